use crate::errors::AgentError;
use serde::Deserialize;
use std::time::Duration;

const IMDS_BASE_URL: &str = "http://169.254.169.254";
const TOKEN_PATH: &str = "/latest/api/token";
const IDENTITY_DOCUMENT_PATH: &str = "/latest/dynamic/instance-identity/document";
const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";
const TOKEN_TTL_SECONDS: &str = "21600";

/// Identity attributes of the host instance, as reported by the instance
/// metadata service.
#[derive(Debug, Clone)]
pub struct InstanceIdentity {
    pub region: String,
    pub instance_id: Option<String>,
    pub image_id: Option<String>,
    pub instance_type: Option<String>,
}

impl InstanceIdentity {
    /// Fixed stand-in identity for dry runs, which never touch the
    /// metadata service. The values are obviously fake on sight.
    pub fn placeholder() -> Self {
        Self {
            region: "us-east-1".to_string(),
            instance_id: None,
            image_id: Some("i-fakefakefake".to_string()),
            instance_type: Some("r3.fake".to_string()),
        }
    }
}

/// The subset of the instance identity document this agent reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityDocument {
    region: String,
    instance_id: Option<String>,
    image_id: Option<String>,
    instance_type: Option<String>,
}

/// Client for the EC2 instance metadata service.
pub struct ImdsResolver {
    http: reqwest::Client,
    base_url: String,
}

impl ImdsResolver {
    pub fn new() -> Result<Self, AgentError> {
        Self::with_base_url(IMDS_BASE_URL.to_string())
    }

    /// Point the resolver at a different endpoint. Tests use this to talk
    /// to a local mock server.
    pub fn with_base_url(base_url: String) -> Result<Self, AgentError> {
        // Short connect timeout so a non-EC2 host fails fast instead of
        // hanging on the link-local address.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(1))
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AgentError::Imds { source: e })?;
        Ok(Self { http, base_url })
    }

    /// Fetch the instance identity document and extract the attributes.
    ///
    /// Tries the IMDSv2 token handshake first and silently falls back to
    /// v1 when the token endpoint is unavailable.
    pub async fn resolve(&self) -> Result<InstanceIdentity, AgentError> {
        let token = self.fetch_token().await;

        let mut request = self
            .http
            .get(format!("{}{}", self.base_url, IDENTITY_DOCUMENT_PATH));
        if let Some(token) = &token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AgentError::Imds { source: e })?;
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::Imds { source: e })?;

        parse_identity_document(&body)
    }

    async fn fetch_token(&self) -> Option<String> {
        let response = self
            .http
            .put(format!("{}{}", self.base_url, TOKEN_PATH))
            .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECONDS)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.text().await.ok()
    }
}

fn parse_identity_document(body: &str) -> Result<InstanceIdentity, AgentError> {
    let doc: IdentityDocument =
        serde_json::from_str(body).map_err(|e| AgentError::IdentityDocument { source: e })?;
    Ok(InstanceIdentity {
        region: doc.region,
        instance_id: doc.instance_id,
        image_id: doc.image_id,
        instance_type: doc.instance_type,
    })
}

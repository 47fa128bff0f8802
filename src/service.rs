use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    config::{ConfigurationRequest, GenerationResult},
    error::GenerateError,
};

const GENERATE_PATH: &str = "/generate-config";
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Renders configuration text from a request. One call, one exchange.
#[async_trait(?Send)]
pub trait GenerationService {
    async fn generate(&self, request: &ConfigurationRequest)
        -> Result<GenerationResult, GenerateError>;
}

// ── HTTP client ───────────────────────────────────────────────────────────────

pub struct HttpGenerationService {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpGenerationService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl GenerationService for HttpGenerationService {
    async fn generate(
        &self,
        request: &ConfigurationRequest,
    ) -> Result<GenerationResult, GenerateError> {
        let response = self.http.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "generation response");

        if !status.is_success() {
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_response(&text)
    }
}

/// Decodes a 2xx body.
pub fn parse_response(body: &str) -> Result<GenerationResult, GenerateError> {
    Ok(serde_json::from_str(body)?)
}

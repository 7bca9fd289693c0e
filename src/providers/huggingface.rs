use std::env;
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use tracing::debug;

use crate::config::InferenceConfig;
use crate::error::{InferenceError, PipelineError};
use crate::providers::{InferenceTransport, TransportResponse};

/// Blocking HTTP transport for the Hugging Face hosted inference API
#[derive(Debug, Clone)]
pub struct HuggingFaceTransport {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl HuggingFaceTransport {
    pub fn new<S: Into<String>>(config: &InferenceConfig, api_key: S) -> Result<Self, InferenceError> {
        let mut builder = HttpClient::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| InferenceError::Network(e.to_string()))?;

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { http, base_url, api_key: api_key.into() })
    }

    /// Read the bearer token from the environment variable named in the config.
    /// An unset or blank variable is a precondition error.
    pub fn from_env(config: &InferenceConfig) -> crate::error::Result<Self> {
        match env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(config, key.trim())?),
            _ => Err(PipelineError::missing_api_key(&config.api_key_env)),
        }
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}{}", self.base_url, model)
    }
}

impl InferenceTransport for HuggingFaceTransport {
    fn post(&self, model: &str, payload: &serde_json::Value) -> Result<TransportResponse, InferenceError> {
        let url = self.endpoint(model);
        debug!("POST {}", url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .map_err(|e| InferenceError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| InferenceError::Network(e.to_string()))?;
        debug!("{} answered {} ({} bytes)", url, status, body.len());
        Ok(TransportResponse { status, body })
    }
}

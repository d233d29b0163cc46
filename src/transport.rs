use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{AskbotError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Body of a reply from `/ask`. A missing `success` reads as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AskResponse {
    pub fn answered(text: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(text.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
        }
    }
}

/// The backend seam. `Err` means the request itself failed; an application
/// failure still arrives as `Ok` with `success == false`.
#[async_trait]
pub trait AskTransport: Send + Sync {
    async fn ask(&self, question: &str) -> Result<AskResponse>;
}

pub struct HttpAskTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpAskTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| AskbotError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url: config.ask_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AskTransport for HttpAskTransport {
    async fn ask(&self, question: &str) -> Result<AskResponse> {
        let body = AskRequest {
            question: question.to_string(),
        };
        debug!(url = %self.url, "posting question");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AskbotError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(AskbotError::Http(format!("HTTP {status}: {text}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AskbotError::Http(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| AskbotError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_question_only() {
        let value = serde_json::to_value(AskRequest {
            question: "What is flexbox?".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"question": "What is flexbox?"}));
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let parsed: AskResponse = serde_json::from_value(json!({"error": "No question provided"}))
            .unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.response, None);
        assert_eq!(parsed.error.as_deref(), Some("No question provided"));

        let parsed: AskResponse =
            serde_json::from_value(json!({"success": true, "response": "Video 12 at 03:10"}))
                .unwrap();
        assert_eq!(parsed, AskResponse::answered("Video 12 at 03:10"));
    }

    #[test]
    fn transport_targets_configured_url() {
        let config = ClientConfig {
            server_url: "http://localhost:9000/".to_string(),
            ask_path: "/ask".to_string(),
            timeout_seconds: Some(3),
        };
        let transport = HttpAskTransport::new(&config).unwrap();
        assert_eq!(transport.url(), "http://localhost:9000/ask");
    }
}

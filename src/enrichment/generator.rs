//! Text-generation backend client

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Rewrite `text` into generated prose. Output is unprocessed.
    async fn generate(&self, text: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Client for a `POST {base}/generate` text-generation service
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
}

impl LlmClient {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            max_tokens,
            temperature,
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    #[instrument(skip(self))]
    async fn generate(&self, text: &str) -> Result<String> {
        let url = format!("{}/generate", self.base_url.trim_end_matches('/'));
        let request = GenerateRequest {
            text,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response: Vec<GeneratedText> = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to reach text generator at {url}"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| "Failed to parse text generator response")?;

        debug!("Generator returned {} candidates", response.len());
        response
            .into_iter()
            .next()
            .map(|candidate| candidate.generated_text)
            .ok_or(anyhow!("Text generator returned no candidates"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_sends_request_shape() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_json(serde_json::json!({
                "text": "light rain",
                "max_tokens": 20,
                "temperature": 0.5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"generated_text": "Puddles gossip in the street."}
            ])))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new(reqwest::Client::new(), mock_server.uri(), 20, 0.5);
        let text = client.generate("light rain").await.unwrap();
        assert_eq!(text, "Puddles gossip in the street.");
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new(reqwest::Client::new(), mock_server.uri(), 20, 0.85);
        let err = client.generate("haze").await.unwrap_err();
        assert!(err.to_string().contains("no candidates"));
    }

    #[tokio::test]
    async fn test_generate_server_error_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new(reqwest::Client::new(), mock_server.uri(), 20, 0.85);
        assert!(client.generate("haze").await.is_err());
    }
}

//! HTTP client for the Gemini `generateContent` API.

use crate::briefing::chapters::{self, Chapter};
use crate::config::Config;
use crate::error::{LessonError, Result};
use crate::genai::types::{
    self, GenerateContentRequest, GenerateContentResponse, LessonDocument,
};
use crate::speech::backend::SpeechBackend;
use crate::whiteboard::{ImageBackend, InlineImage};
use tracing::debug;

/// Client for speech, text and image generation.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    speech_model: String,
    voice: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    /// Build a client from configuration; an API key is required.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .api
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LessonError::ConfigInvalidValue {
                key: "api.api_key".to_string(),
                message: "an API key is required (or set LESSONCAST_API_KEY)".to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout())
            .build()
            .map_err(|e| LessonError::Other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            speech_model: config.speech.model.clone(),
            voice: config.speech.voice.clone(),
            text_model: config.api.text_model.clone(),
            image_model: config.api.image_model.clone(),
        })
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        debug!(model, "Calling generateContent");

        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LessonError::Other(format!("Request to generative service timed out: {e}"))
                } else {
                    LessonError::Other(format!("Request to generative service failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(error = %e, %status, "Could not read error response body");
                    String::new()
                }
            };
            return Err(types::classify_error(status.as_u16(), &body));
        }

        let text = response.text().await.map_err(|e| {
            LessonError::Other(format!("Failed to read generative service response: {e}"))
        })?;

        serde_json::from_str(&text).map_err(|e| {
            LessonError::Other(format!("Failed to parse generative service response: {e}"))
        })
    }

    /// Spoken teaching summary for a lesson document.
    pub async fn teaching_summary(&self, document: &LessonDocument) -> Result<String> {
        let response = self
            .generate(&self.text_model, &types::summary_request(document))
            .await?;
        response.text().ok_or_else(|| LessonError::PlanningFailed {
            message: "Generative service returned no summary text".to_string(),
        })
    }

    /// Raw JSON topic breakdown for the deep dive.
    pub async fn deep_dive_json(&self, document: &LessonDocument) -> Result<String> {
        let response = self
            .generate(&self.text_model, &types::deep_dive_request(document))
            .await?;
        Ok(response.text().unwrap_or_else(|| "[]".to_string()))
    }

    /// Parsed deep-dive chapters.
    pub async fn deep_dive_chapters(&self, document: &LessonDocument) -> Result<Vec<Chapter>> {
        let json = self.deep_dive_json(document).await?;
        chapters::parse_chapters(&json)
    }
}

#[async_trait::async_trait]
impl SpeechBackend for GeminiClient {
    async fn generate_speech(&self, text: &str) -> Result<Option<String>> {
        let response = self
            .generate(&self.speech_model, &types::speech_request(text, &self.voice))
            .await?;
        Ok(response.first_inline_data().map(|d| d.data.clone()))
    }

    fn name(&self) -> &str {
        &self.speech_model
    }
}

#[async_trait::async_trait]
impl ImageBackend for GeminiClient {
    async fn generate_image(&self, prompt: &str) -> Result<Option<InlineImage>> {
        let response = self
            .generate(&self.image_model, &types::image_request(prompt))
            .await?;
        Ok(response.first_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(key: Option<&str>) -> Config {
        let mut config = Config::default();
        config.api.api_key = key.map(str::to_string);
        config
    }

    #[test]
    fn from_config_requires_api_key() {
        assert!(matches!(
            GeminiClient::from_config(&config_with_key(None)),
            Err(LessonError::ConfigInvalidValue { key, .. }) if key == "api.api_key"
        ));
        assert!(GeminiClient::from_config(&config_with_key(Some("  "))).is_err());
    }

    #[test]
    fn endpoint_includes_model() {
        let mut config = config_with_key(Some("k"));
        config.api.base_url = "http://localhost:8080/v1beta/".to_string();
        let client = GeminiClient::from_config(&config).unwrap();

        assert_eq!(
            client.endpoint("gemini-2.5-flash-preview-tts"),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"
        );
        assert_eq!(client.name(), crate::defaults::DEFAULT_SPEECH_MODEL);
        assert_eq!(client.voice(), "Kore");
    }

    #[tokio::test]
    async fn unreachable_service_is_not_rate_limited() {
        let mut config = config_with_key(Some("k"));
        // Port 9 (discard) on localhost is not expected to serve HTTP
        config.api.base_url = "http://127.0.0.1:9".to_string();
        let client = GeminiClient::from_config(&config).unwrap();

        let err = client.generate_speech("hello").await.unwrap_err();
        assert!(!err.is_rate_limited());
    }

    #[tokio::test]
    async fn stalled_service_times_out() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut config = config_with_key(Some("k"));
        config.api.base_url = format!("http://{addr}");
        config.api.request_timeout_secs = 1;
        let client = GeminiClient::from_config(&config).unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            client.generate_speech("hello"),
        )
        .await
        .expect("client should give up on its own");

        let err = result.unwrap_err();
        assert!(!err.is_rate_limited());
        assert!(err.to_string().contains("timed out"), "got: {err}");
        server.abort();
    }
}

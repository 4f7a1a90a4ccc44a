//! Ollama provider implementation.
//!
//! Talks to the native Ollama HTTP API:
//! - `POST /api/generate` for single-prompt completions (non-streaming)
//! - `POST /api/embeddings` for text embeddings
//!
//! Any status >= 400, or a non-empty `error` field in an otherwise
//! successful payload, is reported as a failure.

use async_trait::async_trait;
use genie_core::error::ProviderError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A local (or remote) Ollama server.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    embed_model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider.
    ///
    /// Empty model names fall back to `llama3.2:latest`; an empty embedding
    /// model reuses the generation model.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        embed_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        let mut base_url: String = base_url.into();
        if base_url.trim().is_empty() {
            base_url = "http://localhost:11434".into();
        }
        let mut model: String = model.into();
        if model.trim().is_empty() {
            model = "llama3.2:latest".into();
        }
        let mut embed_model: String = embed_model.into();
        if embed_model.trim().is_empty() {
            embed_model = model.clone();
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            embed_model,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(format!("{url}: {e}"))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if status >= 400 {
            warn!(status, body = %text, "Ollama returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: text,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| ProviderError::InvalidResponse(format!("{path}: {e}")))
    }
}

#[async_trait]
impl genie_core::Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Sending generate request");

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let response: GenerateResponse = self.post("/api/generate", &request).await?;

        if !response.error.is_empty() {
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: response.error,
            });
        }

        Ok(response.response)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        debug!(model = %self.embed_model, text_len = text.len(), "Sending embedding request");

        let request = EmbedRequest {
            model: &self.embed_model,
            prompt: text,
        };
        let response: EmbedResponse = self.post("/api/embeddings", &request).await?;

        if !response.error.is_empty() {
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: response.error,
            });
        }

        Ok(response.embedding)
    }
}

// --- Ollama wire types ---

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Vec<f32>,
    #[serde(default)]
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use genie_core::Provider;
    use serde_json::{Value, json};

    /// Serve `app` on an ephemeral port and return its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn provider(base_url: &str) -> OllamaProvider {
        OllamaProvider::new(base_url, "coder", "embedder", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn empty_settings_fall_back_to_defaults() {
        let p = OllamaProvider::new("", "", "", Duration::from_secs(1)).unwrap();
        assert_eq!(p.base_url, "http://localhost:11434");
        assert_eq!(p.model(), "llama3.2:latest");
        assert_eq!(p.embed_model(), "llama3.2:latest");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let p = provider("http://gpu-box:11434/");
        assert_eq!(p.base_url, "http://gpu-box:11434");
    }

    #[tokio::test]
    async fn generate_returns_response_field() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "coder");
                assert_eq!(body["stream"], false);
                Json(json!({ "response": "package main", "done": true }))
            }),
        );
        let base = serve(app).await;

        let text = provider(&base).generate("write a test").await.unwrap();
        assert_eq!(text, "package main");
    }

    #[tokio::test]
    async fn error_field_is_a_failure() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({ "error": "model 'coder' not found" })) }),
        );
        let base = serve(app).await;

        let err = provider(&base).generate("x").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn http_error_status_is_a_failure() {
        let app = Router::new().route(
            "/api/embeddings",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(app).await;

        let err = provider(&base).embed("x").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ApiError { status_code: 500, .. }
        ));
    }

    #[tokio::test]
    async fn embed_uses_embedding_model() {
        let app = Router::new().route(
            "/api/embeddings",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "embedder");
                assert_eq!(body["prompt"], "tap the login button");
                Json(json!({ "embedding": [0.1, 0.2, 0.3] }))
            }),
        );
        let base = serve(app).await;

        let vector = provider(&base).embed("tap the login button").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let p = provider("http://127.0.0.1:1");
        let err = p.generate("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_) | ProviderError::Timeout(_)));
    }
}

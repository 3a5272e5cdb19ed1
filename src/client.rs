//! Chat backend client.
//!
//! The RAG backend is an opaque collaborator with one operation:
//! `sendMessage(text) -> {response, sources, citations}`. [`ChatBackend`]
//! is the seam; [`HttpChatBackend`] talks to the real service over JSON.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - Other HTTP 4xx → fail immediately
//! - Network errors → retry
//!
//! Backoff doubles from `base_delay` on each attempt, up to
//! `backend.max_retries` retries.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use citemark_core::ChatResponse;

use crate::config::BackendConfig;

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user message and return the assistant reply.
    async fn send_message(&self, text: &str) -> Result<ChatResponse>;
}

/// JSON-over-HTTP backend: `POST {url}{chat_path}` with `{"message": text}`.
pub struct HttpChatBackend {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpChatBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let url = config
            .chat_url()
            .ok_or_else(|| anyhow::anyhow!("backend.url must be set to send messages"))?;

        let api_key = match &config.api_key_env {
            Some(var) => Some(
                std::env::var(var).map_err(|_| anyhow::anyhow!("{} not set", var))?,
            ),
            None => None,
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url,
            api_key,
            max_retries: config.max_retries,
            base_delay: Duration::from_secs(1),
        })
    }

    /// Override the first backoff delay (tests use milliseconds).
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_message(&self, text: &str) -> Result<ChatResponse> {
        let body = serde_json::json!({ "message": text });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * (1u32 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.url).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let text = response
                            .text()
                            .await
                            .with_context(|| "Failed to read backend response")?;
                        return ChatResponse::from_json(&text);
                    }

                    let body_text = response.text().await.unwrap_or_default();

                    if status.as_u16() == 429 || status.is_server_error() {
                        tracing::warn!(%status, attempt, "backend call failed, retrying");
                        last_err = Some(anyhow::anyhow!("Backend error {}: {}", status, body_text));
                        continue;
                    }

                    bail!("Backend error {}: {}", status, body_text);
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "backend unreachable, retrying");
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Backend call failed after retries")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn backend_config(url: &str, max_retries: u32) -> BackendConfig {
        BackendConfig {
            url: Some(url.to_string()),
            max_retries,
            timeout_secs: 5,
            ..BackendConfig::default()
        }
    }

    #[tokio::test]
    async fn test_send_message_parses_reply() {
        let app = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<serde_json::Value>| async move {
                let question = body["message"].as_str().unwrap_or_default().to_string();
                Json(serde_json::json!({
                    "response": format!("You asked: {} [CITE:1]", question),
                    "sources": ["Cell Biology.pdf"],
                    "citations": [{"id": "c1", "source": "Cell Biology.pdf", "relevance_score": 0.9}]
                }))
            }),
        );
        let url = spawn(app).await;

        let backend = HttpChatBackend::new(&backend_config(&url, 0)).unwrap();
        let reply = backend.send_message("what is mitosis?").await.unwrap();
        assert_eq!(reply.response, "You asked: what is mitosis? [CITE:1]");
        assert_eq!(reply.citations.len(), 1);
        assert_eq!(reply.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/api/chat",
            post(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(StatusCode::SERVICE_UNAVAILABLE)
                    } else {
                        Ok(Json(serde_json::json!({ "response": "ok" })))
                    }
                }
            }),
        );
        let url = spawn(app).await;

        let backend = HttpChatBackend::new(&backend_config(&url, 2))
            .unwrap()
            .with_base_delay(Duration::from_millis(5));
        let reply = backend.send_message("hi").await.unwrap();
        assert_eq!(reply.response, "ok");
        assert!(reply.citations.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/api/chat",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::UNAUTHORIZED
                }
            }),
        );
        let url = spawn(app).await;

        let backend = HttpChatBackend::new(&backend_config(&url, 3))
            .unwrap()
            .with_base_delay(Duration::from_millis(5));
        let err = backend.send_message("hi").await.unwrap_err();
        assert!(err.to_string().contains("401"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_requires_url() {
        let err = HttpChatBackend::new(&BackendConfig::default()).err().unwrap();
        assert!(err.to_string().contains("backend.url"));
    }

    #[test]
    fn test_missing_api_key_env() {
        let config = BackendConfig {
            url: Some("http://127.0.0.1:1".into()),
            api_key_env: Some("CITEMARK_TEST_KEY_THAT_IS_NOT_SET".into()),
            ..BackendConfig::default()
        };
        let err = HttpChatBackend::new(&config).err().unwrap();
        assert!(err.to_string().contains("not set"));
    }
}

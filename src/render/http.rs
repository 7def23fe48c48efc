//! HTTP-backed renderer
//!
//! This renderer produces DOM snapshots without driving a local browser:
//! - Direct mode GETs the page HTML
//! - Browserless mode asks a Browserless `/content` endpoint for the
//!   fully rendered HTML, so scripts and lazy content have already run

use crate::config::{RendererConfig, RendererKind};
use crate::render::{Dom, NavigationOutcome, PageRenderer, RenderError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

enum Backend {
    Direct,
    Browserless {
        endpoint: String,
        token: Option<String>,
    },
}

/// Renderer that turns HTTP responses into DOM snapshots
pub struct HttpRenderer {
    client: Client,
    backend: Backend,
    current: Option<String>,
}

impl HttpRenderer {
    /// Builds a renderer from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpRenderer)` - Ready to navigate
    /// * `Err(RenderError::Unavailable)` - The HTTP client could not be built
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| RenderError::Unavailable(e.to_string()))?;

        let backend = match config.kind {
            RendererKind::Http => Backend::Direct,
            RendererKind::Browserless => {
                let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                    RenderError::Unavailable("browserless endpoint not configured".to_string())
                })?;
                Backend::Browserless {
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    token: config.token.clone(),
                }
            }
            RendererKind::Chrome => {
                return Err(RenderError::Unavailable(
                    "chrome is not an HTTP renderer".to_string(),
                ))
            }
        };

        Ok(Self {
            client,
            backend,
            current: None,
        })
    }

    async fn fetch(&self, url: &Url) -> Result<String, RenderError> {
        let request = match &self.backend {
            Backend::Direct => self.client.get(url.as_str()),
            Backend::Browserless { endpoint, token } => {
                let request = self
                    .client
                    .post(format!("{}/content", endpoint))
                    .json(&serde_json::json!({ "url": url.as_str() }));
                match token {
                    Some(token) => request.query(&[("token", token.as_str())]),
                    None => request,
                }
            }
        };

        let response = request.send().await.map_err(|source| RenderError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| RenderError::Http {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait(?Send)]
impl PageRenderer for HttpRenderer {
    async fn navigate(
        &mut self,
        url: &Url,
        timeout: Duration,
    ) -> Result<NavigationOutcome, RenderError> {
        // Navigating away discards the previous page even if the new one never arrives.
        self.current = None;

        match tokio::time::timeout(timeout, self.fetch(url)).await {
            Ok(Ok(body)) => {
                tracing::trace!("Loaded {} ({} bytes)", url, body.len());
                self.current = Some(body);
                Ok(NavigationOutcome::Loaded)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(NavigationOutcome::TimedOut),
        }
    }

    async fn stop_loading(&mut self) {
        // The request future is dropped when the timeout fires; nothing is left in flight.
        tracing::debug!("Stopped loading; continuing with the current document");
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        // Served HTML is final; lazy loading needs the chrome renderer.
        Ok(())
    }

    async fn snapshot(&self) -> Result<Dom, RenderError> {
        Ok(match &self.current {
            Some(html) => Dom::parse(html),
            None => Dom::empty(),
        })
    }

    async fn close(&mut self) {
        self.current = None;
        tracing::debug!("Renderer released");
    }
}

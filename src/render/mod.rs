//! Page rendering for the crawler
//!
//! The crawler never talks to a browser directly. It drives a [`PageRenderer`],
//! which navigates, scrolls, and hands back a [`Dom`] snapshot to read from.
//!
//! # Components
//!
//! - `PageRenderer`: the navigation capability the crawler owns for a whole run
//! - `Dom` / `ElementExt`: element lookup, text, and attribute access on a snapshot
//! - `HttpRenderer`: fetches page HTML directly or through a Browserless service
//! - `BrowserRenderer`: drives a local Chrome, so scrolling and stop-loading are real

mod browser;
mod dom;
mod http;

pub use browser::BrowserRenderer;
pub use dom::{Dom, ElementExt};
pub use http::HttpRenderer;

use crate::config::{RendererConfig, RendererKind};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors reported by a renderer
///
/// Timeouts are not errors; see [`NavigationOutcome::TimedOut`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Renderer unavailable: {0}")]
    Unavailable(String),
}

/// How a navigation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The page finished loading within the timeout
    Loaded,
    /// The timeout elapsed first; whatever DOM exists is all there is
    TimedOut,
}

/// Navigation capability used by the crawler
///
/// One renderer instance serves the whole run and is used strictly
/// sequentially, so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait PageRenderer {
    /// Loads `url`, waiting at most `timeout`
    async fn navigate(
        &mut self,
        url: &Url,
        timeout: Duration,
    ) -> Result<NavigationOutcome, RenderError>;

    /// Abandons an in-flight load, keeping the current DOM
    async fn stop_loading(&mut self);

    /// Scrolls to the bottom of the page to trigger lazy loading
    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError>;

    /// Snapshot of the DOM as it is now
    async fn snapshot(&self) -> Result<Dom, RenderError>;

    /// Releases the renderer at the end of the run
    async fn close(&mut self);
}

/// Builds the renderer selected by the configuration
///
/// A renderer that cannot be built is a fatal configuration problem.
/// `navigation_timeout` bounds the browser's own command timeout.
pub async fn build_renderer(
    config: &RendererConfig,
    navigation_timeout: Duration,
) -> Result<Box<dyn PageRenderer>, RenderError> {
    let renderer: Box<dyn PageRenderer> = match config.kind {
        RendererKind::Http | RendererKind::Browserless => Box::new(HttpRenderer::new(config)?),
        RendererKind::Chrome => {
            Box::new(BrowserRenderer::launch(config, navigation_timeout).await?)
        }
    };
    Ok(renderer)
}

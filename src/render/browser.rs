//! Chrome-backed renderer
//!
//! Drives a local Chrome/Chromium over the DevTools protocol. Unlike the
//! HTTP renderer, page scripts run, `stop_loading` halts an in-flight load
//! and scrolling triggers lazy-loaded product cards.

use crate::config::RendererConfig;
use crate::render::{Dom, NavigationOutcome, PageRenderer, RenderError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

const STOP_SCRIPT: &str = "window.stop()";
const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Renderer owning one Chrome process and one tab for the whole run
pub struct BrowserRenderer {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserRenderer {
    /// Launches Chrome and opens a blank tab
    ///
    /// # Arguments
    ///
    /// * `config` - Renderer configuration (executable, headless, user agent)
    /// * `navigation_timeout` - Upper bound for a single DevTools command
    ///
    /// # Returns
    ///
    /// * `Ok(BrowserRenderer)` - Chrome is running and a tab is open
    /// * `Err(RenderError::Unavailable)` - Chrome could not be found or started
    pub async fn launch(
        config: &RendererConfig,
        navigation_timeout: Duration,
    ) -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(navigation_timeout)
            .window_size(1920, 1080)
            .arg(format!("--user-agent={}", config.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-notifications")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }
        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder.build().map_err(RenderError::Unavailable)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| RenderError::Unavailable(format!("failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler error: {}", e);
                }
            }
            tracing::debug!("Browser handler task completed");
        });

        let page = browser.new_page("about:blank").await?;
        tracing::info!("Launched browser renderer");

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

#[async_trait(?Send)]
impl PageRenderer for BrowserRenderer {
    async fn navigate(
        &mut self,
        url: &Url,
        timeout: Duration,
    ) -> Result<NavigationOutcome, RenderError> {
        match tokio::time::timeout(timeout, self.page.goto(url.as_str())).await {
            Ok(Ok(_)) => Ok(NavigationOutcome::Loaded),
            Ok(Err(CdpError::Timeout)) | Err(_) => Ok(NavigationOutcome::TimedOut),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    async fn stop_loading(&mut self) {
        if let Err(e) = self.page.evaluate(STOP_SCRIPT).await {
            tracing::warn!("Failed to stop loading: {}", e);
        }
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        self.page.evaluate(SCROLL_SCRIPT).await?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<Dom, RenderError> {
        let html = self.page.content().await?;
        Ok(Dom::parse(&html))
    }

    async fn close(&mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser did not exit cleanly: {}", e);
        }
        self.handler.abort();
        tracing::debug!("Renderer released");
    }
}

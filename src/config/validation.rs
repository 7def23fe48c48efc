use crate::config::types::{
    Config, CrawlerConfig, InputConfig, OutputConfig, RendererConfig, RendererKind,
};
use crate::crawler::SelectorTable;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    SelectorTable::compile(&config.selectors)?;
    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.sources_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "sources_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.progress_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "progress_path cannot be empty".to_string(),
        ));
    }

    if config.dataset_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "dataset_path cannot be empty".to_string(),
        ));
    }

    if config.progress_path == config.dataset_path {
        return Err(ConfigError::Validation(format!(
            "progress_path and dataset_path must differ, both are '{}'",
            config.dataset_path
        )));
    }

    Ok(())
}

/// Validates crawl timing
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // Delays may be zero; the navigation bound may not.
    if config.navigation_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "navigation_timeout_ms must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Validates renderer configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    match config.kind {
        RendererKind::Http => Ok(()),
        RendererKind::Chrome => match config.executable.as_deref() {
            Some(path) if path.trim().is_empty() => Err(ConfigError::Validation(
                "renderer executable cannot be empty".to_string(),
            )),
            _ => Ok(()),
        },
        RendererKind::Browserless => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                ConfigError::Validation(
                    "renderer endpoint is required for browserless rendering".to_string(),
                )
            })?;

            let url = Url::parse(endpoint)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;

            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::InvalidUrl(format!(
                    "Renderer endpoint '{}' must use http or https",
                    endpoint
                )));
            }
            Ok(())
        }
    }
}

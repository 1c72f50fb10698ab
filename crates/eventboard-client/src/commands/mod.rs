//! Command implementations.

pub mod check;
pub mod config;
pub mod countries;
pub mod list;

use std::sync::Arc;
use std::time::Duration;

use eventboard_core::FilterEngine;
use eventboard_providers::{EventSource, HttpEventSource, HttpSourceConfig, JsonFileSource};
use tracing::debug;

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::{EventSession, RetryPolicy};

/// Builds the event source from flags and config.
///
/// A file given on the command line wins over any URL; a URL given on the
/// command line (or through the environment) wins over the config file.
pub fn build_source(cli: &Cli, config: &ClientConfig) -> ClientResult<Arc<dyn EventSource>> {
    if let Some(path) = &cli.file {
        return Ok(Arc::new(JsonFileSource::new(path)));
    }
    if cli.source_url.is_none()
        && let Some(path) = &config.source.file
    {
        return Ok(Arc::new(JsonFileSource::new(path)));
    }

    let url = cli.source_url.as_deref().unwrap_or(&config.source.url);
    let timeout = cli.timeout.unwrap_or(config.source.timeout);
    if timeout == 0 {
        return Err(ClientError::InvalidArgument(
            "timeout must be greater than 0".to_string(),
        ));
    }

    let http_config = HttpSourceConfig::new(url)
        .map_err(|e| ClientError::InvalidArgument(format!("invalid source url {:?}: {}", url, e)))?
        .with_timeout(Duration::from_secs(timeout));
    Ok(Arc::new(HttpEventSource::new(http_config)?))
}

/// Builds a session and performs the initial fetch.
///
/// The configuration is validated first, so an unusable value fails the
/// command instead of degrading its output.
pub async fn load_session(cli: &Cli, config: &ClientConfig) -> ClientResult<EventSession> {
    config.validate()?;
    let source = build_source(cli, config)?;
    let engine = FilterEngine::new(cli.page_size(config)?);
    let session = EventSession::new(source).with_engine(engine);

    debug!(source = %session.source().location(), "Loading events");
    session
        .refresh_with_retries(&RetryPolicy::new(cli.retries))
        .await?;
    Ok(session)
}

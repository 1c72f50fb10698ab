//! List the countries present in the collection.

use eventboard_core::{Event, OutputFormat, available_countries};

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Fetches events and prints their distinct countries.
pub async fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let session = super::load_session(cli, config).await?;
    let catalog = session
        .snapshot()
        .await
        .ok_or(crate::error::ClientError::NoEventsLoaded)?;
    println!("{}", render(&catalog.events, cli.output_format())?);
    Ok(())
}

/// Renders the country list, one per line or as a JSON array.
pub fn render(events: &[Event], format: OutputFormat) -> ClientResult<String> {
    let countries = available_countries(events);
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(&countries)?),
        OutputFormat::Tty if countries.is_empty() => Ok("No countries found.".to_string()),
        OutputFormat::Tty => Ok(countries.join("\n")),
    }
}

//! Data check: fetch, normalize and report problems.
//!
//! Diagnostics are reported, not treated as failures. The command only
//! fails when no collection could be fetched.

use std::fmt::Write as _;

use eventboard_providers::NormalizeError;

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::Catalog;

/// Fetches events and prints a normalization report.
pub async fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let session = super::load_session(cli, config).await?;
    let catalog = session
        .snapshot()
        .await
        .ok_or(ClientError::NoEventsLoaded)?;
    println!("{}", render(&session.source().location(), &catalog));
    Ok(())
}

/// Renders the report for one catalog.
pub fn render(location: &str, catalog: &Catalog) -> String {
    let count = |wanted: fn(&NormalizeError) -> bool| {
        catalog.diagnostics.iter().filter(|d| wanted(d)).count()
    };
    let dates = count(|d| matches!(d, NormalizeError::MalformedDate { .. }));
    let records = count(|d| matches!(d, NormalizeError::MalformedRecord { .. }));
    let duplicates = count(|d| matches!(d, NormalizeError::DuplicateIdentifier { .. }));

    let mut out = String::new();
    let _ = writeln!(out, "Source:     {}", location);
    let _ = writeln!(out, "Received:   {} records", catalog.received);
    let _ = writeln!(out, "Normalized: {} events", catalog.events.len());

    if catalog.diagnostics.is_empty() {
        out.push_str("No problems found.");
        return out;
    }

    let _ = writeln!(
        out,
        "Problems:   {} ({} malformed dates, {} malformed records, {} duplicate identifiers)",
        catalog.diagnostics.len(),
        dates,
        records,
        duplicates
    );
    let lines: Vec<String> = catalog
        .diagnostics
        .iter()
        .map(|d| format!("  {}", d))
        .collect();
    out.push_str(&lines.join("\n"));
    out
}

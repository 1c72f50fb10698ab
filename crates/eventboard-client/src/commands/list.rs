//! Default command: print one page of matching events.

use std::io::IsTerminal;

use chrono::NaiveDate;
use eventboard_core::{OutputFormat, OutputFormatter, PageResult, today_local};
use tracing::debug;

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Fetches events and prints the requested page.
pub async fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let criteria = cli.criteria(config);
    let session = super::load_session(cli, config).await?;
    let page = session.view(&criteria).await?;
    debug!(
        total_matching = page.total_matching,
        total_pages = page.total_pages,
        page = page.page_number,
        "Rendering page"
    );

    let format = cli.output_format();
    let hyperlinks = format == OutputFormat::Tty && std::io::stdout().is_terminal();
    let formatter = OutputFormatter::new(cli.format_options(config, hyperlinks));

    println!(
        "{}",
        render(&formatter, format, &page.as_page_result(), today_local())?
    );
    Ok(())
}

/// Renders a page in the requested format.
pub fn render(
    formatter: &OutputFormatter,
    format: OutputFormat,
    result: &PageResult<'_>,
    today: NaiveDate,
) -> ClientResult<String> {
    match format {
        OutputFormat::Tty => Ok(formatter.format_tty_at(result, today)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(
            &formatter.format_json_at(result, today),
        )?),
    }
}

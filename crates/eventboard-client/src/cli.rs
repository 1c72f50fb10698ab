//! Command-line interface definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use eventboard_core::{
    CountryFilter, FilterCriteria, FormatOptions, OutputFormat, TemporalMode, YearMonth,
    parse_event_date,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// eventboard - Browse and search upcoming events
#[derive(Debug, Parser)]
#[command(name = "eventboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "EVENTBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    // --- Filter flags ---
    /// Search name, description, location, country and organizer
    #[arg(long, short)]
    pub search: Option<String>,

    /// Which events to show: all, upcoming or past
    #[arg(long, value_name = "MODE")]
    pub when: Option<TemporalMode>,

    /// Only show events in this country ("all" for every country)
    #[arg(long)]
    pub country: Option<String>,

    /// Only show events on this day
    #[arg(long, value_name = "DD/MM/YYYY", value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    /// Only show events in this month
    #[arg(long, value_name = "YYYY-MM")]
    pub month: Option<YearMonth>,

    // --- Paging flags ---
    /// Page to show, starting at 1
    #[arg(long, short, default_value_t = 1)]
    pub page: usize,

    /// Events per page
    #[arg(long)]
    pub page_size: Option<usize>,

    // --- Output flags ---
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Use the short description limit
    #[arg(long)]
    pub compact: bool,

    // --- Source flags ---
    /// URL of the event list endpoint
    #[arg(long, env = "EVENTBOARD_API_URL")]
    pub source_url: Option<String>,

    /// Read events from a local JSON file instead of the endpoint
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Re-fetch this many times after a transient failure
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Parses a `--date` value.
fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_event_date(value).map_err(|e| e.to_string())
}

impl Cli {
    /// Returns the output format based on CLI flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Tty
        }
    }

    /// Builds the filter criteria from flags, falling back to config.
    pub fn criteria(&self, config: &ClientConfig) -> FilterCriteria {
        let mut criteria = FilterCriteria::new()
            .with_temporal_mode(self.when.unwrap_or(config.filters.when))
            .with_search_term(self.search.clone().unwrap_or_default());

        let country = self
            .country
            .as_deref()
            .or(config.filters.country.as_deref())
            .map(CountryFilter::from_input)
            .unwrap_or_default();
        criteria = criteria.with_country(country);

        if let Some(date) = self.date {
            criteria = criteria.with_exact_date(date);
        }
        if let Some(month) = self.month {
            criteria = criteria.with_month(month);
        }

        criteria.with_page(self.page)
    }

    /// Returns the page size from flags or config.
    pub fn page_size(&self, config: &ClientConfig) -> ClientResult<usize> {
        match self.page_size.unwrap_or(config.filters.page_size) {
            0 => Err(ClientError::InvalidArgument(
                "page size must be greater than 0".to_string(),
            )),
            size => Ok(size),
        }
    }

    /// Builds formatting options from flags and config.
    pub fn format_options(&self, config: &ClientConfig, hyperlinks: bool) -> FormatOptions {
        FormatOptions {
            description_limit: config.display.description_limit,
            compact_description_limit: config.display.compact_description_limit,
            compact: self.compact || config.display.compact,
            hyperlinks,
            no_events_text: config.display.no_events_text.clone(),
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the countries present in the fetched events
    Countries,

    /// Fetch and normalize events, then report data problems
    Check,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["eventboard"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_come_from_config() {
        let mut config = ClientConfig::default();
        config.filters.when = TemporalMode::Past;
        config.filters.country = Some("India".to_string());

        let criteria = parse(&[]).criteria(&config);
        assert_eq!(criteria.temporal_mode, TemporalMode::Past);
        assert_eq!(criteria.country, CountryFilter::Only("India".to_string()));
        assert_eq!(criteria.page, 1);
        assert_eq!(criteria.active_search(), None);
    }

    #[test]
    fn flags_override_config() {
        let mut config = ClientConfig::default();
        config.filters.country = Some("India".to_string());

        let cli = parse(&[
            "--when", "all", "--country", "all", "--search", "expo", "--page", "3",
        ]);
        let criteria = cli.criteria(&config);
        assert_eq!(criteria.temporal_mode, TemporalMode::All);
        assert_eq!(criteria.country, CountryFilter::All);
        assert_eq!(criteria.active_search(), Some("expo"));
        assert_eq!(criteria.page, 3);
    }

    #[test]
    fn date_and_month_flags() {
        let cli = parse(&["--date", "15/03/2030", "--month", "2030-03"]);
        let criteria = cli.criteria(&ClientConfig::default());
        assert_eq!(criteria.exact_date, NaiveDate::from_ymd_opt(2030, 3, 15));
        assert_eq!(criteria.month, YearMonth::new(2030, 3));
    }

    #[test]
    fn rejects_bad_date_and_mode() {
        let argv = ["eventboard", "--date", "31/02/2030"];
        assert!(Cli::try_parse_from(argv).is_err());
        let argv = ["eventboard", "--when", "soon"];
        assert!(Cli::try_parse_from(argv).is_err());
        let argv = ["eventboard", "--month", "March"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn page_size_zero_is_rejected() {
        let config = ClientConfig::default();
        assert_eq!(parse(&[]).page_size(&config).unwrap(), 9);
        assert_eq!(parse(&["--page-size", "4"]).page_size(&config).unwrap(), 4);
        assert!(parse(&["--page-size", "0"]).page_size(&config).is_err());
    }

    #[test]
    fn output_and_format_options() {
        let cli = parse(&["--json", "--compact"]);
        assert_eq!(cli.output_format(), OutputFormat::Json);
        let options = cli.format_options(&ClientConfig::default(), false);
        assert!(options.compact);
        assert_eq!(options.effective_description_limit(), 60);
        assert_eq!(parse(&[]).output_format(), OutputFormat::Tty);
    }

    #[test]
    fn subcommands() {
        assert!(matches!(parse(&["countries"]).command, Some(Command::Countries)));
        assert!(matches!(parse(&["check"]).command, Some(Command::Check)));
        assert!(matches!(
            parse(&["config", "path"]).command,
            Some(Command::Config {
                action: ConfigAction::Path
            })
        ));
    }
}

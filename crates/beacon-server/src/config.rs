use crate::location::DEFAULT_ADDRESS;
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Emergency help backend: alert lifecycle, simulated dispatch, HTTP API and terminal UI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API and optionally the terminal UI
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// HTTP server address
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub http: String,
    /// Do not start the HTTP server
    #[arg(long)]
    pub no_http: bool,
    /// Start the interactive terminal UI
    #[arg(long)]
    pub tui: bool,
    /// Simulated time to contact emergency services (e.g. "2s", "500ms")
    #[arg(long, default_value = "2s")]
    pub dispatch_delay: String,
    /// Simulated time to determine the device location
    #[arg(long, default_value = "2s")]
    pub location_delay: String,
    /// Address reported by the simulated location provider
    #[arg(long, default_value = DEFAULT_ADDRESS)]
    pub location: String,
    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
    /// Write logs to this file (required to see logs while the TUI is open)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Start with empty alert, contact and notification lists
    #[arg(long)]
    pub no_seed: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: Option<String>,
    pub tui: bool,
    pub dispatch_delay: Duration,
    pub location_delay: Duration,
    pub location: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub seed: bool,
}

impl AppConfig {
    pub fn from_args(args: RunArgs) -> anyhow::Result<Self> {
        if args.no_http && !args.tui {
            bail!("Nothing to run: pass --tui or drop --no-http");
        }
        let dispatch_delay = parse_duration(&args.dispatch_delay)
            .context("Invalid dispatch delay (e.g., '2s', '500ms')")?;
        let location_delay = parse_duration(&args.location_delay)
            .context("Invalid location delay (e.g., '2s', '500ms')")?;
        if args.location.trim().is_empty() {
            bail!("--location must not be empty");
        }

        Ok(Self {
            http_addr: (!args.no_http).then_some(args.http),
            tui: args.tui,
            dispatch_delay,
            location_delay,
            location: args.location,
            log_level: args.log_level,
            log_format: args.log_format,
            log_file: args.log_file,
            seed: !args.no_seed,
        })
    }
}

pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        Ok(Duration::from_millis(ms.trim().parse()?))
    } else if let Some(secs) = s.strip_suffix('s') {
        Ok(Duration::from_secs(secs.trim().parse()?))
    } else if let Some(mins) = s.strip_suffix('m') {
        let mins: u64 = mins.trim().parse()?;
        let secs = mins.checked_mul(60).context("Duration is too large")?;
        Ok(Duration::from_secs(secs))
    } else {
        // Bare number means seconds
        Ok(Duration::from_secs(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["beacon", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration(" 7 ").unwrap(), Duration::from_secs(7));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_overflowing_minutes() {
        assert!(parse_duration(&format!("{}m", u64::MAX)).is_err());
        assert!(parse_duration(&format!("{}m", u64::MAX / 60)).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_args(run_args(&[])).unwrap();
        assert_eq!(config.http_addr.as_deref(), Some("127.0.0.1:8080"));
        assert!(!config.tui);
        assert_eq!(config.dispatch_delay, Duration::from_secs(2));
        assert_eq!(config.location, DEFAULT_ADDRESS);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.seed);
    }

    #[test]
    fn test_tui_only() {
        let config = AppConfig::from_args(run_args(&[
            "--tui",
            "--no-http",
            "--dispatch-delay",
            "250ms",
            "--log-format",
            "json",
        ]))
        .unwrap();
        assert!(config.http_addr.is_none());
        assert!(config.tui);
        assert_eq!(config.dispatch_delay, Duration::from_millis(250));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_nothing_to_run() {
        assert!(AppConfig::from_args(run_args(&["--no-http"])).is_err());
    }
}

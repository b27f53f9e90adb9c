use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::models::{CallLog, FilterSpec, ValueFilter};

/// Default file name offered for the filtered export.
pub const DEFAULT_EXPORT_FILE: &str = "filtered_calls.csv";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Summarise a workbook of call logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "calllog-dashboard",
    about = "Summarise a workbook of call logs",
    version
)]
pub struct Settings {
    /// Workbook to load (.xlsx, .xls, .xlsb or .ods)
    pub file: PathBuf,

    /// Only include calls assigned to this user (repeatable; default: all)
    #[arg(long = "user", value_name = "NAME")]
    pub users: Vec<String>,

    /// Only include calls with this direction (repeatable; default: all)
    #[arg(long = "direction", value_name = "LABEL")]
    pub directions: Vec<String>,

    /// Also include calls with no assigned user
    #[arg(long)]
    pub include_unassigned: bool,

    /// Number of longest calls to list
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub top: u32,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Write the filtered records as CSV (default path: filtered_calls.csv)
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = DEFAULT_EXPORT_FILE
    )]
    pub export: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and resolve derived values.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args(args: Vec<OsString>) -> Self {
        Self::resolve(Settings::parse_from(args))
    }

    /// Fallible variant of [`Settings::load_from_args`]; returns clap's error
    /// instead of exiting the process.
    pub fn try_load_from_args(args: Vec<OsString>) -> Result<Self, clap::Error> {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }

    /// Build the active filter for `log`.
    ///
    /// Flags that were not given default to every value observed in the log,
    /// which mirrors a multiselect widget pre-filled with all options.
    pub fn filter_spec(&self, log: &CallLog) -> FilterSpec {
        let assigned = if self.users.is_empty() {
            ValueFilter::new(log.distinct_assigned())
        } else {
            ValueFilter::new(self.users.iter().cloned())
        };
        let direction = if self.directions.is_empty() {
            ValueFilter::new(log.distinct_directions())
        } else {
            ValueFilter::new(self.directions.iter().cloned())
        };

        FilterSpec {
            assigned_to: assigned.with_missing(self.include_unassigned),
            direction,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

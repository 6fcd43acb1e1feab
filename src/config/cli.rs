use crate::adapters::monday::DEFAULT_API_URL;
use crate::config::workflow_config::DEFAULT_CONFIG_PATH;
use crate::core::workflow::RunMode;
use crate::utils::error::{DuplicatorError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_required_field, validate_url, Validate};
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Clone, Parser)]
#[command(name = "item-duplicator")]
#[command(about = "Copy items between Monday boards with column mapping and duplicate detection")]
pub struct CliConfig {
    /// Path to the workflow configuration (JSON, or TOML by extension)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Workflow id to run (skips the interactive menu)
    #[arg(long)]
    pub workflow: Option<String>,

    /// Item name to process (omit for batch mode)
    #[arg(long, conflicts_with = "batch")]
    pub item: Option<String>,

    /// Process every item in the source group
    #[arg(long)]
    pub batch: bool,

    /// List all workflows and exit
    #[arg(long)]
    pub list: bool,

    /// Approve every create/update without asking
    #[arg(long, short = 'y')]
    pub yes: bool,

    #[arg(long, env = "MONDAY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "MONDAY_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Account subdomain used to build item links
    #[arg(long, env = "MONDAY_ACCOUNT")]
    pub account: Option<String>,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,
}

/// Loads `.env`, searching upward from the working directory.
///
/// Variables already present in the process environment are kept. Returns the
/// file that was loaded, if any.
pub fn load_env_file() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Loads a specific env file; a missing or unreadable file is reported as `false`.
pub fn load_env_file_from(path: &Path) -> bool {
    dotenvy::from_path(path).is_ok()
}

impl CliConfig {
    /// Parses the command line after loading `.env`.
    pub fn load() -> Self {
        load_env_file();
        Self::parse()
    }

    /// Mode chosen on the command line, if any; `None` means ask interactively.
    pub fn run_mode(&self) -> Option<RunMode> {
        if self.batch {
            Some(RunMode::Batch)
        } else {
            self.item.clone().map(RunMode::SingleItem)
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        validate_required_field("MONDAY_API_KEY", &self.api_key).map(String::as_str)
    }
}

// Hand-written so the API key never reaches logs.
impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("config", &self.config)
            .field("workflow", &self.workflow)
            .field("item", &self.item)
            .field("batch", &self.batch)
            .field("list", &self.list)
            .field("yes", &self.yes)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_url", &self.api_url)
            .field("account", &self.account)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("verbose", &self.verbose)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("config", &self.config)?;
        if self.list {
            return Ok(());
        }

        validate_url("api_url", &self.api_url)?;
        validate_non_empty_string("MONDAY_API_KEY", self.require_api_key()?)?;
        if let Some(item) = &self.item {
            validate_non_empty_string("item", item)?;
        }
        if self.timeout_seconds == 0 {
            return Err(DuplicatorError::InvalidConfigValueError {
                field: "timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }
}

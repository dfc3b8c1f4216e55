//! Command-line argument definitions for argo-rtqc
//!
//! This module defines the CLI interface using the clap derive API.

use crate::checks::CheckKind;
use crate::config::QcConfig;
use crate::constants::DEFAULT_LOG_LEVEL;
use crate::error::{QcError, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the Argo real-time quality control tool
#[derive(Debug, Clone, Parser)]
#[command(
    name = "argo-rtqc",
    version,
    about = "Run Argo real-time quality control checks on float profiles",
    long_about = "Runs the Argo real-time quality control tests on a profile of pressure, \
                  temperature and salinity and reports the resulting per-sample QC flags. \
                  Profiles are read from CSV files with PRES, TEMP and PSAL columns."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run quality control checks on a profile
    Check(CheckArgs),
    /// Print the QC flag vocabulary and precedence table
    Flags,
}

/// Arguments for the check command
#[derive(Debug, Clone, Parser)]
pub struct CheckArgs {
    /// Profile to check
    ///
    /// CSV with PRES, TEMP and PSAL columns, one sample per line. Empty cells
    /// are missing samples. An optional N_PROF column splits the file into
    /// several rows.
    #[arg(value_name = "PROFILE_CSV")]
    pub profile: PathBuf,

    /// Profile preceding the one under test
    #[arg(
        long = "previous",
        value_name = "PATH",
        help = "Profile preceding the one under test"
    )]
    pub previous: Option<PathBuf>,

    /// TOML configuration file
    ///
    /// Settings not present in the file keep their defaults. The
    /// ARGO_RTQC_SKIP_OPTIONAL environment variable and command line flags
    /// take precedence over the file.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "TOML configuration file"
    )]
    pub config_file: Option<PathBuf>,

    /// Checks to run (repeatable); defaults to all
    #[arg(long = "check", value_name = "CHECK", value_enum)]
    pub checks: Vec<CheckKind>,

    /// Skip checks that are not required
    #[arg(long = "skip-optional", help = "Skip checks that are not required")]
    pub skip_optional: bool,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "table")]
    pub output_format: OutputFormat,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Only show errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Output format for the check report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary and per-sample table
    Table,
    /// CSV for data analysis
    Csv,
}

impl CheckArgs {
    /// Validate the check command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.profile.is_file() {
            return Err(QcError::configuration(format!(
                "Profile file does not exist: {}",
                self.profile.display()
            )));
        }

        if let Some(previous) = &self.previous {
            if !previous.is_file() {
                return Err(QcError::configuration(format!(
                    "Previous profile file does not exist: {}",
                    previous.display()
                )));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(QcError::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Apply command line overrides on top of a loaded configuration
    pub fn apply_to(&self, mut config: QcConfig) -> QcConfig {
        if !self.checks.is_empty() {
            config = config.with_checks(self.checks.clone());
        }
        if self.skip_optional {
            config = config.with_skip_optional(true);
        }
        config
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => DEFAULT_LOG_LEVEL,
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

//! Command implementations for the argo-rtqc CLI
//!
//! Loads profiles, runs the configured checks and prints the report.

use crate::checks::run_checks;
use crate::cli::args::{Args, CheckArgs, Commands, OutputFormat};
use crate::config::QcConfig;
use crate::error::Result;
use crate::loader::load_profile;
use crate::profile::ProfileSource;
use crate::report::{QcReport, render_flag_table};
use std::io::{self, Write};
use tracing::{debug, info};

/// Outcome of a command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandSummary {
    /// Argo QC test bitmask of the checks performed
    pub tests_performed: u32,
    /// Argo QC test bitmask of the checks that failed
    pub tests_failed: u32,
}

/// Main command runner
pub fn run(args: Args) -> Result<CommandSummary> {
    match args.command {
        Commands::Check(check_args) => run_check(check_args),
        Commands::Flags => {
            print!("{}", render_flag_table()?);
            Ok(CommandSummary::default())
        }
    }
}

/// Run the checks on one profile and print the report
pub fn run_check(args: CheckArgs) -> Result<CommandSummary> {
    setup_logging(&args);

    debug!("Command line arguments: {:?}", args);
    args.validate()?;

    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let profile = load_profile(&args.profile)?;
    let previous = args.previous.as_deref().map(load_profile).transpose()?;
    info!(
        "Checking {} ({} valid pressure samples)",
        profile.label(),
        profile.pressure().valid_count()
    );

    let run = run_checks(
        &profile,
        previous.as_ref().map(|p| p as &dyn ProfileSource),
        &config,
    )?;
    let report = QcReport::from_run(&profile, &run)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output_format {
        OutputFormat::Table => {
            if !args.quiet {
                write!(out, "{}", report.render_summary())?;
                writeln!(out)?;
            }
            write!(out, "{}", report.render_table())?;
        }
        OutputFormat::Csv => report.write_csv(&mut out)?,
    }
    out.flush()?;

    Ok(CommandSummary {
        tests_performed: report.tests_performed(),
        tests_failed: report.tests_failed(),
    })
}

/// Load configuration using layered approach (file -> env -> args)
fn load_configuration(args: &CheckArgs) -> Result<QcConfig> {
    let config = QcConfig::load_layered(args.config_file.as_deref())?;
    let config = args.apply_to(config);
    config.validate()?;
    Ok(config)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &CheckArgs) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("argo_rtqc={}", log_level)));

    // fails when a global subscriber is already set
    let result = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(io::stderr),
            )
            .try_init()
    };

    if result.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn check_args(profile: PathBuf) -> CheckArgs {
        CheckArgs {
            profile,
            previous: None,
            config_file: None,
            checks: Vec::new(),
            skip_optional: false,
            output_format: OutputFormat::Csv,
            verbose: 0,
            quiet: true,
        }
    }

    #[test]
    fn test_run_check_reports_failures() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("profile.csv");
        std::fs::write(&path, "PRES,TEMP,PSAL\n0,10,35\n1,10,35\n1,10,35\n").unwrap();

        let summary = run_check(check_args(path)).unwrap();
        assert_eq!(summary.tests_performed, 64 | 256);
        assert_eq!(summary.tests_failed, 256);
    }

    #[test]
    fn test_run_check_with_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("profile.csv");
        std::fs::write(&path, "PRES,TEMP,PSAL\n0,30,35\n1,31,35\n").unwrap();
        let config_path = temp_dir.path().join("rtqc.toml");
        std::fs::write(
            &config_path,
            "checks = [\"global-range\"]\n[global_range]\ntemperature_max = 25.0\n",
        )
        .unwrap();

        let mut args = check_args(path);
        args.config_file = Some(config_path);
        let summary = run_check(args).unwrap();
        assert_eq!(summary.tests_performed, 64);
        assert_eq!(summary.tests_failed, 64);
    }

    #[test]
    fn test_command_line_checks_override_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("profile.csv");
        std::fs::write(&path, "PRES,TEMP,PSAL\n0,10,35\n").unwrap();

        let mut args = check_args(path);
        args.checks = vec![CheckKind::PressureIncreasing];
        let summary = run_check(args).unwrap();
        assert_eq!(summary.tests_performed, 256);
    }

    #[test]
    fn test_missing_profile_is_an_error() {
        let args = check_args(PathBuf::from("/nonexistent/profile.csv"));
        assert!(run_check(args).is_err());
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use mockingbird::cli::{Cli, Commands, OutputFormat};
use mockingbird::config::SessionConfig;
use mockingbird::scenarios::{self, RunReport};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            list_scenarios();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            only,
            format,
            config,
            verbosity,
        } => {
            init_logging(verbosity);
            mockingbird::testkit::install_quiet_failure_hook();

            let mut session_config = load_config(config.as_deref())?;
            if verbosity >= 2 {
                session_config.trace_invocations = true;
            }

            let report = scenarios::run(only.as_deref(), &session_config);
            match format {
                OutputFormat::Text => print_text_report(&report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
            Ok(if report.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

// RUST_LOG wins over -v
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "mockingbird=debug",
        _ => "mockingbird=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let config = match path {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
            .apply_env_overrides(),
        None => SessionConfig::from_environment().context("Invalid session configuration")?,
    };
    config.validate()?;
    Ok(config)
}

fn list_scenarios() {
    for scenario in scenarios::catalogue() {
        println!("{:<22} {}", scenario.name.bold(), scenario.summary);
    }
}

fn print_text_report(report: &RunReport) {
    for outcome in &report.outcomes {
        if outcome.passed {
            println!("{} {}", "PASS".green().bold(), outcome.name);
        } else {
            println!("{} {}", "FAIL".red().bold(), outcome.name);
            if let Some(error) = &outcome.error {
                for line in error.lines() {
                    println!("     {}", line.dimmed());
                }
            }
        }
    }

    let summary = format!("{} passed, {} failed", report.passed, report.failed);
    if report.all_passed() {
        println!("\n{}", summary.green());
    } else {
        println!("\n{}", summary.red());
    }
}

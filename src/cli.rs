use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable summary (default)
    Text,
    /// JSON report
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "mockingbird")]
#[command(about = "Mock objects for trait-based test doubles", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the built-in usage scenarios
    List,

    /// Run the usage scenarios against the mock engine
    Run {
        /// Only run scenarios whose name contains this text
        #[arg(long)]
        only: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Session configuration file (defaults to .mockingbird.toml discovery)
        #[arg(short, long, env = "MOCKINGBIRD_CONFIG")]
        config: Option<PathBuf>,

        /// Increase verbosity level (can be repeated: -v, -vv)
        /// -v: debug logging from the engine
        /// -vv: trace every intercepted call
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },
}

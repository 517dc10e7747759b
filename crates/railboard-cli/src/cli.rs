//! Command-line surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rlb",
    version,
    about = "Generate self-contained HTML reports from a test-management project"
)]
pub struct Cli {
    /// Base URL of the test-management server
    #[arg(long, env = "RAILBOARD_URL")]
    pub url: Option<String>,

    /// Account name for API access
    #[arg(long, env = "RAILBOARD_USER")]
    pub user: Option<String>,

    /// API key for the account
    #[arg(long, env = "RAILBOARD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path to a railboard.toml configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a report for a single run or a whole plan
    Report {
        /// Project id the runs belong to
        #[arg(long)]
        project: u64,

        /// Report a single run
        #[arg(long, conflicts_with = "plan")]
        run: Option<u64>,

        /// Report every run of a plan
        #[arg(long)]
        plan: Option<u64>,

        /// Restrict a plan report to these run ids (comma separated)
        #[arg(long, value_delimiter = ',', requires = "plan")]
        runs: Option<Vec<u64>>,

        /// Output directory for the document and its attachment tree
        #[arg(short, long, default_value = "report")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plan_report_with_subset() {
        let cli = Cli::parse_from([
            "rlb", "--url", "https://qa.example.com", "--user", "bot", "--api-key", "k",
            "report", "--project", "7", "--plan", "5", "--runs", "1,2,3",
        ]);
        match cli.command {
            Commands::Report { project, plan, runs, .. } => {
                assert_eq!(project, 7);
                assert_eq!(plan, Some(5));
                assert_eq!(runs, Some(vec![1, 2, 3]));
            }
        }
    }

    #[test]
    fn run_and_plan_conflict_at_parse_time() {
        let parsed = Cli::try_parse_from([
            "rlb", "report", "--project", "7", "--run", "1", "--plan", "5",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn subset_requires_a_plan() {
        let parsed = Cli::try_parse_from([
            "rlb", "report", "--project", "7", "--run", "1", "--runs", "2",
        ]);
        assert!(parsed.is_err());
    }
}

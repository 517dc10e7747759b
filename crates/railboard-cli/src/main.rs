use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

mod cli;
mod config;

use cli::{Cli, Commands};
use config::CliConfig;
use railboard_api::{ApiClient, RestClient};
use railboard_report::{generate_report, GenerateOptions, HtmlRenderer};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let env_filter = format!(
        "railboard_cli={log_level},railboard_core={log_level},railboard_api={log_level},railboard_report={log_level}"
    );
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::load(cli.config)?;

    // Flags and environment win over the config file.
    let url = cli
        .url
        .or(config.connection.url)
        .context("server url required (--url, RAILBOARD_URL, or the config file)")?;
    let user = cli
        .user
        .or(config.connection.user)
        .context("account name required (--user, RAILBOARD_USER, or the config file)")?;
    let api_key = cli
        .api_key
        .or(config.connection.api_key)
        .context("api key required (--api-key, RAILBOARD_API_KEY, or the config file)")?;

    let mut rest = RestClient::new(url, user, api_key);
    if let Some(secs) = config.connection.timeout_secs {
        rest = rest.with_timeout(Duration::from_secs(secs));
    }
    let client: Arc<dyn ApiClient> = Arc::new(rest);

    match cli.command {
        Commands::Report {
            project,
            run,
            plan,
            runs,
            output,
        } => {
            debug!("generating report for project {project}");
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            spinner.set_message("Generating report...");
            spinner.enable_steady_tick(Duration::from_millis(120));

            let options = GenerateOptions {
                project_id: project,
                run_id: run,
                plan_id: plan,
                run_subset: runs,
                output_dir: output,
                config: config.pipeline,
            };
            let result = generate_report(client, &HtmlRenderer, options).await;
            spinner.finish_and_clear();

            let path = result?;
            println!("Report written to {}", path.display());
        }
    }

    Ok(())
}

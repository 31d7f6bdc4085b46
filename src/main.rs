use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediainfo_api::server::{self, AppState};
use mediainfo_api::{AnalysisPipeline, Cli, Commands, Config, SourceRequest};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        None | Some(Commands::Serve) => run_server(config).await?,
        Some(Commands::Probe { url, format }) => {
            let format = format.unwrap_or(config.app.default_output_format);
            let pipeline = AnalysisPipeline::new(&config)?;

            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .context("invalid progress template")?,
            );
            progress.set_message(format!("Sampling {url}..."));
            progress.enable_steady_tick(Duration::from_millis(120));

            let result = pipeline.analyze(&SourceRequest::new(url, format)).await;
            progress.finish_and_clear();

            println!("{}", result?.to_body());
        }
        Some(Commands::Config { show, init }) => {
            if init {
                let path = Config::config_path()?;
                if path.exists() {
                    println!("Config file already exists: {}", path.display());
                } else {
                    Config::default().save(&path)?;
                    println!("Configuration written to: {}", path.display());
                }
            }
            if show || !init {
                config.display();
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "mediainfo_api=debug,tower_http=debug"
    } else {
        "mediainfo_api=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run_server(config: Config) -> Result<()> {
    config.validate()?;
    let pipeline = AnalysisPipeline::new(&config)?;
    tracing::info!(
        "MediaInfo API starting (max sample {} bytes)",
        config.sampler.max_sample_bytes
    );
    server::serve(AppState::new(config, pipeline)).await
}

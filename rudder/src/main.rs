mod config;

use clap::{Args, Parser, Subcommand};
use config::{CommonConfig, Config, ConfigError};
use metrics_exporter_statsd::StatsdBuilder;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rudder", about = "REST API for Helm releases")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the release API
    ReleaseApi(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to the YAML config file
    #[arg(long, default_value = "rudder.yaml")]
    config_file_path: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("missing release_api section in config")]
    MissingReleaseApiConfig,
    #[error("could not set up metrics: {0}")]
    Metrics(String),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    ReleaseApi(#[from] release_api::ReleaseApiError),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        CliCommand::ReleaseApi(args) => run_release_api(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_release_api(args: ConfigArgs) -> Result<(), CliError> {
    let config = Config::from_file(&args.config_file_path)?;
    let release_api_config = config
        .release_api
        .ok_or(CliError::MissingReleaseApiConfig)?;

    let _sentry = init_logging(&config.common);
    init_metrics(&config.common)?;

    tracing::info!("Starting release API");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(release_api::run(release_api_config))?;
    Ok(())
}

/// Installs the global subscriber. The returned guard flushes Sentry on drop.
fn init_logging(common: &CommonConfig) -> Option<sentry::ClientInitGuard> {
    let guard = common.logging.as_ref().map(|logging| {
        sentry::init((
            logging.sentry_dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    guard
}

fn init_metrics(common: &CommonConfig) -> Result<(), CliError> {
    let Some(metrics_config) = &common.metrics else {
        return Ok(());
    };

    let recorder = StatsdBuilder::from(&metrics_config.statsd_host, metrics_config.statsd_port)
        .build(Some("rudder"))
        .map_err(|e| CliError::Metrics(e.to_string()))?;
    metrics::set_global_recorder(recorder).map_err(|e| CliError::Metrics(e.to_string()))?;

    shared::metrics_defs::describe_all(release_api::metrics_defs::ALL_METRICS);
    shared::metrics_defs::describe_all(chart_repo::metrics_defs::ALL_METRICS);
    tracing::info!(
        host = %metrics_config.statsd_host,
        port = metrics_config.statsd_port,
        "Sending metrics to statsd"
    );
    Ok(())
}

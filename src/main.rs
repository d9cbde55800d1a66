use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mirror_updater::config::{self, MirrorPaths};
use mirror_updater::source::build_source;
use mirror_updater::MirrorUpdater;

#[derive(Parser)]
#[command(name = "mirror-updater")]
#[command(about = "Keeps the gor traffic-mirror launch script in sync with mirror endpoints", long_about = None)]
struct Cli {
    /// JSON source configuration whose endpoints describe gor repeaters
    #[arg(long)]
    source_config: String,

    /// Comma-separated local ports to mirror, e.g. "8080,8081"
    #[arg(long)]
    ports: String,

    /// Max QPS to mirror to each repeater
    #[arg(long)]
    max_qps: u32,

    /// Seconds between mirror configuration updates
    #[arg(long)]
    max_update_frequency: Option<u64>,

    /// Generate the launch script once and exit, without killing anything
    #[arg(long)]
    setup: bool,

    /// Path to the gor binary
    #[arg(long, default_value = "/opt/go/bin/gor")]
    gor_path: PathBuf,

    /// Path of the launch script the supervisor executes
    #[arg(long, default_value = "/etc/mirror-updater/gor/mirror.sh")]
    command_path: PathBuf,

    /// Path of the gor command template
    #[arg(long, default_value = "templates/gor/mirror.sh.template")]
    template_path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mirror_updater=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("mirror-updater v0.1.0 starting");

    let cli = Cli::parse();
    let paths = MirrorPaths {
        binary: cli.gor_path,
        script: cli.command_path,
        template: cli.template_path,
    };
    let (source_config, mirror_config) = config::load_mirror_config(
        &cli.source_config,
        &cli.ports,
        cli.max_qps,
        cli.max_update_frequency,
        paths,
    )?;

    tracing::info!(
        ports = ?mirror_config.ports,
        max_qps = mirror_config.max_qps,
        update_frequency_secs = mirror_config.update_frequency_secs,
        script = %mirror_config.paths.script.display(),
        "Configuration loaded"
    );

    let source = build_source(source_config);
    let updater = MirrorUpdater::new(source, mirror_config);

    if cli.setup {
        updater.set_up();
        tracing::info!("Launch script generated");
        return Ok(());
    }

    updater.start();

    // The reconcile loop has no teardown; it runs until the process dies.
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

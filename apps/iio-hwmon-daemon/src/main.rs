use anyhow::{Context, Result};
use clap::Parser;
use iio_hwmon::{DaemonConfig, Exposition, Sampler, SysfsReader};
use sensor_bus::{DbusBus, MockBus, SensorBus};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "iio-hwmon-daemon")]
#[command(about = "Publishes IIO ADC voltages as OpenBMC sensor objects")]
struct Args {
    /// Optional YAML file overriding the built-in channel table and paths
    #[arg(long)]
    config: Option<PathBuf>,

    /// Publish to an in-memory bus instead of the system D-Bus
    #[arg(long)]
    mock: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DaemonConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DaemonConfig::default(),
    };
    let registry = config.registry().context("building channel table")?;
    let period = config.period()?;
    let prefix = config.prefix()?;

    info!("iio-hwmon-daemon starting");
    info!("Raw sample path: {}N_raw", config.raw_base_path);
    info!("Channels: {}, period: {}ms", registry.len(), period.as_millis());

    let bus: Arc<dyn SensorBus> = if args.mock {
        warn!("Using in-memory mock bus, nothing is published on D-Bus");
        Arc::new(MockBus::new())
    } else {
        let bus = DbusBus::system()
            .await
            .context("connecting to the system bus")?;
        bus.request_name(&config.service_name)
            .await
            .context("claiming bus name")?;
        info!("Claimed bus name {}", config.service_name);
        Arc::new(bus)
    };

    let mut exposition = Exposition::new(bus, prefix);
    exposition
        .register_all(&registry)
        .await
        .context("registering sensor objects")?;

    let reader = SysfsReader::new(config.raw_base_path.clone());
    let mut sampler = Sampler::new(registry, reader, exposition, period);
    sampler.run(shutdown_signal()).await;

    info!("iio-hwmon-daemon shutting down");
    Ok(())
}

fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

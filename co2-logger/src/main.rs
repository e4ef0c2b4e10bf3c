use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use co2_core::{FrameReader, Transport};
use co2_logger::transport::open_reader;
use co2_logger::{
    Config, DiscardSink, FileSink, RecordSink, SimulatedSensor, Station, StorageConfig,
    TransportConfig,
};
use jiff::Zoned;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "co2-logger")]
#[command(about = "Polls a CO2 sensor and logs its readings")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "co2-logger.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,co2_logger=info,co2_core=info".to_owned());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    info!(
        transport = ?config.transport,
        poll_interval_secs = config.station.poll_interval_secs,
        "Starting co2-logger"
    );

    match config.storage {
        StorageConfig::Disabled => {
            info!("Persistence disabled, logging to console only");
            run_logger(&config, DiscardSink).await?;
        }
        StorageConfig::Files {
            ref path,
            bucket_minutes,
        } => {
            info!(path = ?path, bucket_minutes, "Using file storage");
            run_logger(&config, FileSink::new(path, bucket_minutes)).await?;
        }
    }

    Ok(())
}

async fn run_logger<S: RecordSink>(config: &Config, sink: S) -> color_eyre::Result<()> {
    if let Err(e) = sink.log_boot(&Zoned::now()) {
        warn!(error = %e, "Failed to record boot time");
    }

    let interval = config.station.poll_interval();

    match &config.transport {
        TransportConfig::Serial {
            port,
            baud_rate,
            timeout_secs,
        } => {
            let reader =
                open_reader(port, *baud_rate, Duration::from_secs(*timeout_secs), &sink);
            run_station(Station::new(reader, sink, interval)).await
        }
        TransportConfig::Mock { corrupt_one_in } => {
            info!(corrupt_one_in, "Using simulated sensor");
            let reader = FrameReader::new(SimulatedSensor::random(*corrupt_one_in));
            run_station(Station::new(reader, sink, interval)).await
        }
    }
}

async fn run_station<T, S>(station: Station<T, S>) -> color_eyre::Result<()>
where
    T: Transport + 'static,
    S: RecordSink,
{
    let cancel = CancellationToken::new();
    let mut handle = tokio::spawn(station.run(cancel.clone()));

    let stats = tokio::select! {
        result = &mut handle => result??,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            cancel.cancel();
            handle.await??
        }
    };

    info!(
        cycles = stats.cycles(),
        readings = stats.readings,
        failures = stats.failures,
        "co2-logger shut down complete"
    );
    Ok(())
}

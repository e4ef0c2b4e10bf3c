use std::time::Duration;

use co2_core::{AcquisitionOutcome, FrameDecoder, FrameReader, Reading, Transport, acquire};
use jiff::Zoned;
use tokio::task::JoinError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::sink::{RecordSink, error_chain};

/// Counters kept across poll cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StationStats {
    /// Cycles that produced a decoded reading.
    pub readings: u64,
    /// Cycles that ended in an acquisition error.
    pub failures: u64,
    /// Sink writes that failed.
    pub sink_failures: u64,
}

impl StationStats {
    pub fn cycles(&self) -> u64 {
        self.readings + self.failures
    }
}

/// The polling driver: reader, decoder and sink for one sensor.
pub struct Station<T: Transport, S: RecordSink> {
    reader: FrameReader<T>,
    decoder: FrameDecoder,
    sink: S,
    interval: Duration,
    stats: StationStats,
}

impl<T, S> Station<T, S>
where
    T: Transport + 'static,
    S: RecordSink,
{
    pub fn new(reader: FrameReader<T>, sink: S, interval: Duration) -> Self {
        Self {
            reader,
            decoder: FrameDecoder::new(),
            sink,
            interval,
            stats: StationStats::default(),
        }
    }

    pub fn stats(&self) -> StationStats {
        self.stats
    }

    /// Runs one blocking poll cycle and hands the outcome to the sink.
    ///
    /// Failures are logged and counted, never propagated: the next cycle
    /// starts from a fresh header scan.
    pub fn cycle(&mut self) -> AcquisitionOutcome {
        let outcome = acquire(&mut self.reader, &self.decoder);
        let now = Zoned::now();

        match &outcome {
            Ok(record) => {
                self.stats.readings += 1;
                info!(values = ?record.values(), "CO2 reading");

                let reading = Reading {
                    taken_at: now,
                    record: *record,
                };
                if let Err(e) = self.sink.store_reading(&reading) {
                    self.stats.sink_failures += 1;
                    error!(error = %e, "Failed to store reading");
                }
            }
            Err(e) => {
                self.stats.failures += 1;
                error!(error = %error_chain(e), "Acquisition failed");

                if let Err(sink_err) = self.sink.log_error(&now, e) {
                    self.stats.sink_failures += 1;
                    error!(error = %sink_err, "Failed to log acquisition error");
                }
            }
        }

        outcome
    }

    /// Polls on a fixed interval until `cancel` fires.
    ///
    /// Each cycle runs on the blocking pool and is awaited to completion, so
    /// cycles never overlap and cancellation only takes effect between them.
    /// The station is dropped on return, which closes the transport.
    pub async fn run(self, cancel: CancellationToken) -> Result<StationStats, JoinError> {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            transport_open = self.reader.is_open(),
            "Station started"
        );
        if !self.reader.is_open() {
            warn!("Sensor transport unavailable, every poll will fail");
        }

        let mut interval = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut station = self;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Station shutting down");
                    break;
                }
                _ = interval.tick() => {
                    station = tokio::task::spawn_blocking(move || {
                        let _ = station.cycle();
                        station
                    })
                    .await?;
                }
            }
        }

        let stats = station.stats();
        info!(
            readings = stats.readings,
            failures = stats.failures,
            sink_failures = stats.sink_failures,
            "Station stopped"
        );
        Ok(stats)
    }
}

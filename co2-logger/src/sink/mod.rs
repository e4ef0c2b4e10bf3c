pub mod file;
pub mod memory;

use std::convert::Infallible;
use std::error::Error;

use co2_core::Reading;
use jiff::Zoned;

/// Destination for everything a station produces.
/// Implementations persist decoded readings and keep a trail of
/// boots and failures for later diagnosis.
pub trait RecordSink: Send + 'static {
    /// Error type specific to this sink implementation
    type Error: std::error::Error + Send + Sync + 'static;

    /// Record that the process started.
    fn log_boot(&self, at: &Zoned) -> Result<(), Self::Error>;

    /// Persist one decoded reading.
    fn store_reading(&self, reading: &Reading) -> Result<(), Self::Error>;

    /// Record a failure, including its chain of causes.
    fn log_error(&self, at: &Zoned, error: &(dyn Error + 'static)) -> Result<(), Self::Error>;
}

/// Sink used when persistence is disabled. Console logging still happens
/// in the station.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl RecordSink for DiscardSink {
    type Error = Infallible;

    fn log_boot(&self, _at: &Zoned) -> Result<(), Self::Error> {
        Ok(())
    }

    fn store_reading(&self, _reading: &Reading) -> Result<(), Self::Error> {
        Ok(())
    }

    fn log_error(&self, _at: &Zoned, _error: &(dyn Error + 'static)) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Renders an error and its sources, one cause per line.
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str("\n  caused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use co2_core::{AcquisitionError, FramingError, PollError};

    #[test]
    fn error_chain_lists_every_cause() {
        let err = AcquisitionError::from(PollError::from(FramingError::HeaderLost {
            discarded: 10,
        }));

        assert_eq!(
            error_chain(&err),
            "failed to read frame\n  caused by: first header byte not found after 10 bytes"
        );
    }

    #[test]
    fn error_chain_includes_io_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out");
        let err = AcquisitionError::from(PollError::from(io));

        assert_eq!(
            error_chain(&err),
            "failed to read frame\n  caused by: transport i/o error\n  caused by: operation timed out"
        );
    }
}

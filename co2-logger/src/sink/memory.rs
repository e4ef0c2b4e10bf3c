use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use co2_core::Reading;
use jiff::Zoned;

use crate::sink::{RecordSink, error_chain};

/// In-memory sink implementation.
/// This is primarily intended for testing and as a reference
/// implementation of the RecordSink trait. Clones share the same log.
#[derive(Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    boots: Vec<Zoned>,
    readings: Vec<Reading>,
    errors: Vec<LoggedError>,
}

/// A failure as it was handed to the sink.
#[derive(Debug, Clone)]
pub struct LoggedError {
    pub at: Zoned,
    pub message: String,
}

/// Error type for MemorySink
#[derive(Debug)]
pub enum MemorySinkError {
    MutexPoisoned(String),
}

impl std::error::Error for MemorySinkError {}

impl fmt::Display for MemorySinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemorySinkError::MutexPoisoned(msg) => write!(f, "Mutex poisoned: {}", msg),
        }
    }
}

impl<T> From<PoisonError<T>> for MemorySinkError {
    fn from(err: PoisonError<T>) -> Self {
        MemorySinkError::MutexPoisoned(err.to_string())
    }
}

impl MemorySink {
    pub fn boots(&self) -> Result<Vec<Zoned>, MemorySinkError> {
        Ok(self.inner.lock()?.boots.clone())
    }

    pub fn readings(&self) -> Result<Vec<Reading>, MemorySinkError> {
        Ok(self.inner.lock()?.readings.clone())
    }

    pub fn errors(&self) -> Result<Vec<LoggedError>, MemorySinkError> {
        Ok(self.inner.lock()?.errors.clone())
    }
}

impl RecordSink for MemorySink {
    type Error = MemorySinkError;

    fn log_boot(&self, at: &Zoned) -> Result<(), Self::Error> {
        self.inner.lock()?.boots.push(at.clone());
        Ok(())
    }

    fn store_reading(&self, reading: &Reading) -> Result<(), Self::Error> {
        self.inner.lock()?.readings.push(reading.clone());
        Ok(())
    }

    fn log_error(&self, at: &Zoned, error: &(dyn Error + 'static)) -> Result<(), Self::Error> {
        self.inner.lock()?.errors.push(LoggedError {
            at: at.clone(),
            message: error_chain(error),
        });
        Ok(())
    }
}

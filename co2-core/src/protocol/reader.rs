use std::io::{self, Read, Write};

use tracing::{debug, trace};

use super::{
    error::{FramingError, PollError},
    *,
};

/// A byte-oriented duplex channel to the sensor.
///
/// Any blocking `Read + Write` works; a serial port is expected to fail reads
/// with [`io::ErrorKind::TimedOut`] when nothing arrives in time.
pub trait Transport: Read + Write + Send {}
impl<T: Read + Write + Send + ?Sized> Transport for T {}

/// Polls the sensor and aligns the response stream to a frame.
///
/// The reader is the only owner of its transport. Dropping the reader closes
/// it. A reader built with [`FrameReader::disabled`] has no transport and
/// fails every poll with [`PollError::Closed`].
pub struct FrameReader<T: Transport> {
    transport: Option<T>,
}

impl<T: Transport> FrameReader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    pub fn disabled() -> Self {
        Self { transport: None }
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Releases the transport. Later polls fail with [`PollError::Closed`].
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            debug!("Transport closed");
        }
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.transport
    }

    /// Sends the read command and returns the next frame from the stream.
    ///
    /// Up to [`HEADER_SCAN_BUDGET`] single-byte reads are spent looking for
    /// the first header byte. Once found, exactly one more byte must be the
    /// second header byte; otherwise the poll fails without touching the
    /// rest of the stream.
    pub fn poll(&mut self) -> Result<RawFrame, PollError> {
        let port = self.transport.as_mut().ok_or(PollError::Closed)?;

        port.write_all(&READ_COMMAND)?;
        port.flush()?;

        sync_first_header_byte(port)?;

        let second = read_byte(port)?
            .ok_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "second header byte"))?;
        if second != FRAME_HEADER[1] {
            debug!(found = second, "Second header byte mismatch");
            return Err(FramingError::SecondHeaderByteMismatch { found: second }.into());
        }

        let mut payload = [0u8; PAYLOAD_SIZE];
        port.read_exact(&mut payload)?;

        Ok(RawFrame::from_parts(payload))
    }
}

fn sync_first_header_byte<T: Transport + ?Sized>(port: &mut T) -> Result<(), PollError> {
    for attempt in 0..HEADER_SCAN_BUDGET {
        match read_byte(port)? {
            Some(byte) if byte == FRAME_HEADER[0] => {
                if attempt > 0 {
                    debug!(discarded = attempt, "Resynchronized to frame header");
                }
                return Ok(());
            }
            Some(byte) => trace!(byte, attempt, "Discarding byte while seeking header"),
            None => trace!(attempt, "No byte before timeout while seeking header"),
        }
    }

    Err(FramingError::HeaderLost {
        discarded: HEADER_SCAN_BUDGET,
    }
    .into())
}

/// Reads one byte; a timeout yields `None` instead of an error.
fn read_byte<T: Read + ?Sized>(port: &mut T) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    match port.read_exact(&mut byte) {
        Ok(()) => Ok(Some(byte[0])),
        Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
        Err(e) => Err(e),
    }
}

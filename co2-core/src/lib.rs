pub mod protocol;

use serde::{Deserialize, Serialize};

pub use protocol::{
    AcquisitionError, ChecksumError, FrameDecoder, FrameReader, FramingError, MEASUREMENT_FIELDS,
    PollError, RawFrame, Transport,
};

/// Values decoded from one valid response frame.
///
/// The frame carries three big-endian words at offsets 4..10. Only the
/// raw words are exposed; their physical meaning depends on the sensor
/// firmware and is not interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasurementRecord {
    values: [u16; MEASUREMENT_FIELDS],
}

impl MeasurementRecord {
    pub fn new(values: [u16; MEASUREMENT_FIELDS]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> [u16; MEASUREMENT_FIELDS] {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.values.iter().copied()
    }
}

/// A record together with the local time it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Local wall-clock time of the poll that produced the record.
    pub taken_at: jiff::Zoned,
    /// The decoded frame values.
    pub record: MeasurementRecord,
}

/// Result of one poll-and-decode cycle.
pub type AcquisitionOutcome = Result<MeasurementRecord, AcquisitionError>;

/// Polls one frame from `reader` and decodes it with `decoder`.
pub fn acquire<T: Transport>(
    reader: &mut FrameReader<T>,
    decoder: &FrameDecoder,
) -> AcquisitionOutcome {
    let frame = reader.poll()?;
    Ok(decoder.decode(frame)?)
}

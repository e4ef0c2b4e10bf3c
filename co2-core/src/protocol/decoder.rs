use super::{error::ChecksumError, *};
use crate::MeasurementRecord;

/// Additive 16-bit checksum used by the sensor.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)))
}

/// Validates and decodes raw frames. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDecoder;

impl FrameDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Checks the frame's checksum and returns the values at offsets 4..10.
    pub fn decode(&self, frame: RawFrame) -> Result<MeasurementRecord, ChecksumError> {
        self.verify(&frame)?;

        let data = &frame.as_bytes()[DATA_OFFSET..DATA_END];
        let mut values = [0u16; MEASUREMENT_FIELDS];
        for (value, pair) in values.iter_mut().zip(data.chunks_exact(2)) {
            *value = u16::from_be_bytes([pair[0], pair[1]]);
        }

        Ok(MeasurementRecord::new(values))
    }

    pub fn verify(&self, frame: &RawFrame) -> Result<(), ChecksumError> {
        let computed = checksum(&frame.as_bytes()[..CHECKSUM_SPAN]);
        let transmitted = frame.transmitted_checksum();

        if computed != transmitted {
            return Err(ChecksumError {
                computed,
                transmitted,
            });
        }

        Ok(())
    }
}

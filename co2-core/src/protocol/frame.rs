use super::{error::FramingError, *};

/// One response frame as captured from the wire: header followed by the payload.
///
/// A `RawFrame` always holds exactly [`FRAME_SIZE`] bytes starting with
/// [`FRAME_HEADER`]. It says nothing about checksum validity; that is
/// [`FrameDecoder`]'s job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame([u8; FRAME_SIZE]);

impl RawFrame {
    /// Joins a matched header and the payload read after it.
    pub(crate) fn from_parts(payload: [u8; PAYLOAD_SIZE]) -> Self {
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[..HEADER_SIZE].copy_from_slice(&FRAME_HEADER);
        bytes[HEADER_SIZE..].copy_from_slice(&payload);
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FramingError> {
        if bytes.len() < FRAME_SIZE {
            return Err(FramingError::InsufficientData {
                needed: FRAME_SIZE,
                available: bytes.len(),
            });
        }

        let header = [bytes[0], bytes[1]];
        if header != FRAME_HEADER {
            return Err(FramingError::InvalidHeader(header));
        }

        let mut frame = [0u8; FRAME_SIZE];
        frame.copy_from_slice(&bytes[..FRAME_SIZE]);
        Ok(Self(frame))
    }

    /// Builds a well-formed frame carrying `values`, with a correct checksum.
    ///
    /// `reserved` fills offsets 2..4, which the sensor uses for a length field.
    pub fn encode(reserved: [u8; 2], values: [u16; MEASUREMENT_FIELDS]) -> Self {
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[..HEADER_SIZE].copy_from_slice(&FRAME_HEADER);
        bytes[HEADER_SIZE..DATA_OFFSET].copy_from_slice(&reserved);

        for (i, value) in values.iter().enumerate() {
            let at = DATA_OFFSET + i * 2;
            bytes[at..at + 2].copy_from_slice(&value.to_be_bytes());
        }

        let sum = checksum(&bytes[..CHECKSUM_SPAN]);
        bytes[CHECKSUM_SPAN..].copy_from_slice(&sum.to_be_bytes());

        Self(bytes)
    }

    /// The checksum field as sent by the sensor.
    pub fn transmitted_checksum(&self) -> u16 {
        u16::from_be_bytes([self.0[CHECKSUM_SPAN], self.0[CHECKSUM_SPAN + 1]])
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; FRAME_SIZE] {
        self.0
    }

    pub fn payload(&self) -> &[u8] {
        &self.0[HEADER_SIZE..]
    }
}

impl TryFrom<&[u8]> for RawFrame {
    type Error = FramingError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        RawFrame::from_bytes(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_places_fields_at_fixed_offsets() {
        let frame = RawFrame::encode([0x00, 0x00], [0, 500, 200]);

        assert_eq!(
            frame.as_bytes(),
            &[0x42, 0x4D, 0x00, 0x00, 0x00, 0x00, 0x01, 0xF4, 0x00, 0xC8, 0x02, 0x4C]
        );
        assert_eq!(frame.transmitted_checksum(), 0x024C);
        assert_eq!(frame.payload().len(), PAYLOAD_SIZE);
    }

    #[test]
    fn from_bytes_rejects_short_input() {
        let err = RawFrame::from_bytes(&[0x42, 0x4D, 0x00]).unwrap_err();
        assert_eq!(
            err,
            FramingError::InsufficientData {
                needed: FRAME_SIZE,
                available: 3
            }
        );
    }

    #[test]
    fn from_bytes_rejects_wrong_header() {
        let mut bytes = RawFrame::encode([0, 0], [1, 2, 3]).into_bytes();
        bytes[1] = 0x4E;

        let err = RawFrame::try_from(&bytes[..]).unwrap_err();
        assert_eq!(err, FramingError::InvalidHeader([0x42, 0x4E]));
    }
}

use thiserror::Error;

/// The byte stream could not be aligned to a response frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("first header byte not found after {discarded} bytes")]
    HeaderLost { discarded: usize },
    #[error("second header byte mismatch: expected 0x4d, found {found:#04x}")]
    SecondHeaderByteMismatch { found: u8 },
    #[error("invalid frame header {0:02x?}")]
    InvalidHeader([u8; 2]),
    #[error("insufficient data: needed {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },
}

/// Errors produced by a single [`FrameReader::poll`](super::FrameReader::poll).
#[derive(Debug, Error)]
pub enum PollError {
    #[error("transport is closed")]
    Closed,
    #[error(transparent)]
    Framing(#[from] FramingError),
    #[error("transport i/o error")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("checksum mismatch: computed {computed:#06x}, transmitted {transmitted:#06x}")]
pub struct ChecksumError {
    pub computed: u16,
    pub transmitted: u16,
}

/// Everything that can go wrong in one acquisition cycle.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("failed to read frame")]
    Poll(#[from] PollError),
    #[error("frame rejected")]
    Checksum(#[from] ChecksumError),
}

impl AcquisitionError {
    pub fn is_checksum(&self) -> bool {
        matches!(self, AcquisitionError::Checksum(_))
    }
}

mod decoder;
mod error;
mod frame;
mod reader;

pub use decoder::{FrameDecoder, checksum};
pub use error::{AcquisitionError, ChecksumError, FramingError, PollError};
pub use frame::RawFrame;
pub use reader::{FrameReader, Transport};

// response structure : header(2) + reserved(2) + data(6) + checksum(2)

pub const FRAME_HEADER: [u8; 2] = [0x42, 0x4D];
pub const READ_COMMAND: [u8; 7] = [0x42, 0x4D, 0xE3, 0x00, 0x00, 0x01, 0x72];
pub const HEADER_SIZE: usize = 2;
pub const PAYLOAD_SIZE: usize = 10;
pub const FRAME_SIZE: usize = HEADER_SIZE + PAYLOAD_SIZE;
/// Bytes covered by the additive checksum.
pub const CHECKSUM_SPAN: usize = 10;
pub const DATA_OFFSET: usize = 4;
pub const DATA_END: usize = CHECKSUM_SPAN;
/// Number of single-byte reads spent looking for the first header byte.
pub const HEADER_SCAN_BUDGET: usize = 10;
pub const MEASUREMENT_FIELDS: usize = (DATA_END - DATA_OFFSET) / 2;

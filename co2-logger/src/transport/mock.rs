use std::collections::VecDeque;
use std::io::{self, Read, Write};

use co2_core::protocol::{DATA_OFFSET, FRAME_HEADER, READ_COMMAND};
use co2_core::{MEASUREMENT_FIELDS, RawFrame};
use rand::Rng;
use tracing::{debug, info};

/// Reserved bytes the sensor puts after the header.
const RESERVED: [u8; 2] = [0x00, 0x08];
/// Filler the simulated line noise is made of. Never a header byte.
const NOISE: u8 = 0xFF;

/// How the simulated sensor answers one poll command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// A well-formed frame.
    Reading([u16; MEASUREMENT_FIELDS]),
    /// A frame whose data no longer matches its checksum.
    Corrupted([u16; MEASUREMENT_FIELDS]),
    /// `junk` noise bytes followed by a well-formed frame.
    Noisy {
        junk: usize,
        values: [u16; MEASUREMENT_FIELDS],
    },
    /// First header byte followed by garbage.
    BrokenHeader,
    /// No answer at all.
    Silent,
}

enum Source {
    Script(VecDeque<Reply>),
    Random { corrupt_one_in: u32 },
}

/// Simulated sensor speaking the frame protocol over an in-memory line.
///
/// Every complete read command written to it queues one [`Reply`]. Reads
/// drain that queue and fail with [`io::ErrorKind::TimedOut`] once it is
/// empty, just like a serial port with a read timeout.
pub struct SimulatedSensor {
    source: Source,
    command: Vec<u8>,
    line: VecDeque<u8>,
    polls: u64,
}

impl SimulatedSensor {
    /// Answers polls with `replies` in order, then stays silent.
    pub fn scripted(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self::with_source(Source::Script(replies.into_iter().collect()))
    }

    /// Answers polls with random readings, corrupting roughly one in
    /// `corrupt_one_in` replies. Zero never corrupts.
    pub fn random(corrupt_one_in: u32) -> Self {
        info!(corrupt_one_in, "Starting simulated sensor");
        Self::with_source(Source::Random { corrupt_one_in })
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            command: Vec::with_capacity(READ_COMMAND.len()),
            line: VecDeque::new(),
            polls: 0,
        }
    }

    /// Number of read commands received so far.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Bytes sent by the sensor but not yet read.
    pub fn unread(&self) -> usize {
        self.line.len()
    }

    fn next_reply(&mut self) -> Reply {
        match &mut self.source {
            Source::Script(replies) => replies.pop_front().unwrap_or(Reply::Silent),
            Source::Random { corrupt_one_in } => {
                let mut rng = rand::rng();
                let values = [
                    rng.random_range(400..2000),
                    rng.random_range(400..2000),
                    rng.random_range(0..100),
                ];

                if *corrupt_one_in > 0 && rng.random_ratio(1, *corrupt_one_in) {
                    Reply::Corrupted(values)
                } else {
                    Reply::Reading(values)
                }
            }
        }
    }

    fn answer(&mut self) {
        self.polls += 1;
        let reply = self.next_reply();
        debug!(poll = self.polls, ?reply, "Simulated sensor answering");

        match reply {
            Reply::Reading(values) => {
                self.line
                    .extend(RawFrame::encode(RESERVED, values).into_bytes());
            }
            Reply::Corrupted(values) => {
                let mut bytes = RawFrame::encode(RESERVED, values).into_bytes();
                bytes[DATA_OFFSET + 1] ^= 0x01;
                self.line.extend(bytes);
            }
            Reply::Noisy { junk, values } => {
                self.line.extend(std::iter::repeat_n(NOISE, junk));
                self.line
                    .extend(RawFrame::encode(RESERVED, values).into_bytes());
            }
            Reply::BrokenHeader => {
                self.line.extend([FRAME_HEADER[0], NOISE]);
            }
            Reply::Silent => {}
        }
    }
}

impl Read for SimulatedSensor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.line.is_empty() {
            return Err(io::ErrorKind::TimedOut.into());
        }

        let n = buf.len().min(self.line.len());
        for (slot, byte) in buf.iter_mut().zip(self.line.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for SimulatedSensor {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.command.push(byte);
            if self.command.len() > READ_COMMAND.len() {
                self.command.remove(0);
            }
            if self.command == READ_COMMAND {
                self.command.clear();
                self.answer();
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use co2_core::{FrameDecoder, FrameReader, FramingError, PollError, acquire};

    #[test]
    fn answers_each_command_once() {
        let mut reader = FrameReader::new(SimulatedSensor::scripted([
            Reply::Reading([410, 0, 1]),
            Reply::Reading([420, 0, 2]),
        ]));
        let decoder = FrameDecoder::new();

        assert_eq!(acquire(&mut reader, &decoder).unwrap().values(), [410, 0, 1]);
        assert_eq!(acquire(&mut reader, &decoder).unwrap().values(), [420, 0, 2]);
        assert_eq!(reader.transport().unwrap().polls(), 2);
    }

    #[test]
    fn ignores_partial_commands() {
        let mut sensor = SimulatedSensor::scripted([Reply::Reading([1, 2, 3])]);

        sensor.write_all(&READ_COMMAND[..4]).unwrap();
        assert_eq!(sensor.polls(), 0);
        assert_eq!(sensor.unread(), 0);

        sensor.write_all(&READ_COMMAND[4..]).unwrap();
        assert_eq!(sensor.polls(), 1);
        assert_eq!(sensor.unread(), 12);
    }

    #[test]
    fn corrupted_reply_fails_checksum() {
        let mut reader = FrameReader::new(SimulatedSensor::scripted([Reply::Corrupted([
            500, 0, 0,
        ])]));

        let err = acquire(&mut reader, &FrameDecoder::new()).unwrap_err();
        assert!(err.is_checksum());
    }

    #[test]
    fn noisy_reply_is_resynchronized() {
        let mut reader = FrameReader::new(SimulatedSensor::scripted([Reply::Noisy {
            junk: 9,
            values: [700, 1, 2],
        }]));

        let record = acquire(&mut reader, &FrameDecoder::new()).unwrap();
        assert_eq!(record.values(), [700, 1, 2]);
    }

    #[test]
    fn broken_header_and_silence_are_framing_errors() {
        let mut reader =
            FrameReader::new(SimulatedSensor::scripted([Reply::BrokenHeader, Reply::Silent]));
        let decoder = FrameDecoder::new();

        let err = acquire(&mut reader, &decoder).unwrap_err();
        assert!(matches!(
            err,
            co2_core::AcquisitionError::Poll(PollError::Framing(
                FramingError::SecondHeaderByteMismatch { found: NOISE }
            ))
        ));

        let err = acquire(&mut reader, &decoder).unwrap_err();
        assert!(matches!(
            err,
            co2_core::AcquisitionError::Poll(PollError::Framing(FramingError::HeaderLost { .. }))
        ));
    }

    #[test]
    fn random_sensor_without_corruption_always_decodes() {
        let mut reader = FrameReader::new(SimulatedSensor::random(0));
        let decoder = FrameDecoder::new();

        for _ in 0..50 {
            let record = acquire(&mut reader, &decoder).unwrap();
            assert!((400..2000).contains(&record.values()[0]));
        }
    }
}

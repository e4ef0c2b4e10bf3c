pub mod mock;

use std::time::Duration;

use co2_core::FrameReader;
use jiff::Zoned;
use serialport::SerialPort;
use tracing::{error, info, warn};

use crate::sink::{RecordSink, error_chain};

/// The sensor's serial line could not be opened.
#[derive(Debug, thiserror::Error)]
#[error("failed to open serial port {port}")]
pub struct OpenError {
    pub port: String,
    #[source]
    source: serialport::Error,
}

/// Opens the sensor's serial line with 8N1 framing.
pub fn open_serial(
    port: &str,
    baud_rate: u32,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, OpenError> {
    let serial = serialport::new(port, baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(timeout)
        .open()
        .map_err(|source| OpenError {
            port: port.to_owned(),
            source,
        })?;

    info!(port, baud_rate, timeout_secs = timeout.as_secs(), "Serial port opened");
    Ok(serial)
}

/// Opens the serial line and wraps it in a frame reader.
///
/// When the port cannot be opened the failure goes to the console and to
/// `sink`, and a disabled reader is returned so the station still runs.
pub fn open_reader<S: RecordSink>(
    port: &str,
    baud_rate: u32,
    timeout: Duration,
    sink: &S,
) -> FrameReader<Box<dyn SerialPort>> {
    match open_serial(port, baud_rate, timeout) {
        Ok(serial) => FrameReader::new(serial),
        Err(e) => {
            error!(error = %error_chain(&e), "Sensor disabled");
            if let Err(sink_err) = sink.log_error(&Zoned::now(), &e) {
                warn!(error = %sink_err, "Failed to record open failure");
            }
            FrameReader::disabled()
        }
    }
}

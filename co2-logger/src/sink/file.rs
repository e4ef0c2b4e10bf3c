use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use co2_core::Reading;
use jiff::Zoned;

use crate::sink::{RecordSink, error_chain};

const LINE_END: &str = "\r\n";

/// Errors that can occur while appending to log files
#[derive(Debug, thiserror::Error)]
pub enum FileSinkError {
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to append to {path}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Plain-text sink writing tab-separated files under one directory.
///
/// - readings go to `YYYYmmdd-HHMM.txt`, with the minute rounded down to
///   the bucket width
/// - boots go to `BootAtYYYYmmdd-HHMM.txt`
/// - failures go to `ErrYYYYmmdd-HHMM.txt`
///
/// Every write opens the file in append mode and creates the directory if it
/// vanished in the meantime.
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
    bucket_minutes: u8,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>, bucket_minutes: u8) -> Self {
        Self {
            root: root.into(),
            bucket_minutes: bucket_minutes.clamp(1, 60),
        }
    }

    pub fn data_file(&self, at: &Zoned) -> PathBuf {
        let bucket = at.minute() - at.minute() % self.bucket_minutes as i8;
        self.root
            .join(format!("{}{:02}.txt", at.strftime("%Y%m%d-%H"), bucket))
    }

    pub fn boot_file(&self, at: &Zoned) -> PathBuf {
        self.root
            .join(format!("BootAt{}.txt", at.strftime("%Y%m%d-%H%M")))
    }

    pub fn error_file(&self, at: &Zoned) -> PathBuf {
        self.root
            .join(format!("Err{}.txt", at.strftime("%Y%m%d-%H%M")))
    }

    fn append(&self, path: &Path, contents: &str) -> Result<(), FileSinkError> {
        fs::create_dir_all(&self.root).map_err(|source| FileSinkError::CreateDir {
            path: self.root.clone(),
            source,
        })?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(contents.as_bytes()))
            .map_err(|source| FileSinkError::Append {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl RecordSink for FileSink {
    type Error = FileSinkError;

    fn log_boot(&self, at: &Zoned) -> Result<(), Self::Error> {
        let line = format!("{}{LINE_END}", at.strftime("%Y%m%d-%H%M%S"));
        self.append(&self.boot_file(at), &line)
    }

    fn store_reading(&self, reading: &Reading) -> Result<(), Self::Error> {
        let at = &reading.taken_at;

        let values: String = reading.record.iter().map(|v| format!("\t{v}")).collect();
        let line = format!("{}{values}{LINE_END}", at.strftime("%Y%m%d \t %H%M%S"));

        self.append(&self.data_file(at), &line)
    }

    fn log_error(&self, at: &Zoned, error: &(dyn Error + 'static)) -> Result<(), Self::Error> {
        let entry = format!(
            "{}\t{}{LINE_END}",
            at.strftime("%Y%m%d-%H%M%S"),
            error_chain(error)
        );
        self.append(&self.error_file(at), &entry)
    }
}

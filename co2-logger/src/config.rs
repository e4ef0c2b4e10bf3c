use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{bail, eyre};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
pub struct StationConfig {
    /// Seconds between the start of two poll cycles
    pub poll_interval_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    Serial {
        /// Serial device path
        port: String,
        baud_rate: u32,
        /// Per-read timeout in seconds
        timeout_secs: u64,
    },
    Mock {
        /// Corrupt one reply in this many; 0 never corrupts
        corrupt_one_in: u32,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    Disabled,
    Files {
        /// Directory holding data, boot and error files
        path: PathBuf,
        /// Width of the minute bucket that names data files
        bucket_minutes: u8,
    },
}

impl Config {
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> color_eyre::Result<()> {
        if self.station.poll_interval_secs == 0 {
            bail!("station.poll_interval_secs must be at least 1");
        }

        if let StorageConfig::Files { bucket_minutes, .. } = self.storage {
            if !(1..=60).contains(&bucket_minutes) {
                return Err(eyre!(
                    "storage.bucket_minutes must be within 1..=60, got {bucket_minutes}"
                ));
            }
        }

        if let TransportConfig::Serial { baud_rate: 0, .. } = self.transport {
            bail!("transport.baud_rate must be non-zero");
        }

        if let TransportConfig::Serial { timeout_secs: 0, .. } = self.transport {
            bail!("transport.timeout_secs must be at least 1");
        }

        Ok(())
    }
}

impl StationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 1,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::Serial {
            port: "/dev/ttyAMA0".to_string(),
            baud_rate: 9600,
            timeout_secs: 2,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Files {
            path: PathBuf::from("./Data"),
            bucket_minutes: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            station: StationConfig::default(),
            transport: TransportConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_sensor_wiring() {
        let config = Config::default();

        assert_eq!(config.station.poll_interval(), Duration::from_secs(1));
        assert!(matches!(
            config.transport,
            TransportConfig::Serial { ref port, baud_rate: 9600, timeout_secs: 2 } if port == "/dev/ttyAMA0"
        ));
        assert!(matches!(
            config.storage,
            StorageConfig::Files { bucket_minutes: 10, .. }
        ));
        config.validate().unwrap();
    }

    #[test]
    fn parses_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [transport]
            type = "mock"
            corrupt_one_in = 4

            [storage]
            type = "disabled"
            "#,
        )
        .unwrap();

        assert_eq!(config.station.poll_interval_secs, 1);
        assert!(matches!(
            config.transport,
            TransportConfig::Mock { corrupt_one_in: 4 }
        ));
        assert!(matches!(config.storage, StorageConfig::Disabled));
    }

    #[test]
    fn rejects_zero_interval() {
        let config: Config = toml::from_str("[station]\npoll_interval_secs = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let config: Config = toml::from_str(
            "[transport]\ntype = \"serial\"\nport = \"/dev/ttyAMA0\"\nbaud_rate = 9600\ntimeout_secs = 0\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_oversized_bucket() {
        let config: Config = toml::from_str(
            "[storage]\ntype = \"files\"\npath = \"/tmp/co2\"\nbucket_minutes = 90\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}

pub mod config;
pub mod sink;
pub mod station;
pub mod transport;

pub use config::{Config, StationConfig, StorageConfig, TransportConfig};
pub use sink::file::{FileSink, FileSinkError};
pub use sink::memory::{MemorySink, MemorySinkError};
pub use sink::{DiscardSink, RecordSink};
pub use station::{Station, StationStats};
pub use transport::mock::{Reply, SimulatedSensor};

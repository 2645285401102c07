pub mod config;
pub mod error;
pub mod records;
pub mod types;

pub use config::AppConfig;
pub use error::{AdviserError, AdviserResult};
pub use records::{read_records, write_records, ParsedRecords, SkippedRecord};

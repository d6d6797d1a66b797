pub mod cli;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod model;
pub mod report;

pub use ingest::{IngestError, Ingestor, RunnerEvent};
pub use merge::{HistoryStore, merge_snapshots};
pub use model::RunSnapshot;

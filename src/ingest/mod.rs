// Event ingestor - turns the lifecycle notification stream into report trees

pub mod event;
pub mod ingestor;

pub use event::{RunnerEvent, SuiteDescriptor, TestDescriptor};
pub use ingestor::{IngestError, Ingestor};

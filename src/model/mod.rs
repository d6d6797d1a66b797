// Report tree model - spec/suite/test hierarchy with rollup counters

pub mod snapshot;
pub mod spec;
pub mod suite;

pub use snapshot::{
    COLLAPSED_RUNNER_ID, CURRENT_SPECS_KEY, RunSnapshot, RunnerGroup, SuiteCounts, TestCounts,
};
pub use spec::{LogTimeCell, LogTimeRow, Spec, TIME_HEADER_LEAD};
pub use suite::{Suite, SuiteStatus, Test, TestOutcome};

// Run snapshots and the counter shapes rolled up at every level

use crate::model::spec::Spec;
use crate::model::suite::TestOutcome;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Synthetic runner key every runner id collapses into after a merge
pub const COLLAPSED_RUNNER_ID: &str = "0-0";

/// Spec key holding the collapsed suite bag of a merged snapshot
pub const CURRENT_SPECS_KEY: &str = "currentSpecs";

/// Suite-grained tallies. The same shape tracks per-runner test outcomes,
/// the transient in-suite tallies, and the run-wide suite results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteCounts {
    #[serde(default)]
    pub passing: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub failing: u64,
}

impl SuiteCounts {
    /// Tally one test outcome
    pub fn bump(&mut self, outcome: TestOutcome) {
        match outcome {
            TestOutcome::Pass => self.passing += 1,
            TestOutcome::Pending => self.pending += 1,
            TestOutcome::Fail => self.failing += 1,
        }
    }

    pub fn accumulate(&mut self, other: &SuiteCounts) {
        self.passing += other.passing;
        self.pending += other.pending;
        self.failing += other.failing;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Test-grained tallies for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCounts {
    #[serde(default)]
    pub passes: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub failures: u64,
}

impl TestCounts {
    pub fn accumulate(&mut self, other: &TestCounts) {
        self.passes += other.passes;
        self.pending += other.pending;
        self.failures += other.failures;
    }
}

/// The spec trees produced by one runner context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerGroup {
    #[serde(default)]
    pub specs: IndexMap<String, Spec>,
}

/// The full aggregate of one invocation.
///
/// Raw snapshots keep their original runner ids; merged snapshots hold a
/// single [`COLLAPSED_RUNNER_ID`] runner whose [`CURRENT_SPECS_KEY`] spec is
/// the flattened suite bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,

    #[serde(default)]
    pub end: Option<DateTime<Utc>>,

    #[serde(rename = "_duration", default)]
    pub duration_ms: u64,

    #[serde(default)]
    pub suite_results: SuiteCounts,

    #[serde(default)]
    pub counts: TestCounts,

    #[serde(default)]
    pub runners: IndexMap<String, RunnerGroup>,
}

impl RunSnapshot {
    /// Empty cumulative template with the collapsed runner/spec slots in
    /// place, zeroed counters, and empty header/time tables.
    pub fn collapsed_template() -> Self {
        let mut specs = IndexMap::new();
        specs.insert(CURRENT_SPECS_KEY.to_string(), Spec::default());

        let mut runners = IndexMap::new();
        runners.insert(COLLAPSED_RUNNER_ID.to_string(), RunnerGroup { specs });

        Self {
            runners,
            ..Self::default()
        }
    }

    /// The flattened suite bag of a merged snapshot, if present
    pub fn collapsed_spec(&self) -> Option<&Spec> {
        self.runners
            .get(COLLAPSED_RUNNER_ID)?
            .specs
            .get(CURRENT_SPECS_KEY)
    }

    pub fn collapsed_spec_mut(&mut self) -> &mut Spec {
        self.runners
            .entry(COLLAPSED_RUNNER_ID.to_string())
            .or_insert_with(RunnerGroup::default)
            .specs
            .entry(CURRENT_SPECS_KEY.to_string())
            .or_insert_with(Spec::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_template_shape() {
        let snapshot = RunSnapshot::collapsed_template();
        let spec = snapshot.collapsed_spec().expect("collapsed spec");

        assert!(spec.suites.is_empty());
        assert!(spec.log_times.is_empty());
        assert!(spec.log_time_header.is_empty());
        assert_eq!(snapshot.counts, TestCounts::default());
        assert_eq!(snapshot.suite_results, SuiteCounts::default());
    }

    #[test]
    fn test_snapshot_serializes_duration_with_underscore() {
        let snapshot = RunSnapshot::collapsed_template();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert!(json.get("_duration").is_some());
        assert!(json.get("suiteResults").is_some());
        assert!(json["runners"].get(COLLAPSED_RUNNER_ID).is_some());
    }

    #[test]
    fn test_counts_accumulate() {
        let mut counts = TestCounts::default();
        counts.accumulate(&TestCounts {
            passes: 4,
            pending: 1,
            failures: 2,
        });
        counts.accumulate(&TestCounts {
            passes: 1,
            pending: 0,
            failures: 0,
        });

        assert_eq!(counts.passes, 5);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.failures, 2);
    }
}

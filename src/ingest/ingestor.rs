// Aggregation state machine, keyed by runner id
// Notifications must be delivered strictly sequentially; "current" suite and
// test are explicit pointers updated at allocation time

use crate::ingest::event::RunnerEvent;
use crate::model::{
    LogTimeCell, RunSnapshot, RunnerGroup, Spec, Suite, SuiteCounts, SuiteStatus, Test,
    TestCounts, TestOutcome,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// The upstream producer violated the event ordering contract.
///
/// These are not recoverable: masking them would silently corrupt the
/// report tree, so the current run is aborted instead.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("runner `{cid}` was never started (while handling {event})")]
    UnknownRunner { cid: String, event: &'static str },

    #[error("runner `{cid}` has no current spec (while handling {event})")]
    NoCurrentSpec { cid: String, event: &'static str },

    #[error("runner `{cid}` has no open suite (while handling {event})")]
    NoOpenSuite { cid: String, event: &'static str },

    #[error("runner `{cid}` has no open test (while handling {event})")]
    NoOpenTest { cid: String, event: &'static str },
}

/// State tracked for one concurrent execution context
#[derive(Debug, Default)]
struct RunnerContext {
    counts: SuiteCounts,
    specs: IndexMap<String, Spec>,
    current_spec: Option<String>,
    current_suite: Option<String>,
    current_test: Option<String>,
}

impl RunnerContext {
    fn current_spec_mut(&mut self) -> Option<&mut Spec> {
        let key = self.current_spec.as_ref()?;
        self.specs.get_mut(key)
    }

    fn current_suite_mut(&mut self) -> Option<&mut Suite> {
        let key = self.current_suite.clone()?;
        self.current_spec_mut()?.suites.get_mut(&key)
    }

    fn current_test_mut(&mut self) -> Option<&mut Test> {
        let key = self.current_test.clone()?;
        self.current_suite_mut()?.tests.get_mut(&key)
    }
}

/// Processes one lifecycle notification at a time and grows the report
/// trees. One instance per process; all mutable state lives here.
pub struct Ingestor {
    runners: IndexMap<String, RunnerContext>,
    /// Transient tallies for the suite currently open, zeroed at suite end
    in_suite: SuiteCounts,
    /// Run-wide suite status tallies
    suite_results: SuiteCounts,
    started: Option<DateTime<Utc>>,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor {
    pub fn new() -> Self {
        Self {
            runners: IndexMap::new(),
            in_suite: SuiteCounts::default(),
            suite_results: SuiteCounts::default(),
            started: None,
        }
    }

    /// Apply one notification to the tree
    pub fn apply(&mut self, event: RunnerEvent) -> Result<(), IngestError> {
        match event {
            RunnerEvent::RunStarted { cid, specs } => {
                let mut ctx = RunnerContext::default();
                let spec_key = if specs.is_empty() {
                    cid.clone()
                } else {
                    specs.join("|")
                };
                ctx.specs.insert(spec_key.clone(), Spec::default());
                ctx.current_spec = Some(spec_key);
                self.runners.insert(cid, ctx);

                self.in_suite.reset();
                self.suite_results.reset();
                if self.started.is_none() {
                    self.started = Some(Utc::now());
                }
                Ok(())
            }

            RunnerEvent::SuiteStarted { cid, suite } => {
                let ctx = self.runner_mut(&cid, "suite-started")?;
                let spec = ctx
                    .current_spec_mut()
                    .ok_or_else(|| IngestError::NoCurrentSpec {
                        cid: cid.clone(),
                        event: "suite-started",
                    })?;
                let uid = suite.uid;
                spec.suites
                    .insert(uid.clone(), Suite::new(uid.clone(), suite.title));
                ctx.current_suite = Some(uid);
                ctx.current_test = None;
                Ok(())
            }

            RunnerEvent::TestStarted { cid, test } => {
                let ctx = self.runner_mut(&cid, "test-started")?;
                let suite = ctx
                    .current_suite_mut()
                    .ok_or_else(|| IngestError::NoOpenSuite {
                        cid: cid.clone(),
                        event: "test-started",
                    })?;
                let uid = test.uid;
                suite.tests.insert(uid.clone(), Test::new(test.title));
                ctx.current_test = Some(uid);
                Ok(())
            }

            RunnerEvent::TestPass { cid } => {
                self.record_outcome(&cid, TestOutcome::Pass, None, "test-pass")
            }
            RunnerEvent::TestPending { cid } => {
                self.record_outcome(&cid, TestOutcome::Pending, None, "test-pending")
            }
            RunnerEvent::TestFail { cid, error } => {
                self.record_outcome(&cid, TestOutcome::Fail, error, "test-fail")
            }

            RunnerEvent::ScreenshotCaptured { cid, filename } => {
                // Capturing a screenshot is optional; absence is not an error.
                let Some(filename) = filename else {
                    debug!(cid = %cid, "screenshot event without filename, skipping");
                    return Ok(());
                };
                let ctx = self.runner_mut(&cid, "screenshot-captured")?;
                let test = ctx
                    .current_test_mut()
                    .ok_or_else(|| IngestError::NoOpenTest {
                        cid: cid.clone(),
                        event: "screenshot-captured",
                    })?;
                test.screenshots.push(filename);
                Ok(())
            }

            RunnerEvent::SuiteEnded { cid } => {
                let tally = std::mem::take(&mut self.in_suite);
                let ctx = self.runner_mut(&cid, "suite-ended")?;
                let suite = ctx
                    .current_suite_mut()
                    .ok_or_else(|| IngestError::NoOpenSuite {
                        cid: cid.clone(),
                        event: "suite-ended",
                    })?;

                // First match wins: fail beats pending beats pass. All
                // zeroes means the suite produced no real outcomes and is
                // treated as a non-event.
                let status = if tally.failing > 0 {
                    SuiteStatus::Fail
                } else if tally.pending > 0 {
                    SuiteStatus::Pending
                } else if tally.passing > 0 {
                    SuiteStatus::Pass
                } else {
                    SuiteStatus::Unknown
                };
                if status != SuiteStatus::Unknown {
                    suite.status = status;
                }
                match status {
                    SuiteStatus::Fail => self.suite_results.failing += 1,
                    SuiteStatus::Pending => self.suite_results.pending += 1,
                    SuiteStatus::Pass => self.suite_results.passing += 1,
                    SuiteStatus::Unknown => {}
                }
                Ok(())
            }

            RunnerEvent::LogLine {
                cid,
                output,
                accounts,
                suite_number,
            } => {
                if output.is_none() && accounts.is_none() && suite_number.is_none() {
                    debug!(cid = %cid, "log-line event without payload, skipping");
                    return Ok(());
                }
                let ctx = self.runner_mut(&cid, "log-line")?;
                if let Some(output) = output {
                    let test = ctx
                        .current_test_mut()
                        .ok_or_else(|| IngestError::NoOpenTest {
                            cid: cid.clone(),
                            event: "log-line",
                        })?;
                    test.log_lines.get_or_insert_with(Vec::new).push(output);
                }
                if accounts.is_some() || suite_number.is_some() {
                    let suite = ctx
                        .current_suite_mut()
                        .ok_or_else(|| IngestError::NoOpenSuite {
                            cid: cid.clone(),
                            event: "log-line",
                        })?;
                    if let Some(accounts) = accounts {
                        suite.accounts = Some(accounts);
                    }
                    if let Some(number) = suite_number {
                        suite.suite_number = Some(number);
                    }
                }
                Ok(())
            }

            RunnerEvent::LogError { cid, output } => {
                let ctx = self.runner_mut(&cid, "log-error")?;
                let suite = ctx
                    .current_suite_mut()
                    .ok_or_else(|| IngestError::NoOpenSuite {
                        cid: cid.clone(),
                        event: "log-error",
                    })?;
                suite.log_error = Some(output);
                Ok(())
            }

            RunnerEvent::LogTime {
                cid,
                browser_label,
                log_time,
                color,
                suite_number,
            } => {
                if suite_number == 0 {
                    warn!(cid = %cid, "log-time suite number 0 is outside the 1-based contract, skipping");
                    return Ok(());
                }
                let ctx = self.runner_mut(&cid, "log-time")?;
                let spec = ctx
                    .current_spec_mut()
                    .ok_or_else(|| IngestError::NoCurrentSpec {
                        cid: cid.clone(),
                        event: "log-time",
                    })?;
                spec.record_log_time(&browser_label, suite_number, LogTimeCell { log_time, color });
                Ok(())
            }

            RunnerEvent::RunEnded { cid } => {
                // Finalization happens once per run, not per runner.
                debug!(cid = %cid, "runner finished");
                Ok(())
            }
        }
    }

    /// Collapse all runner trees into the raw snapshot for this invocation
    pub fn finalize(self) -> RunSnapshot {
        let end = Utc::now();
        let duration_ms = self
            .started
            .map(|start| (end - start).num_milliseconds().max(0) as u64)
            .unwrap_or(0);

        let mut counts = TestCounts::default();
        let mut runners = IndexMap::new();
        for (cid, ctx) in self.runners {
            counts.passes += ctx.counts.passing;
            counts.pending += ctx.counts.pending;
            counts.failures += ctx.counts.failing;
            runners.insert(cid, RunnerGroup { specs: ctx.specs });
        }

        RunSnapshot {
            start: self.started,
            end: Some(end),
            duration_ms,
            suite_results: self.suite_results,
            counts,
            runners,
        }
    }

    fn record_outcome(
        &mut self,
        cid: &str,
        outcome: TestOutcome,
        error: Option<Value>,
        event: &'static str,
    ) -> Result<(), IngestError> {
        let ctx = self.runner_mut(cid, event)?;
        ctx.counts.bump(outcome);
        // Scalar increments are valid without an open test; detailed state
        // lands on the current test only when one exists.
        if let Some(test) = ctx.current_test_mut() {
            test.state = outcome;
            if error.is_some() {
                test.error = error;
            }
        }
        self.in_suite.bump(outcome);
        Ok(())
    }

    fn runner_mut(
        &mut self,
        cid: &str,
        event: &'static str,
    ) -> Result<&mut RunnerContext, IngestError> {
        self.runners
            .get_mut(cid)
            .ok_or_else(|| IngestError::UnknownRunner {
                cid: cid.to_string(),
                event,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::event::{SuiteDescriptor, TestDescriptor};

    fn start_run(ingestor: &mut Ingestor, cid: &str) {
        ingestor
            .apply(RunnerEvent::RunStarted {
                cid: cid.to_string(),
                specs: vec!["login.spec".to_string()],
            })
            .unwrap();
    }

    fn start_suite(ingestor: &mut Ingestor, cid: &str, title: &str, seq: u32) {
        ingestor
            .apply(RunnerEvent::SuiteStarted {
                cid: cid.to_string(),
                suite: SuiteDescriptor {
                    uid: format!("{title}{seq}"),
                    title: title.to_string(),
                },
            })
            .unwrap();
    }

    fn start_test(ingestor: &mut Ingestor, cid: &str, title: &str, seq: u32) {
        ingestor
            .apply(RunnerEvent::TestStarted {
                cid: cid.to_string(),
                test: TestDescriptor {
                    uid: format!("{title}{seq}"),
                    title: title.to_string(),
                },
            })
            .unwrap();
    }

    fn pass(ingestor: &mut Ingestor, cid: &str) {
        ingestor
            .apply(RunnerEvent::TestPass {
                cid: cid.to_string(),
            })
            .unwrap();
    }

    fn end_suite(ingestor: &mut Ingestor, cid: &str) {
        ingestor
            .apply(RunnerEvent::SuiteEnded {
                cid: cid.to_string(),
            })
            .unwrap();
    }

    #[test]
    fn test_suite_status_priority_pending_beats_pass() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");
        start_suite(&mut ingestor, "0-0", "Checkout", 1);

        for i in 0..5 {
            start_test(&mut ingestor, "0-0", "step", i);
            pass(&mut ingestor, "0-0");
        }
        for i in 5..7 {
            start_test(&mut ingestor, "0-0", "step", i);
            ingestor
                .apply(RunnerEvent::TestPending {
                    cid: "0-0".to_string(),
                })
                .unwrap();
        }
        end_suite(&mut ingestor, "0-0");

        let snapshot = ingestor.finalize();
        assert_eq!(snapshot.suite_results.pending, 1);
        assert_eq!(snapshot.suite_results.passing, 0);

        let spec = &snapshot.runners["0-0"].specs["login.spec"];
        assert_eq!(spec.suites["Checkout1"].status, SuiteStatus::Pending);
    }

    #[test]
    fn test_suite_status_priority_fail_beats_everything() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");
        start_suite(&mut ingestor, "0-0", "Checkout", 1);
        start_test(&mut ingestor, "0-0", "works", 1);
        pass(&mut ingestor, "0-0");
        start_test(&mut ingestor, "0-0", "breaks", 2);
        ingestor
            .apply(RunnerEvent::TestFail {
                cid: "0-0".to_string(),
                error: Some(serde_json::json!({"message": "boom"})),
            })
            .unwrap();
        end_suite(&mut ingestor, "0-0");

        let snapshot = ingestor.finalize();
        assert_eq!(snapshot.suite_results.failing, 1);

        let suite = &snapshot.runners["0-0"].specs["login.spec"].suites["Checkout1"];
        assert_eq!(suite.status, SuiteStatus::Fail);
        assert_eq!(suite.tests["breaks2"].state, TestOutcome::Fail);
        assert!(suite.tests["breaks2"].error.is_some());
    }

    #[test]
    fn test_empty_suite_gets_no_status_and_no_count() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");
        start_suite(&mut ingestor, "0-0", "Idle", 1);
        end_suite(&mut ingestor, "0-0");

        let snapshot = ingestor.finalize();
        assert_eq!(snapshot.suite_results, SuiteCounts::default());

        let suite = &snapshot.runners["0-0"].specs["login.spec"].suites["Idle1"];
        assert_eq!(suite.status, SuiteStatus::Unknown);
    }

    #[test]
    fn test_in_suite_tally_resets_between_suites() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");

        start_suite(&mut ingestor, "0-0", "First", 1);
        start_test(&mut ingestor, "0-0", "breaks", 1);
        ingestor
            .apply(RunnerEvent::TestFail {
                cid: "0-0".to_string(),
                error: None,
            })
            .unwrap();
        end_suite(&mut ingestor, "0-0");

        start_suite(&mut ingestor, "0-0", "Second", 2);
        start_test(&mut ingestor, "0-0", "works", 1);
        pass(&mut ingestor, "0-0");
        end_suite(&mut ingestor, "0-0");

        let snapshot = ingestor.finalize();
        assert_eq!(snapshot.suite_results.failing, 1);
        assert_eq!(snapshot.suite_results.passing, 1);

        let spec = &snapshot.runners["0-0"].specs["login.spec"];
        assert_eq!(spec.suites["Second2"].status, SuiteStatus::Pass);
    }

    #[test]
    fn test_screenshot_without_filename_mutates_nothing() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");
        start_suite(&mut ingestor, "0-0", "Login", 1);
        start_test(&mut ingestor, "0-0", "logs in", 1);

        ingestor
            .apply(RunnerEvent::ScreenshotCaptured {
                cid: "0-0".to_string(),
                filename: None,
            })
            .unwrap();

        let snapshot = ingestor.finalize();
        let test = &snapshot.runners["0-0"].specs["login.spec"].suites["Login1"].tests["logs in1"];
        assert!(test.screenshots.is_empty());
    }

    #[test]
    fn test_screenshot_appends_to_current_test() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");
        start_suite(&mut ingestor, "0-0", "Login", 1);
        start_test(&mut ingestor, "0-0", "logs in", 1);

        ingestor
            .apply(RunnerEvent::ScreenshotCaptured {
                cid: "0-0".to_string(),
                filename: Some("shot-001.png".to_string()),
            })
            .unwrap();
        ingestor
            .apply(RunnerEvent::ScreenshotCaptured {
                cid: "0-0".to_string(),
                filename: Some("shot-002.png".to_string()),
            })
            .unwrap();

        let snapshot = ingestor.finalize();
        let test = &snapshot.runners["0-0"].specs["login.spec"].suites["Login1"].tests["logs in1"];
        assert_eq!(test.screenshots, vec!["shot-001.png", "shot-002.png"]);
    }

    #[test]
    fn test_screenshot_before_any_test_is_a_contract_violation() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");
        start_suite(&mut ingestor, "0-0", "Login", 1);

        let err = ingestor
            .apply(RunnerEvent::ScreenshotCaptured {
                cid: "0-0".to_string(),
                filename: Some("orphan.png".to_string()),
            })
            .unwrap_err();

        assert!(matches!(err, IngestError::NoOpenTest { .. }));
        assert!(err.to_string().contains("0-0"));
        assert!(err.to_string().contains("screenshot-captured"));
    }

    #[test]
    fn test_event_for_unknown_runner_is_a_contract_violation() {
        let mut ingestor = Ingestor::new();

        let err = ingestor
            .apply(RunnerEvent::TestPass {
                cid: "9-9".to_string(),
            })
            .unwrap_err();

        assert!(matches!(err, IngestError::UnknownRunner { .. }));
    }

    #[test]
    fn test_log_line_fields_apply_independently() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");
        start_suite(&mut ingestor, "0-0", "Login", 1);

        // No open test, but the suite-level fields still apply.
        ingestor
            .apply(RunnerEvent::LogLine {
                cid: "0-0".to_string(),
                output: None,
                accounts: Some(serde_json::json!(["alice", "bob"])),
                suite_number: Some(4),
            })
            .unwrap();

        start_test(&mut ingestor, "0-0", "logs in", 1);
        ingestor
            .apply(RunnerEvent::LogLine {
                cid: "0-0".to_string(),
                output: Some("clicked submit".to_string()),
                accounts: None,
                suite_number: None,
            })
            .unwrap();

        let snapshot = ingestor.finalize();
        let suite = &snapshot.runners["0-0"].specs["login.spec"].suites["Login1"];
        assert_eq!(suite.suite_number, Some(4));
        assert_eq!(suite.accounts, Some(serde_json::json!(["alice", "bob"])));
        assert_eq!(
            suite.tests["logs in1"].log_lines,
            Some(vec!["clicked submit".to_string()])
        );
    }

    #[test]
    fn test_log_error_overwrites_prior_value() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");
        start_suite(&mut ingestor, "0-0", "Login", 1);

        for message in ["first failure", "second failure"] {
            ingestor
                .apply(RunnerEvent::LogError {
                    cid: "0-0".to_string(),
                    output: message.to_string(),
                })
                .unwrap();
        }

        let snapshot = ingestor.finalize();
        let suite = &snapshot.runners["0-0"].specs["login.spec"].suites["Login1"];
        assert_eq!(suite.log_error.as_deref(), Some("second failure"));
    }

    #[test]
    fn test_log_time_suite_number_zero_is_skipped() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");

        ingestor
            .apply(RunnerEvent::LogTime {
                cid: "0-0".to_string(),
                browser_label: "chrome".to_string(),
                log_time: "00:00:01.00".to_string(),
                color: "#6b0".to_string(),
                suite_number: 0,
            })
            .unwrap();

        let snapshot = ingestor.finalize();
        let spec = &snapshot.runners["0-0"].specs["login.spec"];
        assert!(spec.log_times.is_empty());
        assert!(spec.log_time_header.is_empty());
    }

    #[test]
    fn test_counters_accumulate_per_runner() {
        let mut ingestor = Ingestor::new();
        start_run(&mut ingestor, "0-0");
        start_run(&mut ingestor, "0-1");

        start_suite(&mut ingestor, "0-0", "A", 1);
        start_test(&mut ingestor, "0-0", "a", 1);
        pass(&mut ingestor, "0-0");

        start_suite(&mut ingestor, "0-1", "B", 1);
        start_test(&mut ingestor, "0-1", "b", 1);
        pass(&mut ingestor, "0-1");
        start_test(&mut ingestor, "0-1", "c", 2);
        ingestor
            .apply(RunnerEvent::TestFail {
                cid: "0-1".to_string(),
                error: None,
            })
            .unwrap();

        let snapshot = ingestor.finalize();
        assert_eq!(snapshot.counts.passes, 2);
        assert_eq!(snapshot.counts.failures, 1);
        assert_eq!(snapshot.counts.pending, 0);
    }
}

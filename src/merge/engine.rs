// Snapshot fold: N independent run snapshots collapse into one cumulative
// result set with no duplicate or orphaned entries

use crate::model::RunSnapshot;
use uuid::Uuid;

/// Fold the given snapshots, in sequence order, into one cumulative
/// snapshot.
///
/// `start` comes from the first input; `end` and duration are overwritten
/// on every iteration so the last input wins. Counters are summed. Every
/// non-empty suite is re-keyed under a fresh identifier into the collapsed
/// suite bag; suites with zero tests are dropped. Timing rows concatenate
/// in order and headers merge by first-seen set union.
///
/// The fresh identifiers make repeated merges structurally equivalent but
/// never identically keyed; suite identifiers are opaque and carry no
/// stability guarantee across merges.
pub fn merge_snapshots(inputs: &[RunSnapshot]) -> RunSnapshot {
    let mut cumulative = RunSnapshot::collapsed_template();

    for (index, snapshot) in inputs.iter().enumerate() {
        if index == 0 {
            cumulative.start = snapshot.start;
        }
        // Last write wins: the final value reflects the last snapshot.
        cumulative.end = snapshot.end;
        cumulative.duration_ms = snapshot.duration_ms;

        cumulative.suite_results.accumulate(&snapshot.suite_results);
        cumulative.counts.accumulate(&snapshot.counts);

        for runner in snapshot.runners.values() {
            for spec in runner.specs.values() {
                let bag = cumulative.collapsed_spec_mut();
                for suite in spec.suites.values() {
                    if !suite.is_reportable() {
                        continue;
                    }
                    let key = Uuid::new_v4().simple().to_string();
                    bag.suites.insert(key, suite.clone());
                }
                bag.log_times.extend(spec.log_times.iter().cloned());
                merge_header_labels(&mut bag.log_time_header, &spec.log_time_header);
            }
        }
    }

    cumulative
}

/// First-seen-order set union; duplicate and empty labels are discarded.
fn merge_header_labels(target: &mut Vec<String>, extra: &[String]) {
    for label in extra {
        if label.is_empty() {
            continue;
        }
        if !target.iter().any(|existing| existing == label) {
            target.push(label.clone());
        }
    }
}

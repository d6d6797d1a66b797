// Lifecycle notifications - the closed event set emitted by the host runner
// Decoded from NDJSON, one object per line, tagged by the `event` field

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity payload carried by `suite-started`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteDescriptor {
    pub uid: String,
    #[serde(default)]
    pub title: String,
}

/// Identity payload carried by `test-started`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDescriptor {
    pub uid: String,
    #[serde(default)]
    pub title: String,
}

/// One lifecycle notification from the host test runner.
///
/// Every variant carries the opaque runner id under `cid`. Fields documented
/// as optional are treated as absent, never as errors, when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RunnerEvent {
    RunStarted {
        cid: String,
        #[serde(default)]
        specs: Vec<String>,
    },

    SuiteStarted {
        cid: String,
        suite: SuiteDescriptor,
    },

    TestStarted {
        cid: String,
        test: TestDescriptor,
    },

    TestPass {
        cid: String,
    },

    TestFail {
        cid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<Value>,
    },

    TestPending {
        cid: String,
    },

    ScreenshotCaptured {
        cid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },

    SuiteEnded {
        cid: String,
    },

    LogLine {
        cid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accounts: Option<Value>,
        #[serde(
            default,
            rename = "suiteNumber",
            skip_serializing_if = "Option::is_none"
        )]
        suite_number: Option<u32>,
    },

    LogError {
        cid: String,
        output: String,
    },

    LogTime {
        cid: String,
        #[serde(rename = "browserLabel")]
        browser_label: String,
        #[serde(rename = "logTime")]
        log_time: String,
        #[serde(default)]
        color: String,
        #[serde(rename = "suiteNumber")]
        suite_number: u32,
    },

    RunEnded {
        cid: String,
    },
}

impl RunnerEvent {
    /// Event kind as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run-started",
            Self::SuiteStarted { .. } => "suite-started",
            Self::TestStarted { .. } => "test-started",
            Self::TestPass { .. } => "test-pass",
            Self::TestFail { .. } => "test-fail",
            Self::TestPending { .. } => "test-pending",
            Self::ScreenshotCaptured { .. } => "screenshot-captured",
            Self::SuiteEnded { .. } => "suite-ended",
            Self::LogLine { .. } => "log-line",
            Self::LogError { .. } => "log-error",
            Self::LogTime { .. } => "log-time",
            Self::RunEnded { .. } => "run-ended",
        }
    }

    /// Runner id the notification belongs to
    pub fn cid(&self) -> &str {
        match self {
            Self::RunStarted { cid, .. }
            | Self::SuiteStarted { cid, .. }
            | Self::TestStarted { cid, .. }
            | Self::TestPass { cid }
            | Self::TestFail { cid, .. }
            | Self::TestPending { cid }
            | Self::ScreenshotCaptured { cid, .. }
            | Self::SuiteEnded { cid }
            | Self::LogLine { cid, .. }
            | Self::LogError { cid, .. }
            | Self::LogTime { cid, .. }
            | Self::RunEnded { cid } => cid,
        }
    }
}

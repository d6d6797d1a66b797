// Suite and test nodes of the report tree

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a single test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Pass,
    Fail,
    #[default]
    Pending,
}

/// Status a suite settles into once it completes.
///
/// `Unknown` is the default for suites that never produced a real test
/// outcome; they are assigned no status and counted nowhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteStatus {
    #[default]
    Unknown,
    Pass,
    Pending,
    Fail,
}

/// One executed test with its attached artifacts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    pub title: String,

    #[serde(default)]
    pub state: TestOutcome,

    /// Screenshot file references, in capture order. Existence of the files
    /// is never validated here.
    #[serde(default)]
    pub screenshots: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_lines: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl Test {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A named grouping of tests within a spec.
///
/// The `uid` is the stable identifier; by convention it embeds the title
/// (e.g. `"Login suite1"` for title `"Login suite"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suite {
    pub title: String,
    pub uid: String,

    #[serde(default)]
    pub tests: IndexMap<String, Test>,

    #[serde(default)]
    pub status: SuiteStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_number: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_error: Option<String>,
}

impl Suite {
    pub fn new(uid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// A suite with zero tests is not a reportable entity.
    pub fn is_reportable(&self) -> bool {
        !self.tests.is_empty()
    }
}

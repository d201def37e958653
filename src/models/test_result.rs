//! Test result record: one complete test execution, keyed by a caller-supplied UUID.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::wire_time;

/// Lifecycle state of a test result, as far as this layer is concerned.
///
/// A result is created "in progress" and moved to "new report" by
/// `finish_result`; the webapp's own report pipeline takes over from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultState {
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "new report")]
    NewReport,
}

impl ResultState {
    /// Wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::NewReport => "new report",
        }
    }

    /// Parse from the wire string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in progress" => Some(Self::InProgress),
            "new report" => Some(Self::NewReport),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResultState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A new test result record.
///
/// The id is caller-supplied; the referenced (project, variant, branch)
/// triple is created on demand before the result itself.
#[derive(Debug, Clone, Serialize)]
pub struct NewTestResult {
    /// Caller-supplied result UUID
    #[serde(rename = "test_result_id")]
    pub result_id: Uuid,
    pub project: String,
    pub variant: String,
    pub branch: String,
    #[serde(with = "wire_time")]
    pub time_start: NaiveDateTime,
    #[serde(with = "wire_time")]
    pub time_end: NaiveDateTime,
    /// Software version of the target under test
    pub version_sw_target: String,
    /// Version of the test software itself
    pub version_sw_test: String,
    pub version_hardware: String,
    /// Link to the CI execution (Jenkins, GitLab CI, ...)
    #[serde(rename = "jenkinsurl")]
    pub build_url: String,
    /// Qualitygate applied when the report is generated
    #[serde(rename = "reporting_qualitygate")]
    pub qualitygate: String,
    /// Interpretation assigned at creation time; distinct from the mutable
    /// category set later via `set_category`
    pub interpretation: String,
}

/// Identifying fields read back from an existing result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultSummary {
    pub project: String,
    pub version_sw_target: String,
}

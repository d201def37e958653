//! Test case records and their write-once children.

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::wire_time;

/// One test case outcome within a file.
///
/// Write-once: there is no update operation for test cases. The backend
/// assigns the integer id returned by `create_test_case`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTestCase {
    pub name: String,
    /// Issue tracker reference
    pub issue: String,
    /// Test management tool id
    pub tcid: String,
    /// Requirement (function) id
    pub fid: String,
    pub component: String,
    #[serde(with = "wire_time")]
    pub time_start: NaiveDateTime,
    pub result_main: String,
    /// Completion state of the case, free-form (unrelated to the result's
    /// lifecycle state)
    pub result_state: String,
    pub result_return: i64,
    /// Target resets observed during the case
    pub counter_resets: i64,
    /// Traceback captured when the case failed
    pub lastlog: String,
    // The webapp stores ordering and repetition as text; keep the fields
    // numeric for callers and stringify at the serialization boundary.
    #[serde(rename = "testnumber", serialize_with = "as_wire_string")]
    pub test_number: i64,
    #[serde(rename = "repeatcount", serialize_with = "as_wire_string")]
    pub repeat_count: i64,
    /// Result this case belongs to
    #[serde(rename = "test_result_id")]
    pub result_id: Uuid,
    /// File this case belongs to
    pub file_id: i64,
}

/// Why a result was aborted before completing.
#[derive(Debug, Clone, Serialize)]
pub struct NewAbortReason {
    #[serde(rename = "test_result_id")]
    pub result_id: Uuid,
    #[serde(rename = "abort_reason")]
    pub reason: String,
    #[serde(rename = "msg_detail")]
    pub message: String,
}

/// One resource-usage measurement tied to a test case.
#[derive(Debug, Clone, Serialize)]
pub struct CcrSample {
    #[serde(with = "wire_time")]
    pub timestamp: NaiveDateTime,
    /// Resident set size, bytes
    #[serde(rename = "MEM_RSS")]
    pub mem_rss: i64,
    /// CPU load, percent
    #[serde(rename = "CPU")]
    pub cpu: f64,
}

fn as_wire_string<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}

//! Record types written through the access layer.
//!
//! Each struct is the explicit parameter set of one create operation, with
//! serde renames pinning the wire field names the webapp expects. The direct
//! backend binds the same fields as SQL parameters, so the structs are the
//! single source of truth for what a record carries.

pub mod test_case;
pub mod test_file;
pub mod test_result;

pub use test_case::{CcrSample, NewAbortReason, NewTestCase};
pub use test_file::{DEFAULT_FILE_ORIGIN, NewFileHeader, NewTestFile};
pub use test_result::{NewTestResult, ResultState, ResultSummary};

/// Serde adapter for the webapp's fixed timestamp format.
///
/// Every timestamp on the wire is `YYYY-MM-DD HH:MM:SS`, no timezone, no
/// fractional seconds.
pub mod wire_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    /// Render a timestamp for wire payloads built outside of serde derives.
    pub fn render(time: &NaiveDateTime) -> String {
        time.format(FORMAT).to_string()
    }
}

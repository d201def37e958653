//! The access seam: one capability trait, two interchangeable backends.
//!
//! Callers obtain a backend from [`create`], call `connect`, issue their
//! create/update/get sequence and `disconnect`. Nothing outside this module
//! depends on a concrete backend type.

pub mod direct;
pub mod rest;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::config::{AccessMode, ConnectSettings};
use crate::error::{DbAccessError, DbResult};
use crate::models::{
    CcrSample, NewAbortReason, NewFileHeader, NewTestCase, NewTestFile, NewTestResult,
    ResultSummary,
};

pub use direct::DirectDbAccess;
pub use rest::RestDbAccess;

/// Capability set both storage strategies expose.
///
/// A backend instance holds one authenticated session and is not meant to be
/// shared between concurrent callers; spin up one instance per worker
/// instead. Reads take `&self`, anything touching session or store state
/// takes `&mut self`.
#[async_trait]
pub trait DbAccess: Send {
    /// Which strategy this backend implements.
    fn mode(&self) -> AccessMode;

    // Connection lifecycle

    /// Establish the session. Fails with `Authentication` when credentials
    /// or the login handshake are rejected.
    async fn connect(&mut self, settings: &ConnectSettings) -> DbResult<()>;

    /// Tear the session down. Fails with `Connection` when the remote end
    /// rejects the logout; never silently ignored, a half-closed session in
    /// a reporting pipeline risks losing records.
    async fn disconnect(&mut self) -> DbResult<()>;

    /// Finalize pending writes. The REST strategy has no transaction and
    /// treats this as a no-op.
    async fn commit(&mut self) -> DbResult<()> {
        Ok(())
    }

    // Retrieval

    /// Names of all existing categories; empty when none exist.
    async fn get_categories(&self) -> DbResult<Vec<String>>;

    /// Whether a result with this id has been created.
    async fn result_exists(&self, result_id: Uuid) -> DbResult<bool>;

    /// Id of the most recently created file, optionally scoped to one
    /// result. `NotFound` when no file exists.
    async fn latest_file_id(&self, result_id: Option<Uuid>) -> DbResult<i64>;

    /// Project and target software version of an existing result, `None`
    /// when the id is unknown.
    async fn result_summary(&self, result_id: Uuid) -> DbResult<Option<ResultSummary>>;

    // Creation

    /// Create a result in state "in progress", creating its (project,
    /// variant, branch) triple first when the store does not know it yet.
    /// Returns the caller-supplied id.
    async fn create_result(&mut self, result: &NewTestResult) -> DbResult<Uuid>;

    /// Create a file record; returns the backend-generated id.
    async fn create_file(&mut self, file: &NewTestFile) -> DbResult<i64>;

    /// Create the write-once header block for a file.
    async fn create_file_header(&mut self, header: &NewFileHeader) -> DbResult<()>;

    /// Create a test case record; returns the backend-generated id.
    async fn create_test_case(&mut self, case: &NewTestCase) -> DbResult<i64>;

    /// Record why a result was aborted.
    async fn create_abort_reason(&mut self, abort: &NewAbortReason) -> DbResult<()>;

    /// Store resource-usage samples for a test case, one write per sample.
    /// The first failure aborts the remainder.
    async fn create_ccr_samples(
        &mut self,
        test_case_id: i64,
        samples: &[CcrSample],
    ) -> DbResult<()>;

    /// Attach free-form user tags to a result.
    async fn create_tags(&mut self, result_id: Uuid, tags: &str) -> DbResult<()>;

    // Updates (idempotent single-field re-assignments)

    /// Set how often the target was reanimated during execution.
    async fn set_reanimation_count(&mut self, result_id: Uuid, count: i64) -> DbResult<()>;

    /// Set the mutable classification label of a result.
    async fn set_category(&mut self, result_id: Uuid, category: &str) -> DbResult<()>;

    async fn update_file_end_time(&mut self, file_id: i64, time_end: NaiveDateTime)
    -> DbResult<()>;

    async fn update_result_end_time(
        &mut self,
        result_id: Uuid,
        time_end: NaiveDateTime,
    ) -> DbResult<()>;

    // Finalization

    /// Transition a result to "new report", the terminal state from this
    /// layer's point of view.
    async fn finish_result(&mut self, result_id: Uuid) -> DbResult<()>;

    /// Run the backend-side event-table aggregation for one result.
    async fn update_event_table(&mut self, result_id: Uuid) -> DbResult<()>;

    /// Run the backend-side event-table aggregation across all results.
    async fn update_event_tables(&mut self) -> DbResult<()>;
}

/// Create the backend selected by a configuration tag.
///
/// `"db"` yields the direct-connection strategy, `"rest"` the REST API
/// strategy; anything else is a `Configuration` error naming the tag.
pub fn create(tag: &str) -> DbResult<Box<dyn DbAccess>> {
    match AccessMode::parse(tag) {
        Some(AccessMode::Db) => Ok(Box::new(DirectDbAccess::new())),
        Some(AccessMode::Rest) => Ok(Box::new(RestDbAccess::new())),
        None => Err(DbAccessError::Configuration(tag.to_string())),
    }
}

//! Direct-connection strategy: parameterized SQL over the webapp's MySQL
//! store, one transaction per batch of writes.
//!
//! The schema and the `update_evtbl`/`update_evtbls` stored procedures live
//! with the webapp; this side only binds parameters.

mod statements;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait,
};
use secrecy::ExposeSecret;
use tracing::{debug, info};
use uuid::Uuid;

use crate::access::DbAccess;
use crate::config::{AccessMode, ConnectSettings};
use crate::error::{DbAccessError, DbResult};
use crate::models::{
    CcrSample, NewAbortReason, NewFileHeader, NewTestCase, NewTestFile, NewTestResult, ResultState,
    ResultSummary,
};

fn db_err(err: DbErr) -> DbAccessError {
    DbAccessError::Request(err.to_string())
}

fn not_connected() -> DbAccessError {
    DbAccessError::Connection("not connected".to_string())
}

/// Access to the webapp's database over a native MySQL connection.
///
/// Writes accumulate in an open transaction; `commit` finalizes them and
/// opens the next one. Reads run inside the same transaction and therefore
/// see the instance's own uncommitted writes.
pub struct DirectDbAccess {
    connection: Option<DatabaseConnection>,
    transaction: Option<DatabaseTransaction>,
}

impl DirectDbAccess {
    pub fn new() -> Self {
        DirectDbAccess {
            connection: None,
            transaction: None,
        }
    }

    fn transaction(&self) -> DbResult<&DatabaseTransaction> {
        self.transaction.as_ref().ok_or_else(not_connected)
    }
}

impl Default for DirectDbAccess {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DbAccess for DirectDbAccess {
    fn mode(&self) -> AccessMode {
        AccessMode::Db
    }

    async fn connect(&mut self, settings: &ConnectSettings) -> DbResult<()> {
        let url = format!(
            "mysql://{}:{}@{}/{}",
            settings.user,
            settings.password.expose_secret(),
            settings.host,
            settings.database
        );
        let connection = Database::connect(url)
            .await
            .map_err(|e| DbAccessError::Authentication(e.to_string()))?;
        let transaction = connection.begin().await.map_err(db_err)?;
        self.connection = Some(connection);
        self.transaction = Some(transaction);
        info!(
            "connected to database {} on {}",
            settings.database, settings.host
        );
        Ok(())
    }

    async fn disconnect(&mut self) -> DbResult<()> {
        // Matching the driver semantics this replaces: closing without
        // commit discards; commit() is the only path that persists.
        if let Some(transaction) = self.transaction.take() {
            transaction
                .rollback()
                .await
                .map_err(|e| DbAccessError::Connection(e.to_string()))?;
        }
        let connection = self.connection.take().ok_or_else(not_connected)?;
        connection
            .close()
            .await
            .map_err(|e| DbAccessError::Connection(e.to_string()))?;
        info!("disconnected");
        Ok(())
    }

    async fn commit(&mut self) -> DbResult<()> {
        let transaction = self.transaction.take().ok_or_else(not_connected)?;
        transaction.commit().await.map_err(db_err)?;
        // keep the session usable for the next batch
        let connection = self.connection.as_ref().ok_or_else(not_connected)?;
        self.transaction = Some(connection.begin().await.map_err(db_err)?);
        Ok(())
    }

    async fn get_categories(&self) -> DbResult<Vec<String>> {
        let rows = self
            .transaction()?
            .query_all_raw(statements::select_categories())
            .await
            .map_err(db_err)?;
        rows.iter()
            .map(|row| row.try_get::<String>("", "category").map_err(db_err))
            .collect()
    }

    async fn result_exists(&self, result_id: Uuid) -> DbResult<bool> {
        Ok(self
            .transaction()?
            .query_one_raw(statements::select_result(result_id))
            .await
            .map_err(db_err)?
            .is_some())
    }

    async fn latest_file_id(&self, result_id: Option<Uuid>) -> DbResult<i64> {
        let row = self
            .transaction()?
            .query_one_raw(statements::select_latest_file_id(result_id))
            .await
            .map_err(db_err)?;
        match row {
            Some(row) => row.try_get::<i64>("", "id").map_err(db_err),
            None => Err(DbAccessError::NotFound("latest file id".to_string())),
        }
    }

    async fn result_summary(&self, result_id: Uuid) -> DbResult<Option<ResultSummary>> {
        let row = self
            .transaction()?
            .query_one_raw(statements::select_result(result_id))
            .await
            .map_err(db_err)?;
        match row {
            Some(row) => Ok(Some(ResultSummary {
                project: row.try_get("", "project").map_err(db_err)?,
                version_sw_target: row.try_get("", "version_sw_target").map_err(db_err)?,
            })),
            None => Ok(None),
        }
    }

    async fn create_result(&mut self, result: &NewTestResult) -> DbResult<Uuid> {
        let transaction = self.transaction()?;
        let known = transaction
            .query_one_raw(statements::select_project(
                &result.project,
                &result.variant,
                &result.branch,
            ))
            .await
            .map_err(db_err)?
            .is_some();
        if !known {
            transaction
                .execute_raw(statements::insert_project(
                    &result.project,
                    &result.variant,
                    &result.branch,
                ))
                .await
                .map_err(db_err)?;
        }
        transaction
            .execute_raw(statements::insert_result(result, ResultState::InProgress))
            .await
            .map_err(db_err)?;
        debug!("created result {}", result.result_id);
        Ok(result.result_id)
    }

    async fn create_file(&mut self, file: &NewTestFile) -> DbResult<i64> {
        let inserted = self
            .transaction()?
            .execute_raw(statements::insert_file(file))
            .await
            .map_err(db_err)?;
        Ok(inserted.last_insert_id() as i64)
    }

    async fn create_file_header(&mut self, header: &NewFileHeader) -> DbResult<()> {
        self.transaction()?
            .execute_raw(statements::insert_file_header(header))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn create_test_case(&mut self, case: &NewTestCase) -> DbResult<i64> {
        let inserted = self
            .transaction()?
            .execute_raw(statements::insert_test_case(case))
            .await
            .map_err(db_err)?;
        Ok(inserted.last_insert_id() as i64)
    }

    async fn create_abort_reason(&mut self, abort: &NewAbortReason) -> DbResult<()> {
        self.transaction()?
            .execute_raw(statements::insert_abort(abort))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn create_ccr_samples(
        &mut self,
        test_case_id: i64,
        samples: &[CcrSample],
    ) -> DbResult<()> {
        let transaction = self.transaction()?;
        for sample in samples {
            transaction
                .execute_raw(statements::insert_ccr(test_case_id, sample))
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }

    async fn create_tags(&mut self, result_id: Uuid, tags: &str) -> DbResult<()> {
        self.transaction()?
            .execute_raw(statements::insert_tags(result_id, tags))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_reanimation_count(&mut self, result_id: Uuid, count: i64) -> DbResult<()> {
        self.transaction()?
            .execute_raw(statements::update_reanimation(result_id, count))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_category(&mut self, result_id: Uuid, category: &str) -> DbResult<()> {
        self.transaction()?
            .execute_raw(statements::update_category(result_id, category))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_file_end_time(
        &mut self,
        file_id: i64,
        time_end: NaiveDateTime,
    ) -> DbResult<()> {
        self.transaction()?
            .execute_raw(statements::update_file_end_time(file_id, time_end))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_result_end_time(
        &mut self,
        result_id: Uuid,
        time_end: NaiveDateTime,
    ) -> DbResult<()> {
        self.transaction()?
            .execute_raw(statements::update_result_end_time(result_id, time_end))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn finish_result(&mut self, result_id: Uuid) -> DbResult<()> {
        self.transaction()?
            .execute_raw(statements::update_result_state(
                result_id,
                ResultState::NewReport,
            ))
            .await
            .map_err(db_err)?;
        info!("finished result {}", result_id);
        Ok(())
    }

    async fn update_event_table(&mut self, result_id: Uuid) -> DbResult<()> {
        self.transaction()?
            .execute_raw(statements::call_update_evtbl(result_id))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_event_tables(&mut self) -> DbResult<()> {
        self.transaction()?
            .execute_raw(statements::call_update_evtbls())
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

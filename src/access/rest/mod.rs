//! REST API strategy.
//!
//! Every operation is exactly one transport call; the only exception is
//! `create_result`, which looks the project triple up first and creates it
//! when the store does not know it yet.

mod auth;
mod transport;

pub use auth::encrypt_password;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};
use urlencoding::encode;
use uuid::Uuid;

use crate::access::DbAccess;
use crate::config::{AccessMode, ConnectSettings};
use crate::error::{DbAccessError, DbResult};
use crate::models::{
    CcrSample, NewAbortReason, NewFileHeader, NewTestCase, NewTestFile, NewTestResult, ResultState,
    ResultSummary, wire_time,
};
use transport::RestTransport;

/// Project sub-resource body for the read-then-create in `create_result`.
#[derive(Serialize)]
struct ProjectBody<'a> {
    project: &'a str,
    variant: &'a str,
    branch: &'a str,
}

/// Result creation body: the caller's fields plus the initial state.
#[derive(Serialize)]
struct CreateResultBody<'a> {
    #[serde(flatten)]
    result: &'a NewTestResult,
    result_state: ResultState,
}

/// CCR sample body: the measurement plus its owning test case.
#[derive(Serialize)]
struct CcrBody<'a> {
    test_case_id: i64,
    #[serde(flatten)]
    sample: &'a CcrSample,
}

/// Access to the webapp's database through its REST API.
///
/// Holds the authenticated session between `connect` and `disconnect`;
/// unconnected instances answer every operation with a `Connection` error.
pub struct RestDbAccess {
    transport: Option<RestTransport>,
}

impl RestDbAccess {
    pub fn new() -> Self {
        RestDbAccess { transport: None }
    }

    fn transport(&self) -> DbResult<&RestTransport> {
        self.transport
            .as_ref()
            .ok_or_else(|| DbAccessError::Connection("not connected".to_string()))
    }
}

impl Default for RestDbAccess {
    fn default() -> Self {
        Self::new()
    }
}

/// The webapp's "truthy data" convention: null and empty containers mean
/// "nothing there", same as an outright failed read.
fn value_present(data: &Value) -> bool {
    match data {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Pull the generated id out of a creation response.
fn created_id(resource: &str, data: &Value) -> DbResult<i64> {
    data.get("id")
        .and_then(|id| id.as_i64())
        .ok_or_else(|| DbAccessError::Request(format!("{} response carries no id", resource)))
}

#[async_trait]
impl DbAccess for RestDbAccess {
    fn mode(&self) -> AccessMode {
        AccessMode::Rest
    }

    async fn connect(&mut self, settings: &ConnectSettings) -> DbResult<()> {
        let transport = RestTransport::new(
            &settings.host,
            &settings.database,
            settings.accept_invalid_certs,
        )?;
        auth::login(&transport, &settings.user, &settings.password).await?;
        self.transport = Some(transport);
        Ok(())
    }

    async fn disconnect(&mut self) -> DbResult<()> {
        // The local session is dropped either way; only the server's answer
        // decides whether the logout counts as clean.
        let transport = self
            .transport
            .take()
            .ok_or_else(|| DbAccessError::Connection("not connected".to_string()))?;
        match transport.get_status("logout").await {
            Ok(StatusCode::OK) => {
                info!("logged out");
                Ok(())
            }
            Ok(status) => Err(DbAccessError::Connection(format!(
                "logout rejected with HTTP {}",
                status
            ))),
            Err(e) => Err(DbAccessError::Connection(format!("logout failed: {}", e))),
        }
    }

    async fn get_categories(&self) -> DbResult<Vec<String>> {
        let Some(Value::Array(items)) = self.transport()?.get("categories").await else {
            return Ok(Vec::new());
        };
        Ok(items
            .iter()
            .filter_map(|item| item.get("category").and_then(|c| c.as_str()))
            .map(str::to_string)
            .collect())
    }

    async fn result_exists(&self, result_id: Uuid) -> DbResult<bool> {
        Ok(self
            .transport()?
            .get(&format!("results/{}", result_id))
            .await
            .as_ref()
            .is_some_and(value_present))
    }

    async fn latest_file_id(&self, result_id: Option<Uuid>) -> DbResult<i64> {
        let resource = match result_id {
            Some(id) => format!("files/last?test_result_id={}", id),
            None => "files/last".to_string(),
        };
        self.transport()?
            .get(&resource)
            .await
            .as_ref()
            .and_then(|data| data.get("id"))
            .and_then(|id| id.as_i64())
            .ok_or_else(|| DbAccessError::NotFound("latest file id".to_string()))
    }

    async fn result_summary(&self, result_id: Uuid) -> DbResult<Option<ResultSummary>> {
        let Some(data) = self
            .transport()?
            .get(&format!("results/{}", result_id))
            .await
        else {
            return Ok(None);
        };
        if !value_present(&data) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(data)?))
    }

    async fn create_result(&mut self, result: &NewTestResult) -> DbResult<Uuid> {
        let transport = self.transport()?;

        // Check-then-act without locking: two callers racing on a fresh
        // project triple can both attempt the create, and the second answer
        // is the backing store's to give. Projects are created rarely enough
        // that this has never been worth a lock.
        let lookup = format!(
            "projects?project={}&variant={}&branch={}",
            encode(&result.project),
            encode(&result.variant),
            encode(&result.branch)
        );
        if !transport.get(&lookup).await.as_ref().is_some_and(value_present) {
            transport
                .post(
                    "projects",
                    &ProjectBody {
                        project: &result.project,
                        variant: &result.variant,
                        branch: &result.branch,
                    },
                )
                .await?;
        }

        transport
            .post(
                "results",
                &CreateResultBody {
                    result,
                    result_state: ResultState::InProgress,
                },
            )
            .await?;
        debug!("created result {}", result.result_id);
        Ok(result.result_id)
    }

    async fn create_file(&mut self, file: &NewTestFile) -> DbResult<i64> {
        let data = self.transport()?.post("files", file).await?;
        created_id("files", &data)
    }

    async fn create_file_header(&mut self, header: &NewFileHeader) -> DbResult<()> {
        self.transport()?.post("fileheaders", header).await?;
        Ok(())
    }

    async fn create_test_case(&mut self, case: &NewTestCase) -> DbResult<i64> {
        let data = self.transport()?.post("testcases", case).await?;
        created_id("testcases", &data)
    }

    async fn create_abort_reason(&mut self, abort: &NewAbortReason) -> DbResult<()> {
        self.transport()?.post("aborts", abort).await?;
        Ok(())
    }

    async fn create_ccr_samples(
        &mut self,
        test_case_id: i64,
        samples: &[CcrSample],
    ) -> DbResult<()> {
        let transport = self.transport()?;
        for sample in samples {
            transport
                .post(
                    "ccrs",
                    &CcrBody {
                        test_case_id,
                        sample,
                    },
                )
                .await?;
        }
        Ok(())
    }

    async fn create_tags(&mut self, result_id: Uuid, tags: &str) -> DbResult<()> {
        self.transport()?
            .post(
                "userresults",
                &json!({ "test_result_id": result_id, "tags": tags }),
            )
            .await?;
        Ok(())
    }

    async fn set_reanimation_count(&mut self, result_id: Uuid, count: i64) -> DbResult<()> {
        self.transport()?
            .patch(
                "results",
                &result_id.to_string(),
                &json!({ "num_of_reanimation": count }),
            )
            .await?;
        Ok(())
    }

    async fn set_category(&mut self, result_id: Uuid, category: &str) -> DbResult<()> {
        self.transport()?
            .patch(
                "results",
                &result_id.to_string(),
                &json!({ "category_main": category }),
            )
            .await?;
        Ok(())
    }

    async fn update_file_end_time(
        &mut self,
        file_id: i64,
        time_end: NaiveDateTime,
    ) -> DbResult<()> {
        self.transport()?
            .patch(
                "files",
                &file_id.to_string(),
                &json!({ "time_end": wire_time::render(&time_end) }),
            )
            .await?;
        Ok(())
    }

    async fn update_result_end_time(
        &mut self,
        result_id: Uuid,
        time_end: NaiveDateTime,
    ) -> DbResult<()> {
        self.transport()?
            .patch(
                "results",
                &result_id.to_string(),
                &json!({ "time_end": wire_time::render(&time_end) }),
            )
            .await?;
        Ok(())
    }

    async fn finish_result(&mut self, result_id: Uuid) -> DbResult<()> {
        self.transport()?
            .patch(
                "results",
                &result_id.to_string(),
                &json!({ "result_state": ResultState::NewReport }),
            )
            .await?;
        info!("finished result {}", result_id);
        Ok(())
    }

    async fn update_event_table(&mut self, result_id: Uuid) -> DbResult<()> {
        self.transport()?
            .patch_empty("evtblresults", &result_id.to_string())
            .await?;
        Ok(())
    }

    async fn update_event_tables(&mut self) -> DbResult<()> {
        self.transport()?.post_empty("evtblresults").await?;
        Ok(())
    }
}

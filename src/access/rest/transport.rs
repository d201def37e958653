//! HTTP plumbing for the REST strategy.
//!
//! Three verbs against `{host}/{database}`, one uniform response wrapper.
//! Reads treat every failure as absence; writes fail loudly with the server
//! message. That asymmetry is part of the observable contract and callers
//! rely on it.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DbAccessError, DbResult};

/// HTTP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP total timeout per request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Uniform response wrapper used by every webapp resource endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub message: String,
}

/// Session-holding HTTP transport bound to one `{host}/{database}` base URL.
///
/// The cookie jar carries the authenticated session established by the login
/// handshake; every call reuses it.
#[derive(Debug)]
pub struct RestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl RestTransport {
    /// Build a transport with a fresh cookie jar.
    ///
    /// Certificate verification stays on unless the caller explicitly opted
    /// out in their settings.
    pub fn new(host: &str, database: &str, accept_invalid_certs: bool) -> DbResult<Self> {
        if accept_invalid_certs {
            warn!("TLS certificate verification disabled for {}", host);
        }

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| DbAccessError::Connection(format!("cannot build HTTP client: {}", e)))?;

        Ok(RestTransport {
            client,
            base_url: format!("{}/{}", host.trim_end_matches('/'), database),
        })
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    /// GET a resource. `Some(data)` on HTTP 200 with a successful envelope;
    /// every other outcome, transport failures included, is "no data".
    pub async fn get(&self, resource: &str) -> Option<Value> {
        let response = match self.client.get(self.url(resource)).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("GET {}: {}", resource, e);
                return None;
            }
        };
        if response.status() != StatusCode::OK {
            return None;
        }
        match response.json::<Envelope>().await {
            Ok(envelope) if envelope.success => Some(envelope.data),
            _ => None,
        }
    }

    /// GET a resource and report only the HTTP status. The session endpoints
    /// (`loggedin`, `logout`) answer with plain statuses, not the envelope.
    pub async fn get_status(&self, resource: &str) -> Result<StatusCode, reqwest::Error> {
        Ok(self.client.get(self.url(resource)).send().await?.status())
    }

    /// GET a resource body as raw JSON, outside the envelope contract.
    pub(super) async fn get_raw(&self, resource: &str) -> Result<Value, reqwest::Error> {
        self.client.get(self.url(resource)).send().await?.json().await
    }

    /// POST raw JSON and return the raw response body.
    pub(super) async fn post_raw<T>(&self, resource: &str, payload: &T) -> Result<Value, reqwest::Error>
    where
        T: Serialize + ?Sized,
    {
        self.client
            .post(self.url(resource))
            .json(payload)
            .send()
            .await?
            .json()
            .await
    }

    /// POST a new record. Data on HTTP 201 with a successful envelope,
    /// `Request` carrying the server message otherwise.
    pub async fn post<T>(&self, resource: &str, payload: &T) -> DbResult<Value>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(self.url(resource))
            .json(payload)
            .send()
            .await?;
        Self::mutation_result(resource, response, StatusCode::CREATED).await
    }

    /// POST with no body (procedure-style endpoints).
    pub async fn post_empty(&self, resource: &str) -> DbResult<Value> {
        let response = self.client.post(self.url(resource)).send().await?;
        Self::mutation_result(resource, response, StatusCode::CREATED).await
    }

    /// PATCH one record by id. Data on HTTP 200 with a successful envelope,
    /// `Request` carrying the server message otherwise.
    pub async fn patch<T>(&self, resource: &str, id: &str, payload: &T) -> DbResult<Value>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .client
            .patch(self.url(&format!("{}/{}", resource, id)))
            .json(payload)
            .send()
            .await?;
        Self::mutation_result(resource, response, StatusCode::OK).await
    }

    /// PATCH with no body (procedure-style endpoints).
    pub async fn patch_empty(&self, resource: &str, id: &str) -> DbResult<Value> {
        let response = self
            .client
            .patch(self.url(&format!("{}/{}", resource, id)))
            .send()
            .await?;
        Self::mutation_result(resource, response, StatusCode::OK).await
    }

    async fn mutation_result(
        resource: &str,
        response: reqwest::Response,
        expected: StatusCode,
    ) -> DbResult<Value> {
        let status = response.status();
        let envelope: Envelope = response.json().await.map_err(|e| {
            DbAccessError::Request(format!(
                "{}: unreadable response (HTTP {}): {}",
                resource, status, e
            ))
        })?;
        if status == expected && envelope.success {
            Ok(envelope.data)
        } else {
            Err(DbAccessError::Request(envelope.message))
        }
    }
}

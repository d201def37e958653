//! Access layer for the test result webapp.
//!
//! Persists structured test-execution records (results, files, headers, test
//! cases, tags, abort reasons, resource-usage samples) through one of two
//! interchangeable strategies: the webapp's REST API behind a corporate SSO
//! login, or a direct database connection. Callers pick a strategy with
//! [`access::create`], connect, write their records, and disconnect; nothing
//! outside the factory names a concrete backend.

pub mod access;
pub mod config;
pub mod error;
pub mod models;

pub use access::{DbAccess, create};
pub use config::{AccessMode, ConnectSettings};
pub use error::{DbAccessError, DbResult};

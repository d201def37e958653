//! Connection settings and access-mode selection.

use secrecy::SecretString;

/// Backend selection tag.
///
/// Parsed with an exact match: the webapp's import tools pass the tag through
/// verbatim from their configuration, and a tag they never wrote must fail
/// loudly rather than fall back to a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Direct database connection
    Db,
    /// REST API client
    Rest,
}

impl AccessMode {
    /// Parse an access-mode tag. Exact match only.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "db" => Some(Self::Db),
            "rest" => Some(Self::Rest),
            _ => None,
        }
    }

    /// String representation, identical to the accepted tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Db => "db",
            Self::Rest => "rest",
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters for `DbAccess::connect`.
///
/// For the REST backend `host` is the webapp base URL and `database` the
/// schema segment appended to it; for the direct backend they name the
/// database server and schema.
#[derive(Debug, Clone)]
pub struct ConnectSettings {
    /// Webapp base URL or database server address
    pub host: String,
    /// Account used for authentication
    pub user: String,
    /// Password; encrypted with the server's public key before it goes on
    /// the wire (REST), or passed to the driver (direct)
    pub password: SecretString,
    /// Database / schema name
    pub database: String,
    /// Disable TLS certificate verification (REST only). Off by default;
    /// enabling it is an explicit decision of the deployment, never a
    /// silent fallback.
    pub accept_invalid_certs: bool,
}

impl ConnectSettings {
    /// Settings with certificate verification enabled.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        ConnectSettings {
            host: host.into(),
            user: user.into(),
            password: SecretString::from(password.into()),
            database: database.into(),
            accept_invalid_certs: false,
        }
    }
}

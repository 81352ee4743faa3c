//! Log record models
//!
//! Both record kinds are create-only: they are produced by the line parsers,
//! appended to the store in batches and never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two independent kinds of records the collector persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Web-server access log lines (`nginx_logs`)
    WebAccess,
    /// Authentication log lines (`ssh_logs`)
    Auth,
}

impl RecordKind {
    /// Table holding records of this kind
    pub fn table(self) -> &'static str {
        match self {
            RecordKind::WebAccess => "nginx_logs",
            RecordKind::Auth => "ssh_logs",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::WebAccess => "web_access",
            RecordKind::Auth => "auth",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed line of the web-server access log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAccessRecord {
    pub remote_addr: String,
    pub method: String,
    pub path: String,
    pub status_code: i32,
    /// Original line, trailing whitespace removed
    pub raw: String,
}

/// Outcome of an authentication attempt, classified from the line text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthAction {
    Accepted,
    Failed,
    Unknown,
}

impl AuthAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthAction::Accepted => "accepted",
            AuthAction::Failed => "failed",
            AuthAction::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed line of the authentication log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub user: Option<String>,
    pub ip_address: Option<String>,
    pub action: AuthAction,
    /// Original line, trailing whitespace removed
    pub raw: String,
}

/// A record as held by the store, with its surrogate id and insert time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord<T> {
    pub id: i64,
    #[serde(flatten)]
    pub record: T,
    pub created_at: DateTime<Utc>,
}

/// Records of a single kind, appended to the store as one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBatch {
    WebAccess(Vec<WebAccessRecord>),
    Auth(Vec<AuthRecord>),
}

impl RecordBatch {
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordBatch::WebAccess(_) => RecordKind::WebAccess,
            RecordBatch::Auth(_) => RecordKind::Auth,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordBatch::WebAccess(records) => records.len(),
            RecordBatch::Auth(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<WebAccessRecord>> for RecordBatch {
    fn from(records: Vec<WebAccessRecord>) -> Self {
        RecordBatch::WebAccess(records)
    }
}

impl From<Vec<AuthRecord>> for RecordBatch {
    fn from(records: Vec<AuthRecord>) -> Self {
        RecordBatch::Auth(records)
    }
}

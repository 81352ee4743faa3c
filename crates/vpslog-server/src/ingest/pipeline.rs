//! Ingestion pass
//!
//! One pass reads each log file from the start, parses it line by line and
//! appends everything that parsed as a single batch per source. There is no
//! offset tracking: running a pass twice over the same file stores every
//! record twice.

use serde::Serialize;
use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use super::parser::{AuthParser, LineParser, WebAccessParser};
use crate::config::IngestConfig;
use crate::models::RecordKind;
use crate::store::{RecordStore, SharedStore, StoreError};

/// Failures that abort ingestion of one source
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to store {kind} records: {source}")]
    Store {
        kind: RecordKind,
        #[source]
        source: StoreError,
    },
}

/// Outcome of ingesting one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub kind: RecordKind,
    pub path: PathBuf,
    /// The file did not exist, nothing was read
    pub missing: bool,
    pub lines_read: u64,
    pub lines_skipped: u64,
    pub records_stored: u64,
}

impl SourceStats {
    fn new(kind: RecordKind, path: &Path) -> Self {
        Self {
            kind,
            path: path.to_path_buf(),
            missing: false,
            lines_read: 0,
            lines_skipped: 0,
            records_stored: 0,
        }
    }
}

/// Outcome of a full pass over both sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub web_access: SourceStats,
    pub auth: SourceStats,
}

impl PassSummary {
    pub fn records_stored(&self) -> u64 {
        self.web_access.records_stored + self.auth.records_stored
    }
}

/// Decode one line, replacing invalid UTF-8 and dropping NUL bytes
///
/// Postgres text columns cannot hold NUL, and auth logs pick them up after an
/// unclean shutdown.
fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    let line = String::from_utf8_lossy(bytes);
    if line.contains('\0') {
        Cow::Owned(line.replace('\0', ""))
    } else {
        line
    }
}

/// Ingest one log file into the store
///
/// A missing file is logged and reported through [`SourceStats::missing`],
/// not as an error. Lines end at `\n`, `\r\n` or a bare `\r`. Bytes that are
/// not valid UTF-8 are replaced rather than failing the read.
pub async fn ingest_source<P>(
    store: &dyn RecordStore,
    path: &Path,
    parser: &P,
) -> Result<SourceStats, IngestError>
where
    P: LineParser,
{
    let kind = parser.kind();
    let mut stats = SourceStats::new(kind, path);

    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(kind = %kind, path = %path.display(), "Log file not found, skipping");
            stats.missing = true;
            return Ok(stats);
        },
        Err(source) => {
            return Err(IngestError::Read {
                path: path.to_path_buf(),
                source,
            })
        },
    };

    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut records = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }

        let chunk = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let chunk = chunk.strip_suffix(b"\r").unwrap_or(chunk);
        // A bare carriage return also ends a line
        for raw in chunk.split(|&b| b == b'\r') {
            stats.lines_read += 1;
            match parser.parse_line(&decode_line(raw)) {
                Some(record) => records.push(record),
                None => stats.lines_skipped += 1,
            }
        }
    }
    drop(reader);

    stats.records_stored = store
        .append(parser.into_batch(records))
        .await
        .map_err(|source| IngestError::Store { kind, source })?;

    info!(
        kind = %kind,
        path = %path.display(),
        lines_read = stats.lines_read,
        lines_skipped = stats.lines_skipped,
        records_stored = stats.records_stored,
        "Source ingested"
    );

    Ok(stats)
}

/// A complete read-parse-persist cycle over both log sources
pub struct IngestionPass {
    store: SharedStore,
    sources: IngestConfig,
}

impl IngestionPass {
    pub fn new(store: SharedStore, sources: IngestConfig) -> Self {
        Self { store, sources }
    }

    pub fn sources(&self) -> &IngestConfig {
        &self.sources
    }

    /// Ingest the web-access log, then the auth log
    ///
    /// A failing source does not stop the other one from running. If either
    /// failed, the first failure is returned once both have been attempted.
    pub async fn run(&self) -> Result<PassSummary, IngestError> {
        info!("Starting log ingestion");

        let web_access =
            ingest_source(&*self.store, &self.sources.nginx_log_path, &WebAccessParser).await;
        if let Err(ref e) = web_access {
            error!(error = %e, "Web access log ingestion failed");
        }

        let auth = ingest_source(&*self.store, &self.sources.ssh_log_path, &AuthParser).await;
        if let Err(ref e) = auth {
            error!(error = %e, "Auth log ingestion failed");
        }

        let outcome = match (web_access, auth) {
            (Ok(web_access), Ok(auth)) => Ok(PassSummary { web_access, auth }),
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
        };

        match outcome {
            Ok(ref summary) => info!(
                records_stored = summary.records_stored(),
                "Log ingestion finished"
            ),
            Err(_) => warn!("Log ingestion finished with errors"),
        }

        outcome
    }
}

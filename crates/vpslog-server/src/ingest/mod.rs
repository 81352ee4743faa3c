//! Log ingestion
//!
//! - **parser**: line parsers for the web-access and auth log formats
//! - **pipeline**: one read-parse-persist pass over both log files
//! - **coordinator**: admission control and mutual exclusion for passes
//! - **scheduler**: the periodic pass

pub mod coordinator;
pub mod parser;
pub mod pipeline;
pub mod scheduler;

pub use coordinator::{RunCoordinator, RunTrigger, TriggerError, INGEST_INTERVAL, MANUAL_COOLDOWN};
pub use parser::{AuthParser, LineParser, WebAccessParser};
pub use pipeline::{ingest_source, IngestError, IngestionPass, PassSummary, SourceStats};
pub use scheduler::IngestScheduler;

pub mod trigger;

pub use trigger::{TriggerIngestCommand, TriggerIngestResponse};

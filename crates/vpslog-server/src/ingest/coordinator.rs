//! Run coordinator
//!
//! Owns the single exclusive run lock and the time of the last admitted
//! manual trigger, and decides whether a requested ingestion pass runs.
//!
//! - **Manual** triggers fail fast: first the cooldown gate, then the lock
//!   gate. Neither gate waits or queues.
//! - **Scheduled** and **boot** runs skip the cooldown and wait for the lock.
//!
//! The pass itself runs in its own task that owns the lock guard, so once a
//! pass has started it always runs to completion and always releases the
//! lock, even if the caller stops waiting or the pass fails.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{info, info_span, Instrument};

use super::pipeline::{IngestError, IngestionPass, PassSummary};

/// Interval between scheduled passes
pub const INGEST_INTERVAL: Duration = Duration::from_secs(60 * 60 * 24);

/// Minimum time between two admitted manual triggers
pub const MANUAL_COOLDOWN: Duration = Duration::from_secs(60);

/// Why a run was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTrigger {
    Boot,
    Scheduled,
    Manual,
}

impl fmt::Display for RunTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunTrigger::Boot => "boot",
            RunTrigger::Scheduled => "scheduled",
            RunTrigger::Manual => "manual",
        })
    }
}

/// A requested run that was rejected or did not complete
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Ingest cooldown active ({}s)", MANUAL_COOLDOWN.as_secs())]
    CooldownActive { remaining: Duration },

    #[error("Ingest already running")]
    AlreadyRunning,

    #[error("Ingestion pass failed: {0}")]
    Failed(#[from] IngestError),

    #[error("Ingestion pass aborted: {0}")]
    Aborted(String),
}

/// Process-wide run state
#[derive(Default)]
struct RunState {
    locked: AtomicBool,
    last_manual_trigger: Mutex<Option<Instant>>,
}

impl RunState {
    fn last_manual_trigger(&self) -> Option<Instant> {
        *self
            .last_manual_trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held for the whole pass; dropping it returns the coordinator to idle
struct RunPermit {
    _guard: OwnedMutexGuard<()>,
    state: Arc<RunState>,
}

impl RunPermit {
    fn new(guard: OwnedMutexGuard<()>, state: Arc<RunState>) -> Self {
        state.locked.store(true, Ordering::SeqCst);
        Self {
            _guard: guard,
            state,
        }
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.state.locked.store(false, Ordering::SeqCst);
    }
}

/// Admits or rejects ingestion passes and serializes the admitted ones
pub struct RunCoordinator {
    pass: Arc<IngestionPass>,
    run_lock: Arc<AsyncMutex<()>>,
    state: Arc<RunState>,
    cooldown: Duration,
}

impl RunCoordinator {
    pub fn new(pass: IngestionPass) -> Self {
        Self {
            pass: Arc::new(pass),
            run_lock: Arc::new(AsyncMutex::new(())),
            state: Arc::new(RunState::default()),
            cooldown: MANUAL_COOLDOWN,
        }
    }

    /// Whether a pass currently holds the run lock
    pub fn is_running(&self) -> bool {
        self.state.locked.load(Ordering::SeqCst)
    }

    /// When the last manual trigger was admitted, if ever
    pub fn last_manual_trigger(&self) -> Option<Instant> {
        self.state.last_manual_trigger()
    }

    /// Time left before another manual trigger can be admitted
    fn cooldown_remaining(&self, last: Option<Instant>, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(last?);
        (elapsed < self.cooldown).then(|| self.cooldown - elapsed)
    }

    /// Operator-requested pass
    ///
    /// Rejected with [`TriggerError::CooldownActive`] within the cooldown of
    /// the last admitted manual trigger, or with [`TriggerError::AlreadyRunning`]
    /// while any pass holds the lock. Otherwise runs a pass and waits for it.
    pub async fn trigger_manual(&self) -> Result<PassSummary, TriggerError> {
        let now = Instant::now();
        if let Some(remaining) = self.cooldown_remaining(self.state.last_manual_trigger(), now) {
            return Err(TriggerError::CooldownActive { remaining });
        }

        let guard = Arc::clone(&self.run_lock)
            .try_lock_owned()
            .map_err(|_| TriggerError::AlreadyRunning)?;

        {
            // Checked again under the run lock: another manual trigger may
            // have been admitted since the first check.
            let mut last = self
                .state
                .last_manual_trigger
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(remaining) = self.cooldown_remaining(*last, now) {
                return Err(TriggerError::CooldownActive { remaining });
            }
            *last = Some(now);
        }

        self.execute(guard, RunTrigger::Manual).await
    }

    /// Timer-driven pass; waits for any running pass instead of failing
    pub async fn run_scheduled(&self) -> Result<PassSummary, TriggerError> {
        let guard = Arc::clone(&self.run_lock).lock_owned().await;
        self.execute(guard, RunTrigger::Scheduled).await
    }

    /// The pass run once at startup, before the scheduler starts
    pub async fn run_on_boot(&self) -> Result<PassSummary, TriggerError> {
        let guard = Arc::clone(&self.run_lock).lock_owned().await;
        self.execute(guard, RunTrigger::Boot).await
    }

    async fn execute(
        &self,
        guard: OwnedMutexGuard<()>,
        trigger: RunTrigger,
    ) -> Result<PassSummary, TriggerError> {
        let permit = RunPermit::new(guard, Arc::clone(&self.state));
        let pass = Arc::clone(&self.pass);
        let span = info_span!("ingestion_pass", trigger = %trigger);

        let handle = tokio::spawn(
            async move {
                let _permit = permit;
                pass.run().await
            }
            .instrument(span),
        );

        match handle.await {
            Ok(result) => {
                let summary = result?;
                info!(
                    trigger = %trigger,
                    records_stored = summary.records_stored(),
                    "Ingestion pass completed"
                );
                Ok(summary)
            },
            Err(e) => Err(TriggerError::Aborted(e.to_string())),
        }
    }
}

#[cfg(test)]
impl RunCoordinator {
    fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

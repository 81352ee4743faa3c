//! In-process record store

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{AuthRecord, RecordBatch, RecordKind, StoredRecord, WebAccessRecord};

#[derive(Default)]
struct Tables {
    next_id: i64,
    web_access: Vec<StoredRecord<WebAccessRecord>>,
    auth: Vec<StoredRecord<AuthRecord>>,
    failing: HashSet<RecordKind>,
}

impl Tables {
    fn stamp<T>(&mut self, record: T) -> StoredRecord<T> {
        self.next_id += 1;
        StoredRecord {
            id: self.next_id,
            record,
            created_at: Utc::now(),
        }
    }
}

/// Record store that keeps everything in memory
///
/// Appends can be made to fail per record kind with [`fail_appends`], which
/// lets callers exercise the write-failure paths.
///
/// [`fail_appends`]: MemoryRecordStore::fail_appends
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: Mutex<Tables>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following append of `kind` fail (or succeed again)
    pub fn fail_appends(&self, kind: RecordKind, fail: bool) {
        let mut tables = self.tables();
        if fail {
            tables.failing.insert(kind);
        } else {
            tables.failing.remove(&kind);
        }
    }

    pub fn web_access_records(&self) -> Vec<StoredRecord<WebAccessRecord>> {
        self.tables().web_access.clone()
    }

    pub fn auth_records(&self) -> Vec<StoredRecord<AuthRecord>> {
        self.tables().auth.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn initialize(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn append(&self, batch: RecordBatch) -> StoreResult<u64> {
        let mut tables = self.tables();
        let kind = batch.kind();
        if tables.failing.contains(&kind) {
            return Err(StoreError::Unavailable(format!("appends to {} disabled", kind.table())));
        }

        let written = batch.len() as u64;
        match batch {
            RecordBatch::WebAccess(records) => {
                for record in records {
                    let stored = tables.stamp(record);
                    tables.web_access.push(stored);
                }
            },
            RecordBatch::Auth(records) => {
                for record in records {
                    let stored = tables.stamp(record);
                    tables.auth.push(stored);
                }
            },
        }
        Ok(written)
    }

    async fn count(&self, kind: RecordKind) -> StoreResult<i64> {
        let tables = self.tables();
        let count = match kind {
            RecordKind::WebAccess => tables.web_access.len(),
            RecordKind::Auth => tables.auth.len(),
        };
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthAction;

    fn auth(raw: &str) -> AuthRecord {
        AuthRecord {
            user: None,
            ip_address: None,
            action: AuthAction::Unknown,
            raw: raw.to_string(),
        }
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let store = MemoryRecordStore::new();
        store
            .append(vec![auth("one"), auth("two")].into())
            .await
            .unwrap();

        let stored = store.auth_records();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].id < stored[1].id);
        assert_eq!(store.count(RecordKind::Auth).await.unwrap(), 2);
        assert_eq!(store.count(RecordKind::WebAccess).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_append_writes_nothing() {
        let store = MemoryRecordStore::new();
        store.fail_appends(RecordKind::Auth, true);

        let result = store.append(vec![auth("one")].into()).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.count(RecordKind::Auth).await.unwrap(), 0);

        store.fail_appends(RecordKind::Auth, false);
        store.append(vec![auth("one")].into()).await.unwrap();
        assert_eq!(store.count(RecordKind::Auth).await.unwrap(), 1);
    }
}

//! Count records query

use serde::{Deserialize, Serialize};

use crate::models::RecordKind;
use crate::store::{RecordStore, StoreError};

/// Query for the number of stored records of one kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountRecordsQuery {
    pub kind: RecordKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountRecordsResponse {
    pub count: i64,
}

#[tracing::instrument(skip(store), fields(kind = %query.kind))]
pub async fn handle(
    store: &dyn RecordStore,
    query: CountRecordsQuery,
) -> Result<CountRecordsResponse, StoreError> {
    let count = store.count(query.kind).await?;
    tracing::debug!(count, "Records counted");
    Ok(CountRecordsResponse { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthAction, AuthRecord};
    use crate::store::MemoryRecordStore;

    #[tokio::test]
    async fn test_count_per_kind() {
        let store = MemoryRecordStore::new();
        store
            .append(
                vec![AuthRecord {
                    user: Some("root".to_string()),
                    ip_address: Some("10.0.0.9".to_string()),
                    action: AuthAction::Failed,
                    raw: "Failed password for root from 10.0.0.9".to_string(),
                }]
                .into(),
            )
            .await
            .unwrap();

        let auth = handle(&store, CountRecordsQuery { kind: RecordKind::Auth })
            .await
            .unwrap();
        let web = handle(
            &store,
            CountRecordsQuery {
                kind: RecordKind::WebAccess,
            },
        )
        .await
        .unwrap();

        assert_eq!(auth.count, 1);
        assert_eq!(web.count, 0);
    }
}

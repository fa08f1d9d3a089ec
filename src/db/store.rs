use std::sync::Arc;

use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;
use sqlx::{FromRow, Sqlite};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{init_pool, queries, DbPool};
use crate::models::{ContactInfo, WarningRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a warning from {nickname:?} sent at {sent} already exists")]
    DuplicateKey { nickname: String, sent: i64 },

    #[error("storage is unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("storage query failed: {0}")]
    Query(#[source] sqlx::Error),
}

#[derive(Debug, FromRow)]
struct WarningRow {
    sent: i64,
    nickname: String,
    latitude: f64,
    longitude: f64,
    dangertype: String,
    areacode: Option<String>,
    phonenumber: Option<String>,
    weather: Option<i64>,
}

impl From<WarningRow> for WarningRecord {
    fn from(row: WarningRow) -> Self {
        let contact = match (row.areacode, row.phonenumber) {
            (Some(area_code), Some(phone_number)) => Some(ContactInfo {
                area_code,
                phone_number,
            }),
            _ => None,
        };

        WarningRecord {
            sent_at: row.sent,
            reporter_id: row.nickname,
            latitude: row.latitude,
            longitude: row.longitude,
            hazard_type: row.dangertype,
            contact,
            weather: row.weather.and_then(|w| i32::try_from(w).ok()),
        }
    }
}

/// Durable home of every accepted warning.
///
/// Cheap to clone; clones share the pool and the write lock. Inserts and the
/// emptiness check ahead of each read run under the write lock.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Opens (creating if needed) the database at `database_url` and prepares the schema.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = init_pool(database_url, max_connections).await?;
        info!("Warning store ready at {}", database_url);
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Warning store closed");
    }

    /// Persists `warning`. Fails with [`StoreError::DuplicateKey`] when a warning
    /// with the same `(sent, nickname)` already exists.
    pub async fn insert(&self, warning: &WarningRecord) -> Result<(), StoreError> {
        self.ensure_open()?;
        let _guard = self.write_lock.lock().await;

        let contact = warning.contact.as_ref();
        sqlx::query(queries::INSERT_WARNING)
            .bind(warning.sent_at)
            .bind(&warning.reporter_id)
            .bind(warning.latitude)
            .bind(warning.longitude)
            .bind(&warning.hazard_type)
            .bind(contact.map(|c| c.area_code.as_str()))
            .bind(contact.map(|c| c.phone_number.as_str()))
            .bind(warning.weather)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if is_key_violation(&**db) => {
                    StoreError::DuplicateKey {
                        nickname: warning.reporter_id.clone(),
                        sent: warning.sent_at,
                    }
                }
                other => storage_error(other),
            })?;

        debug!(
            nickname = %warning.reporter_id,
            sent = warning.sent_at,
            "warning inserted"
        );
        Ok(())
    }

    /// Every warning, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<WarningRecord>, StoreError> {
        if self.is_empty().await? {
            return Ok(Vec::new());
        }
        self.fetch(sqlx::query_as(queries::SELECT_ALL_WARNINGS))
            .await
    }

    /// Every warning sent under `nickname`, in insertion order.
    pub async fn query_by_user(&self, nickname: &str) -> Result<Vec<WarningRecord>, StoreError> {
        if self.is_empty().await? {
            return Ok(Vec::new());
        }
        self.fetch(sqlx::query_as(queries::SELECT_WARNINGS_BY_NICKNAME).bind(nickname))
            .await
    }

    /// Every warning with `start <= sent <= end` (epoch milliseconds), in insertion order.
    /// An inverted range simply matches nothing.
    pub async fn query_by_time_range(
        &self,
        start: i64,
        end: i64,
    ) -> Result<Vec<WarningRecord>, StoreError> {
        if self.is_empty().await? {
            return Ok(Vec::new());
        }
        self.fetch(
            sqlx::query_as(queries::SELECT_WARNINGS_BY_TIME_RANGE)
                .bind(start)
                .bind(end),
        )
        .await
    }

    async fn is_empty(&self) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let _guard = self.write_lock.lock().await;

        let found: i64 = sqlx::query_scalar(queries::ANY_WARNING)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(found == 0)
    }

    async fn fetch<'q>(
        &self,
        query: QueryAs<'q, Sqlite, WarningRow, SqliteArguments<'q>>,
    ) -> Result<Vec<WarningRecord>, StoreError> {
        let rows = query.fetch_all(&self.pool).await.map_err(storage_error)?;
        Ok(rows.into_iter().map(WarningRecord::from).collect())
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.pool.is_closed() {
            return Err(StoreError::Unavailable(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

fn is_key_violation(err: &dyn sqlx::error::DatabaseError) -> bool {
    // SQLITE_CONSTRAINT_PRIMARYKEY (1555) and SQLITE_CONSTRAINT_UNIQUE (2067)
    err.is_unique_violation() || matches!(err.code().as_deref(), Some("1555") | Some("2067"))
}

fn storage_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err)
        }
        other => StoreError::Query(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        Store::connect("sqlite::memory:", 1).await.unwrap()
    }

    fn warning(nickname: &str, sent_at: i64) -> WarningRecord {
        WarningRecord {
            sent_at,
            reporter_id: nickname.to_string(),
            latitude: 65.01,
            longitude: 25.47,
            hazard_type: "reindeer".to_string(),
            contact: None,
            weather: None,
        }
    }

    #[tokio::test]
    async fn test_empty_store_reads_return_empty() {
        let store = memory_store().await;
        assert!(store.list_all().await.unwrap().is_empty());
        assert!(store.query_by_user("alice").await.unwrap().is_empty());
        assert!(store.query_by_time_range(0, i64::MAX).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_keeps_insertion_order() {
        let store = memory_store().await;
        store.insert(&warning("carol", 3_000)).await.unwrap();
        store.insert(&warning("alice", 1_000)).await.unwrap();
        store.insert(&warning("bob", 2_000)).await.unwrap();

        let nicknames: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.reporter_id)
            .collect();
        assert_eq!(nicknames, vec!["carol", "alice", "bob"]);
    }

    #[tokio::test]
    async fn test_optional_fields_survive_round_trip() {
        let store = memory_store().await;
        let mut full = warning("alice", 1_000);
        full.contact = Some(ContactInfo {
            area_code: "358".to_string(),
            phone_number: "0401234567".to_string(),
        });
        full.weather = Some(-12);
        store.insert(&full).await.unwrap();
        store.insert(&warning("bob", 1_000)).await.unwrap();

        let stored = store.list_all().await.unwrap();
        assert_eq!(stored[0], full);
        assert_eq!(stored[1].contact, None);
        assert_eq!(stored[1].weather, None);
    }

    #[tokio::test]
    async fn test_duplicate_key_is_rejected_without_touching_first() {
        let store = memory_store().await;
        let first = warning("alice", 1_000);
        store.insert(&first).await.unwrap();

        let mut second = warning("alice", 1_000);
        second.hazard_type = "moose".to_string();
        let err = store.insert(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { sent: 1_000, .. }));

        assert_eq!(store.list_all().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn test_same_nickname_different_time_is_allowed() {
        let store = memory_store().await;
        store.insert(&warning("alice", 1_000)).await.unwrap();
        store.insert(&warning("alice", 1_001)).await.unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_query_by_user() {
        let store = memory_store().await;
        store.insert(&warning("alice", 1_000)).await.unwrap();
        store.insert(&warning("bob", 2_000)).await.unwrap();
        store.insert(&warning("alice", 3_000)).await.unwrap();

        let alice = store.query_by_user("alice").await.unwrap();
        assert_eq!(
            alice.iter().map(|w| w.sent_at).collect::<Vec<_>>(),
            vec![1_000, 3_000]
        );
        assert!(store.query_by_user("dave").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_time_range_is_inclusive() {
        let store = memory_store().await;
        for sent in [1_000, 2_000, 3_000, 4_000] {
            store.insert(&warning("alice", sent)).await.unwrap();
        }

        let hits = store.query_by_time_range(2_000, 3_000).await.unwrap();
        assert_eq!(
            hits.iter().map(|w| w.sent_at).collect::<Vec<_>>(),
            vec![2_000, 3_000]
        );
        assert!(store.query_by_time_range(3_000, 2_000).await.unwrap().is_empty());
        assert!(store.query_by_time_range(5_000, 6_000).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let store = memory_store().await;
        store.close().await;

        let err = store.insert(&warning("alice", 1_000)).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(matches!(
            store.list_all().await.unwrap_err(),
            StoreError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_inserts_keep_one_row() {
        let store = memory_store().await;
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.insert(&warning("alice", 1_000)).await.is_ok()
            }));
        }

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }
}

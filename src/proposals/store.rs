//! SQLite persistence for proposals.

use super::model::{
    local_now, Category, Priority, Proposal, ProposalFields, ProposalPatch, Status,
    TIMESTAMP_FORMAT,
};
use crate::error::InputError;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use thiserror::Error;
use time::PrimitiveDateTime;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cannot prepare database location: {0}")]
    Io(#[from] std::io::Error),

    #[error("proposal {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Invalid(#[from] InputError),

    #[error("proposal {id} has unreadable {reason}")]
    Corrupt { id: i64, reason: String },

    #[error("unreadable {0} in proposal table")]
    Unreadable(String),

    #[error("cannot format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS proposals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    category TEXT NOT NULL,
    status TEXT NOT NULL,
    author TEXT NOT NULL,
    department TEXT NOT NULL,
    priority INTEGER NOT NULL,
    created_date TEXT NOT NULL,
    expected_benefit TEXT,
    estimated_cost REAL,
    implementation_time TEXT,
    risks TEXT
)";

const COLUMNS: &str = "id, title, description, category, status, author, department, priority, \
     created_date, expected_benefit, estimated_cost, implementation_time, risks";

/// Optional filters for [`ProposalStore::list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ListFilter {
    pub status: Option<Status>,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket<T> {
    pub key: T,
    pub count: i64,
    pub cost: f64,
}

impl<T> Bucket<T> {
    /// Share of `total` in percent; 0 for an empty store.
    pub fn share(&self, total: i64) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.count as f64 * 100.0 / total as f64
        }
    }
}

/// Aggregates over the whole table. Every enum variant gets a bucket, in
/// declaration order, even when its count is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total: i64,
    pub by_status: Vec<Bucket<Status>>,
    pub by_category: Vec<Bucket<Category>>,
    pub by_priority: Vec<Bucket<Priority>>,
    /// Sum of estimated costs, rejected proposals excluded.
    pub total_cost: f64,
}

pub struct ProposalStore {
    pool: SqlitePool,
}

impl ProposalStore {
    /// Open (or create) the database and seed the sample proposals into an empty table.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let store = Self::open_unseeded(path).await?;
        if store.count().await? == 0 {
            store.seed().await?;
        }
        Ok(store)
    }

    pub async fn open_unseeded(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let pool = SqlitePool::connect_with(
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
        )
        .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        tracing::debug!(path = %path.display(), "proposal store opened");
        Ok(Self { pool })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM proposals")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn seed(&self) -> Result<(), StoreError> {
        for fields in sample_proposals() {
            self.add(fields).await?;
        }
        tracing::info!("seeded sample proposals");
        Ok(())
    }

    pub async fn add(&self, fields: ProposalFields) -> Result<Proposal, StoreError> {
        let fields = fields.validated()?;
        let created_date = local_now();
        let created = format_timestamp(created_date)?;

        let result = sqlx::query(
            "INSERT INTO proposals (title, description, category, status, author, department, \
             priority, created_date, expected_benefit, estimated_cost, implementation_time, risks) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.category.key())
        .bind(fields.status.key())
        .bind(&fields.author)
        .bind(&fields.department)
        .bind(i64::from(fields.priority.level()))
        .bind(created)
        .bind(&fields.expected_benefit)
        .bind(fields.estimated_cost)
        .bind(&fields.implementation_time)
        .bind(&fields.risks)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, title = %fields.title, "proposal added");
        Ok(Proposal {
            id,
            created_date,
            fields,
        })
    }

    /// Apply `patch` to the stored proposal. `created_date` is kept.
    pub async fn update(&self, id: i64, patch: ProposalPatch) -> Result<Proposal, StoreError> {
        let current = self.get(id).await?.ok_or(StoreError::NotFound(id))?;
        let fields = patch.apply(current.fields).validated()?;

        let result = sqlx::query(
            "UPDATE proposals SET title = ?, description = ?, category = ?, status = ?, \
             author = ?, department = ?, priority = ?, expected_benefit = ?, \
             estimated_cost = ?, implementation_time = ?, risks = ? WHERE id = ?",
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.category.key())
        .bind(fields.status.key())
        .bind(&fields.author)
        .bind(&fields.department)
        .bind(i64::from(fields.priority.level()))
        .bind(&fields.expected_benefit)
        .bind(fields.estimated_cost)
        .bind(&fields.implementation_time)
        .bind(&fields.risks)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!(id, "proposal updated");
        Ok(Proposal {
            id,
            created_date: current.created_date,
            fields,
        })
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!(id, "proposal deleted");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Proposal>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM proposals WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(decode_row).transpose()
    }

    /// Ordered by priority, then newest first.
    pub async fn list(&self, filter: ListFilter) -> Result<Vec<Proposal>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM proposals \
             WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR category = ?2) \
             ORDER BY priority, created_date DESC, id DESC"
        ))
        .bind(filter.status.map(Status::key))
        .bind(filter.category.map(Category::key))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(decode_row).collect()
    }

    pub async fn statistics(&self) -> Result<Statistics, StoreError> {
        let total = self.count().await?;

        let mut by_status: Vec<Bucket<Status>> = Status::ALL
            .into_iter()
            .map(|key| Bucket {
                key,
                count: 0,
                cost: 0.0,
            })
            .collect();
        for row in self.grouped("status").await? {
            let key: String = row.try_get("key")?;
            let status = Status::from_key(&key)
                .ok_or_else(|| StoreError::Unreadable(format!("status '{key}'")))?;
            if let Some(bucket) = by_status.iter_mut().find(|b| b.key == status) {
                bucket.count = row.try_get("count")?;
                bucket.cost = row.try_get("cost")?;
            }
        }

        let mut by_category: Vec<Bucket<Category>> = Category::ALL
            .into_iter()
            .map(|key| Bucket {
                key,
                count: 0,
                cost: 0.0,
            })
            .collect();
        for row in self.grouped("category").await? {
            let key: String = row.try_get("key")?;
            let category = Category::from_key(&key)
                .ok_or_else(|| StoreError::Unreadable(format!("category '{key}'")))?;
            if let Some(bucket) = by_category.iter_mut().find(|b| b.key == category) {
                bucket.count = row.try_get("count")?;
                bucket.cost = row.try_get("cost")?;
            }
        }

        let mut by_priority: Vec<Bucket<Priority>> = Priority::ALL
            .into_iter()
            .map(|key| Bucket {
                key,
                count: 0,
                cost: 0.0,
            })
            .collect();
        for row in self.grouped("priority").await? {
            let level: i64 = row.try_get("key")?;
            let priority = Priority::from_level(level)
                .map_err(|_| StoreError::Unreadable(format!("priority {level}")))?;
            if let Some(bucket) = by_priority.iter_mut().find(|b| b.key == priority) {
                bucket.count = row.try_get("count")?;
                bucket.cost = row.try_get("cost")?;
            }
        }

        let row = sqlx::query(
            "SELECT COALESCE(SUM(estimated_cost), 0.0) AS cost FROM proposals WHERE status != ?",
        )
        .bind(Status::Rejected.key())
        .fetch_one(&self.pool)
        .await?;
        let total_cost: f64 = row.try_get("cost")?;

        Ok(Statistics {
            total,
            by_status,
            by_category,
            by_priority,
            total_cost,
        })
    }

    async fn grouped(&self, column: &'static str) -> Result<Vec<SqliteRow>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {column} AS key, COUNT(*) AS count, \
             COALESCE(SUM(estimated_cost), 0.0) AS cost \
             FROM proposals GROUP BY {column}"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn format_timestamp(dt: PrimitiveDateTime) -> Result<String, StoreError> {
    Ok(dt.format(TIMESTAMP_FORMAT)?)
}

fn decode_row(row: &SqliteRow) -> Result<Proposal, StoreError> {
    let id: i64 = row.try_get("id")?;
    let corrupt = |reason: String| StoreError::Corrupt { id, reason };

    let category: String = row.try_get("category")?;
    let status: String = row.try_get("status")?;
    let created: String = row.try_get("created_date")?;
    let priority: i64 = row.try_get("priority")?;

    let fields = ProposalFields {
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: Category::from_key(&category)
            .ok_or_else(|| corrupt(format!("category '{category}'")))?,
        status: Status::from_key(&status).ok_or_else(|| corrupt(format!("status '{status}'")))?,
        author: row.try_get("author")?,
        department: row.try_get("department")?,
        priority: Priority::from_level(priority)
            .map_err(|_| corrupt(format!("priority {priority}")))?,
        expected_benefit: row
            .try_get::<Option<String>, _>("expected_benefit")?
            .unwrap_or_default(),
        estimated_cost: row
            .try_get::<Option<f64>, _>("estimated_cost")?
            .unwrap_or_default(),
        implementation_time: row
            .try_get::<Option<String>, _>("implementation_time")?
            .unwrap_or_default(),
        risks: row.try_get::<Option<String>, _>("risks")?.unwrap_or_default(),
    };
    let created_date = PrimitiveDateTime::parse(&created, TIMESTAMP_FORMAT)
        .map_err(|e| corrupt(format!("created_date '{created}': {e}")))?;

    Ok(Proposal {
        id,
        created_date,
        fields,
    })
}

fn sample_proposals() -> Vec<ProposalFields> {
    vec![
        ProposalFields {
            title: "Analytics module".into(),
            description: "Build a module that analyses user data and visualises the results"
                .into(),
            category: Category::Functionality,
            status: Status::InProgress,
            author: "Ivanov A.I.".into(),
            department: "Analytics department".into(),
            priority: Priority::High,
            expected_benefit: "40% faster data analysis".into(),
            estimated_cost: 150_000.0,
            implementation_time: "3 months".into(),
            risks: "Staff need training".into(),
        },
        ProposalFields {
            title: "Migration to cloud infrastructure".into(),
            description: "Move the system to a cloud platform to improve scalability".into(),
            category: Category::Performance,
            status: Status::Approved,
            author: "Petrov S.V.".into(),
            department: "IT department".into(),
            priority: Priority::High,
            expected_benefit: "30% lower support costs".into(),
            estimated_cost: 250_000.0,
            implementation_time: "6 months".into(),
            risks: "Downtime during migration".into(),
        },
        ProposalFields {
            title: "CRM integration".into(),
            description: "Set up an integration with the CRM for automatic data exchange".into(),
            category: Category::Integration,
            status: Status::New,
            author: "Sidorova M.K.".into(),
            department: "Sales department".into(),
            priority: Priority::Medium,
            expected_benefit: "Automated sales processes".into(),
            estimated_cost: 80_000.0,
            implementation_time: "2 months".into(),
            risks: "API compatibility".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn seeded() -> (TempDir, ProposalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProposalStore::open(&dir.path().join("data/proposals.db"))
            .await
            .unwrap();
        (dir, store)
    }

    async fn empty() -> (TempDir, ProposalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProposalStore::open_unseeded(&dir.path().join("proposals.db"))
            .await
            .unwrap();
        (dir, store)
    }

    fn fields(title: &str, status: Status, cost: f64) -> ProposalFields {
        ProposalFields {
            title: title.into(),
            description: "desc".into(),
            author: "Ann".into(),
            department: "QA".into(),
            status,
            estimated_cost: cost,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn open_seeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proposals.db");
        let store = ProposalStore::open(&path).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3);
        store.close().await;

        let store = ProposalStore::open(&path).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn list_orders_by_priority_then_newest() {
        let (_dir, store) = seeded().await;
        let ids: Vec<i64> = store
            .list(ListFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_category() {
        let (_dir, store) = seeded().await;
        let approved = store
            .list(ListFilter {
                status: Some(Status::Approved),
                category: None,
            })
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].fields.category, Category::Performance);

        let none = store
            .list(ListFilter {
                status: Some(Status::New),
                category: Some(Category::Security),
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn add_get_round_trips_fields() {
        let (_dir, store) = empty().await;
        let added = store
            .add(fields("  Dark mode  ", Status::New, 12.5))
            .await
            .unwrap();
        assert_eq!(added.fields.title, "Dark mode");

        let loaded = store.get(added.id).await.unwrap().unwrap();
        assert_eq!(loaded, added);
        assert!(store.get(added.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_rejects_invalid_fields() {
        let (_dir, store) = empty().await;
        let err = store
            .add(fields(" ", Status::New, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(InputError::Empty { field: "title" })));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_keeps_created_date() {
        let (_dir, store) = empty().await;
        let added = store.add(fields("A", Status::New, 1.0)).await.unwrap();
        let updated = store
            .update(
                added.id,
                ProposalPatch {
                    status: Some(Status::Completed),
                    priority: Some(Priority::High),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.created_date, added.created_date);

        let loaded = store.get(added.id).await.unwrap().unwrap();
        assert_eq!(loaded.fields.status, Status::Completed);
        assert_eq!(loaded.fields.priority, Priority::High);
        assert_eq!(loaded.fields.title, "A");
    }

    #[tokio::test]
    async fn update_and_delete_unknown_id_fail() {
        let (_dir, store) = empty().await;
        assert!(matches!(
            store.update(42, ProposalPatch::default()).await,
            Err(StoreError::NotFound(42))
        ));
        assert!(matches!(store.delete(42).await, Err(StoreError::NotFound(42))));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let (_dir, store) = seeded().await;
        store.delete(1).await.unwrap();
        assert!(store.get(1).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn statistics_zero_fill_and_exclude_rejected_cost() {
        let (_dir, store) = empty().await;
        store.add(fields("a", Status::New, 100.0)).await.unwrap();
        store.add(fields("b", Status::New, 50.0)).await.unwrap();
        store.add(fields("c", Status::Rejected, 1000.0)).await.unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.total_cost, 150.0);
        assert_eq!(stats.by_status.len(), Status::ALL.len());

        let new = &stats.by_status[0];
        assert_eq!((new.key, new.count, new.cost), (Status::New, 2, 150.0));
        assert!((new.share(stats.total) - 66.666).abs() < 0.01);

        let rejected = stats
            .by_status
            .iter()
            .find(|b| b.key == Status::Rejected)
            .unwrap();
        assert_eq!(rejected.cost, 1000.0);

        let other = stats.by_category.last().unwrap();
        assert_eq!((other.key, other.count), (Category::Other, 3));
        assert_eq!(stats.by_priority[2].count, 3);
        assert_eq!(stats.by_priority[0].count, 0);
    }

    #[tokio::test]
    async fn unknown_stored_keys_are_reported() {
        let (_dir, store) = empty().await;
        let added = store.add(fields("a", Status::New, 1.0)).await.unwrap();
        sqlx::query("UPDATE proposals SET status = 'someday' WHERE id = ?")
            .bind(added.id)
            .execute(&store.pool)
            .await
            .unwrap();

        let err = store.get(added.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { id, .. } if id == added.id));

        let err = store.statistics().await.unwrap_err();
        assert!(matches!(&err, StoreError::Unreadable(what) if what == "status 'someday'"));
        assert_eq!(err.to_string(), "unreadable status 'someday' in proposal table");
    }

    #[tokio::test]
    async fn statistics_on_empty_store() {
        let (_dir, store) = empty().await;
        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.total_cost, 0.0);
        assert!(stats.by_status.iter().all(|b| b.count == 0));
        assert_eq!(stats.by_status[0].share(0), 0.0);
    }
}

use super::types::Draft;
use crate::error::{DraftError, SchemaIssue};
use crate::paper::Section;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use uuid::Uuid;

/// Result of an ownership-scoped update. `NoMatch` means zero records matched
/// the id + owner predicate; callers must be able to tell it apart from both
/// success and store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NoMatch,
}

/// Record operations over the drafts store. Every predicate is scoped by the
/// owner identity column.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn insert(
        &self,
        owner_id: &str,
        title: &str,
        sections: &[Section],
    ) -> Result<Draft, DraftError>;

    async fn update(
        &self,
        draft_id: &str,
        owner_id: &str,
        title: &str,
        sections: &[Section],
    ) -> Result<UpdateOutcome, DraftError>;

    async fn fetch(&self, draft_id: &str, owner_id: &str) -> Result<Option<Draft>, DraftError>;

    /// All drafts belonging to `owner_id`, newest first.
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Draft>, DraftError>;
}

/// `sqlx`-backed store over a local SQLite file.
pub struct SqliteDraftStore {
    pool: SqlitePool,
}

impl SqliteDraftStore {
    /// Open (creating if missing) a store at `path` and install the schema.
    pub async fn open(path: &Path) -> Result<Self, DraftError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(classify_store_error)?;
        let store = Self::attach(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Wrap an existing pool without touching the schema, for deployments
    /// that manage the schema themselves.
    pub fn attach(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), DraftError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS drafts (
                 id         TEXT PRIMARY KEY,
                 created_at TEXT NOT NULL,
                 title      TEXT NOT NULL,
                 content    TEXT NOT NULL,
                 owner_id   TEXT NOT NULL
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(classify_store_error)?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_drafts_owner_created
                 ON drafts(owner_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(classify_store_error)?;
        Ok(())
    }
}

#[async_trait]
impl DraftStore for SqliteDraftStore {
    async fn insert(
        &self,
        owner_id: &str,
        title: &str,
        sections: &[Section],
    ) -> Result<Draft, DraftError> {
        let draft = Draft {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            title: title.to_string(),
            sections: sections.to_vec(),
        };
        let content = encode_sections(&draft.sections)?;
        sqlx::query(
            "INSERT INTO drafts (id, created_at, title, content, owner_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&draft.id)
        .bind(encode_timestamp(draft.created_at))
        .bind(&draft.title)
        .bind(&content)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(classify_store_error)?;
        tracing::debug!(draft = %draft.id, "draft saved");
        Ok(draft)
    }

    async fn update(
        &self,
        draft_id: &str,
        owner_id: &str,
        title: &str,
        sections: &[Section],
    ) -> Result<UpdateOutcome, DraftError> {
        let content = encode_sections(sections)?;
        let result = sqlx::query(
            "UPDATE drafts SET title = ?1, content = ?2
                 WHERE id = ?3 AND owner_id = ?4",
        )
        .bind(title)
        .bind(&content)
        .bind(draft_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(classify_store_error)?;
        if result.rows_affected() == 0 {
            Ok(UpdateOutcome::NoMatch)
        } else {
            Ok(UpdateOutcome::Updated)
        }
    }

    async fn fetch(&self, draft_id: &str, owner_id: &str) -> Result<Option<Draft>, DraftError> {
        let row = sqlx::query(
            "SELECT id, created_at, title, content FROM drafts
                 WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(draft_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify_store_error)?;
        row.map(row_to_draft).transpose()
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Draft>, DraftError> {
        let rows = sqlx::query(
            "SELECT id, created_at, title, content FROM drafts
                 WHERE owner_id = ?1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_store_error)?;
        rows.into_iter().map(row_to_draft).collect()
    }
}

/// Map a store failure onto the schema taxonomy when the backend's message
/// makes the condition recognizable; everything else stays a generic store
/// error. Never swallowed.
fn classify_store_error(error: sqlx::Error) -> DraftError {
    if let sqlx::Error::Database(db) = &error {
        let message = db.message().to_ascii_lowercase();
        if message.contains("no such table") {
            tracing::warn!(%message, "drafts table missing");
            return DraftError::Schema(SchemaIssue::MissingDraftsTable);
        }
        if message.contains("no such column") || message.contains("has no column named") {
            tracing::warn!(%message, "drafts owner column missing");
            return DraftError::Schema(SchemaIssue::MissingOwnerColumn);
        }
    }
    DraftError::Store(error.to_string())
}

fn encode_sections(sections: &[Section]) -> Result<String, DraftError> {
    serde_json::to_string(sections).map_err(|error| DraftError::Encoding(error.to_string()))
}

/// Fixed-width RFC 3339 so lexicographic text ordering matches time order.
fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn row_to_draft(row: SqliteRow) -> Result<Draft, DraftError> {
    let id: String = row
        .try_get("id")
        .map_err(|error| DraftError::Store(error.to_string()))?;
    let created_raw: String = row
        .try_get("created_at")
        .map_err(|error| DraftError::Store(error.to_string()))?;
    let created_at = DateTime::parse_from_rfc3339(&created_raw)
        .map_err(|error| DraftError::Encoding(error.to_string()))?
        .with_timezone(&Utc);
    let title: String = row
        .try_get("title")
        .map_err(|error| DraftError::Store(error.to_string()))?;
    let content: String = row
        .try_get("content")
        .map_err(|error| DraftError::Store(error.to_string()))?;
    let sections: Vec<Section> =
        serde_json::from_str(&content).map_err(|error| DraftError::Encoding(error.to_string()))?;
    Ok(Draft {
        id,
        created_at,
        title,
        sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool")
    }

    async fn memory_store() -> SqliteDraftStore {
        let store = SqliteDraftStore::attach(memory_pool().await);
        store.init_schema().await.expect("schema");
        store
    }

    fn sample_sections() -> Vec<Section> {
        vec![
            Section::new("Intro")
                .with_content("- A\n- B")
                .with_citations(vec!["X".to_string()]),
            Section::new("Methods").with_content("- measured"),
        ]
    }

    #[tokio::test]
    async fn insert_then_fetch_round_trips_by_value() {
        let store = memory_store().await;
        let sections = sample_sections();
        let saved = store
            .insert("user-1", "My Paper", &sections)
            .await
            .expect("insert");

        let fetched = store
            .fetch(&saved.id, "user-1")
            .await
            .expect("fetch")
            .expect("present");
        assert_eq!(fetched.title, "My Paper");
        assert_eq!(fetched.sections, sections);
        assert_eq!(fetched.created_at, saved.created_at);
    }

    #[tokio::test]
    async fn fetch_is_owner_scoped() {
        let store = memory_store().await;
        let saved = store
            .insert("user-1", "Private", &sample_sections())
            .await
            .expect("insert");
        let other = store.fetch(&saved.id, "user-2").await.expect("fetch");
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn update_with_wrong_owner_reports_no_match() {
        let store = memory_store().await;
        let saved = store
            .insert("user-1", "Original", &sample_sections())
            .await
            .expect("insert");

        let outcome = store
            .update(&saved.id, "intruder", "Hijacked", &[])
            .await
            .expect("update call itself succeeds");
        assert_eq!(outcome, UpdateOutcome::NoMatch);

        // The record is untouched.
        let kept = store
            .fetch(&saved.id, "user-1")
            .await
            .expect("fetch")
            .expect("present");
        assert_eq!(kept.title, "Original");
    }

    #[tokio::test]
    async fn update_rewrites_title_and_snapshot() {
        let store = memory_store().await;
        let saved = store
            .insert("user-1", "Original", &sample_sections())
            .await
            .expect("insert");

        let new_sections = vec![Section::new("Only").with_content("- rewritten")];
        let outcome = store
            .update(&saved.id, "user-1", "Renamed", &new_sections)
            .await
            .expect("update");
        assert_eq!(outcome, UpdateOutcome::Updated);

        let fetched = store
            .fetch(&saved.id, "user-1")
            .await
            .expect("fetch")
            .expect("present");
        assert_eq!(fetched.title, "Renamed");
        assert_eq!(fetched.sections, new_sections);
    }

    #[tokio::test]
    async fn list_returns_newest_first_for_owner_only() {
        let store = memory_store().await;
        let first = store
            .insert("user-1", "Older", &[])
            .await
            .expect("insert");
        let second = store
            .insert("user-1", "Newer", &[])
            .await
            .expect("insert");
        store
            .insert("user-2", "Foreign", &[])
            .await
            .expect("insert");

        // Pin distinct timestamps; two inserts can share a millisecond.
        for (id, stamp) in [
            (&first.id, "2026-01-01T00:00:00.000Z"),
            (&second.id, "2026-02-01T00:00:00.000Z"),
        ] {
            sqlx::query("UPDATE drafts SET created_at = ?1 WHERE id = ?2")
                .bind(stamp)
                .bind(id)
                .execute(&store.pool)
                .await
                .expect("pin timestamp");
        }

        let listed = store.list_for_owner("user-1").await.expect("list");
        let titles: Vec<&str> = listed.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn missing_table_is_classified_with_remediation() {
        let store = SqliteDraftStore::attach(memory_pool().await);
        let err = store
            .insert("user-1", "Anything", &[])
            .await
            .expect_err("no schema installed");
        let DraftError::Schema(issue) = err else {
            panic!("expected schema classification, got {err:?}");
        };
        assert_eq!(issue, SchemaIssue::MissingDraftsTable);
        assert!(issue.remediation().starts_with("CREATE TABLE drafts"));
    }

    #[tokio::test]
    async fn missing_owner_column_is_classified_on_write_and_read() {
        let pool = memory_pool().await;
        // Legacy deployment: drafts table predating the owner column.
        sqlx::query(
            "CREATE TABLE drafts (
                 id TEXT PRIMARY KEY,
                 created_at TEXT NOT NULL,
                 title TEXT NOT NULL,
                 content TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .expect("legacy table");
        let store = SqliteDraftStore::attach(pool);

        let write_err = store
            .insert("user-1", "Anything", &[])
            .await
            .expect_err("insert must fail");
        assert!(matches!(
            write_err,
            DraftError::Schema(SchemaIssue::MissingOwnerColumn)
        ));

        let read_err = store
            .list_for_owner("user-1")
            .await
            .expect_err("select must fail");
        let DraftError::Schema(issue) = read_err else {
            panic!("expected schema classification, got {read_err:?}");
        };
        assert_eq!(issue.remediation(), "ALTER TABLE drafts ADD COLUMN owner_id TEXT;");
    }

    #[tokio::test]
    async fn open_bootstraps_a_file_backed_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("drafts.db");
        let store = SqliteDraftStore::open(&path).await.expect("open");
        store
            .insert("user-1", "On disk", &sample_sections())
            .await
            .expect("insert");
        assert!(path.exists());
    }
}

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::db::models::{DraftRow, GuidelineRow};
use crate::db::schema::SQLITE_INIT;
use crate::error::ForgeError;

pub type SqlitePool = Pool<Sqlite>;

/// Open (creating if missing) the SQLite database behind `database_url`.
pub async fn connect(database_url: &str) -> Result<SqlitePool, ForgeError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(sqlx::Error::from)?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct ForgeStorage {
    pool: SqlitePool,
}

impl ForgeStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ForgeError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn insert_draft(&self, draft: &DraftRow) -> Result<(), ForgeError> {
        sqlx::query(
            r#"
            INSERT INTO thread_drafts (
                id, client_id, prompt_json, output_json, provider, model,
                created_at, rating, regeneration_count, was_final_version,
                feedback_tags, parent_thread_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.id.to_string())
        .bind(&draft.client_id)
        .bind(&draft.prompt_json)
        .bind(&draft.output_json)
        .bind(&draft.provider)
        .bind(&draft.model)
        .bind(draft.created_at.to_rfc3339())
        .bind(draft.rating)
        .bind(draft.regeneration_count)
        .bind(if draft.was_final_version { 1 } else { 0 })
        .bind(&draft.feedback_tags)
        .bind(draft.parent_thread_id.map(|id| id.to_string()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Newest-first page of a client's drafts.
    pub async fn list_drafts(
        &self,
        client_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<DraftRow>, ForgeError> {
        let rows = sqlx::query(
            r#"SELECT id, client_id, prompt_json, output_json, provider, model,
               created_at, rating, regeneration_count, was_final_version,
               feedback_tags, parent_thread_id
               FROM thread_drafts
               WHERE client_id = ?
               ORDER BY created_at DESC
               LIMIT ? OFFSET ?"#,
        )
        .bind(client_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_draft).collect()
    }

    pub async fn get_draft(&self, id: Uuid) -> Result<Option<DraftRow>, ForgeError> {
        let row = sqlx::query(
            r#"SELECT id, client_id, prompt_json, output_json, provider, model,
               created_at, rating, regeneration_count, was_final_version,
               feedback_tags, parent_thread_id
               FROM thread_drafts WHERE id = ?"#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_draft).transpose()
    }

    /// Apply user feedback to a draft. Returns false when the id is unknown.
    pub async fn update_draft_feedback(
        &self,
        id: Uuid,
        rating: Option<i32>,
        feedback_tags: Option<&str>,
        was_final_version: Option<bool>,
    ) -> Result<bool, ForgeError> {
        let result = sqlx::query(
            r#"UPDATE thread_drafts SET
                rating = COALESCE(?, rating),
                feedback_tags = COALESCE(?, feedback_tags),
                was_final_version = COALESCE(?, was_final_version)
              WHERE id = ?"#,
        )
        .bind(rating)
        .bind(feedback_tags)
        .bind(was_final_version.map(|b| if b { 1 } else { 0 }))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The most recently updated guideline row, if any.
    pub async fn get_guideline(&self) -> Result<Option<GuidelineRow>, ForgeError> {
        let row = sqlx::query(
            "SELECT id, text, updated_at FROM brand_guidelines ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_guideline).transpose()
    }

    /// Replace the singleton guideline row.
    pub async fn upsert_guideline(&self, text: &str) -> Result<GuidelineRow, ForgeError> {
        let existing = self.get_guideline().await?;
        let id = existing.map(|g| g.id).unwrap_or_else(Uuid::new_v4);
        let updated_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO brand_guidelines (id, text, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                text = excluded.text,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id.to_string())
        .bind(text)
        .bind(updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(GuidelineRow {
            id,
            text: text.to_string(),
            updated_at,
        })
    }

    pub async fn delete_guideline(&self) -> Result<(), ForgeError> {
        sqlx::query("DELETE FROM brand_guidelines")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn row_to_draft(row: SqliteRow) -> Result<DraftRow, ForgeError> {
        let id: String = row.try_get("id")?;
        let client_id: String = row.try_get("client_id")?;
        let prompt_json: String = row.try_get("prompt_json")?;
        let output_json: String = row.try_get("output_json")?;
        let provider: String = row.try_get("provider")?;
        let model: String = row.try_get("model")?;
        let created_at_str: String = row.try_get("created_at")?;
        let rating: Option<i32> = row.try_get("rating")?;
        let regeneration_count: i32 = row.try_get("regeneration_count")?;
        let was_final_i: i64 = row.try_get("was_final_version")?;
        let feedback_tags: Option<String> = row.try_get("feedback_tags")?;
        let parent_str: Option<String> = row.try_get("parent_thread_id")?;

        Ok(DraftRow {
            id: parse_uuid(&id)?,
            client_id,
            prompt_json,
            output_json,
            provider,
            model,
            created_at: parse_timestamp(&created_at_str)?,
            rating,
            regeneration_count,
            was_final_version: was_final_i != 0,
            feedback_tags,
            parent_thread_id: parent_str.as_deref().map(parse_uuid).transpose()?,
        })
    }

    fn row_to_guideline(row: SqliteRow) -> Result<GuidelineRow, ForgeError> {
        let id: String = row.try_get("id")?;
        let text: String = row.try_get("text")?;
        let updated_at_str: String = row.try_get("updated_at")?;
        Ok(GuidelineRow {
            id: parse_uuid(&id)?,
            text,
            updated_at: parse_timestamp(&updated_at_str)?,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, ForgeError> {
    Uuid::parse_str(s)
        .map_err(|e| ForgeError::Database(sqlx::Error::Decode(Box::new(e))))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ForgeError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ForgeError::Database(sqlx::Error::Decode(Box::new(e))))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted thread-generation request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRow {
    pub id: Uuid,
    /// Anonymous identifier provided by the client; no auth for MVP.
    pub client_id: String,
    /// Original request JSON. Never logged.
    pub prompt_json: String,
    /// Canonical stored output: `{"tweets":[...]}`.
    pub output_json: String,
    pub provider: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    /// 1-5 stars, None until rated.
    pub rating: Option<i32>,
    pub regeneration_count: i32,
    pub was_final_version: bool,
    /// Comma-separated tags from `types::thread::FEEDBACK_TAGS`.
    pub feedback_tags: Option<String>,
    pub parent_thread_id: Option<Uuid>,
}

/// Singleton free-text brand guideline row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidelineRow {
    pub id: Uuid,
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

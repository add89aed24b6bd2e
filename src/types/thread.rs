use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::quality::QualityReport;

/// Fine-grained formatting knobs for a generated thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylePreferences {
    /// None lets the model decide.
    pub use_emojis: Option<bool>,
    /// X/N numbering at the end of each tweet.
    pub use_numbering: Option<bool>,
    /// 200..=280, defaults to 260 when absent.
    pub max_chars_per_tweet: Option<u32>,
    /// bold, question, story or stat.
    pub hook_style: Option<String>,
    /// soft, direct or question.
    pub cta_style: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateThreadRequest {
    pub topic: String,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    pub tweet_count: u32,
    #[serde(default)]
    pub key_points: Option<Vec<String>>,
    #[serde(default)]
    pub feedback: Option<String>,
    /// Per-request brand voice; falls back to the stored global guideline.
    #[serde(default)]
    pub brand_guidelines: Option<String>,
    /// Few-shot examples to match style, at most 3.
    #[serde(default)]
    pub example_threads: Option<Vec<String>>,
    #[serde(default)]
    pub style_preferences: Option<StylePreferences>,
    /// Run the web research pipeline and feed the synthesis into the prompt.
    #[serde(default)]
    pub use_research: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateThreadResponse {
    pub id: Uuid,
    pub tweets: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    pub quality: QualityReport,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_history_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryListItem {
    pub id: Uuid,
    pub topic_preview: String,
    pub tweet_count: usize,
    pub first_tweet_preview: String,
    pub created_at: DateTime<Utc>,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDetail {
    pub id: Uuid,
    pub tweets: Vec<String>,
    pub request: serde_json::Value,
    pub provider: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub rating: Option<i32>,
    pub regeneration_count: i32,
    pub was_final_version: bool,
    pub feedback_tags: Option<String>,
    pub parent_thread_id: Option<Uuid>,
}

/// Feedback tags accepted by the draft feedback endpoint.
pub const FEEDBACK_TAGS: &[&str] = &[
    "too_generic",
    "too_long",
    "weak_hook",
    "not_engaging",
    "too_marketing",
    "off_topic",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftFeedbackRequest {
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub feedback_tags: Option<Vec<String>>,
    #[serde(default)]
    pub was_final_version: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandGuidelineBody {
    pub text: String,
}

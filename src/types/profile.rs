use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnalysisRequest {
    pub username: String,
    #[serde(default)]
    pub profile_bio: Option<String>,
    #[serde(default)]
    pub recent_tweets: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnalysisResponse {
    pub username: String,
    pub profile_url: String,
    pub analyzed_at: DateTime<Utc>,
    pub tweet_count: usize,
    pub brand_description: BrandDescription,
}

/// Brand description document assembled from the model's JSON answer.
/// Every field has a permissive fallback so a partially formed answer
/// still yields a complete document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDescription {
    pub overview: String,
    pub brand_voice: BrandVoice,
    pub target_audience: TargetAudience,
    pub content_pillars: Vec<String>,
    pub content_patterns: ContentPatterns,
    pub engagement_insights: EngagementInsights,
    pub unique_differentiators: Vec<String>,
    pub recommended_strategy: RecommendedStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandVoice {
    pub tone: String,
    pub style: String,
    pub personality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAudience {
    pub primary: String,
    pub demographics: String,
    pub pain_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPatterns {
    pub format: String,
    pub length: String,
    pub structure: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementInsights {
    pub top_performing_content: Vec<String>,
    pub call_to_action_style: String,
    pub posting_frequency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedStrategy {
    pub content_types: Vec<String>,
    pub tone_guidance: String,
    pub topics_to_explore: Vec<String>,
}

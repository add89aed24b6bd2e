use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::ForgeError;
use crate::api::xai::{ChatClient, ChatMessage, ChatOptions};
use crate::config::CONFIG;
use crate::types::profile::{
    BrandDescription, BrandVoice, ContentPatterns, EngagementInsights, ProfileAnalysisRequest,
    ProfileAnalysisResponse, RecommendedStrategy, TargetAudience,
};

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("static regex"));

const SYSTEM_PROMPT: &str = r#"You are a brand strategist analyzing a Twitter profile. Generate a comprehensive brand description document as JSON.

Return ONLY valid JSON matching this exact structure (no markdown, no extra text):
{
  "overview": "2-3 paragraphs summarizing the brand",
  "brandVoice": {
    "tone": "Description of overall tone",
    "style": "Description of writing style",
    "personality": "Description of personality traits"
  },
  "targetAudience": {
    "primary": "Primary audience description",
    "demographics": "Age, profession, background",
    "painPoints": ["pain point 1", "pain point 2", "pain point 3"]
  },
  "contentPillars": ["topic 1", "topic 2", "topic 3"],
  "contentPatterns": {
    "format": "Format distribution",
    "length": "Typical length",
    "structure": "Common structure"
  },
  "engagementInsights": {
    "topPerformingContent": ["type 1", "type 2"],
    "callToActionStyle": "CTA style description",
    "postingFrequency": "Frequency description"
  },
  "uniqueDifferentiators": ["differentiator 1", "differentiator 2"],
  "recommendedStrategy": {
    "contentTypes": ["type 1", "type 2"],
    "toneGuidance": "Guidance on tone",
    "topicsToExplore": ["topic 1", "topic 2", "topic 3"]
  }
}"#;

pub async fn analyze(
    chat: &ChatClient,
    request: ProfileAnalysisRequest,
) -> Result<ProfileAnalysisResponse, ForgeError> {
    let username = validate_username(&request.username)?;
    let bio = validate_bio(request.profile_bio.as_deref())?;
    let tweets = validate_recent_tweets(request.recent_tweets.as_deref())?;

    let prompt = build_analysis_prompt(&username, &bio, &tweets);

    let completion = chat
        .complete(
            &CONFIG.xai.model,
            &[ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            ChatOptions::default(),
        )
        .await?;

    let brand_description = parse_brand_description(&completion.content)?;

    Ok(ProfileAnalysisResponse {
        profile_url: format!("https://x.com/{username}"),
        username,
        analyzed_at: Utc::now(),
        tweet_count: tweets.len(),
        brand_description,
    })
}

/// Strip a leading `@`, then require 1-15 chars of `[A-Za-z0-9_]`.
fn validate_username(username: &str) -> Result<String, ForgeError> {
    let normalized = username.trim().trim_start_matches('@').trim().to_string();
    if normalized.is_empty() || normalized.len() > 15 {
        return Err(ForgeError::validation("Username must be 1-15 characters"));
    }
    if !USERNAME_PATTERN.is_match(&normalized) {
        return Err(ForgeError::validation(
            "Username can only contain letters, numbers, and underscores",
        ));
    }
    Ok(normalized)
}

fn validate_bio(bio: Option<&str>) -> Result<String, ForgeError> {
    let trimmed = bio.unwrap_or_default().trim().to_string();
    if trimmed.is_empty() {
        return Err(ForgeError::validation("Please paste the profile bio"));
    }
    if trimmed.chars().count() > 400 {
        return Err(ForgeError::validation(
            "Profile bio must not exceed 400 characters",
        ));
    }
    Ok(trimmed)
}

fn validate_recent_tweets(tweets: Option<&[String]>) -> Result<Vec<String>, ForgeError> {
    let cleaned: Vec<String> = tweets
        .unwrap_or_default()
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if cleaned.len() < 5 {
        return Err(ForgeError::validation("Please paste at least 5 recent tweets"));
    }
    if cleaned.len() > 30 {
        return Err(ForgeError::validation("Please paste no more than 30 tweets"));
    }
    if cleaned.iter().any(|t| t.chars().count() > 500) {
        return Err(ForgeError::validation(
            "Each tweet must not exceed 500 characters",
        ));
    }
    Ok(cleaned)
}

fn build_analysis_prompt(username: &str, bio: &str, tweets: &[String]) -> String {
    let tweets_block: String = tweets
        .iter()
        .map(|t| format!("- {t}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze the X profile @{username} and create a comprehensive brand description based ONLY on the provided bio and tweets.\n\n\
         Do NOT invent or assume any facts (follower count, engagement, posting frequency, etc.). If information is missing, state it as unknown.\n\n\
         Profile bio:\n{bio}\n\n\
         Recent tweets (use these as the sole source of truth):\n{tweets_block}\n\n\
         Return a complete brand profile that could be used for content strategy."
    )
}

// Loose mirror of the model's JSON; every field optional so a partial
// answer still produces a full document via defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBrandDescription {
    overview: Option<String>,
    brand_voice: Option<RawBrandVoice>,
    target_audience: Option<RawTargetAudience>,
    content_pillars: Option<Vec<String>>,
    content_patterns: Option<RawContentPatterns>,
    engagement_insights: Option<RawEngagementInsights>,
    unique_differentiators: Option<Vec<String>>,
    recommended_strategy: Option<RawRecommendedStrategy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBrandVoice {
    tone: Option<String>,
    style: Option<String>,
    personality: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTargetAudience {
    primary: Option<String>,
    demographics: Option<String>,
    pain_points: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawContentPatterns {
    format: Option<String>,
    length: Option<String>,
    structure: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawEngagementInsights {
    top_performing_content: Option<Vec<String>>,
    call_to_action_style: Option<String>,
    posting_frequency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawRecommendedStrategy {
    content_types: Option<Vec<String>>,
    tone_guidance: Option<String>,
    topics_to_explore: Option<Vec<String>>,
}

fn parse_brand_description(raw: &str) -> Result<BrandDescription, ForgeError> {
    let parsed: RawBrandDescription = match serde_json::from_str(raw) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "failed to parse brand description response");
            return Err(ForgeError::ModelResponse(
                "Brand analysis failed. Try again.".to_string(),
            ));
        }
    };

    let voice = parsed.brand_voice.unwrap_or_default();
    let audience = parsed.target_audience.unwrap_or_default();
    let patterns = parsed.content_patterns.unwrap_or_default();
    let insights = parsed.engagement_insights.unwrap_or_default();
    let strategy = parsed.recommended_strategy.unwrap_or_default();

    Ok(BrandDescription {
        overview: parsed
            .overview
            .unwrap_or_else(|| "Unable to generate overview".to_string()),
        brand_voice: BrandVoice {
            tone: voice.tone.unwrap_or_else(|| "Professional".to_string()),
            style: voice.style.unwrap_or_else(|| "Informative".to_string()),
            personality: voice
                .personality
                .unwrap_or_else(|| "Authoritative".to_string()),
        },
        target_audience: TargetAudience {
            primary: audience
                .primary
                .unwrap_or_else(|| "General audience".to_string()),
            demographics: audience
                .demographics
                .unwrap_or_else(|| "Various demographics".to_string()),
            pain_points: audience.pain_points.unwrap_or_else(|| {
                vec!["Information seeking".to_string(), "Staying updated".to_string()]
            }),
        },
        content_pillars: parsed
            .content_pillars
            .unwrap_or_else(|| vec!["General topics".to_string()]),
        content_patterns: ContentPatterns {
            format: patterns.format.unwrap_or_else(|| "Mixed content".to_string()),
            length: patterns
                .length
                .unwrap_or_else(|| "Variable length".to_string()),
            structure: patterns
                .structure
                .unwrap_or_else(|| "Standard structure".to_string()),
        },
        engagement_insights: EngagementInsights {
            top_performing_content: insights
                .top_performing_content
                .unwrap_or_else(|| vec!["Informative content".to_string()]),
            call_to_action_style: insights
                .call_to_action_style
                .unwrap_or_else(|| "Direct engagement".to_string()),
            posting_frequency: insights
                .posting_frequency
                .unwrap_or_else(|| "Regular posting".to_string()),
        },
        unique_differentiators: parsed
            .unique_differentiators
            .unwrap_or_else(|| vec!["Unique perspective".to_string()]),
        recommended_strategy: RecommendedStrategy {
            content_types: strategy
                .content_types
                .unwrap_or_else(|| vec!["Educational content".to_string()]),
            tone_guidance: strategy
                .tone_guidance
                .unwrap_or_else(|| "Maintain authenticity".to_string()),
            topics_to_explore: strategy
                .topics_to_explore
                .unwrap_or_else(|| vec!["Related topics".to_string()]),
        },
    })
}

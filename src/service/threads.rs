use chrono::Utc;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::ForgeError;
use crate::api::serper::SearchClient;
use crate::api::xai::{ChatClient, ChatMessage, ChatOptions};
use crate::config::CONFIG;
use crate::db::models::DraftRow;
use crate::db::sqlite::ForgeStorage;
use crate::service::{quality, research};
use crate::types::thread::{
    DraftFeedbackRequest, FEEDBACK_TAGS, GenerateThreadRequest, GenerateThreadResponse,
    HistoryDetail, HistoryListItem,
};

const PROVIDER: &str = "xai";
const TWEET_CHAR_LIMIT: usize = 280;
const PREVIEW_CHARS: usize = 80;

const SYSTEM_PROMPT: &str = "You are ThreadForge. Generate a Twitter/X thread as JSON only. \
     Return exactly: {\"tweets\":[\"...\",\"...\"]}. No extra keys, no markdown.";

/// Full generation pipeline: validate, optional research, prompt, chat call,
/// parse/repair, length enforcement, quality scoring, persist.
pub async fn generate(
    chat: &ChatClient,
    search: &SearchClient,
    storage: &ForgeStorage,
    request: GenerateThreadRequest,
    client_id: &str,
) -> Result<GenerateThreadResponse, ForgeError> {
    validate_request(&request)?;

    let model = CONFIG.xai.model.clone();
    let prompt_json = serde_json::to_string(&request)?;

    // Stored global guideline is the fallback voice
    let guideline = match request.brand_guidelines.as_deref() {
        Some(g) if !g.trim().is_empty() => Some(g.trim().to_string()),
        _ => storage.get_guideline().await?.map(|g| g.text),
    };

    // Research failures must never fail generation
    let research_context = if request.use_research {
        match research::run(chat, search, &request.topic).await {
            Ok(context) if !context.is_empty() => Some(context),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "research pipeline failed; generating without context");
                None
            }
        }
    } else {
        None
    };

    let user = build_user_prompt(&request, guideline.as_deref(), research_context.as_deref());

    let completion = chat
        .complete(
            &model,
            &[ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)],
            ChatOptions::default(),
        )
        .await?;

    if let Some(total) = completion.total_tokens {
        info!(
            prompt_tokens = ?completion.prompt_tokens,
            completion_tokens = ?completion.completion_tokens,
            total_tokens = total,
            "thread generation completed"
        );
    }

    let tweets = enforce_tweet_length(extract_tweets(&completion.content), TWEET_CHAR_LIMIT);
    let report = quality::analyze(&tweets, request.tone.as_deref());

    let draft = DraftRow {
        id: Uuid::new_v4(),
        client_id: client_id.to_string(),
        prompt_json,
        output_json: serde_json::to_string(&json!({ "tweets": tweets }))?,
        provider: PROVIDER.to_string(),
        model: model.clone(),
        created_at: Utc::now(),
        rating: None,
        regeneration_count: 0,
        was_final_version: false,
        feedback_tags: None,
        parent_thread_id: None,
    };
    storage.insert_draft(&draft).await?;

    Ok(GenerateThreadResponse {
        id: draft.id,
        tweets,
        created_at: draft.created_at,
        provider: draft.provider,
        model,
        quality: report,
    })
}

pub async fn history_list(
    storage: &ForgeStorage,
    client_id: &str,
    limit: u32,
    offset: u32,
) -> Result<Vec<HistoryListItem>, ForgeError> {
    if limit > 100 {
        return Err(ForgeError::validation("Limit must not exceed 100"));
    }
    let rows = storage.list_drafts(client_id, limit, offset).await?;
    Ok(rows.iter().map(to_list_item).collect())
}

pub async fn history_detail(
    storage: &ForgeStorage,
    id: Uuid,
) -> Result<HistoryDetail, ForgeError> {
    let row = storage
        .get_draft(id)
        .await?
        .ok_or(ForgeError::NotFound("Thread"))?;

    Ok(HistoryDetail {
        id: row.id,
        tweets: stored_tweets(&row.output_json),
        request: serde_json::from_str(&row.prompt_json).unwrap_or(Value::Null),
        provider: row.provider,
        model: row.model,
        created_at: row.created_at,
        rating: row.rating,
        regeneration_count: row.regeneration_count,
        was_final_version: row.was_final_version,
        feedback_tags: row.feedback_tags,
        parent_thread_id: row.parent_thread_id,
    })
}

pub async fn apply_feedback(
    storage: &ForgeStorage,
    id: Uuid,
    feedback: DraftFeedbackRequest,
) -> Result<(), ForgeError> {
    if let Some(rating) = feedback.rating
        && !(1..=5).contains(&rating)
    {
        return Err(ForgeError::validation("Rating must be between 1 and 5"));
    }

    let tags = match feedback.feedback_tags {
        Some(tags) => {
            for tag in &tags {
                if !FEEDBACK_TAGS.contains(&tag.as_str()) {
                    return Err(ForgeError::Validation(format!(
                        "Unknown feedback tag: {tag}"
                    )));
                }
            }
            Some(tags.join(","))
        }
        None => None,
    };

    let updated = storage
        .update_draft_feedback(id, feedback.rating, tags.as_deref(), feedback.was_final_version)
        .await?;
    if !updated {
        return Err(ForgeError::NotFound("Thread"));
    }
    Ok(())
}

fn validate_request(request: &GenerateThreadRequest) -> Result<(), ForgeError> {
    if request.topic.trim().is_empty() {
        return Err(ForgeError::validation("Topic is required"));
    }
    if request.topic.chars().count() > 500 {
        return Err(ForgeError::validation("Topic is too long"));
    }
    if !(3..=25).contains(&request.tweet_count) {
        return Err(ForgeError::validation("TweetCount must be between 3 and 25"));
    }
    if let Some(audience) = &request.audience
        && audience.chars().count() > 100
    {
        return Err(ForgeError::validation("Audience is too long"));
    }
    if let Some(points) = &request.key_points
        && points.len() > 20
    {
        return Err(ForgeError::validation("Too many key points"));
    }
    if let Some(feedback) = &request.feedback
        && feedback.chars().count() > 1000
    {
        return Err(ForgeError::validation("Feedback is too long"));
    }
    if let Some(guidelines) = &request.brand_guidelines
        && guidelines.chars().count() > 1500
    {
        return Err(ForgeError::validation(
            "Brand guidelines must not exceed 1500 characters",
        ));
    }
    if let Some(examples) = &request.example_threads {
        if examples.len() > 3 {
            return Err(ForgeError::validation("At most 3 example threads"));
        }
        if examples.iter().any(|e| e.chars().count() > 5000) {
            return Err(ForgeError::validation(
                "Each example thread must not exceed 5000 characters",
            ));
        }
    }
    if let Some(prefs) = &request.style_preferences
        && let Some(max_chars) = prefs.max_chars_per_tweet
        && !(200..=280).contains(&max_chars)
    {
        return Err(ForgeError::validation(
            "MaxCharsPerTweet must be between 200 and 280",
        ));
    }
    Ok(())
}

fn build_user_prompt(
    request: &GenerateThreadRequest,
    guideline: Option<&str>,
    research_context: Option<&str>,
) -> String {
    let tone = request
        .tone
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("clear, practical");
    let audience = request
        .audience
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or("builders");

    let mut prompt = format!(
        "Topic: {}\nAudience: {audience}\nTone: {tone}\nTweet count: {}\n",
        request.topic, request.tweet_count
    );

    if let Some(points) = request.key_points.as_deref().filter(|p| !p.is_empty()) {
        prompt.push_str("\nKey points:\n");
        for point in points {
            prompt.push_str("- ");
            prompt.push_str(point);
            prompt.push('\n');
        }
    }

    if let Some(feedback) = request.feedback.as_deref().filter(|f| !f.trim().is_empty()) {
        prompt.push_str(&format!("\nRegeneration feedback: {feedback}\n"));
    }

    if let Some(guideline) = guideline {
        prompt.push_str(&format!("\nBrand guidelines to follow:\n{guideline}\n"));
    }

    if let Some(examples) = request.example_threads.as_deref().filter(|e| !e.is_empty()) {
        prompt.push_str("\nExample threads to match in style:\n");
        for (i, example) in examples.iter().enumerate() {
            prompt.push_str(&format!("Example {}:\n{example}\n\n", i + 1));
        }
    }

    if let Some(context) = research_context {
        prompt.push_str(&format!(
            "\nRESEARCH CONTEXT (use these facts, do not invent others):\n{context}\n"
        ));
    }

    if let Some(prefs) = &request.style_preferences {
        let max_chars = prefs.max_chars_per_tweet.unwrap_or(260);
        prompt.push_str(&format!("\nStyle constraints:\n- Aim for at most {max_chars} characters per tweet\n"));
        match prefs.use_numbering {
            Some(false) => prompt.push_str("- Do not number the tweets\n"),
            _ => prompt.push_str("- End each tweet with X/N numbering\n"),
        }
        match prefs.use_emojis {
            Some(true) => prompt.push_str("- Use emojis where they add energy\n"),
            Some(false) => prompt.push_str("- Do not use emojis\n"),
            None => {}
        }
        if let Some(hook) = prefs.hook_style.as_deref().filter(|h| !h.trim().is_empty()) {
            prompt.push_str(&format!("- Hook style for tweet 1: {hook}\n"));
        }
        if let Some(cta) = prefs.cta_style.as_deref().filter(|c| !c.trim().is_empty()) {
            prompt.push_str(&format!("- CTA style for the final tweet: {cta}\n"));
        }
    }

    prompt.push_str(
        "\nRules: Each tweet must be <= 280 characters. Include a strong hook in tweet 1 and a concise CTA in the last tweet.",
    );
    prompt
}

/// Strict JSON parse of `{"tweets":[...]}`, falling back to line splitting
/// with bullet and numbering cleanup.
fn extract_tweets(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return vec!["(No output)".to_string()];
    }

    // A parsed `tweets` array wins even when it filters down to nothing;
    // the line-splitting fallback is only for non-JSON output.
    if let Ok(value) = serde_json::from_str::<Value>(raw)
        && let Some(items) = value.get("tweets").and_then(Value::as_array)
    {
        return items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    raw.lines()
        .map(str::trim)
        .map(|l| l.trim_start_matches(['-', '•', '*', ' ']))
        .map(strip_leading_numbering)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Strip "1) foo", "2. bar", "3 - baz" prefixes.
fn strip_leading_numbering(line: &str) -> String {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return line.to_string();
    }
    let rest = &line[digits..];
    let rest = rest.trim_start_matches(['.', ')', '-', ' ', '\t']);
    rest.trim().to_string()
}

/// Split any tweet exceeding `max_len` characters at word boundaries.
fn enforce_tweet_length(tweets: Vec<String>, max_len: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(tweets.len());
    for tweet in tweets {
        if tweet.chars().count() <= max_len {
            out.push(tweet);
        } else {
            out.extend(split_to_max_length(&tweet, max_len));
        }
    }
    out
}

fn split_to_max_length(text: &str, max_len: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut remaining = text.trim().to_string();

    while remaining.chars().count() > max_len {
        let window: String = remaining.chars().take(max_len + 1).collect();
        // Break at the last space inside the window, unless that leaves
        // the part shorter than 60% of the cap.
        let cut_chars = match window.rfind(' ') {
            Some(byte_idx) => {
                let chars_before = window[..byte_idx].chars().count();
                if (chars_before as f64) < max_len as f64 * 0.6 {
                    max_len
                } else {
                    chars_before
                }
            }
            None => max_len,
        };

        let part: String = remaining.chars().take(cut_chars).collect();
        let part = part.trim().to_string();
        if !part.is_empty() {
            parts.push(part);
        }
        remaining = remaining.chars().skip(cut_chars).collect::<String>();
        remaining = remaining.trim().to_string();
    }

    if !remaining.is_empty() {
        parts.push(remaining);
    }
    parts
}

fn to_list_item(row: &DraftRow) -> HistoryListItem {
    let topic = serde_json::from_str::<Value>(&row.prompt_json)
        .ok()
        .and_then(|v| v.get("topic").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();
    let tweets = stored_tweets(&row.output_json);

    HistoryListItem {
        id: row.id,
        topic_preview: truncate_chars(&topic, PREVIEW_CHARS),
        tweet_count: tweets.len(),
        first_tweet_preview: tweets
            .first()
            .map(|t| truncate_chars(t, PREVIEW_CHARS))
            .unwrap_or_default(),
        created_at: row.created_at,
        rating: row.rating,
    }
}

fn stored_tweets(output_json: &str) -> Vec<String> {
    serde_json::from_str::<Value>(output_json)
        .ok()
        .and_then(|v| {
            v.get("tweets").and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
        })
        .unwrap_or_default()
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> GenerateThreadRequest {
        GenerateThreadRequest {
            topic: "Building in public".to_string(),
            tone: None,
            audience: None,
            tweet_count: 5,
            key_points: None,
            feedback: None,
            brand_guidelines: None,
            example_threads: None,
            style_preferences: None,
            use_research: false,
        }
    }

    #[test]
    fn rejects_blank_topic() {
        let mut req = base_request();
        req.topic = "   ".to_string();
        let err = validate_request(&req).unwrap_err();
        assert!(matches!(err, ForgeError::Validation(m) if m == "Topic is required"));
    }

    #[test]
    fn rejects_out_of_range_tweet_count() {
        let mut req = base_request();
        req.tweet_count = 2;
        assert!(validate_request(&req).is_err());
        req.tweet_count = 26;
        assert!(validate_request(&req).is_err());
        req.tweet_count = 25;
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn rejects_too_many_key_points() {
        let mut req = base_request();
        req.key_points = Some(vec!["p".to_string(); 21]);
        let err = validate_request(&req).unwrap_err();
        assert!(matches!(err, ForgeError::Validation(m) if m == "Too many key points"));
    }

    #[test]
    fn prompt_uses_defaults_and_sections() {
        let mut req = base_request();
        req.key_points = Some(vec!["Ship daily".to_string()]);
        req.feedback = Some("less fluff".to_string());
        let prompt = build_user_prompt(&req, Some("First person, no jargon"), None);
        assert!(prompt.contains("Audience: builders"));
        assert!(prompt.contains("Tone: clear, practical"));
        assert!(prompt.contains("- Ship daily"));
        assert!(prompt.contains("Regeneration feedback: less fluff"));
        assert!(prompt.contains("Brand guidelines to follow:\nFirst person, no jargon"));
        assert!(prompt.contains("<= 280 characters"));
    }

    #[test]
    fn prompt_includes_research_block() {
        let req = base_request();
        let prompt = build_user_prompt(&req, None, Some("KEY FACTS: 42% of builders"));
        assert!(prompt.contains("RESEARCH CONTEXT"));
        assert!(prompt.contains("42% of builders"));
    }

    #[test]
    fn extracts_tweets_from_strict_json() {
        let raw = r#"{"tweets": ["  one ", "", "two"]}"#;
        assert_eq!(extract_tweets(raw), vec!["one", "two"]);
    }

    #[test]
    fn empty_tweets_array_stays_empty() {
        assert!(extract_tweets(r#"{"tweets": []}"#).is_empty());
        assert!(extract_tweets(r#"{"tweets": ["  ", ""]}"#).is_empty());
    }

    #[test]
    fn falls_back_to_line_splitting() {
        let raw = "1) First tweet\n- Second tweet\n• Third tweet\n2. Fourth";
        assert_eq!(
            extract_tweets(raw),
            vec!["First tweet", "Second tweet", "Third tweet", "Fourth"]
        );
    }

    #[test]
    fn blank_output_becomes_placeholder() {
        assert_eq!(extract_tweets("   "), vec!["(No output)"]);
    }

    #[test]
    fn strips_numbering_variants() {
        assert_eq!(strip_leading_numbering("1) foo"), "foo");
        assert_eq!(strip_leading_numbering("2. bar"), "bar");
        assert_eq!(strip_leading_numbering("3 - baz"), "baz");
        assert_eq!(strip_leading_numbering("no number"), "no number");
    }

    #[test]
    fn long_tweets_split_at_word_boundaries() {
        let long = "word ".repeat(100);
        let parts = enforce_tweet_length(vec![long.trim().to_string()], 280);
        assert!(parts.len() > 1);
        for part in &parts {
            assert!(part.chars().count() <= 280);
            assert!(!part.starts_with(' ') && !part.ends_with(' '));
        }
    }

    #[test]
    fn unbreakable_text_hard_cuts() {
        let long = "a".repeat(600);
        let parts = enforce_tweet_length(vec![long], 280);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].chars().count(), 280);
    }

    #[test]
    fn short_tweets_pass_through() {
        let tweets = vec!["fine".to_string()];
        assert_eq!(enforce_tweet_length(tweets.clone(), 280), tweets);
    }

    #[test]
    fn stored_tweets_round_trip() {
        let json = r#"{"tweets":["a","b"]}"#;
        assert_eq!(stored_tweets(json), vec!["a", "b"]);
        assert!(stored_tweets("not json").is_empty());
    }
}

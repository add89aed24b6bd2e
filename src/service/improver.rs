use serde_json::Value;
use tracing::info;

use crate::ForgeError;
use crate::api::xai::{ChatClient, ChatMessage, ChatOptions};
use crate::config::CONFIG;
use crate::types::tweet::{ImproveTweetRequest, ImproveTweetResponse, improvement_types};

const TWITTER_CHAR_LIMIT: usize = 280;
const MAX_DRAFT_LENGTH: usize = 500;

// Tone descriptions for consistent voice
const TONE_DESCRIPTIONS: &[(&str, &str)] = &[
    (
        "indie_hacker",
        "Casual, transparent, no-BS voice. First-person, share real experiences, motivational but realistic.",
    ),
    (
        "professional",
        "Clear, structured, authoritative but approachable. Polished language.",
    ),
    (
        "humorous",
        "Witty, playful, internet-native humor. Light sarcasm when appropriate.",
    ),
    (
        "motivational",
        "Inspiring, energetic, encouraging action and positivity.",
    ),
    (
        "educational",
        "Teacher-like, clear explanations, helpful and informative.",
    ),
    (
        "provocative",
        "Bold, contrarian, challenges conventional wisdom with strong statements.",
    ),
    (
        "storytelling",
        "Narrative-driven, uses personal anecdotes, builds intrigue.",
    ),
    (
        "clear_practical",
        "Straightforward, actionable, focuses on practical value.",
    ),
];

const IMPROVEMENT_PROMPTS: &[(&str, &str)] = &[
    (
        improvement_types::MORE_ENGAGING,
        "Make this tweet IMPOSSIBLE to scroll past:\n\
         - Add a hook that creates curiosity or tension\n\
         - Use 'you' to speak directly to the reader\n\
         - Include a question, bold claim, or surprising angle\n\
         - Make people WANT to engage (like, reply, retweet)",
    ),
    (
        improvement_types::MORE_CONCISE,
        "Make this tweet PUNCHY and TIGHT:\n\
         - Cut every unnecessary word ruthlessly\n\
         - Remove filler words: very, really, just, actually, basically, that\n\
         - Use short sentences that hit hard\n\
         - One clear idea, maximum impact in minimum words",
    ),
    (
        improvement_types::MORE_CLEAR,
        "Make this tweet CRYSTAL CLEAR:\n\
         - Simplify complex language\n\
         - Use concrete examples instead of abstractions\n\
         - Structure the message logically\n\
         - Anyone should understand this instantly",
    ),
    (
        improvement_types::MORE_VIRAL,
        "Optimize this tweet for MAXIMUM VIRALITY:\n\
         - Use proven viral patterns (curiosity gap, contrarian take, specific numbers)\n\
         - Make it highly shareable and quotable\n\
         - Create an emotional reaction (surprise, agreement, inspiration)\n\
         - Add elements that encourage replies and discussion",
    ),
    (
        improvement_types::MORE_PROFESSIONAL,
        "Make this tweet POLISHED and PROFESSIONAL:\n\
         - Use proper grammar and clear structure\n\
         - Remove slang and overly casual language\n\
         - Sound authoritative and credible\n\
         - Maintain a confident but approachable tone",
    ),
    (
        improvement_types::MORE_CASUAL,
        "Make this tweet CONVERSATIONAL and FRIENDLY:\n\
         - Sound like you're talking to a friend\n\
         - Use natural, everyday language\n\
         - Add personality and warmth\n\
         - Keep it relatable and down-to-earth",
    ),
];

const SYSTEM_PROMPT: &str = r#"You are TweetForge, an expert tweet writer who transforms mediocre drafts into scroll-stopping tweets.

Your expertise:
- You understand what makes people stop scrolling on Twitter/X
- You know viral patterns: curiosity gaps, contrarian takes, specific numbers, story hooks
- You write concise, punchy copy that fits the 280 character limit
- You preserve the original intent while dramatically improving the delivery

OUTPUT FORMAT: Return ONLY valid JSON:
{
    "improved": "The primary improved version of the tweet",
    "alternatives": ["Alternative version 1", "Alternative version 2"],
    "explanation": "Brief explanation of what was changed and why (1-2 sentences)"
}

RULES:
1. The "improved" tweet MUST be 280 characters or less
2. Each "alternative" MUST be 280 characters or less
3. Preserve the core message and intent of the original
4. Make meaningful improvements, not just minor word swaps
5. No hashtags unless the original had them
6. No markdown, no explanations outside the JSON"#;

pub async fn improve(
    chat: &ChatClient,
    request: ImproveTweetRequest,
) -> Result<ImproveTweetResponse, ForgeError> {
    validate_request(&request)?;

    let model = CONFIG.xai.model.clone();
    let user_prompt = build_user_prompt(&request);

    let completion = chat
        .complete(
            &model,
            &[ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)],
            ChatOptions::default(),
        )
        .await?;

    if let Some(total) = completion.total_tokens {
        info!(
            prompt_tokens = ?completion.prompt_tokens,
            completion_tokens = ?completion.completion_tokens,
            total_tokens = total,
            "tweet improvement completed"
        );
    }

    let mut parsed = parse_response(&completion.content, &request.draft)?;
    parsed.model = model;

    info!(
        original_chars = request.draft.chars().count(),
        improved_chars = parsed.character_count,
        within_limit = parsed.is_within_limit,
        "tweet improved"
    );

    Ok(parsed)
}

fn validate_request(request: &ImproveTweetRequest) -> Result<(), ForgeError> {
    if request.draft.trim().is_empty() {
        return Err(ForgeError::validation("Draft is required"));
    }
    if request.draft.chars().count() > MAX_DRAFT_LENGTH {
        return Err(ForgeError::Validation(format!(
            "Draft must not exceed {MAX_DRAFT_LENGTH} characters"
        )));
    }
    if let Some(kind) = request.improvement_type.as_deref().filter(|k| !k.trim().is_empty())
        && !improvement_types::ALL
            .iter()
            .any(|k| k.eq_ignore_ascii_case(kind))
    {
        return Err(ForgeError::Validation(format!(
            "Improvement type must be one of: {}",
            improvement_types::ALL.join(", ")
        )));
    }
    if let Some(preserve) = &request.preserve_elements
        && preserve.chars().count() > 200
    {
        return Err(ForgeError::validation(
            "Preserve elements must not exceed 200 characters",
        ));
    }
    if let Some(instructions) = &request.additional_instructions
        && instructions.chars().count() > 300
    {
        return Err(ForgeError::validation(
            "Additional instructions must not exceed 300 characters",
        ));
    }
    Ok(())
}

fn build_user_prompt(request: &ImproveTweetRequest) -> String {
    let mut prompt = format!("ORIGINAL TWEET DRAFT:\n\"{}\"\n\n", request.draft);

    let improvement_type = request
        .improvement_type
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .unwrap_or(improvement_types::MORE_ENGAGING);
    if let Some(guide) = lookup(IMPROVEMENT_PROMPTS, improvement_type) {
        prompt.push_str(&format!("IMPROVEMENT GOAL:\n{guide}\n\n"));
    }

    if let Some(tone) = request.tone.as_deref().filter(|t| !t.trim().is_empty()) {
        let desc = lookup(TONE_DESCRIPTIONS, tone).unwrap_or(tone);
        prompt.push_str(&format!("TARGET TONE: {desc}\n\n"));
    }

    if let Some(preserve) = request
        .preserve_elements
        .as_deref()
        .filter(|p| !p.trim().is_empty())
    {
        prompt.push_str(&format!("MUST PRESERVE: {preserve}\n\n"));
    }

    if let Some(instructions) = request
        .additional_instructions
        .as_deref()
        .filter(|i| !i.trim().is_empty())
    {
        prompt.push_str(&format!("ADDITIONAL INSTRUCTIONS: {instructions}\n\n"));
    }

    prompt.push_str(&format!(
        "CONSTRAINTS:\n\
         - Maximum 280 characters per tweet (original is {} chars)\n\
         - Keep the core message intact\n\
         - Make it feel natural, not forced\n\
         - Provide 2 alternative versions with different approaches\n",
        request.draft.chars().count()
    ));
    prompt
}

fn lookup<'a>(table: &'a [(&str, &'a str)], key: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| *v)
}

fn parse_response(raw: &str, original: &str) -> Result<ImproveTweetResponse, ForgeError> {
    if raw.trim().is_empty() {
        return Err(ForgeError::ModelResponse(
            "Failed to improve tweet. Empty response.".to_string(),
        ));
    }

    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        let improved = value
            .get("improved")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        if !improved.is_empty() {
            let alternatives = value
                .get("alternatives")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .take(2)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            let explanation = value
                .get("explanation")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("Improved for better engagement.")
                .to_string();

            return Ok(build_response(original, improved, alternatives, explanation));
        }
    }

    // Fallback: first plausible content line from non-JSON output
    let fallback = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('{') && !l.starts_with('}'));

    match fallback {
        Some(line) => {
            let improved = line.trim_matches(['"', ' ']).to_string();
            Ok(build_response(
                original,
                improved,
                Vec::new(),
                "Improved for better engagement.".to_string(),
            ))
        }
        None => Err(ForgeError::ModelResponse(
            "Failed to parse AI response. Please try again.".to_string(),
        )),
    }
}

fn build_response(
    original: &str,
    improved: String,
    alternatives: Vec<String>,
    explanation: String,
) -> ImproveTweetResponse {
    let character_count = improved.chars().count();
    ImproveTweetResponse {
        original: original.to_string(),
        improved,
        alternatives,
        explanation,
        character_count,
        is_within_limit: character_count <= TWITTER_CHAR_LIMIT,
        model: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> ImproveTweetRequest {
        ImproveTweetRequest {
            draft: "Just launched my new app. Check it out.".to_string(),
            improvement_type: None,
            tone: None,
            preserve_elements: None,
            additional_instructions: None,
        }
    }

    #[test]
    fn rejects_blank_and_oversized_drafts() {
        let mut req = base_request();
        req.draft = "  ".to_string();
        assert!(validate_request(&req).is_err());
        req.draft = "x".repeat(501);
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn rejects_unknown_improvement_type() {
        let mut req = base_request();
        req.improvement_type = Some("more_sparkly".to_string());
        let err = validate_request(&req).unwrap_err();
        assert!(matches!(err, ForgeError::Validation(m) if m.contains("more_engaging")));

        req.improvement_type = Some("MORE_VIRAL".to_string());
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn prompt_defaults_to_more_engaging() {
        let prompt = build_user_prompt(&base_request());
        assert!(prompt.contains("IMPOSSIBLE to scroll past"));
        assert!(prompt.contains("original is 39 chars"));
    }

    #[test]
    fn prompt_expands_known_tone() {
        let mut req = base_request();
        req.tone = Some("indie_hacker".to_string());
        let prompt = build_user_prompt(&req);
        assert!(prompt.contains("no-BS voice"));

        req.tone = Some("pirate".to_string());
        let prompt = build_user_prompt(&req);
        assert!(prompt.contains("TARGET TONE: pirate"));
    }

    #[test]
    fn parses_full_json_answer() {
        let raw = r#"{"improved":"Shipped it. 9 months of nights, one click to try.","alternatives":["alt one","alt two","alt three"],"explanation":"Tightened the hook."}"#;
        let resp = parse_response(raw, "original").unwrap();
        assert!(resp.improved.starts_with("Shipped it."));
        assert_eq!(resp.alternatives.len(), 2);
        assert_eq!(resp.explanation, "Tightened the hook.");
        assert!(resp.is_within_limit);
    }

    #[test]
    fn falls_back_to_first_content_line() {
        let raw = "Here is a better version:\n\"Shipped my app today.\"";
        let resp = parse_response(raw, "orig").unwrap();
        assert_eq!(resp.improved, "Here is a better version:");
        assert!(resp.alternatives.is_empty());
    }

    #[test]
    fn empty_response_is_an_error() {
        assert!(parse_response("  ", "orig").is_err());
    }
}

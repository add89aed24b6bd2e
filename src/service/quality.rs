use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Heuristic hook/CTA scoring for a generated thread. Rule tables only,
/// no model calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub hook_score: i32,
    pub cta_score: i32,
    pub overall_score: i32,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

// Hook strength indicators
const POWER_VERBS: &[&str] = &[
    "stop",
    "quit",
    "never",
    "always",
    "discovered",
    "realized",
    "learned",
    "built",
    "made",
    "created",
    "launched",
    "shipped",
    "changed",
    "transformed",
    "doubled",
    "tripled",
    "10x",
    "failed",
    "lost",
    "won",
    "broke",
];

const CURIOSITY_PHRASES: &[&str] = &[
    "here's what",
    "here's how",
    "here's why",
    "this is how",
    "this is why",
    "the truth",
    "the secret",
    "the real reason",
    "what happened next",
    "nobody talks about",
    "most people don't",
    "unpopular opinion",
    "hot take",
    "controversial",
    "i was wrong",
];

const CTA_INDICATORS: &[&str] = &[
    "follow",
    "retweet",
    "like",
    "share",
    "comment",
    "dm",
    "link in bio",
    "check out",
    "subscribe",
    "join",
    "sign up",
    "download",
    "try",
    "let me know",
    "what do you think",
    "agree?",
    "thoughts?",
];

const ACTION_VERBS: &[&str] = &["follow", "share", "try", "start", "join", "build", "create"];

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?\d[\d,\.]*[KkMmBb]?|\d+%|\d+x").expect("static regex"));

// Emoji and pictograph blocks
static EMOJI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{1F300}-\x{1FAFF}\x{2600}-\x{27BF}]").expect("static regex")
});

pub fn analyze(tweets: &[String], tone: Option<&str>) -> QualityReport {
    if tweets.is_empty() {
        return QualityReport {
            hook_score: 0,
            cta_score: 0,
            overall_score: 0,
            warnings: vec!["No tweets to analyze".to_string()],
            suggestions: Vec::new(),
        };
    }

    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    let hook_score = analyze_hook(&tweets[0], &mut warnings, &mut suggestions);
    let cta_score = analyze_cta(&tweets[tweets.len() - 1], &mut warnings, &mut suggestions);
    check_duplicates(tweets, &mut warnings);
    check_emoji_usage(tweets, tone, &mut warnings, &mut suggestions);

    // Hook weighted more than CTA
    let overall_score = (hook_score * 2 + cta_score + 70) / 4;

    QualityReport {
        hook_score,
        cta_score,
        overall_score,
        warnings,
        suggestions,
    }
}

fn analyze_hook(hook: &str, warnings: &mut Vec<String>, suggestions: &mut Vec<String>) -> i32 {
    let mut score = 50;
    let hook_lower = hook.to_lowercase();

    // Specific numbers beat vague claims
    if NUMBER_PATTERN.is_match(hook) {
        score += 15;
    } else {
        suggestions
            .push("Add specific numbers to your hook (e.g., '$47K', '3 months', '10x')".to_string());
    }

    if POWER_VERBS.iter().any(|v| hook_lower.contains(v)) {
        score += 10;
    }

    if CURIOSITY_PHRASES.iter().any(|p| hook_lower.contains(p)) {
        score += 15;
    } else {
        suggestions.push("Create a curiosity gap (e.g., 'Here's what happened...')".to_string());
    }

    // Questions drive engagement
    if hook.contains('?') {
        score += 10;
    }

    if hook_lower.starts_with("i think") || hook_lower.starts_with("in my opinion") {
        score -= 15;
        warnings.push("Hook starts with weak phrase. Be more direct and confident.".to_string());
    }

    if hook_lower.starts_with("today i want to") || hook_lower.starts_with("let me tell you") {
        score -= 10;
        warnings.push("Hook uses generic opener. Start with impact, not setup.".to_string());
    }

    if hook.chars().count() < 80 {
        suggestions
            .push("Consider expanding your hook - longer hooks often perform better".to_string());
    }

    score.clamp(0, 100)
}

fn analyze_cta(cta: &str, warnings: &mut Vec<String>, suggestions: &mut Vec<String>) -> i32 {
    let mut score = 50;
    let cta_lower = cta.to_lowercase();

    if CTA_INDICATORS.iter().any(|c| cta_lower.contains(c)) {
        score += 30;
    } else {
        warnings.push("Final tweet may lack a clear call-to-action".to_string());
        suggestions.push(
            "End with engagement: 'Follow for more', 'RT if you agree', 'What's your take?'"
                .to_string(),
        );
    }

    if cta.contains('?') {
        score += 15;
    }

    if ACTION_VERBS.iter().any(|v| cta_lower.contains(v)) {
        score += 5;
    }

    score.clamp(0, 100)
}

/// Warn once on the first repeated 4-word phrase longer than 15 chars.
/// Matching is case-insensitive; the warning keeps the original casing.
fn check_duplicates(tweets: &[String], warnings: &mut Vec<String>) {
    let mut phrases: HashSet<String> = HashSet::new();

    for tweet in tweets {
        let words: Vec<&str> = tweet.split_whitespace().collect();
        for window in words.windows(4) {
            let phrase = window.join(" ");
            if phrase.len() > 15 && !phrases.insert(phrase.to_lowercase()) {
                warnings.push(format!("Repeated phrase detected: '{phrase}'"));
                return;
            }
        }
    }
}

fn check_emoji_usage(
    tweets: &[String],
    tone: Option<&str>,
    warnings: &mut Vec<String>,
    suggestions: &mut Vec<String>,
) {
    let total_emojis: usize = tweets
        .iter()
        .map(|t| EMOJI_PATTERN.find_iter(t).count())
        .sum();

    let tone = tone.map(str::to_lowercase);

    if tone.as_deref() == Some("professional") && total_emojis > 3 {
        warnings.push("Professional tone typically uses fewer emojis".to_string());
    }

    if tone.as_deref() == Some("humorous") && total_emojis == 0 {
        suggestions.push("Consider adding emojis to enhance the humorous tone".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(tweets: &[&str]) -> Vec<String> {
        tweets.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_thread_scores_zero() {
        let report = analyze(&[], None);
        assert_eq!(report.overall_score, 0);
        assert_eq!(report.warnings, vec!["No tweets to analyze"]);
    }

    #[test]
    fn strong_hook_scores_high() {
        let tweets = thread(&[
            "I built a $47K side project in 3 months. Here's what nobody talks about when you ship fast:",
            "Middle tweet with substance.",
            "Follow for more - what do you think?",
        ]);
        let report = analyze(&tweets, None);
        // numbers +15, power verb +10, curiosity +15 on a base of 50
        assert!(report.hook_score >= 90);
        // CTA indicator +30, question +15, action verb +5
        assert_eq!(report.cta_score, 100);
    }

    #[test]
    fn weak_opener_is_penalized() {
        let tweets = thread(&["I think threads are neat.", "Follow me"]);
        let report = analyze(&tweets, None);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| w.contains("weak phrase"))
        );
        assert!(report.hook_score < 50);
    }

    #[test]
    fn missing_cta_warns_and_suggests() {
        let tweets = thread(&["A fine hook with 10x energy.", "Closing without any ask."]);
        let report = analyze(&tweets, None);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| w.contains("call-to-action"))
        );
        assert!(report.suggestions.iter().any(|s| s.contains("Follow for more")));
    }

    #[test]
    fn duplicate_phrase_detected_once() {
        let tweets = thread(&[
            "shipping every single day matters a lot",
            "I keep shipping every single day matters to me too",
            "again shipping every single day matters here",
        ]);
        let report = analyze(&tweets, None);
        let dup_warnings = report
            .warnings
            .iter()
            .filter(|w| w.contains("Repeated phrase"))
            .count();
        assert_eq!(dup_warnings, 1);
    }

    #[test]
    fn duplicate_warning_keeps_original_casing() {
        let tweets = thread(&[
            "shipping every single day matters",
            "and Shipping Every Single Day matters again",
        ]);
        let report = analyze(&tweets, None);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| w.contains("'Shipping Every Single Day'"))
        );
    }

    #[test]
    fn professional_tone_flags_heavy_emoji() {
        let tweets = thread(&["Hook 🚀🚀", "Body 🚀🚀", "Follow for more"]);
        let report = analyze(&tweets, Some("professional"));
        assert!(report.warnings.iter().any(|w| w.contains("fewer emojis")));
    }

    #[test]
    fn overall_weights_hook_double() {
        let tweets = thread(&["plain hook", "plain cta"]);
        let report = analyze(&tweets, None);
        assert_eq!(
            report.overall_score,
            (report.hook_score * 2 + report.cta_score + 70) / 4
        );
    }
}

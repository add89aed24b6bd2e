use futures::future::join_all;
use serde_json::Value;
use tracing::{info, warn};

use crate::ForgeError;
use crate::api::serper::SearchClient;
use crate::api::xai::{ChatClient, ChatMessage, ChatOptions};
use crate::config::CONFIG;
use crate::types::search::SearchResult;

const QUERY_SYSTEM_PROMPT: &str = r#"You are a search query optimizer. Given a topic, generate 2-3 Google search queries
that will find the most relevant, recent, and factual information about the topic.

Focus on queries that will surface:
- Recent statistics and data
- Expert opinions and analysis
- Trends and developments
- Concrete examples and case studies

OUTPUT FORMAT: Return ONLY valid JSON:
{"queries":["query1","query2","query3"]}

No markdown, no explanations outside the JSON."#;

const SYNTHESIS_SYSTEM_PROMPT: &str = r#"You are a research analyst. Given a topic and a set of web search results (titles + snippets),
extract and organize the most useful information for writing a compelling Twitter thread.

Your synthesis must include (when available):
- KEY FACTS & STATISTICS: Specific numbers, percentages, dates
- TRENDS & INSIGHTS: What's changing, emerging patterns
- CONTRARIAN VIEWS: Debates, opposing perspectives
- CONCRETE EXAMPLES: Real companies, people, case studies
- NOTABLE SOURCES: Which sources are most authoritative

Be concise and factual. Organize with clear headings.
Do NOT write a thread - just provide structured raw material.
Output plain text with clear section headings."#;

/// Query generation, concurrent search fan-out and synthesis. Returns an
/// empty string when nothing useful was found.
pub async fn run(
    chat: &ChatClient,
    search: &SearchClient,
    topic: &str,
) -> Result<String, ForgeError> {
    let queries = generate_queries(chat, topic).await?;

    let searches = queries.iter().map(|q| search.search(q));
    let results: Vec<SearchResult> = join_all(searches).await.into_iter().flatten().collect();
    info!(
        queries = queries.len(),
        results = results.len(),
        "web research fan-out completed"
    );

    synthesize(chat, topic, &results).await
}

/// Ask the light model for 2-3 optimized queries; fall back to the raw
/// topic when the answer is not usable JSON.
pub async fn generate_queries(chat: &ChatClient, topic: &str) -> Result<Vec<String>, ForgeError> {
    let completion = chat
        .complete(
            &CONFIG.xai.light_model,
            &[
                ChatMessage::system(QUERY_SYSTEM_PROMPT),
                ChatMessage::user(format!(
                    "Generate optimized Google search queries for this topic: {topic}"
                )),
            ],
            ChatOptions {
                temperature: 0.3,
                max_tokens: Some(200),
                json_mode: true,
            },
        )
        .await?;

    let queries = parse_queries(&completion.content);
    if queries.is_empty() {
        warn!("falling back to raw topic as search query");
        return Ok(vec![topic.to_string()]);
    }
    info!(count = queries.len(), "generated search queries");
    Ok(queries)
}

pub async fn synthesize(
    chat: &ChatClient,
    topic: &str,
    results: &[SearchResult],
) -> Result<String, ForgeError> {
    if results.is_empty() {
        return Ok(String::new());
    }

    let mut user = format!("Topic: {topic}\n\nSEARCH RESULTS:\n\n");
    for result in results {
        user.push_str(&format!(
            "Title: {}\nSnippet: {}\nSource: {}\n\n",
            result.title, result.snippet, result.link
        ));
    }
    user.push_str("Please synthesize the above search results into structured research context.");

    let completion = chat
        .complete(
            &CONFIG.xai.light_model,
            &[ChatMessage::system(SYNTHESIS_SYSTEM_PROMPT), ChatMessage::user(user)],
            ChatOptions {
                temperature: 0.3,
                max_tokens: Some(1500),
                json_mode: false,
            },
        )
        .await?;

    info!(
        length = completion.content.len(),
        total_tokens = ?completion.total_tokens,
        "research synthesis completed"
    );
    Ok(completion.content)
}

fn parse_queries(raw: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };
    value
        .get("queries")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(3)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_up_to_three_queries() {
        let raw = r#"{"queries":["a","b","c","d"]}"#;
        assert_eq!(parse_queries(raw), vec!["a", "b", "c"]);
    }

    #[test]
    fn drops_blank_queries() {
        let raw = r#"{"queries":["  ", "real query"]}"#;
        assert_eq!(parse_queries(raw), vec!["real query"]);
    }

    #[test]
    fn bad_json_yields_empty() {
        assert!(parse_queries("not json at all").is_empty());
        assert!(parse_queries(r#"{"other":1}"#).is_empty());
    }
}

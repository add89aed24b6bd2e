use std::time::Duration;

use serde_json::{Value, json};
use tracing::{info, warn};
use url::Url;

use crate::ForgeError;
use crate::config::SerperConfig;
use crate::types::search::SearchResult;

/// Client for the Serper Google-search API. Search failures never bubble
/// up: every error path degrades to an empty result list so generation
/// can proceed without research context.
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl SearchClient {
    pub fn new(cfg: &SerperConfig) -> Result<Self, ForgeError> {
        let http = reqwest::Client::builder()
            .user_agent("threadforge/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        let mut base = cfg.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let endpoint = base.join("search")?;
        Ok(Self {
            http,
            endpoint,
            api_key: cfg.api_key.clone(),
        })
    }

    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        if self.api_key.is_empty() {
            warn!("serper api key not configured; skipping web search");
            return Vec::new();
        }

        let resp = self
            .http
            .post(self.endpoint.clone())
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": 10 }))
            .send()
            .await;

        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "serper request failed");
                return Vec::new();
            }
        };

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "serper returned an error status");
            return Vec::new();
        }

        let body: Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "failed to parse serper response");
                return Vec::new();
            }
        };

        let results = extract_organic(&body);
        info!(count = results.len(), "serper search completed");
        results
    }
}

/// Pull `{title, snippet, link}` triples out of the `organic` array,
/// dropping entries without a title or snippet.
fn extract_organic(body: &Value) -> Vec<SearchResult> {
    let Some(organic) = body.get("organic").and_then(Value::as_array) else {
        return Vec::new();
    };

    organic
        .iter()
        .filter_map(|item| {
            let title = item.get("title")?.as_str()?.to_string();
            let snippet = item.get("snippet")?.as_str()?.to_string();
            let link = item
                .get("link")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if title.trim().is_empty() || snippet.trim().is_empty() {
                return None;
            }
            Some(SearchResult {
                title,
                snippet,
                link,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_complete_organic_entries() {
        let body = json!({
            "organic": [
                {"title": "A", "snippet": "alpha", "link": "https://a.example"},
                {"title": "B", "snippet": "beta"},
                {"title": "", "snippet": "dropped"},
                {"snippet": "no title"}
            ]
        });
        let results = extract_organic(&body);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "A");
        assert_eq!(results[0].link, "https://a.example");
        assert_eq!(results[1].link, "");
    }

    #[test]
    fn missing_organic_yields_empty() {
        assert!(extract_organic(&json!({"searchParameters": {}})).is_empty());
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveTweetRequest {
    pub draft: String,
    /// One of `improvement_types::ALL`; defaults to `more_engaging`.
    #[serde(default)]
    pub improvement_type: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub preserve_elements: Option<String>,
    #[serde(default)]
    pub additional_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveTweetResponse {
    pub original: String,
    pub improved: String,
    pub alternatives: Vec<String>,
    pub explanation: String,
    pub character_count: usize,
    pub is_within_limit: bool,
    pub model: String,
}

pub mod improvement_types {
    pub const MORE_ENGAGING: &str = "more_engaging";
    pub const MORE_CONCISE: &str = "more_concise";
    pub const MORE_CLEAR: &str = "more_clear";
    pub const MORE_VIRAL: &str = "more_viral";
    pub const MORE_PROFESSIONAL: &str = "more_professional";
    pub const MORE_CASUAL: &str = "more_casual";

    pub const ALL: &[&str] = &[
        MORE_ENGAGING,
        MORE_CONCISE,
        MORE_CLEAR,
        MORE_VIRAL,
        MORE_PROFESSIONAL,
        MORE_CASUAL,
    ];

    /// Short human-readable description per type, served to the front end.
    pub const DESCRIPTIONS: &[(&str, &str)] = &[
        (
            MORE_ENGAGING,
            "Make it more engaging and attention-grabbing with hooks, questions, or bold statements",
        ),
        (
            MORE_CONCISE,
            "Make it shorter and punchier while keeping the core message",
        ),
        (
            MORE_CLEAR,
            "Make it clearer and easier to understand, simplify complex ideas",
        ),
        (
            MORE_VIRAL,
            "Optimize for maximum shares and engagement with viral patterns",
        ),
        (
            MORE_PROFESSIONAL,
            "Make it more polished and professional in tone",
        ),
        (
            MORE_CASUAL,
            "Make it more casual, friendly, and conversational",
        ),
    ];
}

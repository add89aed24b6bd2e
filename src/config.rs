use figment::{Figment, providers::Env};
use serde::Deserialize;
use std::sync::LazyLock;
use url::Url;

/// Process-wide configuration, loaded once from the environment.
/// `main` calls `dotenvy::dotenv()` before first access.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::load);

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
    /// Shared key guarding admin routes (brand-guideline writes).
    #[serde(default)]
    pub admin_key: String,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub xai: XaiConfig,
    #[serde(default)]
    pub serper: SerperConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XaiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_xai_base_url")]
    pub base_url: Url,
    #[serde(default = "default_xai_model")]
    pub model: String,
    #[serde(default = "default_xai_light_model")]
    pub light_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerperConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_serper_base_url")]
    pub base_url: Url,
    #[serde(default = "default_serper_timeout_secs")]
    pub timeout_secs: u64,
}

impl Config {
    /// Read `FORGE_*` variables, e.g. `FORGE_XAI__API_KEY`, `FORGE_DATABASE_URL`.
    pub fn load() -> Self {
        Figment::new()
            .merge(Env::prefixed("FORGE_").split("__"))
            .extract()
            .expect("FATAL: invalid ThreadForge configuration")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_url: default_database_url(),
            loglevel: default_loglevel(),
            admin_key: String::new(),
            cors_origins: default_cors_origins(),
            xai: XaiConfig::default(),
            serper: SerperConfig::default(),
        }
    }
}

impl Default for XaiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_xai_base_url(),
            model: default_xai_model(),
            light_model: default_xai_light_model(),
        }
    }
}

impl Default for SerperConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_serper_base_url(),
            timeout_secs: default_serper_timeout_secs(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_database_url() -> String {
    "sqlite:threadforge.sqlite".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:4200".to_string()]
}

fn default_xai_base_url() -> Url {
    Url::parse("https://api.x.ai/v1/").expect("static URL")
}

fn default_xai_model() -> String {
    "grok-2-latest".to_string()
}

fn default_xai_light_model() -> String {
    "grok-3-mini-fast".to_string()
}

fn default_serper_base_url() -> Url {
    Url::parse("https://google.serper.dev/").expect("static URL")
}

fn default_serper_timeout_secs() -> u64 {
    8
}

//! Configuration types for Dollsay.
//!
//! `AppConfig` represents the top-level `config.toml` that controls the
//! provider endpoint, the guest quota, the HTTP listener, and the emotion
//! keyword table. Every field has a default so an empty file is valid.

use serde::{Deserialize, Serialize};

use crate::chat::Emotion;
use crate::error::ConfigError;

/// Top-level configuration, loaded from `~/.dollsay/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub guest: GuestSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub emotion: EmotionSettings,
}

impl AppConfig {
    /// Reject values the backend cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guest.max_messages == 0 {
            return Err(ConfigError::Invalid(
                "guest.max_messages must be at least 1".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.model must not be empty".to_string()));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "provider.base_url must not be empty".to_string(),
            ));
        }
        if self.emotion.rules.iter().any(|r| r.keywords.iter().any(|k| k.is_empty())) {
            return Err(ConfigError::Invalid(
                "emotion.rules keywords must not be empty strings".to_string(),
            ));
        }
        Ok(())
    }
}

/// Remote chat-completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Label used in logs and spans.
    #[serde(default = "default_provider_name")]
    pub name: String,
    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Usually supplied through `DOLLSAY_API_KEY` instead.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_name() -> String {
    "deepseek".to_string()
}

fn default_base_url() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Guest quota settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestSettings {
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,
}

fn default_max_messages() -> u32 {
    20
}

impl Default for GuestSettings {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// One row of the emotion keyword table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionRule {
    pub emotion: Emotion,
    pub keywords: Vec<String>,
}

impl EmotionRule {
    pub fn new(emotion: Emotion, keywords: &[&str]) -> Self {
        Self {
            emotion,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Ordered emotion keyword table. Earlier rules win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionSettings {
    #[serde(default = "default_emotion_rules")]
    pub rules: Vec<EmotionRule>,
}

impl Default for EmotionSettings {
    fn default() -> Self {
        Self {
            rules: default_emotion_rules(),
        }
    }
}

/// The built-in keyword table: happy, sad, surprised, thinking.
pub fn default_emotion_rules() -> Vec<EmotionRule> {
    vec![
        EmotionRule::new(Emotion::Happy, &["开心", "太好了", "哈哈", "真棒"]),
        EmotionRule::new(Emotion::Sad, &["难过", "抱歉", "遗憾", "心疼"]),
        EmotionRule::new(Emotion::Surprised, &["哇", "真的吗", "不会吧", "天啊"]),
        EmotionRule::new(Emotion::Thinking, &["让我想想", "可能", "也许"]),
    ]
}

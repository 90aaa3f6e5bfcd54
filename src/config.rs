use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub provider_config: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS origin allow-list. Explicit rather than wildcard.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Overridden by the GROQ_API_KEY environment variable when set.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    #[serde(default = "default_speech_model")]
    pub speech_model: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_chat_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_transcription_model() -> String {
    "whisper-large-v3-turbo".to_string()
}

fn default_speech_model() -> String {
    "playai-tts".to_string()
}

fn default_voice() -> String {
    "Fritz-PlayAI".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Environment overrides take precedence over the file.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            if !key.is_empty() {
                self.provider_config.api_key = key;
            }
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            chat_model: default_chat_model(),
            transcription_model: default_transcription_model(),
            speech_model: default_speech_model(),
            voice: default_voice(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

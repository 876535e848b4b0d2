use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "wss://openspeech.bytedance.com/api/v1/tts/ws_binary";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tts: TtsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Everything a synthesis session needs, passed explicitly into the session
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub app_id: String,
    pub access_token: String,
    pub voice_type: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_ratio")]
    pub speed_ratio: f32,
    #[serde(default = "default_ratio")]
    pub volume_ratio: f32,
    #[serde(default = "default_ratio")]
    pub pitch_ratio: f32,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
        }
    }
}

/// Connection credentials, treated as opaque strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsCredentials {
    pub app_id: String,
    pub access_token: String,
    pub endpoint: String,
}

/// Voice selection and audio format for one request
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub voice_type: String,
    pub encoding: String,
    pub speed_ratio: f32,
    pub volume_ratio: f32,
    pub pitch_ratio: f32,
}

impl TtsConfig {
    pub fn credentials(&self) -> TtsCredentials {
        TtsCredentials {
            app_id: self.app_id.clone(),
            access_token: self.access_token.clone(),
            endpoint: self.endpoint.clone(),
        }
    }

    pub fn voice(&self) -> VoiceConfig {
        VoiceConfig {
            voice_type: self.voice_type.clone(),
            encoding: self.encoding.clone(),
            speed_ratio: self.speed_ratio,
            volume_ratio: self.volume_ratio,
            pitch_ratio: self.pitch_ratio,
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_encoding() -> String {
    "mp3".to_string()
}

fn default_ratio() -> f32 {
    1.0
}

fn default_read_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}

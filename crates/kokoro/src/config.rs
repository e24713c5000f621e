//! Client configuration.
//!
//! Holds the endpoint and the per-request defaults. The shell that owns the process fills this
//! in from flags, environment or a config file; nothing in this crate reads ambient state.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::KokoroError;
use crate::format::AudioFormat;

pub const DEFAULT_VOICE: &str = "af_bella";
pub const DEFAULT_MODEL: &str = "kokoro";
pub const DEFAULT_LANGUAGE: &str = "a";
pub const DEFAULT_SPEED: f32 = 1.0;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

pub const MIN_SPEED: f32 = 0.25;
pub const MAX_SPEED: f32 = 4.0;

const RUNPOD_API_BASE: &str = "https://api.runpod.ai/v2/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Full URL the envelope is POSTed to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<Url>,

    /// Bearer credential, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub voice: String,
    pub speed: f32,
    pub model: String,
    pub response_format: AudioFormat,

    /// Phonemizer language code (`a` = American English, `b` = British English, ...)
    pub language: String,

    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            api_key: None,
            voice: DEFAULT_VOICE.to_string(),
            speed: DEFAULT_SPEED,
            model: DEFAULT_MODEL.to_string(),
            response_format: AudioFormat::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The synchronous RunPod route for a serverless endpoint id.
    pub fn runpod_endpoint(endpoint_id: &str) -> Result<Url, KokoroError> {
        let id = endpoint_id.trim();
        if id.is_empty() || id.contains('/') {
            return Err(KokoroError::InvalidOperation(format!(
                "invalid endpoint id '{endpoint_id}'"
            )));
        }
        Ok(Url::parse(RUNPOD_API_BASE)?.join(&format!("{id}/runsync"))?)
    }

    pub fn endpoint_url(mut self, url: Url) -> Self {
        self.endpoint_url = Some(url);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn response_format(mut self, format: AudioFormat) -> Self {
        self.response_format = format;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn timeout_seconds(mut self, secs: u64) -> Self {
        self.timeout_seconds = secs;
        self
    }

    pub fn endpoint(&self) -> Result<&Url, KokoroError> {
        self.endpoint_url.as_ref().ok_or_else(|| {
            KokoroError::InvalidOperation("no endpoint URL configured".to_string())
        })
    }

    /// The configured key, if any non-blank one is set.
    pub fn bearer_token(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}

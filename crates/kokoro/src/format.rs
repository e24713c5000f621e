//! Audio formats and the output artifacts handed back to callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KokoroError;

pub const VOICE_BLEND_MIME: &str = "application/octet-stream";
pub const VOICE_BLEND_EXTENSION: &str = "pt";
pub const SUBTITLES_MIME: &str = "text/plain";

/// Output encodings the endpoint can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
    Opus,
    Flac,
    Pcm,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 5] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::Opus,
        AudioFormat::Flac,
        AudioFormat::Pcm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Opus => "opus",
            AudioFormat::Flac => "flac",
            AudioFormat::Pcm => "pcm",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn mime_type(&self) -> String {
        format!("audio/{}", self.as_str())
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = KokoroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AudioFormat::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                KokoroError::InvalidOperation(format!(
                    "unsupported response format '{s}' (expected one of mp3, wav, opus, flac, pcm)"
                ))
            })
    }
}

/// A finished output: bytes plus the MIME type and conventional file name to store them under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl Artifact {
    pub fn audio(bytes: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            bytes,
            mime_type: format.mime_type(),
            file_name: format!("output.{}", format.extension()),
        }
    }

    /// Captioned speech is always requested as mp3.
    pub fn captioned_audio(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: AudioFormat::Mp3.mime_type(),
            file_name: "captioned.mp3".to_string(),
        }
    }

    pub fn voice_blend(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: VOICE_BLEND_MIME.to_string(),
            file_name: format!("combined_voice.{VOICE_BLEND_EXTENSION}"),
        }
    }

    pub fn subtitles(srt: String) -> Self {
        Self {
            bytes: srt.into_bytes(),
            mime_type: SUBTITLES_MIME.to_string(),
            file_name: "captioned.srt".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

//! Request Builder: turns an [`Operation`] into the wire envelope the worker expects.
//!
//! The worker takes a single `input` object. Plain synthesis sends the OpenAI-style speech
//! body; every other operation adds an `endpoint`/`method` pair naming the route the worker
//! should forward to. Nothing here touches the network.

use http::{
    Method, Request,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::Serialize;

use crate::config::{ClientConfig, MAX_SPEED, MIN_SPEED};
use crate::error::KokoroError;
use crate::format::AudioFormat;
use crate::operation::{
    CaptionRequest, CombineRequest, Operation, OperationKind, PhonemizeRequest, Route,
    SpeechRequest,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderEnvelope {
    pub input: EnvelopeInput,

    #[serde(skip)]
    kind: OperationKind,
}

impl ProviderEnvelope {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn to_json(&self) -> Result<Vec<u8>, KokoroError> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeInput {
    #[serde(flatten)]
    pub route: Option<Route>,

    #[serde(flatten)]
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Speech(SpeechBody),
    ListVoices {},
    CombineVoices { voices: String },
    CaptionedSpeech(CaptionBody),
    Phonemize { text: String, language: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechBody {
    pub model: String,
    #[serde(rename = "input")]
    pub text: String,
    pub voice: String,
    pub response_format: AudioFormat,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionBody {
    #[serde(rename = "input")]
    pub text: String,
    pub voice: String,
    pub return_timestamps: bool,
    pub response_format: AudioFormat,
}

/// Builds the envelope for `op`, filling unset parameters from `cfg`.
pub fn build(op: &Operation, cfg: &ClientConfig) -> Result<ProviderEnvelope, KokoroError> {
    let kind = op.kind();
    let payload = match op {
        Operation::Synthesize(req) => Payload::Speech(speech_body(req, cfg)?),
        Operation::ListVoices => Payload::ListVoices {},
        Operation::CombineVoices(req) => combine_payload(req)?,
        Operation::CaptionedSynthesize(req) => Payload::CaptionedSpeech(caption_body(req, cfg)?),
        Operation::Phonemize(req) => phonemize_payload(req, cfg)?,
    };

    log::debug!("built {kind} envelope");
    Ok(ProviderEnvelope {
        input: EnvelopeInput {
            route: kind.route(),
            payload,
        },
        kind,
    })
}

fn speech_body(req: &SpeechRequest, cfg: &ClientConfig) -> Result<SpeechBody, KokoroError> {
    let text = require_text(&req.text, "synthesize")?;
    let voice = resolve_voice(req.voice.as_deref(), cfg)?;
    let speed = req.speed.unwrap_or(cfg.speed);
    validate_speed(speed)?;

    Ok(SpeechBody {
        model: req.model.clone().unwrap_or_else(|| cfg.model.clone()),
        text,
        voice,
        response_format: req.format.unwrap_or(cfg.response_format),
        speed,
    })
}

fn combine_payload(req: &CombineRequest) -> Result<Payload, KokoroError> {
    if req.identifiers().next().is_none() {
        return Err(KokoroError::InvalidOperation(
            "combine_voices requires at least one voice identifier".into(),
        ));
    }
    Ok(Payload::CombineVoices {
        voices: req.voices.clone(),
    })
}

fn caption_body(req: &CaptionRequest, cfg: &ClientConfig) -> Result<CaptionBody, KokoroError> {
    Ok(CaptionBody {
        text: require_text(&req.text, "captioned_synthesize")?,
        voice: resolve_voice(req.voice.as_deref(), cfg)?,
        return_timestamps: true,
        response_format: AudioFormat::Mp3,
    })
}

fn phonemize_payload(req: &PhonemizeRequest, cfg: &ClientConfig) -> Result<Payload, KokoroError> {
    let text = require_text(&req.text, "phonemize")?;
    let language = req.language.as_deref().unwrap_or(&cfg.language).trim();
    if language.is_empty() {
        return Err(KokoroError::InvalidOperation(
            "phonemize requires a language code".into(),
        ));
    }
    Ok(Payload::Phonemize {
        text,
        language: language.to_string(),
    })
}

fn require_text(text: &str, kind: &str) -> Result<String, KokoroError> {
    if text.trim().is_empty() {
        return Err(KokoroError::InvalidOperation(format!(
            "{kind} request text is empty"
        )));
    }
    Ok(text.to_string())
}

fn resolve_voice(voice: Option<&str>, cfg: &ClientConfig) -> Result<String, KokoroError> {
    let voice = voice.unwrap_or(&cfg.voice).trim();
    if voice.is_empty() {
        return Err(KokoroError::InvalidOperation("voice must not be empty".into()));
    }
    Ok(voice.to_string())
}

fn validate_speed(speed: f32) -> Result<(), KokoroError> {
    if !speed.is_finite() || !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
        return Err(KokoroError::InvalidOperation(format!(
            "speed {speed} is outside [{MIN_SPEED}, {MAX_SPEED}]"
        )));
    }
    Ok(())
}

/// Wraps an envelope into the POST the transport sends.
pub fn http_request(
    cfg: &ClientConfig,
    envelope: &ProviderEnvelope,
) -> Result<Request<Vec<u8>>, KokoroError> {
    let url = cfg.endpoint()?;
    let json_body = envelope.to_json()?;

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(url.as_str())
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = cfg.bearer_token() {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    Ok(builder.body(json_body)?)
}

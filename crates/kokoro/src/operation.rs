use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::AudioFormat;

/// The logical action requested from the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Synthesize,
    ListVoices,
    CombineVoices,
    CaptionedSynthesize,
    Phonemize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    Get,
    Post,
}

/// Sub-path and verb the worker forwards a non-synthesis operation to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    pub endpoint: &'static str,
    pub method: RouteMethod,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Synthesize => "synthesize",
            OperationKind::ListVoices => "list_voices",
            OperationKind::CombineVoices => "combine_voices",
            OperationKind::CaptionedSynthesize => "captioned_synthesize",
            OperationKind::Phonemize => "phonemize",
        }
    }

    /// Plain synthesis goes to the worker's default handler and carries no route.
    pub fn route(&self) -> Option<Route> {
        let (endpoint, method) = match self {
            OperationKind::Synthesize => return None,
            OperationKind::ListVoices => ("/v1/audio/voices", RouteMethod::Get),
            OperationKind::CombineVoices => ("/v1/audio/voices/combine", RouteMethod::Post),
            OperationKind::CaptionedSynthesize => ("/dev/captioned_speech", RouteMethod::Post),
            OperationKind::Phonemize => ("/dev/phonemize", RouteMethod::Post),
        };
        Some(Route { endpoint, method })
    }

    /// Whether the result fields sit under an extra `result` key.
    pub fn nests_result(&self) -> bool {
        matches!(
            self,
            OperationKind::CaptionedSynthesize | OperationKind::Phonemize
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for plain text-to-speech.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SpeechRequest {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<AudioFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

impl SpeechRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn format(mut self, format: AudioFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Voices to blend, already joined by `+` or `,`. The service owns the parsing.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CombineRequest {
    pub voices: String,
}

impl CombineRequest {
    pub fn new(voices: impl Into<String>) -> Self {
        Self {
            voices: voices.into(),
        }
    }

    /// Joins identifiers with `+`.
    pub fn from_voices<I, S>(voices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = voices
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("+");
        Self { voices: joined }
    }

    /// Identifiers as the service will see them, split on `+` and `,`.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.voices
            .split(['+', ','])
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Speech with word-level timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CaptionRequest {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl CaptionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PhonemizeRequest {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl PhonemizeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// One request to the endpoint, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    Synthesize(SpeechRequest),
    ListVoices,
    CombineVoices(CombineRequest),
    CaptionedSynthesize(CaptionRequest),
    Phonemize(PhonemizeRequest),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Synthesize(_) => OperationKind::Synthesize,
            Operation::ListVoices => OperationKind::ListVoices,
            Operation::CombineVoices(_) => OperationKind::CombineVoices,
            Operation::CaptionedSynthesize(_) => OperationKind::CaptionedSynthesize,
            Operation::Phonemize(_) => OperationKind::Phonemize,
        }
    }
}

impl From<SpeechRequest> for Operation {
    fn from(req: SpeechRequest) -> Self {
        Operation::Synthesize(req)
    }
}

impl From<CombineRequest> for Operation {
    fn from(req: CombineRequest) -> Self {
        Operation::CombineVoices(req)
    }
}

impl From<CaptionRequest> for Operation {
    fn from(req: CaptionRequest) -> Self {
        Operation::CaptionedSynthesize(req)
    }
}

impl From<PhonemizeRequest> for Operation {
    fn from(req: PhonemizeRequest) -> Self {
        Operation::Phonemize(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_synthesis_is_unrouted() {
        assert!(OperationKind::Synthesize.route().is_none());
        let voices = OperationKind::ListVoices.route().unwrap();
        assert_eq!(voices.endpoint, "/v1/audio/voices");
        assert_eq!(voices.method, RouteMethod::Get);
        let phon = OperationKind::Phonemize.route().unwrap();
        assert_eq!(phon.endpoint, "/dev/phonemize");
        assert_eq!(phon.method, RouteMethod::Post);
    }

    #[test]
    fn nested_result_kinds() {
        assert!(OperationKind::CaptionedSynthesize.nests_result());
        assert!(OperationKind::Phonemize.nests_result());
        assert!(!OperationKind::Synthesize.nests_result());
        assert!(!OperationKind::ListVoices.nests_result());
        assert!(!OperationKind::CombineVoices.nests_result());
    }

    #[test]
    fn combine_identifiers_split_on_both_separators() {
        let req = CombineRequest::new("af_bella+af_sky, am_adam");
        let ids: Vec<_> = req.identifiers().collect();
        assert_eq!(ids, vec!["af_bella", "af_sky", "am_adam"]);
        assert_eq!(CombineRequest::new("+,").identifiers().count(), 0);
    }

    #[test]
    fn combine_from_voices_joins_with_plus() {
        let req = CombineRequest::from_voices(["af_bella", "af_sky"]);
        assert_eq!(req.voices, "af_bella+af_sky");
    }

    #[test]
    fn operation_is_tagged_by_kind() {
        let op: Operation = SpeechRequest::new().text("hi").speed(1.5).into();
        assert_eq!(op.kind(), OperationKind::Synthesize);
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(v["kind"], "synthesize");
        assert_eq!(v["text"], "hi");

        let v = serde_json::to_value(Operation::ListVoices).unwrap();
        assert_eq!(v, serde_json::json!({"kind": "list_voices"}));
    }
}

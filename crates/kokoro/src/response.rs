//! Response Normalizer & Decoder.
//!
//! RunPod-style workers answer in one of two shapes depending on how the endpoint is
//! deployed: the result fields directly, or wrapped under `output` next to job bookkeeping
//! (`id`, `status`). Captioned speech and phonemization may nest once more under `result`.
//! [`normalize`] peels at most those two layers and then looks for a fixed set of keys per
//! operation kind. Anything it does not recognize is returned intact.

use base64::Engine;
use http::Response;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::captions::WordTiming;
use crate::error::KokoroError;
use crate::operation::OperationKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioResult {
    pub bytes: Vec<u8>,
}

impl AudioResult {
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionedResult {
    pub audio: Vec<u8>,
    /// Absent when the worker returned audio only.
    pub timestamps: Option<Vec<WordTiming>>,
}

/// Phoneme token ids, or whatever the worker sent when they are not plain integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tokens {
    Ids(Vec<i64>),
    Opaque(Value),
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tokens::Ids(ids) => write!(f, "{ids:?}"),
            Tokens::Opaque(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhonemeResult {
    pub phonemes: String,
    pub tokens: Option<Tokens>,
}

/// Provider-agnostic outcome of one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResult {
    Audio(AudioResult),
    VoiceList(Vec<String>),
    VoiceBlend(Vec<u8>),
    Captioned(CaptionedResult),
    Phonemes(PhonemeResult),
    /// The worker reported an `error` field.
    Error { message: String },
    /// None of the expected keys were present. Carries the response exactly as received.
    Unrecognized { raw: Value },
}

impl NormalizedResult {
    /// Turns the two failure variants into errors.
    pub fn into_success(self) -> Result<Self, KokoroError> {
        match self {
            NormalizedResult::Error { message } => Err(KokoroError::UpstreamError(message)),
            NormalizedResult::Unrecognized { raw } => Err(KokoroError::UnrecognizedShape { raw }),
            other => Ok(other),
        }
    }
}

/// RunPod job states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    InQueue,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    TimedOut,
    Other(String),
}

impl JobStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "IN_QUEUE" => JobStatus::InQueue,
            "IN_PROGRESS" => JobStatus::InProgress,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            "CANCELLED" => JobStatus::Cancelled,
            "TIMED_OUT" => JobStatus::TimedOut,
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// The job has not finished; its output is not in this response.
    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::InQueue | JobStatus::InProgress)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::InQueue => "IN_QUEUE",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Cancelled => "CANCELLED",
            JobStatus::TimedOut => "TIMED_OUT",
            JobStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    pub id: String,
    pub status: JobStatus,
}

/// Job bookkeeping, when the response carries both `id` and `status` at the top level.
pub fn job_info(raw: &Value) -> Option<JobInfo> {
    let obj = raw.as_object()?;
    let id = match obj.get("id")? {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let status = JobStatus::parse(obj.get("status")?.as_str()?);
    Some(JobInfo { id, status })
}

/// A parsed HTTP response: job bookkeeping, the raw JSON, and the normalized result.
#[derive(Debug, Clone, PartialEq)]
pub struct KokoroResponse {
    pub job: Option<JobInfo>,
    pub raw: Value,
    pub result: NormalizedResult,
}

/// Normalizes a raw JSON response for the operation that produced it.
pub fn normalize(raw: &Value, kind: OperationKind) -> Result<NormalizedResult, KokoroError> {
    let Some(effective) = effective_object(raw) else {
        log::warn!("{kind} response is not a JSON object");
        return Ok(unrecognized(raw));
    };

    let result = if kind.nests_result() {
        match effective.get("result") {
            Some(Value::Object(inner)) => inner,
            _ => effective,
        }
    } else {
        effective
    };

    let normalized = match kind {
        OperationKind::Synthesize => {
            if let Some(b64) = result.get("audio_base64") {
                NormalizedResult::Audio(AudioResult {
                    bytes: decode_base64(b64, "audio_base64")?,
                })
            } else if let Some(err) = result.get("error") {
                NormalizedResult::Error {
                    message: error_message(err),
                }
            } else {
                unrecognized(raw)
            }
        }
        OperationKind::ListVoices => match result.get("voices").and_then(voice_names) {
            Some(voices) => NormalizedResult::VoiceList(voices),
            None => unrecognized(raw),
        },
        OperationKind::CombineVoices => match result.get("voice_file_base64") {
            Some(b64) => NormalizedResult::VoiceBlend(decode_base64(b64, "voice_file_base64")?),
            None => unrecognized(raw),
        },
        OperationKind::CaptionedSynthesize => match result.get("audio") {
            Some(b64) => {
                let audio = decode_base64(b64, "audio")?;
                let timestamps = result
                    .get("timestamps")
                    .filter(|v| !v.is_null())
                    .map(parse_timestamps)
                    .transpose()?;
                NormalizedResult::Captioned(CaptionedResult { audio, timestamps })
            }
            None => unrecognized(raw),
        },
        OperationKind::Phonemize => match result.get("phonemes") {
            Some(phonemes) => NormalizedResult::Phonemes(PhonemeResult {
                phonemes: match phonemes {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                tokens: result
                    .get("tokens")
                    .filter(|v| !v.is_null())
                    .map(parse_tokens),
            }),
            None => unrecognized(raw),
        },
    };

    if let NormalizedResult::Unrecognized { .. } = &normalized {
        log::warn!("{kind} response matched no known shape");
    }
    Ok(normalized)
}

/// Status check, JSON parse and normalization of a transport response.
pub fn parse_response(
    resp: Response<Vec<u8>>,
    kind: OperationKind,
) -> Result<KokoroResponse, KokoroError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(KokoroError::HttpStatus {
            status: status.as_u16(),
            body: String::from_utf8_lossy(resp.body()).into_owned(),
        });
    }

    let raw: Value = serde_json::from_slice(resp.body()).map_err(|e| {
        KokoroError::ResponseFormatError {
            message: format!("Failed to decode response body as JSON: {e}"),
            raw_response: String::from_utf8_lossy(resp.body()).into_owned(),
        }
    })?;

    let job = job_info(&raw);
    if let Some(job) = &job {
        log::debug!("job {} status {}", job.id, job.status);
    }
    let result = normalize(&raw, kind)?;
    Ok(KokoroResponse { job, raw, result })
}

fn effective_object(raw: &Value) -> Option<&Map<String, Value>> {
    let obj = raw.as_object()?;
    match obj.get("output") {
        Some(output) => {
            log::debug!("unwrapping `output` envelope");
            output.as_object()
        }
        None => Some(obj),
    }
}

fn unrecognized(raw: &Value) -> NormalizedResult {
    NormalizedResult::Unrecognized { raw: raw.clone() }
}

fn decode_base64(value: &Value, field: &str) -> Result<Vec<u8>, KokoroError> {
    let Value::String(encoded) = value else {
        return Err(KokoroError::DecodeError(format!(
            "`{field}` is not a base64 string"
        )));
    };
    // line-wrapped payloads are accepted
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| KokoroError::DecodeError(format!("`{field}`: {e}")))
}

fn error_message(err: &Value) -> String {
    match err {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn voice_names(voices: &Value) -> Option<Vec<String>> {
    voices
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn parse_timestamps(value: &Value) -> Result<Vec<WordTiming>, KokoroError> {
    serde_json::from_value(value.clone()).map_err(|e| KokoroError::ResponseFormatError {
        message: format!("Malformed timestamps: {e}"),
        raw_response: value.to_string(),
    })
}

fn parse_tokens(value: &Value) -> Tokens {
    serde_json::from_value::<Vec<i64>>(value.clone())
        .map(Tokens::Ids)
        .unwrap_or_else(|_| Tokens::Opaque(value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HELLO_B64: &str = "aGVsbG8="; // "hello"

    #[test]
    fn synthesize_wrapped_audio() {
        let raw = json!({"id": "job-1", "status": "COMPLETED", "output": {"audio_base64": HELLO_B64}});
        let res = normalize(&raw, OperationKind::Synthesize).unwrap();
        match res {
            NormalizedResult::Audio(audio) => {
                assert_eq!(audio.bytes, b"hello");
                assert_eq!(audio.byte_length(), 5);
            }
            other => panic!("expected audio, got {other:?}"),
        }
    }

    #[test]
    fn synthesize_direct_audio() {
        let raw = json!({"audio_base64": HELLO_B64});
        assert!(matches!(
            normalize(&raw, OperationKind::Synthesize).unwrap(),
            NormalizedResult::Audio(_)
        ));
    }

    #[test]
    fn synthesize_error_field() {
        let raw = json!({"output": {"error": "boom"}});
        assert_eq!(
            normalize(&raw, OperationKind::Synthesize).unwrap(),
            NormalizedResult::Error {
                message: "boom".into()
            }
        );
    }

    #[test]
    fn audio_takes_priority_over_error() {
        let raw = json!({"output": {"audio_base64": HELLO_B64, "error": "ignored"}});
        assert!(matches!(
            normalize(&raw, OperationKind::Synthesize).unwrap(),
            NormalizedResult::Audio(_)
        ));
    }

    #[test]
    fn failed_job_error_at_top_level() {
        let raw = json!({"id": "j", "status": "FAILED", "error": "worker crashed"});
        assert_eq!(
            normalize(&raw, OperationKind::Synthesize).unwrap(),
            NormalizedResult::Error {
                message: "worker crashed".into()
            }
        );
    }

    #[test]
    fn structured_error_is_stringified() {
        let raw = json!({"error": {"code": 7}});
        assert_eq!(
            normalize(&raw, OperationKind::Synthesize).unwrap(),
            NormalizedResult::Error {
                message: "{\"code\":7}".into()
            }
        );
    }

    #[test]
    fn malformed_base64_is_decode_error() {
        let raw = json!({"output": {"audio_base64": "not base64!!"}});
        let err = normalize(&raw, OperationKind::Synthesize).unwrap_err();
        assert!(matches!(err, KokoroError::DecodeError(_)));

        let raw = json!({"output": {"audio_base64": 12}});
        let err = normalize(&raw, OperationKind::Synthesize).unwrap_err();
        assert!(matches!(err, KokoroError::DecodeError(_)));
    }

    #[test]
    fn wrapped_base64_is_accepted() {
        let raw = json!({"audio_base64": "aGVs\nbG8="});
        match normalize(&raw, OperationKind::Synthesize).unwrap() {
            NormalizedResult::Audio(audio) => assert_eq!(audio.bytes, b"hello"),
            other => panic!("expected audio, got {other:?}"),
        }
    }

    #[test]
    fn unknown_shape_keeps_raw_payload() {
        let raw = json!({"id": "j", "status": "IN_QUEUE"});
        assert_eq!(
            normalize(&raw, OperationKind::Synthesize).unwrap(),
            NormalizedResult::Unrecognized { raw: raw.clone() }
        );

        let raw = json!({"output": {"something": "else"}});
        assert_eq!(
            normalize(&raw, OperationKind::CombineVoices).unwrap(),
            NormalizedResult::Unrecognized { raw: raw.clone() }
        );
    }

    #[test]
    fn missing_voices_or_phonemes_key_is_unrecognized() {
        let raw = json!({"output": {"names": ["af_bella"]}});
        assert_eq!(
            normalize(&raw, OperationKind::ListVoices).unwrap(),
            NormalizedResult::Unrecognized { raw: raw.clone() }
        );

        let raw = json!({"output": {"result": {"tokens": [1]}}});
        assert_eq!(
            normalize(&raw, OperationKind::Phonemize).unwrap(),
            NormalizedResult::Unrecognized { raw: raw.clone() }
        );

        let raw = json!({"tokens": [4, 5]});
        assert_eq!(
            normalize(&raw, OperationKind::Phonemize).unwrap(),
            NormalizedResult::Unrecognized { raw: raw.clone() }
        );
    }

    #[test]
    fn non_object_output_is_unrecognized() {
        for raw in [json!({"output": null}), json!({"output": "text"}), json!([1, 2])] {
            assert_eq!(
                normalize(&raw, OperationKind::Synthesize).unwrap(),
                NormalizedResult::Unrecognized { raw: raw.clone() }
            );
        }
    }

    #[test]
    fn voice_list() {
        let raw = json!({"output": {"voices": ["af_bella", "af_sky"]}});
        assert_eq!(
            normalize(&raw, OperationKind::ListVoices).unwrap(),
            NormalizedResult::VoiceList(vec!["af_bella".into(), "af_sky".into()])
        );
    }

    #[test]
    fn voice_list_with_non_string_entries_is_unrecognized() {
        let raw = json!({"voices": [{"name": "af_bella"}]});
        assert!(matches!(
            normalize(&raw, OperationKind::ListVoices).unwrap(),
            NormalizedResult::Unrecognized { .. }
        ));
    }

    #[test]
    fn voice_blend() {
        let raw = json!({"output": {"voice_file_base64": HELLO_B64}});
        assert_eq!(
            normalize(&raw, OperationKind::CombineVoices).unwrap(),
            NormalizedResult::VoiceBlend(b"hello".to_vec())
        );
    }

    #[test]
    fn captioned_with_nested_result_and_no_output() {
        let raw = json!({
            "result": {
                "audio": HELLO_B64,
                "timestamps": [
                    {"word": "Hello", "start_time": 0.0, "end_time": 0.5},
                    {"word": "world", "start_time": 0.5, "end_time": 1.0}
                ]
            }
        });
        match normalize(&raw, OperationKind::CaptionedSynthesize).unwrap() {
            NormalizedResult::Captioned(c) => {
                assert_eq!(c.audio, b"hello");
                let ts = c.timestamps.expect("timestamps present");
                assert_eq!(ts.len(), 2);
                assert_eq!(ts[1].word, "world");
            }
            other => panic!("expected captioned, got {other:?}"),
        }
    }

    #[test]
    fn captioned_without_result_level_or_timestamps() {
        let raw = json!({"output": {"audio": HELLO_B64}});
        assert_eq!(
            normalize(&raw, OperationKind::CaptionedSynthesize).unwrap(),
            NormalizedResult::Captioned(CaptionedResult {
                audio: b"hello".to_vec(),
                timestamps: None,
            })
        );
    }

    #[test]
    fn captioned_missing_audio_is_unrecognized() {
        let raw = json!({"output": {"result": {"timestamps": []}}});
        assert_eq!(
            normalize(&raw, OperationKind::CaptionedSynthesize).unwrap(),
            NormalizedResult::Unrecognized { raw: raw.clone() }
        );
    }

    #[test]
    fn captioned_malformed_timestamps() {
        let raw = json!({"result": {"audio": HELLO_B64, "timestamps": [{"word": 1}]}});
        let err = normalize(&raw, OperationKind::CaptionedSynthesize).unwrap_err();
        assert!(matches!(err, KokoroError::ResponseFormatError { .. }));
    }

    #[test]
    fn phonemes_with_token_ids() {
        let raw = json!({"output": {"result": {"phonemes": "həlˈO", "tokens": [50, 83, 54]}}});
        assert_eq!(
            normalize(&raw, OperationKind::Phonemize).unwrap(),
            NormalizedResult::Phonemes(PhonemeResult {
                phonemes: "həlˈO".into(),
                tokens: Some(Tokens::Ids(vec![50, 83, 54])),
            })
        );
    }

    #[test]
    fn phonemes_with_opaque_or_missing_tokens() {
        let raw = json!({"phonemes": "a", "tokens": "opaque"});
        match normalize(&raw, OperationKind::Phonemize).unwrap() {
            NormalizedResult::Phonemes(p) => {
                assert_eq!(p.tokens, Some(Tokens::Opaque(json!("opaque"))))
            }
            other => panic!("expected phonemes, got {other:?}"),
        }

        let raw = json!({"result": {"phonemes": "a"}});
        match normalize(&raw, OperationKind::Phonemize).unwrap() {
            NormalizedResult::Phonemes(p) => assert!(p.tokens.is_none()),
            other => panic!("expected phonemes, got {other:?}"),
        }
    }

    #[test]
    fn result_key_ignored_for_flat_kinds() {
        let raw = json!({"output": {"result": {"audio_base64": HELLO_B64}}});
        assert!(matches!(
            normalize(&raw, OperationKind::Synthesize).unwrap(),
            NormalizedResult::Unrecognized { .. }
        ));
    }

    #[test]
    fn into_success_maps_failures() {
        let err = NormalizedResult::Error {
            message: "boom".into(),
        }
        .into_success()
        .unwrap_err();
        assert!(matches!(err, KokoroError::UpstreamError(m) if m == "boom"));

        let raw = json!({"x": 1});
        let err = NormalizedResult::Unrecognized { raw: raw.clone() }
            .into_success()
            .unwrap_err();
        assert!(matches!(err, KokoroError::UnrecognizedShape { raw: r } if r == raw));

        let ok = NormalizedResult::VoiceList(vec![]).into_success().unwrap();
        assert_eq!(ok, NormalizedResult::VoiceList(vec![]));
    }

    #[test]
    fn job_info_from_bookkeeping_fields() {
        let info = job_info(&json!({"id": "abc", "status": "IN_PROGRESS"})).unwrap();
        assert_eq!(info.id, "abc");
        assert!(info.status.is_pending());

        let info = job_info(&json!({"id": "abc", "status": "WEIRD"})).unwrap();
        assert_eq!(info.status, JobStatus::Other("WEIRD".into()));
        assert!(!info.status.is_pending());

        assert!(job_info(&json!({"output": {}})).is_none());
        assert!(job_info(&json!({"id": "abc"})).is_none());
    }

    fn http_response(status: u16, body: &str) -> Response<Vec<u8>> {
        Response::builder()
            .status(status)
            .body(body.as_bytes().to_vec())
            .unwrap()
    }

    #[test]
    fn parse_response_non_2xx_keeps_body() {
        let err = parse_response(http_response(500, "upstream exploded"), OperationKind::Synthesize)
            .unwrap_err();
        match err {
            KokoroError::HttpStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("expected HttpStatus, got {other}"),
        }
    }

    #[test]
    fn parse_response_non_json_body() {
        let err = parse_response(http_response(200, "<html>"), OperationKind::ListVoices)
            .unwrap_err();
        match err {
            KokoroError::ResponseFormatError { raw_response, .. } => {
                assert_eq!(raw_response, "<html>")
            }
            other => panic!("expected ResponseFormatError, got {other}"),
        }
    }

    #[test]
    fn parse_response_collects_job_and_result() {
        let body = json!({"id": "j1", "status": "COMPLETED", "output": {"voices": ["af_bella"]}});
        let resp = parse_response(
            http_response(200, &body.to_string()),
            OperationKind::ListVoices,
        )
        .unwrap();
        assert_eq!(resp.job.as_ref().map(|j| j.id.as_str()), Some("j1"));
        assert_eq!(resp.raw, body);
        assert_eq!(
            resp.result,
            NormalizedResult::VoiceList(vec!["af_bella".into()])
        );
    }
}

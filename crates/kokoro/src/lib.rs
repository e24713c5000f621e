//! Client core for Kokoro text-to-speech workers deployed behind an HTTP endpoint
//! (RunPod serverless or a self-hosted equivalent).
//!
//! # Overview
//! The crate covers the translation layer between a caller and the worker:
//!
//! - building the `{"input": {...}}` envelope for each operation (speech, voice listing,
//!   voice blending, captioned speech, phonemization)
//! - normalizing the worker's response, wrapped or not, into one result type and
//!   decoding base64 payloads
//! - rendering word timings as SRT subtitles
//!
//! Building and parsing are pure; the `http-client` feature adds a reqwest transport and
//! [`KokoroClient`] that runs the whole round trip.

/// Operation descriptors and their parameters
pub mod operation;

/// Request Builder
pub mod envelope;

/// Response Normalizer & Decoder
pub mod response;

/// SRT generation from word timings
pub mod captions;

/// Audio formats and output artifacts
pub mod format;

pub mod config;

/// Error types and handling
pub mod error;

pub mod provider;

#[cfg(all(feature = "http-client", not(target_arch = "wasm32")))]
pub mod outbound;

#[cfg(all(feature = "http-client", not(target_arch = "wasm32")))]
mod client;

#[cfg(all(feature = "http-client", not(target_arch = "wasm32")))]
pub use client::KokoroClient;

pub use captions::{WordTiming, format_timestamp, to_srt};
pub use config::ClientConfig;
pub use envelope::{ProviderEnvelope, build};
pub use error::KokoroError;
pub use format::{Artifact, AudioFormat};
pub use operation::{
    CaptionRequest, CombineRequest, Operation, OperationKind, PhonemizeRequest, SpeechRequest,
};
pub use provider::HTTPKokoroProvider;
pub use response::{KokoroResponse, NormalizedResult, normalize, parse_response};

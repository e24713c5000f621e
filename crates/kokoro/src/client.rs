use crate::config::ClientConfig;
use crate::error::KokoroError;
use crate::operation::{CaptionRequest, CombineRequest, Operation, PhonemizeRequest, SpeechRequest};
use crate::outbound::call_outbound;
use crate::provider::HTTPKokoroProvider;
use crate::response::KokoroResponse;

/// Builds, sends and normalizes one operation at a time. Holds no per-request state.
pub struct KokoroClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl KokoroClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn execute(&self, op: &Operation) -> Result<KokoroResponse, KokoroError> {
        let req = self.config.operation_request(op)?;
        log::info!("sending {} request to {}", op.kind(), req.uri());
        let resp = call_outbound(&self.http, req, self.config.timeout()).await?;
        self.config.parse_operation(op.kind(), resp)
    }

    pub async fn synthesize(&self, req: SpeechRequest) -> Result<KokoroResponse, KokoroError> {
        self.execute(&req.into()).await
    }

    pub async fn list_voices(&self) -> Result<KokoroResponse, KokoroError> {
        self.execute(&Operation::ListVoices).await
    }

    pub async fn combine_voices(
        &self,
        voices: impl Into<String>,
    ) -> Result<KokoroResponse, KokoroError> {
        self.execute(&CombineRequest::new(voices).into()).await
    }

    pub async fn captioned_speech(
        &self,
        req: CaptionRequest,
    ) -> Result<KokoroResponse, KokoroError> {
        self.execute(&req.into()).await
    }

    pub async fn phonemize(&self, req: PhonemizeRequest) -> Result<KokoroResponse, KokoroError> {
        self.execute(&req.into()).await
    }
}

use http::{Request, Response};

use crate::config::ClientConfig;
use crate::envelope;
use crate::error::KokoroError;
use crate::operation::{Operation, OperationKind};
use crate::response::{self, KokoroResponse};

/// Splits an operation into a request to send and a parser for what comes back.
/// Whoever implements this performs no I/O; the transport sits between the two calls.
pub trait HTTPKokoroProvider: Send + Sync {
    fn operation_request(&self, op: &Operation) -> Result<Request<Vec<u8>>, KokoroError>;
    fn parse_operation(
        &self,
        kind: OperationKind,
        resp: Response<Vec<u8>>,
    ) -> Result<KokoroResponse, KokoroError>;
}

impl HTTPKokoroProvider for ClientConfig {
    fn operation_request(&self, op: &Operation) -> Result<Request<Vec<u8>>, KokoroError> {
        let envelope = envelope::build(op, self)?;
        envelope::http_request(self, &envelope)
    }

    fn parse_operation(
        &self,
        kind: OperationKind,
        resp: Response<Vec<u8>>,
    ) -> Result<KokoroResponse, KokoroError> {
        response::parse_response(resp, kind)
    }
}

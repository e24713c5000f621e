use http::{Request, Response};
use std::time::Duration;

use crate::error::KokoroError;

/// Sends `req` and hands back whatever the server answered.
///
/// Non-2xx statuses are returned as responses so their body text survives; only connection
/// failures and timeouts are errors. Nothing is retried.
#[cfg_attr(feature = "tracing", tracing::instrument(name = "kokoro_outbound", skip_all, fields(uri = %req.uri())))]
pub async fn call_outbound(
    client: &reqwest::Client,
    req: Request<Vec<u8>>,
    timeout: Duration,
) -> Result<Response<Vec<u8>>, KokoroError> {
    let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
        .map_err(|e| KokoroError::HttpError(format!("Invalid HTTP method: {e}")))?;

    let mut rb = client
        .request(method, req.uri().to_string())
        .timeout(timeout);

    for (name, value) in req.headers().iter() {
        rb = rb.header(name.as_str(), value.as_bytes());
    }

    let resp = rb.body(req.into_body()).send().await?;

    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.bytes().await?.to_vec();
    log::debug!("received HTTP {} ({} bytes)", status.as_u16(), bytes.len());

    let mut builder = Response::builder().status(status.as_u16());
    for (name, value) in headers.iter() {
        builder = builder.header(name.as_str(), value.as_bytes());
    }
    Ok(builder.body(bytes)?)
}

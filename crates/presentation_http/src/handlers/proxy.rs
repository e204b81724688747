//! Catch-all proxy handler

use application::ports::ProxyResponse;
use axum::{
    body::{Body, Bytes},
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_LENGTH, request::Parts},
    response::Response,
};

use crate::{error::ProxyError, proxy::strip_hop_by_hop, state::AppState};

/// Forward any request to the destination
///
/// The body is buffered before the fault protocol starts, so injected
/// delays never hold a half-read client connection. The buffering limit is
/// the router's `DefaultBodyLimit`.
pub async fn proxy_request(
    State(state): State<AppState>,
    parts: Parts,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyError> {
    let limit = state.max_body_bytes;
    if declared_length(&parts.headers).is_some_and(|len| len > limit) {
        return Err(ProxyError::PayloadTooLarge { limit });
    }

    let body = body.map_err(|rejection| body_error(&rejection, limit))?;

    let response = state.proxy.forward(parts, body, &state.shutdown).await?;
    Ok(into_response(response))
}

/// Undeclared bodies that outgrow the limit get the same answer as declared ones
fn body_error(rejection: &BytesRejection, limit: usize) -> ProxyError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProxyError::PayloadTooLarge { limit }
    } else {
        ProxyError::RequestBody(rejection.body_text())
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn into_response(response: ProxyResponse) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::from(body))
}

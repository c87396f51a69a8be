use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::modules::system::request_context::{with_request_context, RequestContext};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_INBOUND_ID_LEN: usize = 128;

fn inbound_request_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_INBOUND_ID_LEN)
        .map(ToString::to_string)
}

/// Tags the request with an id (the caller's `x-request-id` or a fresh uuid),
/// makes it visible to the task and echoes it on the response.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let request_id =
        inbound_request_id(&request).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let span = tracing::info_span!("request", id = %request_id);
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };

    let mut response = with_request_context(ctx, next.run(request))
        .instrument(span)
        .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

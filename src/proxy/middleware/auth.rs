use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::models::Tier;
use crate::modules::persistence::token_store::{QuotaDecision, UsageSnapshot};
use crate::proxy::handlers::errors::ApiError;
use crate::proxy::state::AppState;

pub const QUOTA_LIMIT_HEADER: HeaderName = HeaderName::from_static("x-quota-limit");
pub const QUOTA_REMAINING_HEADER: HeaderName = HeaderName::from_static("x-quota-remaining");

const MISSING_TOKEN: &str = "Missing or malformed Authorization header. Use 'Bearer <token>'.";
const INVALID_TOKEN: &str = "Invalid access token.";
const ADMIN_ONLY: &str = "This endpoint requires the master API key.";

/// Who is calling, attached to the request by the auth middlewares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallerIdentity {
    Admin,
    Token { token: String, tier: Tier },
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        matches!(self, CallerIdentity::Admin)
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            CallerIdentity::Admin => None,
            CallerIdentity::Token { token, .. } => Some(token),
        }
    }
}

fn constant_time_str_eq(left: &str, right: &str) -> bool {
    let left_bytes = left.as_bytes();
    let right_bytes = right.as_bytes();
    let max_len = left_bytes.len().max(right_bytes.len());
    let mut diff = left_bytes.len() ^ right_bytes.len();

    for i in 0..max_len {
        let l = left_bytes.get(i).copied().unwrap_or(0);
        let r = right_bytes.get(i).copied().unwrap_or(0);
        diff |= (l ^ r) as usize;
    }

    diff == 0
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn resolve_caller(state: &AppState, headers: &HeaderMap) -> Result<CallerIdentity, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized(MISSING_TOKEN))?;

    if constant_time_str_eq(token, &state.security.master_api_key) {
        return Ok(CallerIdentity::Admin);
    }

    match state.core.tokens.get(token) {
        Some(record) => Ok(CallerIdentity::Token {
            token: record.token,
            tier: record.tier,
        }),
        None => {
            tracing::warn!("Rejected unknown access token");
            Err(ApiError::Unauthorized(INVALID_TOKEN))
        }
    }
}

fn log_request(request: &Request) {
    let path = request.uri().path();
    if path == "/api/health" || path == "/healthz" {
        tracing::trace!("Heartbeat/Health: {} {}", request.method(), path);
    } else {
        tracing::info!("Request: {} {}", request.method(), path);
    }
}

fn apply_quota_headers(headers: &mut HeaderMap, snapshot: &UsageSnapshot) {
    headers.insert(QUOTA_LIMIT_HEADER, HeaderValue::from(snapshot.daily_limit));
    headers.insert(QUOTA_REMAINING_HEADER, HeaderValue::from(snapshot.remaining));
}

/// Authenticates the caller and charges one call against its daily quota.
///
/// The master key skips both the burst window and the daily quota. For every
/// other token the burst window is checked first so a burst rejection does
/// not consume quota, and a quota rejection gives its burst slot back.
pub async fn quota_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    log_request(&request);
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let identity = match resolve_caller(&state, request.headers()) {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };

    let token = match &identity {
        CallerIdentity::Admin => {
            tracing::debug!("Master key request, quota bypassed");
            request.extensions_mut().insert(identity);
            return next.run(request).await;
        }
        CallerIdentity::Token { token, .. } => token.clone(),
    };

    let burst_hit = match state.core.burst.check(&token) {
        Ok(hit) => hit,
        Err(retry_after_secs) => {
            tracing::warn!("Burst limit hit, retry in {}s", retry_after_secs);
            return ApiError::BurstLimited { retry_after_secs }.into_response();
        }
    };

    let decision = state.core.tokens.try_acquire(&token);
    if !matches!(decision, QuotaDecision::Granted(_)) {
        state.core.burst.release(&token, burst_hit);
    }

    match decision {
        QuotaDecision::Granted(snapshot) => {
            tracing::debug!(
                "Quota granted | Tier: {} | Used: {}/{}",
                snapshot.tier,
                snapshot.used_today,
                snapshot.daily_limit
            );
            request.extensions_mut().insert(identity);
            let mut response = next.run(request).await;
            apply_quota_headers(response.headers_mut(), &snapshot);
            response
        }
        QuotaDecision::Exhausted(snapshot) => {
            tracing::warn!(
                "Daily quota exhausted | Tier: {} | Limit: {}",
                snapshot.tier,
                snapshot.daily_limit
            );
            let mut response = ApiError::QuotaExceeded {
                limit: snapshot.daily_limit,
            }
            .into_response();
            apply_quota_headers(response.headers_mut(), &snapshot);
            response
        }
        // Removed by an admin between lookup and acquire.
        QuotaDecision::UnknownToken => ApiError::Unauthorized(INVALID_TOKEN).into_response(),
    }
}

/// Authenticates the caller without charging quota.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    log_request(&request);
    match resolve_caller(&state, request.headers()) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    log_request(&request);
    match resolve_caller(&state, request.headers()) {
        Ok(CallerIdentity::Admin) => {
            request.extensions_mut().insert(CallerIdentity::Admin);
            next.run(request).await
        }
        Ok(CallerIdentity::Token { .. }) => {
            tracing::warn!("Access token used on an admin route");
            ApiError::Unauthorized(ADMIN_ONLY).into_response()
        }
        Err(e) => e.into_response(),
    }
}

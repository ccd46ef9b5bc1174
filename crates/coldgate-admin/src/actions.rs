//! Trigger endpoints and signout.
//!
//! The three triggers always answer 302 to `/`, success or not. Failures
//! are logged here and discovered by the operator on the next visit to
//! `/admin` — the admin surface never shows a raw error.

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

use coldgate_cloud::with_timeout;

use crate::AdminState;

/// 302 Found to the given location.
fn found(location: &str) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    let location = HeaderValue::from_str(location)
        .unwrap_or_else(|_| HeaderValue::from_static("/"));
    response.headers_mut().insert(header::LOCATION, location);
    response
}

pub async fn scale_up(State(state): State<AdminState>) -> Response {
    match with_timeout(state.op_timeout, state.plane.scale_up()).await {
        Ok(outcome) => info!(?outcome, "scale-up requested"),
        Err(e) => error!(error = %e, "scale-up request failed"),
    }
    found("/")
}

pub async fn shut_down(State(state): State<AdminState>) -> Response {
    match with_timeout(state.op_timeout, state.plane.scale_down()).await {
        Ok(outcome) => info!(?outcome, "shutdown requested"),
        Err(e) => error!(error = %e, "shutdown request failed"),
    }
    found("/")
}

pub async fn restart(State(state): State<AdminState>) -> Response {
    match with_timeout(state.op_timeout, state.plane.restart()).await {
        Ok(outcome) => info!(?outcome, "restart requested"),
        Err(e) => error!(error = %e, "restart request failed"),
    }
    found("/")
}

/// Expire every front-door session cookie and bounce to the identity
/// provider's logout URL.
pub async fn signout(State(state): State<AdminState>) -> Response {
    let mut response = found(&state.signout.redirect_url);
    for cookie in &state.signout.cookies {
        let expired = format!("{cookie}=; Max-Age=0; Path=/");
        match HeaderValue::from_str(&expired) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => error!(cookie = %cookie, error = %e, "invalid session cookie name"),
        }
    }
    response
}

use crate::auth::AuthState;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Serialize)]
struct AuthErrorResponse {
    error: &'static str,
}

pub(crate) async fn auth_middleware(
    State(auth): State<Option<AuthState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let auth = match &auth {
        Some(auth) => auth,
        None => return next.run(req).await,
    };

    if is_auth_bypass_path(req.uri().path()) {
        return next.run(req).await;
    }

    if let Some(token) = bearer_token(req.headers())
        && auth.verify_token(token).is_ok()
    {
        return next.run(req).await;
    }

    tracing::warn!(path = %req.uri().path(), "rejected unauthenticated request");
    (
        StatusCode::UNAUTHORIZED,
        Json(AuthErrorResponse {
            error: "unauthorized",
        }),
    )
        .into_response()
}

fn is_auth_bypass_path(path: &str) -> bool {
    path == "/health" || path == "/sw.js" || path == "/firebase-messaging-sw.js"
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = raw.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use utils::response::ApiResponse;
use workflow::Actor;

/// Identity headers injected by the upstream authenticator once it has
/// verified the caller's session token. This service never sees credentials.
pub const USER_EMAIL_HEADER: &str = "x-auth-user-email";
pub const USER_NAME_HEADER: &str = "x-auth-user-name";

fn header_value(req: &Request, name: &str) -> Option<String> {
    let value = req.headers().get(name)?;
    let value = String::from_utf8_lossy(value.as_bytes()).trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}

pub async fn require_session(req: Request, next: Next) -> Response {
    let Some(email) = header_value(&req, USER_EMAIL_HEADER) else {
        tracing::warn!(
            path = %req.uri().path(),
            method = %req.method(),
            "Request without session identity"
        );

        // Unauthenticated requests get the standard envelope with a 401.
        let response = ApiResponse::<()>::error("Unauthorized");
        return (StatusCode::UNAUTHORIZED, Json(response)).into_response();
    };

    let display_name = header_value(&req, USER_NAME_HEADER).unwrap_or_else(|| email.clone());

    let mut req = req;
    req.extensions_mut().insert(Actor {
        display_name,
        email,
    });
    next.run(req).await
}

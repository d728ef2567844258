/// Authentication middleware
///
/// Validates bearer tokens from the `Authorization` header and adds the
/// authenticated user's identity to request extensions. Applied to every
/// route under `/tasks` plus `/logout`.
///
/// # Request Extensions
///
/// After successful authentication, the middleware adds:
/// - `AuthUser`: the authenticated user's id
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskdeck_api::middleware::auth::AuthUser;
///
/// async fn handler(Extension(auth): Extension<AuthUser>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
/// ```

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user identity added to request extensions
///
/// Handlers behind the auth middleware extract it with Axum's `Extension`
/// extractor and use it to scope every query to the calling user.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// Authenticated user ID
    pub user_id: Uuid,
}

/// Strips an optional `Bearer ` prefix from the header value
///
/// Both `Authorization: Bearer <token>` and `Authorization: <token>` are
/// accepted; the raw token form is kept for clients that never set the
/// scheme.
fn extract_token(header_value: &str) -> &str {
    header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value)
}

/// Bearer token authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing (`missing token`)
/// - Token verification fails for any reason (`invalid token`)
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing token".to_string()))?;

    let token = extract_token(auth_header);

    // Verify signature and expiry; the token itself is never logged
    let user_id = state.tokens.verify(token)?;

    req.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(req).await)
}

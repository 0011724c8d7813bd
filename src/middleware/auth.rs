use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::AuthError;
use crate::error::ApiError;

/// Resolves the bearer token and injects the caller's `Identity` into request
/// extensions. Nothing downstream runs for an unauthenticated request.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())?;
    let identity = state.identity.verify(token).await?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("Invalid Authorization header format"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader("Authorization header must use Bearer token format"))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MalformedHeader("Empty bearer token"));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_and_malformed_headers() {
        assert!(matches!(extract_bearer(&HeaderMap::new()), Err(AuthError::MissingHeader)));
        assert!(matches!(extract_bearer(&headers("Basic dXNlcg==")), Err(AuthError::MalformedHeader(_))));
        assert!(matches!(extract_bearer(&headers("Bearer   ")), Err(AuthError::MalformedHeader(_))));
    }
}

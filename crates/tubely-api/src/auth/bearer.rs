use axum::http::{header::AUTHORIZATION, HeaderMap};
use tubely_core::AppError;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::MissingCredential("no authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::MissingCredential("authorization header is not ASCII".to_string()))?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| {
            AppError::MissingCredential("authorization scheme is not Bearer".to_string())
        })?
        .trim();

    if token.is_empty() {
        return Err(AppError::MissingCredential("empty bearer token".to_string()));
    }

    Ok(token)
}

/// Bearer Header Parsing
///
/// Extracts the raw token from an `Authorization: Bearer <token>` header.
/// Pure; no I/O.

use crate::error::AppError;

/// Parse the header value into the token string.
///
/// Accepted shape is exactly `"Bearer <token>"`: one separating space and
/// a non-empty token. A missing header, a different scheme, or an empty
/// token all fail the same way.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let token = header
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::BearerFormat)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AppError::BearerFormat);
    }

    Ok(token)
}

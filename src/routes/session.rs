/// Session Routes
///
/// Login, token refresh, and refresh-token revocation. These handlers own
/// only the wire format; the semantics live in
/// [`crate::session::SessionService`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::session::SessionService;
use crate::validators::is_valid_email;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the user plus both tokens.
#[derive(Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

fn bearer_header(req: &HttpRequest) -> Option<&str> {
    req.headers().get(AUTHORIZATION).and_then(|h| h.to_str().ok())
}

/// POST /api/login
///
/// # Errors
/// - 400: unparsable email
/// - 401: bad credentials — the same body whether the email is unknown or
///   the password is wrong
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let session = sessions.login(&email, &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: session.user.id,
        created_at: session.user.created_at,
        updated_at: session.user.updated_at,
        email: session.user.email,
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Exchanges the refresh token in the Authorization header for a new
/// access token. The refresh token is not rotated.
///
/// # Errors
/// - 401: missing/malformed header, or an unknown, revoked, or expired
///   refresh token — indistinguishable from outside
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let token = sessions.refresh(bearer_header(&req)).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Revokes the refresh token in the Authorization header. Responds 204
/// whenever the header parses, whether or not the token ever existed.
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    sessions.revoke(bearer_header(&req)).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// User Routes
///
/// Registration and the authenticated "who am I" endpoint.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::{AppError, StorageError};
use crate::middleware::AuthenticatedUser;
use crate::users::{insert_user, UserDirectory, UserRecord};
use crate::validators::{is_valid_email, is_valid_password};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or password outside the length policy
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;

    // Hashing is deliberately slow; keep it off the async workers.
    let password = form.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))??;

    let user = insert_user(pool.get_ref(), &email, &password_hash).await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// GET /api/me
///
/// Requires a valid access token; the JWT middleware establishes the
/// identity.
pub async fn get_current_user(
    user: web::ReqData<AuthenticatedUser>,
    directory: web::Data<dyn UserDirectory>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.into_inner().0;

    let record = directory
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| StorageError::NotFound("user".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(record)))
}

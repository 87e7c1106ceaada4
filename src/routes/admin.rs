/// Admin Routes
///
/// Request-count metrics and the dev-only reset.

use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::middleware::HitCounter;
use crate::users::delete_all_users;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<HitCounter>) -> HttpResponse {
    let body = format!(
        "<html><body><h1>Welcome, Perch Admin</h1><p>Perch has been visited {} times!</p></body></html>",
        hits.load()
    );

    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

/// POST /admin/reset
///
/// Clears the hit counter and deletes every user (cascading to their
/// refresh tokens). Forbidden outside the dev platform.
pub async fn reset(
    hits: web::Data<HitCounter>,
    pool: web::Data<PgPool>,
    settings: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if !settings.is_dev() {
        return Ok(HttpResponse::Forbidden().body("forbidden"));
    }

    hits.reset();
    delete_all_users(pool.get_ref()).await?;

    tracing::info!("Users and hit counter reset");

    Ok(HttpResponse::Ok().body(format!("Hits: {}", hits.load())))
}

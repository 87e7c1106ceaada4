use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{PgRefreshTokenStore, RefreshTokenStore};
use crate::configuration::{ApplicationSettings, AuthConfig};
use crate::middleware::{HitCounter, JwtMiddleware, MetricsMiddleware};
use crate::routes::{
    create_user, get_current_user, health_check, login, metrics, refresh, reset, revoke,
};
use crate::session::SessionService;
use crate::users::{PgUserDirectory, UserDirectory};

pub fn run(
    listener: TcpListener,
    pool: PgPool,
    auth_config: AuthConfig,
    app_settings: ApplicationSettings,
) -> Result<Server, std::io::Error> {
    let users: Arc<dyn UserDirectory> = Arc::new(PgUserDirectory::new(pool.clone()));
    let refresh_tokens: Arc<dyn RefreshTokenStore> = Arc::new(PgRefreshTokenStore::new(
        pool.clone(),
        auth_config.refresh_token_ttl_seconds,
    ));
    let sessions = Arc::new(SessionService::new(
        auth_config,
        users.clone(),
        refresh_tokens,
    ));
    let hits = HitCounter::new();

    let pool_data = web::Data::new(pool);
    let users_data: web::Data<dyn UserDirectory> = web::Data::from(users);
    let sessions_data = web::Data::from(sessions.clone());
    let settings_data = web::Data::new(app_settings);
    let hits_data = web::Data::new(hits.clone());

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(MetricsMiddleware::new(hits.clone()))

            // Shared state
            .app_data(pool_data.clone())
            .app_data(users_data.clone())
            .app_data(sessions_data.clone())
            .app_data(settings_data.clone())
            .app_data(hits_data.clone())

            // Public routes
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/users", web::post().to(create_user))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))

            // Protected routes (require a valid access token)
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(sessions.clone()))
                    .route("/me", web::get().to(get_current_user)),
            )

            // Admin surface
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))

            // Static site (must be last to not override API routes)
            .service(fs::Files::new("/app", "./public").index_file("index.html"))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

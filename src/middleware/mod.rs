/// Middleware module
///
/// Authentication guard and request metrics.

mod jwt_middleware;
mod metrics;

pub use jwt_middleware::AuthenticatedUser;
pub use jwt_middleware::JwtMiddleware;
pub use metrics::HitCounter;
pub use metrics::MetricsMiddleware;

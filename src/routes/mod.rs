mod admin;
mod health_check;
mod session;
mod users;

pub use admin::metrics;
pub use admin::reset;
pub use health_check::health_check;
pub use session::login;
pub use session::refresh;
pub use session::revoke;
pub use users::create_user;
pub use users::get_current_user;

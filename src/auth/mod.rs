/// Authentication core
///
/// Password hashing, access-token minting/validation, bearer header
/// parsing, and refresh-token lifecycle.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;

pub use bearer::extract_bearer_token;
pub use claims::Claims;
pub use jwt::mint_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::InMemoryRefreshTokenStore;
pub use refresh_token::PgRefreshTokenStore;
pub use refresh_token::RefreshTokenStore;

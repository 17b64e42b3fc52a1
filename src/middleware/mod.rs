pub mod auth;
pub mod rate_limit;

pub use auth::AuthMiddleware;
pub use rate_limit::{RateLimit, RateLimiter};

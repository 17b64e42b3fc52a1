pub mod auth_service;
pub mod badge_service;
pub mod user_service;

pub use user_service::UserService;

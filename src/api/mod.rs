pub mod auth;
pub mod badges;
pub mod health;
pub mod swagger;
pub mod users;

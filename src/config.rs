use std::env;

/// Runtime configuration, read once from the environment in `main` and
/// injected into the pieces that need it instead of being re-read per call.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub mongodb_uri: String,
    pub jwt_secret: String,
    pub allowed_origin: String,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let mongodb_uri = env::var("MONGODB_URI")
            .map_err(|_| "MONGODB_URI must be set".to_string())?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "5000".to_string()),
            mongodb_uri,
            jwt_secret,
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            production: env::var("APP_ENV").map(|v| v == "production").unwrap_or(false),
        })
    }
}

use crate::models::User;
use crate::utils::error::{AppError, AuthFailure};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One canonical expiry for every session token, body and cookie alike.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Name of the httpOnly cookie carrying the session token for browser flows.
pub const SESSION_COOKIE: &str = "jwt";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User id as a 24-char hex string.
    pub sub: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

/// Signs a session token for the given user (HS256, 1 hour).
pub fn issue_token(user: &User, secret: &str) -> Result<String, AppError> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::seconds(TOKEN_TTL_SECS)).timestamp() as usize;

    let claims = Claims {
        sub: user.id_hex(),
        email: user.email.clone(),
        iat,
        exp,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

/// Verifies signature and expiry, keeping the failure kind so the bearer
/// path can answer with a specific 401 sub-reason.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthFailure> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthFailure::ExpiredToken,
            _ => AuthFailure::InvalidToken,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    const SECRET: &str = "test-secret";

    fn sample_user() -> User {
        User {
            _id: Some(ObjectId::new()),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@test.com".to_string(),
            membership_number: "5678".to_string(),
            username: Some("johndoe".to_string()),
            password: None,
            earned_badges: vec![],
            required_badges: vec![],
            last_login: None,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let user = sample_user();
        let token = issue_token(&user, SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user.id_hex());
        assert_eq!(claims.email, user.email);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_invalid_not_expired() {
        let token = issue_token(&sample_user(), SECRET).unwrap();
        assert_eq!(
            verify_token(&token, "other-secret"),
            Err(AuthFailure::InvalidToken)
        );
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: ObjectId::new().to_hex(),
            email: "john.doe@test.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_ref()),
        )
        .unwrap();
        assert_eq!(verify_token(&token, SECRET), Err(AuthFailure::ExpiredToken));
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(
            verify_token("not.a.token", SECRET),
            Err(AuthFailure::InvalidToken)
        );
    }
}

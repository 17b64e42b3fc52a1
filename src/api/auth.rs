use crate::config::Config;
use crate::models::{AuthResponse, SecondarySignupRequest, SigninRequest, SignupRequest};
use crate::services::{auth_service, UserService};
use crate::utils::error::AppError;
use crate::utils::validation;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use mongodb::bson::{doc, DateTime as BsonDateTime};

/// Session cookie mirroring the body token so browser flows authenticate
/// without handling the bearer header themselves.
fn session_cookie(token: &str, config: &Config) -> Cookie<'static> {
    Cookie::build(auth_service::SESSION_COOKIE, token.to_string())
        .http_only(true)
        .secure(config.production)
        .same_site(if config.production {
            SameSite::Lax
        } else {
            SameSite::None
        })
        .max_age(CookieDuration::seconds(auth_service::TOKEN_TTL_SECS))
        .path("/")
        .finish()
}

fn field_errors(checks: &[Result<(), AppError>]) -> Vec<String> {
    checks
        .iter()
        .filter_map(|check| check.as_ref().err().map(|e| e.to_string()))
        .collect()
}

/// POST /auth/signup - first signup step, profile fields only.
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Profile created, proceed to the second step"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    users: web::Data<UserService>,
    config: web::Data<Config>,
    body: web::Json<SignupRequest>,
) -> HttpResponse {
    log::info!("📝 POST /auth/signup");

    let first_name = body.first_name.as_deref().unwrap_or_default();
    let last_name = body.last_name.as_deref().unwrap_or_default();
    let email = body.email.as_deref().unwrap_or_default();
    let membership_number = body.membership_number.as_deref().unwrap_or_default();

    let errors = field_errors(&[
        validation::validate_first_name(first_name),
        validation::validate_last_name(last_name),
        validation::validate_email(email),
        validation::validate_membership_number(membership_number),
    ]);
    if !errors.is_empty() {
        log::info!("❌ Signup request validation errors: {:?}", errors);
        return HttpResponse::BadRequest().json(serde_json::json!({ "errors": errors }));
    }

    match users
        .register_user(first_name, last_name, email, membership_number)
        .await
    {
        Ok(user) => {
            log::info!("✅ User created successfully: {}", user.id_hex());
            HttpResponse::Created().json(serde_json::json!({
                "message": "User created successfully. Proceed to the second step",
                "user": user
            }))
        }
        Err(e) => e.to_response(config.production),
    }
}

/// POST /auth/signup-secondary - attaches credentials and the initial
/// badge lists to the profile created in step one.
#[utoipa::path(
    post,
    path = "/auth/signup-secondary",
    tag = "Auth",
    request_body = SecondarySignupRequest,
    responses(
        (status = 200, description = "Signup completed", body = AuthResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Unknown user id"),
        (status = 409, description = "User already completed signup")
    )
)]
pub async fn signup_secondary(
    users: web::Data<UserService>,
    config: web::Data<Config>,
    body: web::Json<SecondarySignupRequest>,
) -> HttpResponse {
    log::info!("📝 POST /auth/signup-secondary");

    let user_id = body.user_id.as_deref().unwrap_or_default();
    let username = body.username.as_deref().unwrap_or_default();
    let password = body.password.as_deref().unwrap_or_default();

    let mut errors = field_errors(&[
        validation::validate_username(username),
        validation::validate_password(password),
    ]);
    if user_id.is_empty() {
        errors.insert(0, "User ID is required".to_string());
    }
    if !errors.is_empty() {
        log::info!("❌ Signup-secondary request validation errors: {:?}", errors);
        return HttpResponse::BadRequest().json(serde_json::json!({ "errors": errors }));
    }

    let existing = match users.find_by_id(user_id).await {
        Ok(user) => user,
        Err(e) => return e.to_response(config.production),
    };
    if existing.username.is_some() {
        log::info!("❌ User {} already completed the signup process", user_id);
        return AppError::DuplicateUsername.to_response(config.production);
    }

    // Cross-reference the caller's id lists against the badge catalog;
    // unknown ids are dropped rather than rejected.
    let earned = match users.attach_badges(&body.earned_badges).await {
        Ok(badges) => badges,
        Err(e) => return e.to_response(config.production),
    };
    let required = match users.attach_badges(&body.required_badges).await {
        Ok(badges) => badges,
        Err(e) => return e.to_response(config.production),
    };

    let updated = match users
        .register_secondary_user(user_id, username, password, &earned, &required)
        .await
    {
        Ok(user) => user,
        Err(e) => return e.to_response(config.production),
    };

    match auth_service::issue_token(&updated, &config.jwt_secret) {
        Ok(token) => {
            log::info!("✅ Signup-secondary completed successfully");
            let cookie = session_cookie(&token, &config);
            HttpResponse::Ok()
                .cookie(cookie)
                .json(AuthResponse { token, user: updated })
        }
        Err(e) => e.to_response(config.production),
    }
}

/// POST /auth/signin - authenticates and refreshes `lastLogin`.
#[utoipa::path(
    post,
    path = "/auth/signin",
    tag = "Auth",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Missing fields or wrong password"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn signin(
    users: web::Data<UserService>,
    config: web::Data<Config>,
    body: web::Json<SigninRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /auth/signin");

    let username = body.username.as_deref().unwrap_or_default();
    let password = body.password.as_deref().unwrap_or_default();

    let mut errors = Vec::new();
    if username.is_empty() {
        errors.push("Username is required".to_string());
    }
    if password.is_empty() {
        errors.push("Password is required".to_string());
    }
    if !errors.is_empty() {
        log::info!("❌ Signin request validation errors: {:?}", errors);
        return HttpResponse::BadRequest().json(serde_json::json!({ "errors": errors }));
    }

    if let Err(e) = users.authenticate_user(username, password).await {
        return match e {
            // Unknown username and wrong password share one message so the
            // response does not leak which usernames exist.
            AppError::UserNotFound(_) => {
                log::info!("❌ Invalid username or password");
                HttpResponse::NotFound()
                    .json(serde_json::json!({ "error": "Invalid username or password" }))
            }
            other => other.to_response(config.production),
        };
    }

    let updated = match users
        .find_one_and_update(
            doc! { "username": username },
            doc! { "lastLogin": BsonDateTime::now() },
        )
        .await
    {
        Ok(user) => user,
        Err(e) => return e.to_response(config.production),
    };

    match auth_service::issue_token(&updated, &config.jwt_secret) {
        Ok(token) => {
            log::info!("✅ Signin completed successfully: {}", updated.id_hex());
            let cookie = session_cookie(&token, &config);
            HttpResponse::Ok()
                .cookie(cookie)
                .json(AuthResponse { token, user: updated })
        }
        Err(e) => e.to_response(config.production),
    }
}

/// Catch-all for unsupported methods on the auth scope.
pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(serde_json::json!({
        "message": "Method not allowed"
    }))
}

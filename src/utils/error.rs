use actix_web::HttpResponse;
use std::fmt;

/// Reason carried by a 401 so the bearer-header path can tell the caller
/// whether the token was missing, malformed, or expired. The cookie path
/// collapses all three into a generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl AuthFailure {
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "Not authorized to access this route",
            AuthFailure::InvalidToken => "Token is invalid",
            AuthFailure::ExpiredToken => "Token is expired",
        }
    }
}

/// Every user-facing failure the service can produce, one variant per
/// condition so the route layer maps 1:1 to status codes.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    UserNotFound(String),
    BadgeNotFound(String),
    RequirementNotFound(String),
    InvalidFirstName,
    InvalidLastName,
    InvalidEmail,
    InvalidMembershipNumber,
    InvalidUsername,
    InvalidPassword,
    InvalidUserId(String),
    InvalidBadgeId(String),
    InvalidCompletionStatus,
    DoesNotHaveBadge,
    WrongPassword,
    DuplicateEmail,
    DuplicateUsername,
    Unauthenticated(AuthFailure),
    Database(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UserNotFound(detail) => write!(f, "User not found: {}", detail),
            AppError::BadgeNotFound(detail) => write!(f, "Badge not found: {}", detail),
            AppError::RequirementNotFound(detail) => {
                write!(f, "Requirement not found: {}", detail)
            }
            AppError::InvalidFirstName => write!(f, "firstName must be a non-empty string"),
            AppError::InvalidLastName => write!(f, "lastName must be a non-empty string"),
            AppError::InvalidEmail => write!(f, "email must be a valid email address"),
            AppError::InvalidMembershipNumber => {
                write!(f, "membershipNumber must be a non-empty string")
            }
            AppError::InvalidUsername => write!(f, "username must be a non-empty string"),
            AppError::InvalidPassword => {
                write!(f, "password must be a string of at least 8 characters")
            }
            AppError::InvalidUserId(id) => write!(f, "Invalid user id: {}", id),
            AppError::InvalidBadgeId(id) => write!(f, "Invalid badge id: {}", id),
            AppError::InvalidCompletionStatus => write!(f, "Completed is required"),
            AppError::DoesNotHaveBadge => write!(f, "User does not have the badge"),
            AppError::WrongPassword => write!(f, "Invalid username or password"),
            AppError::DuplicateEmail => write!(f, "User with this email already exists"),
            AppError::DuplicateUsername => {
                write!(f, "User already completed the signup process")
            }
            AppError::Unauthenticated(reason) => write!(f, "{}", reason.message()),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::UserNotFound(_)
            | AppError::BadgeNotFound(_)
            | AppError::RequirementNotFound(_) => 404,
            AppError::InvalidFirstName
            | AppError::InvalidLastName
            | AppError::InvalidEmail
            | AppError::InvalidMembershipNumber
            | AppError::InvalidUsername
            | AppError::InvalidPassword
            | AppError::InvalidUserId(_)
            | AppError::InvalidBadgeId(_)
            | AppError::InvalidCompletionStatus
            | AppError::DoesNotHaveBadge
            | AppError::WrongPassword => 400,
            AppError::DuplicateEmail | AppError::DuplicateUsername => 409,
            AppError::Unauthenticated(_) => 401,
            AppError::Database(_) | AppError::Internal(_) => 500,
        }
    }

    /// Shapes the unified `{"error": ...}` envelope. Unexpected failures are
    /// logged with full detail and reduced to a generic message when
    /// `production` is set.
    pub fn to_response(&self, production: bool) -> HttpResponse {
        let status = self.status_code();
        let message = if status == 500 {
            log::error!("❌ Internal failure: {}", self);
            if production {
                "Something broke!".to_string()
            } else {
                self.to_string()
            }
        } else {
            self.to_string()
        };

        let body = serde_json::json!({ "error": message });
        match status {
            400 => HttpResponse::BadRequest().json(body),
            401 => HttpResponse::Unauthorized().json(body),
            404 => HttpResponse::NotFound().json(body),
            409 => HttpResponse::Conflict().json(body),
            _ => HttpResponse::InternalServerError().json(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_404() {
        assert_eq!(AppError::UserNotFound("u".into()).status_code(), 404);
        assert_eq!(AppError::BadgeNotFound("b".into()).status_code(), 404);
        assert_eq!(AppError::RequirementNotFound("r".into()).status_code(), 404);
    }

    #[test]
    fn validation_variants_map_to_400() {
        assert_eq!(AppError::InvalidEmail.status_code(), 400);
        assert_eq!(AppError::InvalidPassword.status_code(), 400);
        assert_eq!(AppError::InvalidCompletionStatus.status_code(), 400);
        assert_eq!(AppError::DoesNotHaveBadge.status_code(), 400);
        assert_eq!(AppError::WrongPassword.status_code(), 400);
    }

    #[test]
    fn duplicates_map_to_409() {
        assert_eq!(AppError::DuplicateEmail.status_code(), 409);
        assert_eq!(
            AppError::DuplicateEmail.to_string(),
            "User with this email already exists"
        );
        assert_eq!(AppError::DuplicateUsername.status_code(), 409);
        assert_eq!(
            AppError::DuplicateUsername.to_string(),
            "User already completed the signup process"
        );
    }

    #[test]
    fn auth_failures_map_to_401_with_sub_reason() {
        let err = AppError::Unauthenticated(AuthFailure::ExpiredToken);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.to_string(), "Token is expired");
        assert_eq!(
            AppError::Unauthenticated(AuthFailure::MissingToken).to_string(),
            "Not authorized to access this route"
        );
    }

    #[test]
    fn unexpected_errors_map_to_500() {
        assert_eq!(AppError::Database("boom".into()).status_code(), 500);
        assert_eq!(AppError::Internal("boom".into()).status_code(), 500);
    }
}

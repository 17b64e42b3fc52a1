//! Fail-fast input shape checks. Every mutating or lookup operation runs
//! these before any database round-trip, raising the specific typed error
//! for the offending field.

use crate::utils::error::AppError;
use mongodb::bson::oid::ObjectId;

const MIN_PASSWORD_LEN: usize = 8;

/// Parses a 24-char hex ObjectId, mapping the failure to the error the
/// calling operation wants (user lookups want `UserNotFound`, badge routes
/// want `InvalidUserId`, and so on).
pub fn parse_object_id(id: &str, on_invalid: AppError) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| on_invalid)
}

pub fn validate_first_name(value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidFirstName);
    }
    Ok(())
}

pub fn validate_last_name(value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidLastName);
    }
    Ok(())
}

pub fn validate_membership_number(value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidMembershipNumber);
    }
    Ok(())
}

pub fn validate_username(value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidUsername);
    }
    Ok(())
}

pub fn validate_password(value: &str) -> Result<(), AppError> {
    if value.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidPassword);
    }
    Ok(())
}

/// local@domain.tld shape check. Deliberately loose about the local part;
/// the unique index on `Users.email` is the real gatekeeper.
pub fn validate_email(value: &str) -> Result<(), AppError> {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    let domain_ok = {
        let mut labels = domain.split('.');
        let has_empty = domain.split('.').any(|l| l.is_empty());
        labels.next().is_some() && domain.contains('.') && !has_empty
    };

    if local.is_empty() || domain.is_empty() || !domain_ok || value.contains(char::is_whitespace) {
        return Err(AppError::InvalidEmail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_emails() {
        assert!(validate_email("scout@example.com").is_ok());
        assert!(validate_email("first.last@sub.domain.org").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        assert_eq!(validate_email("no-at-sign"), Err(AppError::InvalidEmail));
        assert_eq!(validate_email("@example.com"), Err(AppError::InvalidEmail));
        assert_eq!(validate_email("user@"), Err(AppError::InvalidEmail));
        assert_eq!(validate_email("user@nodot"), Err(AppError::InvalidEmail));
        assert_eq!(validate_email("user@dot."), Err(AppError::InvalidEmail));
        assert_eq!(validate_email("user name@x.com"), Err(AppError::InvalidEmail));
    }

    #[test]
    fn password_requires_eight_chars() {
        assert_eq!(validate_password("short"), Err(AppError::InvalidPassword));
        assert_eq!(validate_password("1234567"), Err(AppError::InvalidPassword));
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn names_and_membership_must_be_non_empty() {
        assert_eq!(validate_first_name("  "), Err(AppError::InvalidFirstName));
        assert_eq!(validate_last_name(""), Err(AppError::InvalidLastName));
        assert_eq!(
            validate_membership_number(""),
            Err(AppError::InvalidMembershipNumber)
        );
        assert_eq!(validate_username(" "), Err(AppError::InvalidUsername));
        assert!(validate_first_name("John").is_ok());
    }

    #[test]
    fn object_id_format_is_enforced() {
        let err = AppError::UserNotFound("bad id".into());
        assert_eq!(parse_object_id("not-hex", err.clone()), Err(err));
        assert!(parse_object_id("64527a53b431de7e0e8b1a1e", AppError::InvalidUserId("x".into())).is_ok());
    }
}

use super::serialize_oid_hex;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Per-user copy of a catalog requirement plus its completion flag. Lives
/// embedded inside `earned_badges[].requirements[]`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct UserRequirement {
    pub requirement_id: i64,
    pub requirement_string: String,
    #[serde(default)]
    pub completed: bool,
}

/// Badge a user is pursuing, with the catalog requirements embedded at
/// attach time so the completion update always has the nested array.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct UserBadge {
    pub badge_id: i64,
    pub badge_name: String,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(default)]
    pub requirements: Vec<UserRequirement>,
}

/// Presentation affordance computed from `(completedCount, totalCount)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BadgeProgress {
    Complete,
    Partial,
    Untouched,
}

impl UserBadge {
    pub fn completed_count(&self) -> usize {
        self.requirements.iter().filter(|r| r.completed).count()
    }

    pub fn progress(&self) -> BadgeProgress {
        let completed = self.completed_count();
        if completed == 0 {
            BadgeProgress::Untouched
        } else if completed == self.requirements.len() {
            BadgeProgress::Complete
        } else {
            BadgeProgress::Partial
        }
    }
}

/// User document. `username` and `password` stay absent until the second
/// signup step completes; the password hash is deserialize-only and never
/// reaches a response body.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct User {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_oid_hex",
        default
    )]
    #[schema(value_type = Option<String>)]
    pub _id: Option<ObjectId>,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "membershipNumber")]
    pub membership_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    #[serde(default)]
    pub earned_badges: Vec<UserBadge>,
    #[serde(default)]
    pub required_badges: Vec<UserBadge>,
    #[serde(rename = "lastLogin", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub last_login: Option<BsonDateTime>,
}

impl User {
    pub fn id_hex(&self) -> String {
        self._id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn has_badge(&self, badge_id: i64) -> bool {
        self.earned_badges.iter().any(|b| b.badge_id == badge_id)
    }
}

// ==================== Request / Response shapes ====================

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "membershipNumber", default)]
    pub membership_number: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SecondarySignupRequest {
    #[serde(rename = "_id", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Numeric catalog ids of badges the scout already earned.
    #[serde(rename = "earnedBadges", default)]
    pub earned_badges: Vec<i64>,
    /// Numeric catalog ids of badges the scout still needs.
    #[serde(rename = "requiredBadges", default)]
    pub required_badges: Vec<i64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SigninRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddBadgeRequest {
    #[serde(rename = "badgeId", default)]
    pub badge_id: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CompletionRequest {
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge_with(completed: usize, total: usize) -> UserBadge {
        UserBadge {
            badge_id: 1,
            badge_name: "Hikes Away".to_string(),
            image_url: None,
            categories: Some("Outdoors".to_string()),
            requirements: (0..total)
                .map(|i| UserRequirement {
                    requirement_id: i as i64,
                    requirement_string: format!("req {}", i),
                    completed: i < completed,
                })
                .collect(),
        }
    }

    #[test]
    fn progress_reflects_completion_counts() {
        assert_eq!(badge_with(0, 3).progress(), BadgeProgress::Untouched);
        assert_eq!(badge_with(1, 3).progress(), BadgeProgress::Partial);
        assert_eq!(badge_with(3, 3).progress(), BadgeProgress::Complete);
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            _id: Some(ObjectId::new()),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@test.com".to_string(),
            membership_number: "5678".to_string(),
            username: Some("johndoe".to_string()),
            password: Some("$2b$10$hash".to_string()),
            earned_badges: vec![],
            required_badges: vec![],
            last_login: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "johndoe");
    }

    #[test]
    fn object_id_serializes_as_plain_hex() {
        let oid = ObjectId::new();
        let user = User {
            _id: Some(oid),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@test.com".to_string(),
            membership_number: "5678".to_string(),
            username: None,
            password: None,
            earned_badges: vec![],
            required_badges: vec![],
            last_login: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["_id"], oid.to_hex());
    }

    #[test]
    fn password_still_deserializes_from_the_store() {
        let doc = serde_json::json!({
            "firstName": "John",
            "lastName": "Doe",
            "email": "john.doe@test.com",
            "membershipNumber": "5678",
            "password": "$2b$10$hash"
        });
        let user: User = serde_json::from_value(doc).unwrap();
        assert_eq!(user.password.as_deref(), Some("$2b$10$hash"));
        assert!(user.earned_badges.is_empty());
    }
}

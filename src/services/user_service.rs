use crate::database::MongoDB;
use crate::models::{Badge, Requirement, User, UserBadge, UserRequirement};
use crate::utils::error::AppError;
use crate::utils::validation;
use bcrypt::{hash, verify, DEFAULT_COST};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

/// Typed CRUD and domain operations over the `Users` collection, plus
/// read-only lookups into the badge catalog. Every operation validates its
/// input shape first, performs one logical database operation, and re-wraps
/// the raw document into a typed `User`.
#[derive(Clone)]
pub struct UserService {
    db: MongoDB,
}

fn duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => write_err.code == 11000,
        _ => false,
    }
}

// The setters take `impl Into<Option<_>>`, so the absent-filters case chains
// through as `None` instead of branching on the typed builder.
fn update_options(array_filters: Option<Vec<Document>>) -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .array_filters(array_filters)
        .build()
}

impl UserService {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }

    // ==================== Reads ====================

    pub async fn find_by_query(&self, filter: Document) -> Result<User, AppError> {
        log::info!("🔍 Searching for user with query {}", filter);
        self.db
            .users_collection::<User>()
            .find_one(filter)
            .await?
            .ok_or_else(|| AppError::UserNotFound("no user matched the query".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<User, AppError> {
        let oid = validation::parse_object_id(id, AppError::UserNotFound(format!("bad id {}", id)))?;
        self.find_by_query(doc! { "_id": oid }).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        validation::validate_email(email)?;
        self.find_by_query(doc! { "email": email }).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, AppError> {
        validation::validate_username(username)?;
        self.find_by_query(doc! { "username": username }).await
    }

    // ==================== Writes ====================

    /// Inserts a profile-only user document. The unique index on `email`
    /// turns a second signup into `DuplicateEmail`.
    pub async fn create(&self, user: &User) -> Result<ObjectId, AppError> {
        let result = self
            .db
            .users_collection::<User>()
            .insert_one(user)
            .await
            .map_err(|e| {
                if duplicate_key(&e) {
                    AppError::DuplicateEmail
                } else {
                    AppError::from(e)
                }
            })?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Internal("insert returned a non-ObjectId id".to_string()))
    }

    /// `$set` partial update. Fails `UserNotFound` when nothing matched and
    /// `Internal` when the match produced no change.
    pub async fn update(&self, filter: Document, update_data: Document) -> Result<(), AppError> {
        let result = self
            .db
            .users_collection::<User>()
            .update_one(filter, doc! { "$set": update_data })
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::UserNotFound("no user matched the update".to_string()));
        }
        if result.modified_count == 0 {
            return Err(AppError::Internal("No changes made to the user".to_string()));
        }
        Ok(())
    }

    /// `$set` partial update returning the post-image.
    pub async fn find_one_and_update(
        &self,
        filter: Document,
        update_data: Document,
    ) -> Result<User, AppError> {
        self.apply_operations(filter, doc! { "$set": update_data }, None)
            .await
    }

    /// Raw update operations (`$set`/`$addToSet`/`$pull`) with optional
    /// array filters, returning the updated document.
    async fn apply_operations(
        &self,
        filter: Document,
        operations: Document,
        array_filters: Option<Vec<Document>>,
    ) -> Result<User, AppError> {
        self.db
            .users_collection::<User>()
            .find_one_and_update(filter, operations)
            .with_options(update_options(array_filters))
            .await?
            .ok_or_else(|| AppError::UserNotFound("no user matched the update".to_string()))
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        let oid = validation::parse_object_id(id, AppError::UserNotFound(format!("bad id {}", id)))?;
        let result = self
            .db
            .users_collection::<User>()
            .delete_one(doc! { "_id": oid })
            .await?;
        if result.deleted_count == 0 {
            return Err(AppError::UserNotFound(format!("no user with id {}", id)));
        }
        Ok(())
    }

    // ==================== Registration & authentication ====================

    /// First signup step: profile fields only, no credentials yet.
    pub async fn register_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        membership_number: &str,
    ) -> Result<User, AppError> {
        validation::validate_first_name(first_name)?;
        validation::validate_last_name(last_name)?;
        validation::validate_email(email)?;
        validation::validate_membership_number(membership_number)?;

        // The unique index still backstops the race between this check and
        // the insert below.
        match self.find_by_email(email).await {
            Ok(_) => return Err(AppError::DuplicateEmail),
            Err(AppError::UserNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let user = User {
            _id: None,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            membership_number: membership_number.to_string(),
            username: None,
            password: None,
            earned_badges: vec![],
            required_badges: vec![],
            last_login: None,
        };

        let id = self.create(&user).await?;
        log::info!("✅ User created: {}", id.to_hex());
        self.find_by_id(&id.to_hex()).await
    }

    /// Second signup step: attaches credentials and the initial badge lists
    /// to the profile-only record.
    pub async fn register_secondary_user(
        &self,
        id: &str,
        username: &str,
        password: &str,
        earned_badges: &[UserBadge],
        required_badges: &[UserBadge],
    ) -> Result<User, AppError> {
        validation::validate_username(username)?;
        validation::validate_password(password)?;
        let oid = validation::parse_object_id(id, AppError::UserNotFound(format!("bad id {}", id)))?;

        let hashed = hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        let update = doc! {
            "username": username,
            "password": hashed,
            "earned_badges": to_bson(earned_badges)
                .map_err(|e| AppError::Internal(e.to_string()))?,
            "required_badges": to_bson(required_badges)
                .map_err(|e| AppError::Internal(e.to_string()))?,
        };

        // The fresh bcrypt salt guarantees the `$set` modifies the document.
        self.update(doc! { "_id": oid }, update).await?;
        let user = self.find_by_query(doc! { "_id": oid }).await?;
        log::info!("✅ Secondary signup completed for user {}", user.id_hex());
        Ok(user)
    }

    /// Password check against the stored bcrypt hash. A user who never
    /// finished signup step two has no hash and cannot authenticate.
    pub async fn authenticate_user(&self, username: &str, password: &str) -> Result<User, AppError> {
        validation::validate_username(username)?;
        if password.is_empty() {
            return Err(AppError::InvalidPassword);
        }

        let user = self.find_by_username(username).await?;
        let stored = user.password.as_deref().ok_or(AppError::WrongPassword)?;

        let matches = verify(password, stored)
            .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;
        if !matches {
            return Err(AppError::WrongPassword);
        }
        Ok(user)
    }

    // ==================== Catalog lookups ====================

    pub async fn find_badge(&self, badge_id: i64) -> Result<Badge, AppError> {
        self.db
            .badges_collection::<Badge>()
            .find_one(doc! { "badge_id": badge_id })
            .await?
            .ok_or_else(|| AppError::BadgeNotFound(format!("no badge with id {}", badge_id)))
    }

    pub async fn find_requirement(&self, requirement_id: i64) -> Result<Requirement, AppError> {
        self.db
            .requirements_collection::<Requirement>()
            .find_one(doc! { "requirement_id": requirement_id })
            .await?
            .ok_or_else(|| {
                AppError::RequirementNotFound(format!("no requirement with id {}", requirement_id))
            })
    }

    async fn requirements_of(&self, badge_id: i64) -> Result<Vec<UserRequirement>, AppError> {
        let requirements: Vec<Requirement> = self
            .db
            .requirements_collection::<Requirement>()
            .find(doc! { "badge_id": badge_id })
            .await?
            .try_collect()
            .await?;

        Ok(requirements
            .into_iter()
            .map(|r| UserRequirement {
                requirement_id: r.requirement_id,
                requirement_string: r.requirement_string,
                completed: false,
            })
            .collect())
    }

    async fn to_user_badge(&self, badge: Badge) -> Result<UserBadge, AppError> {
        let requirements = self.requirements_of(badge.badge_id).await?;
        Ok(UserBadge {
            badge_id: badge.badge_id,
            badge_name: badge.badge_name,
            image_url: badge.image_url,
            categories: badge.categories,
            requirements,
        })
    }

    /// Resolves a list of numeric catalog ids into embeddable user badges,
    /// silently skipping ids the catalog does not know.
    pub async fn attach_badges(&self, badge_ids: &[i64]) -> Result<Vec<UserBadge>, AppError> {
        let badges: Vec<Badge> = self
            .db
            .badges_collection::<Badge>()
            .find(doc! { "badge_id": { "$in": badge_ids.to_vec() } })
            .await?
            .try_collect()
            .await?;

        let mut attached = Vec::with_capacity(badges.len());
        for badge in badges {
            attached.push(self.to_user_badge(badge).await?);
        }
        Ok(attached)
    }

    // ==================== Badge set mutation ====================

    /// Adds a catalog badge (with its requirements embedded, all
    /// uncompleted) to the user's earned set by identity.
    pub async fn add_badge(&self, user_id: &str, badge_id: i64) -> Result<User, AppError> {
        let oid = validation::parse_object_id(
            user_id,
            AppError::UserNotFound(format!("bad id {}", user_id)),
        )?;
        let badge = self.find_badge(badge_id).await?;
        let user_badge = self.to_user_badge(badge).await?;

        let entry = to_bson(&user_badge).map_err(|e| AppError::Internal(e.to_string()))?;
        self.apply_operations(
            doc! { "_id": oid },
            doc! { "$addToSet": { "earned_badges": entry } },
            None,
        )
        .await
    }

    /// Removes a badge from the user's earned set. The catalog lookup runs
    /// first so an unknown id is a 404, not a silent no-op.
    pub async fn remove_badge(&self, user_id: &str, badge_id: i64) -> Result<User, AppError> {
        let oid = validation::parse_object_id(
            user_id,
            AppError::UserNotFound(format!("bad id {}", user_id)),
        )?;
        self.find_badge(badge_id).await?;

        self.apply_operations(
            doc! { "_id": oid },
            doc! { "$pull": { "earned_badges": { "badge_id": badge_id } } },
            None,
        )
        .await
    }

    /// Appends a catalog requirement into the matching earned badge's
    /// requirement list. Used to backfill a badge attached before its
    /// requirements were seeded.
    pub async fn update_badge_requirement(
        &self,
        user_id: &str,
        badge_id: i64,
        requirement_id: i64,
    ) -> Result<User, AppError> {
        let oid = validation::parse_object_id(
            user_id,
            AppError::UserNotFound(format!("bad id {}", user_id)),
        )?;
        let requirement = self.find_requirement(requirement_id).await?;

        let entry = to_bson(&UserRequirement {
            requirement_id: requirement.requirement_id,
            requirement_string: requirement.requirement_string,
            completed: false,
        })
        .map_err(|e| AppError::Internal(e.to_string()))?;

        self.apply_operations(
            doc! { "_id": oid, "earned_badges.badge_id": badge_id },
            doc! { "$addToSet": { "earned_badges.$.requirements": entry } },
            None,
        )
        .await
        .map_err(|e| match e {
            // The combined filter missed: the user does not hold the badge.
            AppError::UserNotFound(_) => {
                AppError::BadgeNotFound(format!("user does not hold badge {}", badge_id))
            }
            other => other,
        })
    }

    /// Flips the nested completion flag via an array-filtered update, after
    /// chained user → badge → requirement existence checks. Last writer
    /// wins under concurrent toggles; there is no conflict retry.
    pub async fn set_requirement_completion(
        &self,
        user_id: &str,
        badge_id: i64,
        requirement_id: i64,
        completed: bool,
    ) -> Result<User, AppError> {
        let oid = validation::parse_object_id(
            user_id,
            AppError::UserNotFound(format!("bad id {}", user_id)),
        )?;

        let user = self.find_by_query(doc! { "_id": oid }).await?;
        let badge = user
            .earned_badges
            .iter()
            .find(|b| b.badge_id == badge_id)
            .ok_or_else(|| AppError::BadgeNotFound(format!("badge with id {} not found", badge_id)))?;
        badge
            .requirements
            .iter()
            .find(|r| r.requirement_id == requirement_id)
            .ok_or_else(|| {
                AppError::RequirementNotFound(format!(
                    "requirement with id {} not found",
                    requirement_id
                ))
            })?;

        self.apply_operations(
            doc! { "_id": oid },
            doc! {
                "$set": {
                    "earned_badges.$[badge].requirements.$[req].completed": completed
                }
            },
            Some(vec![
                doc! { "badge.badge_id": badge_id },
                doc! { "req.requirement_id": requirement_id },
            ]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_options_return_the_post_image_with_and_without_filters() {
        let plain = update_options(None);
        assert!(matches!(plain.return_document, Some(ReturnDocument::After)));
        assert!(plain.array_filters.is_none());

        let filters = vec![
            doc! { "badge.badge_id": 7_i64 },
            doc! { "req.requirement_id": 3_i64 },
        ];
        let filtered = update_options(Some(filters.clone()));
        assert!(matches!(filtered.return_document, Some(ReturnDocument::After)));
        assert_eq!(filtered.array_filters, Some(filters));
    }
}

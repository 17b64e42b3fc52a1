use crate::config::Config;
use crate::models::{AddBadgeRequest, CompletionRequest, User};
use crate::services::UserService;
use crate::utils::error::AppError;
use actix_web::{web, HttpResponse};

/// GET /user/{id} - fetches a user document. The password field never
/// serializes, so the response is safe to hand back as-is.
#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId hex")),
    responses(
        (status = 200, description = "User document", body = User),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    users: web::Data<UserService>,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("👤 GET /user/{}", id);

    match users.find_by_id(&id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => e.to_response(config.production),
    }
}

/// DELETE /user/{id} - removes the account.
#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId hex")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    users: web::Data<UserService>,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("🗑️ DELETE /user/{}", id);

    match users.delete_by_id(&id).await {
        Ok(()) => {
            log::info!("✅ User {} deleted", id);
            HttpResponse::Ok().json(serde_json::json!({ "message": "User deleted" }))
        }
        Err(e) => e.to_response(config.production),
    }
}

/// POST /user/{id}/badge - adds a catalog badge to the user's earned set,
/// embedding its requirements uncompleted.
#[utoipa::path(
    post,
    path = "/user/{id}/badge",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId hex")),
    request_body = AddBadgeRequest,
    responses(
        (status = 201, description = "Badge added, updated user returned", body = User),
        (status = 400, description = "Missing badgeId"),
        (status = 404, description = "Unknown user or badge")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_badge(
    users: web::Data<UserService>,
    config: web::Data<Config>,
    path: web::Path<String>,
    body: web::Json<AddBadgeRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("🏅 POST /user/{}/badge", id);

    let badge_id = match body.badge_id {
        Some(badge_id) => badge_id,
        None => return AppError::InvalidBadgeId("badgeId is required".to_string())
            .to_response(config.production),
    };

    match users.add_badge(&id, badge_id).await {
        Ok(user) => {
            log::info!("✅ Badge {} added to user {}", badge_id, id);
            HttpResponse::Created().json(user)
        }
        Err(e) => e.to_response(config.production),
    }
}

/// DELETE /user/{id}/badge/{badge_id} - removes a badge from the earned
/// set by numeric identity.
#[utoipa::path(
    delete,
    path = "/user/{id}/badge/{badge_id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ObjectId hex"),
        ("badge_id" = i64, Path, description = "Catalog badge id")
    ),
    responses(
        (status = 200, description = "Badge removed, updated user returned", body = User),
        (status = 400, description = "User does not hold the badge"),
        (status = 404, description = "Unknown user or badge")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_badge(
    users: web::Data<UserService>,
    config: web::Data<Config>,
    path: web::Path<(String, i64)>,
) -> HttpResponse {
    let (id, badge_id) = path.into_inner();
    log::info!("🗑️ DELETE /user/{}/badge/{}", id, badge_id);

    // Confirm the user actually holds the badge so the removal of an
    // unheld badge is a 400, not a silent success.
    let user = match users.find_by_id(&id).await {
        Ok(user) => user,
        Err(e) => return e.to_response(config.production),
    };
    if !user.has_badge(badge_id) {
        return AppError::DoesNotHaveBadge.to_response(config.production);
    }

    match users.remove_badge(&id, badge_id).await {
        Ok(user) => {
            log::info!("✅ Badge {} removed from user {}", badge_id, id);
            HttpResponse::Ok().json(user)
        }
        Err(e) => e.to_response(config.production),
    }
}

/// PUT /user/{id}/badge/{badge_id}/requirement/{requirement_id} - backfills
/// a catalog requirement into an earned badge attached before the
/// requirement was seeded.
pub async fn add_badge_requirement(
    users: web::Data<UserService>,
    config: web::Data<Config>,
    path: web::Path<(String, i64, i64)>,
) -> HttpResponse {
    let (id, badge_id, requirement_id) = path.into_inner();
    log::info!(
        "🔧 PUT /user/{}/badge/{}/requirement/{}",
        id,
        badge_id,
        requirement_id
    );

    match users
        .update_badge_requirement(&id, badge_id, requirement_id)
        .await
    {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => e.to_response(config.production),
    }
}

/// PATCH /user/{id}/badge/{badge_id}/requirement/{requirement_id} - flips
/// the nested completion flag. Idempotent; repeated toggles settle on the
/// last committed value.
#[utoipa::path(
    patch,
    path = "/user/{id}/badge/{badge_id}/requirement/{requirement_id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ObjectId hex"),
        ("badge_id" = i64, Path, description = "Catalog badge id"),
        ("requirement_id" = i64, Path, description = "Catalog requirement id")
    ),
    request_body = CompletionRequest,
    responses(
        (status = 200, description = "Completion updated, updated user returned", body = User),
        (status = 400, description = "Missing completed flag"),
        (status = 404, description = "Unknown user, badge or requirement")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_requirement(
    users: web::Data<UserService>,
    config: web::Data<Config>,
    path: web::Path<(String, i64, i64)>,
    body: web::Json<CompletionRequest>,
) -> HttpResponse {
    let (id, badge_id, requirement_id) = path.into_inner();
    log::info!(
        "✏️ PATCH /user/{}/badge/{}/requirement/{}",
        id,
        badge_id,
        requirement_id
    );

    let completed = match body.completed {
        Some(completed) => completed,
        None => return AppError::InvalidCompletionStatus.to_response(config.production),
    };

    match users
        .set_requirement_completion(&id, badge_id, requirement_id, completed)
        .await
    {
        Ok(user) => {
            if let Some(badge) = user.earned_badges.iter().find(|b| b.badge_id == badge_id) {
                log::info!(
                    "✅ Requirement {} set completed={}; badge {} now {:?} ({}/{}) for user {}",
                    requirement_id,
                    completed,
                    badge_id,
                    badge.progress(),
                    badge.completed_count(),
                    badge.requirements.len(),
                    id
                );
            }
            HttpResponse::Ok().json(user)
        }
        Err(e) => e.to_response(config.production),
    }
}

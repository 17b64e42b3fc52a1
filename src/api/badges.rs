use crate::config::Config;
use crate::database::MongoDB;
use crate::services::badge_service;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub badge: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub categories: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequirementQuery {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BadgeIdQuery {
    pub badge_id: Option<i64>,
}

/// GET /badges - the full catalog.
#[utoipa::path(
    get,
    path = "/badges",
    tag = "Badges",
    responses(
        (status = 200, description = "Full badge catalog", body = [crate::models::Badge])
    )
)]
pub async fn get_badges(db: web::Data<MongoDB>, config: web::Data<Config>) -> HttpResponse {
    log::info!("📚 GET /badges");
    match badge_service::all_badges(&db).await {
        Ok(badges) => HttpResponse::Ok().json(badges),
        Err(e) => e.to_response(config.production),
    }
}

/// GET /badges/search?badge= - case-insensitive name search, 404 on no
/// match.
#[utoipa::path(
    get,
    path = "/badges/search",
    tag = "Badges",
    params(("badge" = String, Query, description = "Badge name fragment")),
    responses(
        (status = 200, description = "First matching badge", body = crate::models::Badge),
        (status = 400, description = "Missing badge parameter"),
        (status = 404, description = "No badge matched")
    )
)]
pub async fn search_badge(
    db: web::Data<MongoDB>,
    config: web::Data<Config>,
    query: web::Query<NameQuery>,
) -> HttpResponse {
    let name = match query.badge.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "badge parameter is required" }))
        }
    };
    log::info!("🔍 GET /badges/search?badge={}", name);

    match badge_service::search_by_name(&db, name).await {
        Ok(badge) => HttpResponse::Ok().json(badge),
        Err(e) => e.to_response(config.production),
    }
}

/// GET /badges/category?categories= - AND filter over the comma-separated
/// selection, 404 when nothing matches.
#[utoipa::path(
    get,
    path = "/badges/category",
    tag = "Badges",
    params(("categories" = String, Query, description = "Comma-separated category list")),
    responses(
        (status = 200, description = "Badges matching every category", body = [crate::models::Badge]),
        (status = 404, description = "No badge matched the selection")
    )
)]
pub async fn badges_by_category(
    db: web::Data<MongoDB>,
    config: web::Data<Config>,
    query: web::Query<CategoryQuery>,
) -> HttpResponse {
    let selection = query.categories.as_deref().unwrap_or_default();
    log::info!("🔍 GET /badges/category?categories={}", selection);

    match badge_service::search_by_categories(&db, selection).await {
        Ok(badges) => HttpResponse::Ok().json(badges),
        Err(e) => e.to_response(config.production),
    }
}

/// GET /badges/requirements?query= - badges whose requirement text matches,
/// empty list on no match.
#[utoipa::path(
    get,
    path = "/badges/requirements",
    tag = "Badges",
    params(("query" = String, Query, description = "Requirement text fragment")),
    responses(
        (status = 200, description = "Badges with a matching requirement", body = [crate::models::Badge]),
        (status = 400, description = "Missing query parameter")
    )
)]
pub async fn badges_by_requirement(
    db: web::Data<MongoDB>,
    config: web::Data<Config>,
    query: web::Query<RequirementQuery>,
) -> HttpResponse {
    let text = match query.query.as_deref() {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "query parameter is required" }))
        }
    };
    log::info!("🔍 GET /badges/requirements?query={}", text);

    match badge_service::search_by_requirement(&db, text).await {
        Ok(badges) => HttpResponse::Ok().json(badges),
        Err(e) => e.to_response(config.production),
    }
}

/// GET /requirements?badge_id= - requirement list for one badge; unknown
/// ids yield an empty list, not a 404.
#[utoipa::path(
    get,
    path = "/requirements",
    tag = "Badges",
    params(("badge_id" = i64, Query, description = "Catalog badge id")),
    responses(
        (status = 200, description = "Requirements for the badge", body = [crate::models::Requirement]),
        (status = 400, description = "Missing badge_id parameter")
    )
)]
pub async fn get_requirements(
    db: web::Data<MongoDB>,
    config: web::Data<Config>,
    query: web::Query<BadgeIdQuery>,
) -> HttpResponse {
    let badge_id = match query.badge_id {
        Some(badge_id) => badge_id,
        None => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "badge_id parameter is required" }))
        }
    };
    log::info!("📋 GET /requirements?badge_id={}", badge_id);

    match badge_service::requirements_for_badge(&db, badge_id).await {
        Ok(requirements) => HttpResponse::Ok().json(requirements),
        Err(e) => e.to_response(config.production),
    }
}

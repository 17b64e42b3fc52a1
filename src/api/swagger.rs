use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BadgeFinder API",
        version = "1.0.0",
        description = "Badge tracking API for Scouts. \n\n**Authentication:** `/user/*` endpoints require a JWT Bearer token (or the `jwt` session cookie set at signin).\n\n**Features:**\n- Two-step signup and JWT sign-in\n- Badge catalog browsing and search\n- Per-requirement completion tracking",
        contact(
            name = "BadgeFinder Team",
            email = "support@badgefinder.app"
        )
    ),
    paths(
        // Auth endpoints
        crate::api::auth::signup,
        crate::api::auth::signup_secondary,
        crate::api::auth::signin,

        // Health
        crate::api::health::health,

        // Users
        crate::api::users::get_user,
        crate::api::users::delete_user,
        crate::api::users::add_badge,
        crate::api::users::remove_badge,
        crate::api::users::update_requirement,

        // Badges
        crate::api::badges::get_badges,
        crate::api::badges::search_badge,
        crate::api::badges::badges_by_category,
        crate::api::badges::badges_by_requirement,
        crate::api::badges::get_requirements,
    ),
    components(
        schemas(
            // Auth
            crate::models::SignupRequest,
            crate::models::SecondarySignupRequest,
            crate::models::SigninRequest,
            crate::models::AuthResponse,

            // Users
            crate::models::User,
            crate::models::UserBadge,
            crate::models::UserRequirement,
            crate::models::AddBadgeRequest,
            crate::models::CompletionRequest,

            // Catalog
            crate::models::Badge,
            crate::models::Requirement,

            // Health
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Two-step signup and JWT sign-in endpoints."),
        (name = "Users", description = "Per-user badge and requirement tracking. Requires authentication."),
        (name = "Badges", description = "Badge catalog browsing, search and requirement lookups."),
        (name = "Health", description = "Liveness probe for monitoring service status."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}

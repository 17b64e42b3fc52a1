mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = config::Config::from_env().unwrap_or_else(|e| {
        log::error!("❌ Configuration error: {}", e);
        std::process::exit(1);
    });

    log::info!("🚀 Starting BadgeFinder API...");
    log::info!("📊 Database: {}", config.mongodb_uri);

    // Initialize MongoDB connection
    let db = match database::MongoDB::new(&config.mongodb_uri).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("✅ MongoDB connected successfully");

    let users = services::UserService::new(db.clone());
    let limiter = middleware::RateLimiter::new(
        middleware::rate_limit::MAX_REQUESTS,
        middleware::rate_limit::WINDOW,
    );

    let db_data = web::Data::new(db.clone());
    let users_data = web::Data::new(users.clone());
    let config_data = web::Data::new(config.clone());

    let host = config.host.clone();
    let port = config.port.clone();
    let allowed_origin = config.allowed_origin.clone();
    let jwt_secret = config.jwt_secret.clone();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(users_data.clone())
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(middleware::RateLimit::new(limiter.clone()))
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health))
            // Auth endpoints
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(api::auth::signup))
                    .route("/signup-secondary", web::post().to(api::auth::signup_secondary))
                    .route("/signin", web::post().to(api::auth::signin))
                    .default_service(web::route().to(api::auth::method_not_allowed)),
            )
            // User endpoints - require JWT
            .service(
                web::scope("/user")
                    .wrap(middleware::AuthMiddleware::new(
                        jwt_secret.clone(),
                        users.clone(),
                    ))
                    .route("/{id}", web::get().to(api::users::get_user))
                    .route("/{id}", web::delete().to(api::users::delete_user))
                    .route("/{id}/badge", web::post().to(api::users::add_badge))
                    .route(
                        "/{id}/badge/{badge_id}",
                        web::delete().to(api::users::remove_badge),
                    )
                    .route(
                        "/{id}/badge/{badge_id}/requirement/{requirement_id}",
                        web::put().to(api::users::add_badge_requirement),
                    )
                    .route(
                        "/{id}/badge/{badge_id}/requirement/{requirement_id}",
                        web::patch().to(api::users::update_requirement),
                    )
                    .default_service(web::route().to(api::auth::method_not_allowed)),
            )
            // Badge catalog endpoints
            .service(
                web::scope("/badges")
                    .route("", web::get().to(api::badges::get_badges))
                    .route("/search", web::get().to(api::badges::search_badge))
                    .route("/category", web::get().to(api::badges::badges_by_category))
                    .route(
                        "/requirements",
                        web::get().to(api::badges::badges_by_requirement),
                    )
                    .default_service(web::route().to(api::auth::method_not_allowed)),
            )
            .route("/requirements", web::get().to(api::badges::get_requirements))
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}

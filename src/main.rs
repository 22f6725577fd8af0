mod api;
mod config;
mod database;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{dev::Service, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::database::{MongoDB, UserStore};
use crate::services::{BytezGateway, ModelGateway};

fn io_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        io_error(e.to_string())
    })?;

    log::info!("🚀 Starting Caption & Trend Service...");
    log::info!("🔑 Bytez API key configured: {}", !config.gateway.api_key.is_empty());
    if config.gateway.api_key.is_empty() {
        log::warn!("⚠️  BYTEZ_API_KEY is empty, every model call will be rejected by the provider");
    }

    // Initialize MongoDB connection
    let db = MongoDB::new(&config.database_url)
        .await
        .map_err(|e| io_error(format!("Failed to connect to MongoDB: {}", e)))?;
    log::info!("✅ MongoDB connected successfully");

    let store: Arc<dyn UserStore> = Arc::new(db);

    // 👑 Bootstrap admin account
    if let Some(seed) = &config.admin_seed {
        seeds::admin_seed::seed_admin(store.as_ref(), seed, config.bcrypt_cost).await;
    }

    let gateway: Arc<dyn ModelGateway> =
        Arc::new(BytezGateway::new(&config.gateway).map_err(|e| io_error(e.to_string()))?);

    let bind_address = config.bind_address();
    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);
    log::info!("📄 OpenAPI spec at: http://{}/api-docs/openapi.json", bind_address);

    let store_data = web::Data::from(store);
    let gateway_data = web::Data::from(gateway);
    let config_data = web::Data::new(config);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = config_data
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(gateway_data.clone())
            .app_data(config_data.clone())
            .wrap_fn(|req, srv| {
                api::metrics::increment_request_count();
                srv.call(req)
            })
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .wrap(cors)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            .configure(api::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}

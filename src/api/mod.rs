/// Builds a test service over the full route table with the given store, gateway and config.
#[cfg(test)]
macro_rules! test_app {
    ($store:expr, $gateway:expr, $config:expr) => {{
        let store: std::sync::Arc<dyn crate::database::UserStore> = $store.clone();
        let gateway: std::sync::Arc<dyn crate::services::ModelGateway> = $gateway.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::from(store))
                .app_data(actix_web::web::Data::from(gateway))
                .app_data(actix_web::web::Data::new($config.clone()))
                .configure(crate::api::configure),
        )
        .await
    }};
}

pub mod admin;
pub mod ai;
pub mod auth;
pub mod health;
pub mod metrics;
pub mod models;
pub mod swagger;
pub mod trends;

use actix_web::web;

use crate::middleware::auth::AuthMiddleware;
use crate::utils::AppError;

/// Malformed JSON bodies get the same `{success, error}` shape as every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err, _req| AppError::InvalidRequest(format!("Invalid request body: {}", err)).into())
}

/// Registers every route. Expects `Data<dyn UserStore>`, `Data<dyn ModelGateway>` and
/// `Data<AppConfig>` to be present on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        // Health check
        .route("/health", web::get().to(health::health_check))
        // Metrics
        .route("/metrics", web::get().to(metrics::get_metrics))
        // Auth endpoints
        .service(
            web::scope("/api/v1/auth")
                .route("/signup", web::post().to(auth::signup))
                .route("/login", web::post().to(auth::login))
                .route("/refresh", web::post().to(auth::refresh_token))
                .route("/verify", web::get().to(auth::verify_token))
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::get_me)),
                ),
        )
        // Admin panel
        .service(
            web::scope("/api/v1/admin")
                .wrap(AuthMiddleware)
                .route("/users", web::get().to(admin::list_users))
                .route("/users", web::put().to(admin::update_user)),
        )
        // Public model catalog
        .route("/api/v1/models", web::get().to(models::get_models))
        // Generation
        .service(
            web::scope("/api/v1/ai")
                .wrap(AuthMiddleware)
                .route("/generate", web::post().to(ai::generate))
                .route("/insights", web::post().to(ai::insights)),
        )
        .service(
            web::scope("/api/v1/trends")
                .wrap(AuthMiddleware)
                .route("", web::get().to(trends::get_trends)),
        );
}

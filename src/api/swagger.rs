use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Caption & Trend Service API",
        version = "1.0.0",
        description = "Caption generation and trend analysis for social media creators.\n\n**Authentication:** Most endpoints require a JWT Bearer access token from `/api/v1/auth/login`.\n\n**Access:** New accounts start pending. An admin approves them and enables features one by one (Trend Dashboard, Caption Generation, Image Analysis, Audio Analysis)."
    ),
    paths(
        // Auth endpoints
        crate::api::auth::signup,
        crate::api::auth::login,
        crate::api::auth::refresh_token,
        crate::api::auth::verify_token,
        crate::api::auth::get_me,

        // Admin
        crate::api::admin::list_users,
        crate::api::admin::update_user,

        // AI
        crate::api::ai::generate,
        crate::api::ai::insights,
        crate::api::trends::get_trends,
        crate::api::models::get_models,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            // Auth
            crate::services::auth_service::SignupRequest,
            crate::services::auth_service::RefreshTokenRequest,
            crate::services::auth_service::AuthResponse,
            crate::api::auth::VerifyTokenResponse,
            crate::api::auth::ProfileResponse,

            // Users
            crate::models::UserProfile,
            crate::models::UserRole,
            crate::models::UserStatus,
            crate::models::UserPermissions,
            crate::models::ProfileUpdate,
            crate::services::user_service::UserListResponse,

            // AI
            crate::models::PipelineInput,
            crate::models::PipelineOutput,
            crate::models::TrendData,
            crate::models::TrendSource,
            crate::models::TrendsResponse,
            crate::services::insights_service::InsightsRequest,
            crate::services::insights_service::InsightsResponse,
            crate::services::insights_service::SentimentResult,

            // Health & Metrics
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Email/password accounts with locally issued access and refresh tokens."),
        (name = "Admin", description = "User approval, role and feature permission management. Admin only."),
        (name = "AI", description = "Caption pipeline over text, image, audio and video, plus text insights."),
        (name = "Trends", description = "Current content trends from a text model, with a static fallback."),
        (name = "Models", description = "Featured models per medium."),
        (name = "Health", description = "Health check and system metrics endpoints for monitoring service status."),
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
                        .description(Some("Access token from /api/v1/auth/login or /api/v1/auth/signup"))
                        .build()
                ),
            );
        }
    }
}

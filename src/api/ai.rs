use actix_web::{web, HttpResponse};

use crate::database::UserStore;
use crate::models::{Permission, PipelineInput, PipelineOutput, UserProfile};
use crate::services::auth_service::{self, Claims};
use crate::services::insights_service::{self, InsightsRequest, InsightsResponse};
use crate::services::pipeline_service;
use crate::services::ModelGateway;
use crate::utils::AppError;

/// Caption generation plus the analysis flag each supplied medium needs.
fn ensure_pipeline_permissions(profile: &UserProfile, input: &PipelineInput) -> Result<(), AppError> {
    auth_service::ensure_permission(profile, Permission::CaptionGen)?;

    if input.image().is_some() || input.video().is_some() {
        auth_service::ensure_permission(profile, Permission::ImageAnalysis)?;
    }
    if input.audio().is_some() {
        auth_service::ensure_permission(profile, Permission::AudioAnalysis)?;
    }

    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/generate",
    tag = "AI",
    request_body = PipelineInput,
    responses(
        (status = 200, description = "Caption variations, strategy reasoning and media analyses", body = PipelineOutput),
        (status = 400, description = "No caption text and no media"),
        (status = 403, description = "Not approved or feature not enabled"),
        (status = 502, description = "Model API Error")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn generate(
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
    gateway: web::Data<dyn ModelGateway>,
    input: web::Json<PipelineInput>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "✨ POST /ai/generate - {} (image: {}, audio: {}, video: {})",
        claims.sub,
        input.image().is_some(),
        input.audio().is_some(),
        input.video().is_some()
    );

    let profile = auth_service::require_approval(store.get_ref(), &claims).await?;
    ensure_pipeline_permissions(&profile, &input)?;

    let output = pipeline_service::run_trend_pipeline(gateway.get_ref(), &input).await?;

    Ok(HttpResponse::Ok().json(output))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/insights",
    tag = "AI",
    request_body = InsightsRequest,
    responses(
        (status = 200, description = "Sentiment, summary and topics", body = InsightsResponse),
        (status = 400, description = "Text is required"),
        (status = 403, description = "Not approved or feature not enabled")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn insights(
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
    gateway: web::Data<dyn ModelGateway>,
    request: web::Json<InsightsRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔎 POST /ai/insights - {}", claims.sub);

    let profile = auth_service::require_approval(store.get_ref(), &claims).await?;
    auth_service::ensure_permission(&profile, Permission::CaptionGen)?;

    let response = insights_service::text_insights(gateway.get_ref(), &request.text).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{account, bearer, test_config};
    use crate::database::memory::InMemoryUserStore;
    use crate::models::{UserPermissions, UserRole, UserStatus};
    use crate::services::gateway::testing::ScriptedGateway;
    use crate::services::gateway::GatewayError;
    use actix_web::test as actix_test;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn captions_only() -> UserPermissions {
        UserPermissions {
            caption_gen: true,
            ..Default::default()
        }
    }

    fn echo_gateway() -> Arc<ScriptedGateway> {
        Arc::new(ScriptedGateway::new(|_| {
            Ok(json!("1. Ideas\nSunset vibes only\n\"Golden hour glow\"\n- Beach days"))
        }))
    }

    #[test]
    fn test_media_permissions() {
        let mut profile = UserProfile::new_pending("u".into(), "u@example.com".into());
        profile.permissions = captions_only();

        let text_only = PipelineInput {
            caption_text: Some("hi".into()),
            ..Default::default()
        };
        assert!(ensure_pipeline_permissions(&profile, &text_only).is_ok());

        let video = PipelineInput {
            video_url: Some("https://cdn.example.com/v.mp4".into()),
            ..Default::default()
        };
        let err = ensure_pipeline_permissions(&profile, &video).unwrap_err();
        assert_eq!(err.to_string(), "Permission denied: Image Analysis not enabled for this user.");

        let audio = PipelineInput {
            audio_url: Some("https://cdn.example.com/a.mp3".into()),
            ..Default::default()
        };
        profile.permissions.image_analysis = true;
        let err = ensure_pipeline_permissions(&profile, &audio).unwrap_err();
        assert_eq!(err.to_string(), "Permission denied: Audio Analysis not enabled for this user.");
    }

    #[actix_web::test]
    async fn test_generate_for_approved_user() {
        let store = Arc::new(InMemoryUserStore::new());
        let config = test_config();
        let token = account(&store, &config, "creator", UserRole::User, UserStatus::Approved, captions_only());
        let gateway = echo_gateway();
        let app = test_app!(store, gateway, config);

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/ai/generate")
            .insert_header(bearer(&token))
            .set_json(json!({ "captionText": "Beach day", "model": "microsoft/Phi-3-mini-4k-instruct" }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
        let body: Value = actix_test::read_body_json(res).await;

        assert_eq!(
            body["variations"],
            json!(["Sunset vibes only", "Golden hour glow", "Beach days"])
        );
        assert!(body["generatedReasoning"].is_string());
        assert_eq!(body["imageAnalysis"], "");
        assert!(gateway
            .calls()
            .iter()
            .any(|c| c.model_id == "microsoft/Phi-3-mini-4k-instruct"));
    }

    #[actix_web::test]
    async fn test_generate_gates() {
        let store = Arc::new(InMemoryUserStore::new());
        let config = test_config();
        let pending = account(&store, &config, "pending", UserRole::User, UserStatus::Pending, captions_only());
        let no_flags = account(&store, &config, "plain", UserRole::User, UserStatus::Approved, UserPermissions::default());
        let creator = account(&store, &config, "creator", UserRole::User, UserStatus::Approved, captions_only());
        let gateway = echo_gateway();
        let app = test_app!(store, gateway, config);

        let generate = |token: &str, body: Value| {
            actix_test::TestRequest::post()
                .uri("/api/v1/ai/generate")
                .insert_header(bearer(token))
                .set_json(body)
                .to_request()
        };

        let body: Value =
            actix_test::call_and_read_body_json(&app, generate(&pending, json!({ "captionText": "x" }))).await;
        assert_eq!(body["error"], "Forbidden: Account pending approval");

        let body: Value =
            actix_test::call_and_read_body_json(&app, generate(&no_flags, json!({ "captionText": "x" }))).await;
        assert_eq!(body["error"], "Permission denied: Caption Generation not enabled for this user.");

        let res = actix_test::call_service(
            &app,
            generate(&creator, json!({ "imageUrl": "https://cdn.example.com/p.jpg" })),
        )
        .await;
        assert_eq!(res.status(), 403);

        let res = actix_test::call_service(&app, generate(&creator, json!({ "captionText": "  " }))).await;
        assert_eq!(res.status(), 400);

        assert!(gateway.calls().is_empty());
    }

    #[actix_web::test]
    async fn test_gateway_failure_is_bad_gateway() {
        let store = Arc::new(InMemoryUserStore::new());
        let config = test_config();
        let token = account(&store, &config, "creator", UserRole::User, UserStatus::Approved, captions_only());
        let gateway = Arc::new(ScriptedGateway::new(|_| {
            Err(GatewayError::Status {
                status: "429 Too Many Requests".into(),
                body: "slow down".into(),
            })
        }));
        let app = test_app!(store, gateway, config);

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/ai/generate")
            .insert_header(bearer(&token))
            .set_json(json!({ "captionText": "Beach day" }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), 502);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body["error"],
            "Model API Error: Bytez API error: 429 Too Many Requests - slow down"
        );
    }

    #[actix_web::test]
    async fn test_insights() {
        let store = Arc::new(InMemoryUserStore::new());
        let config = test_config();
        let token = account(&store, &config, "creator", UserRole::User, UserStatus::Approved, captions_only());
        let gateway = Arc::new(ScriptedGateway::new(|call| {
            Ok(match call.model_id.as_str() {
                crate::models::catalog::SENTIMENT_MODEL => json!({ "label": "positive", "score": 0.8 }),
                crate::models::catalog::TOPIC_MODEL => json!({ "labels": ["travel"] }),
                _ => json!("Short summary"),
            })
        }));
        let app = test_app!(store, gateway, config);

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/ai/insights")
            .insert_header(bearer(&token))
            .set_json(json!({ "text": "Loved the beach" }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["sentiment"]["label"], "positive");
        assert_eq!(body["summary"], "Short summary");
        assert_eq!(body["topics"], json!(["travel"]));
    }
}

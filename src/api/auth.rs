use actix_web::{http::header::AUTHORIZATION, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::UserStore;
use crate::models::UserProfile;
use crate::services::auth_service::{
    self, AuthResponse, Claims, LoginRequest, RefreshTokenRequest, SignupRequest, TokenUse,
};
use crate::utils::AppError;

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VerifyTokenResponse {
    pub success: bool,
    pub valid: bool,
    pub uid: String,
    pub email: String,
    pub exp: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: UserProfile,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, pending approval", body = AuthResponse),
        (status = 400, description = "Invalid email or password too short"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn signup(
    store: web::Data<dyn UserStore>,
    config: web::Data<AppConfig>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /auth/signup - email: {}", request.email);

    let response = auth_service::signup(store.get_ref(), &config.jwt, config.bcrypt_cost, &request)
        .await
        .map_err(|e| {
            log::warn!("❌ Signup failed: {} - {}", request.email, e);
            e
        })?;

    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    store: web::Data<dyn UserStore>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    match auth_service::login(store.get_ref(), &config.jwt, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {} ({:?})", request.email, response.profile.status);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = AuthResponse),
        (status = 401, description = "Invalid or expired refresh token"),
        (status = 403, description = "Account disabled")
    )
)]
pub async fn refresh_token(
    store: web::Data<dyn UserStore>,
    config: web::Data<AppConfig>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔄 POST /auth/refresh");

    let response = auth_service::refresh_token(store.get_ref(), &config.jwt, &request).await?;

    log::info!("✅ Token refreshed for {}", response.profile.uid);
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid", body = VerifyTokenResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn verify_token(req: HttpRequest, config: web::Data<AppConfig>) -> Result<HttpResponse, AppError> {
    log::info!("✓ GET /auth/verify");

    let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = auth_service::bearer_token(header)?;
    let claims = auth_service::verify_token(&config.jwt, token, TokenUse::Access)?;

    log::info!("✅ Token valid for user: {}", claims.sub);
    Ok(HttpResponse::Ok().json(VerifyTokenResponse {
        success: true,
        valid: true,
        uid: claims.sub,
        email: claims.email,
        exp: claims.exp,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Caller's profile, whatever its status", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User profile not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(claims: web::ReqData<Claims>, store: web::Data<dyn UserStore>) -> Result<HttpResponse, AppError> {
    log::info!("👤 GET /auth/me - {}", claims.sub);

    let profile = auth_service::get_user_profile(store.get_ref(), &claims.sub).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse { success: true, profile }))
}

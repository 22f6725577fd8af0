use actix_web::{web, HttpResponse};

use crate::database::UserStore;
use crate::models::ProfileUpdate;
use crate::services::auth_service::{self, Claims};
use crate::services::user_service::{self, UserListResponse};
use crate::utils::AppError;

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "All profiles, newest first", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(claims: web::ReqData<Claims>, store: web::Data<dyn UserStore>) -> Result<HttpResponse, AppError> {
    log::info!("👥 GET /admin/users - {}", claims.sub);

    auth_service::require_admin(store.get_ref(), &claims).await?;
    let response = user_service::list_users(store.get_ref()).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users",
    tag = "Admin",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "UID required or nothing to update"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Unknown uid")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
    update: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    log::info!("🛠️  PUT /admin/users - {} -> {:?}", claims.sub, update.uid);

    let admin = auth_service::require_admin(store.get_ref(), &claims).await?;
    user_service::update_user(store.get_ref(), &admin, &update).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

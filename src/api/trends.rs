use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::database::UserStore;
use crate::models::catalog::DEFAULT_TEXT_MODEL;
use crate::models::{Permission, TrendsResponse};
use crate::services::auth_service::{self, Claims};
use crate::services::{trend_service, ModelGateway};
use crate::utils::AppError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TrendsQuery {
    /// Text model to ask; defaults to the catalog's text default
    pub model: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/trends",
    tag = "Trends",
    params(TrendsQuery),
    responses(
        (status = 200, description = "Six trend categories, from the model or the static fallback", body = TrendsResponse),
        (status = 403, description = "Not approved or Trend Dashboard not enabled"),
        (status = 502, description = "Model API Error")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_trends(
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
    gateway: web::Data<dyn ModelGateway>,
    query: web::Query<TrendsQuery>,
) -> Result<HttpResponse, AppError> {
    let model = query
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_TEXT_MODEL);

    log::info!("📊 GET /trends - {} (model: {})", claims.sub, model);

    let profile = auth_service::require_approval(store.get_ref(), &claims).await?;
    auth_service::ensure_permission(&profile, Permission::TrendDashboard)?;

    let today = chrono::Local::now().date_naive();
    let (trends, source) = trend_service::analyze_trends(gateway.get_ref(), model, today).await?;

    Ok(HttpResponse::Ok().json(TrendsResponse {
        success: true,
        trends,
        source,
        last_updated: chrono::Utc::now().to_rfc3339(),
    }))
}

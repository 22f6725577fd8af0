use actix_web::HttpResponse;

use crate::models::model_catalog;

/// Featured models per medium and the defaults the pipeline uses.
#[utoipa::path(
    get,
    path = "/api/v1/models",
    tag = "Models",
    responses(
        (status = 200, description = "Static model catalog: featured_models and defaults per medium")
    )
)]
pub async fn get_models() -> HttpResponse {
    HttpResponse::Ok().json(model_catalog())
}

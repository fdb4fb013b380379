use axum::{Json, Router, extract::Path, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::response::ApiResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct Recommendations {
    /// Recommended product ids.
    pub recommendations: Vec<String>,
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/recommend/user/{user_id}", get(recommend_for_user))
}

// No ranking yet; the endpoint exists so clients can integrate against it.
#[utoipa::path(
    get,
    path = "/recommend/user/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Recommended products (currently always empty)", body = ApiResponse<Recommendations>)
    ),
    tag = "Recommendations"
)]
pub async fn recommend_for_user(Path(user_id): Path<String>) -> Json<ApiResponse<Recommendations>> {
    tracing::debug!(%user_id, "recommendations requested");
    Json(ApiResponse::success(Recommendations {
        recommendations: Vec::new(),
    }))
}

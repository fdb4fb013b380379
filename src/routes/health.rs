use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthData {
    pub status: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ReadinessData {
    pub ready: bool,
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/readiness", get(readiness))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = HealthData),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthData> {
    Json(HealthData {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/readiness",
    responses(
        (status = 200, description = "Ready to serve traffic", body = ReadinessData),
    ),
    tag = "Health"
)]
pub async fn readiness() -> Json<ReadinessData> {
    Json(ReadinessData { ready: true })
}

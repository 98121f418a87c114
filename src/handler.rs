use std::sync::Arc;

use axum::Json;
use axum::response::IntoResponse;
use tracing::info;

use crate::api::HealthResponse;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Liveness check
///
/// `GET /health` always answers 200; the body says whether the store answered
/// a ping.
///
/// ```json
/// { "status": "healthy", "version": "0.1.0", "database": "connected" }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: String,
    pub database: StoreStatus,
}

impl HealthResponse {
    fn from_store(database: StoreStatus) -> Self {
        let status = match database {
            StoreStatus::Connected => ServiceStatus::Healthy,
            StoreStatus::Disconnected => ServiceStatus::Degraded,
        };

        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.store.ping().await {
        Ok(()) => StoreStatus::Connected,
        Err(e) => {
            tracing::warn!(error = %e, "Store ping failed");
            StoreStatus::Disconnected
        }
    };

    Json(HealthResponse::from_store(database))
}

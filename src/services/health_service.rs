use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report the degraded flag, logging storage connectivity issues on the way.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_state_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    HealthResponse::from_degraded(state.is_degraded())
}

use axum::Json;
use axum::extract::State;

use crate::ForgeError;
use crate::middleware::client_id::ClientId;
use crate::router::AppState;
use crate::service::profile;
use crate::types::profile::{ProfileAnalysisRequest, ProfileAnalysisResponse};

pub async fn analyze(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<ProfileAnalysisRequest>,
) -> Result<Json<ProfileAnalysisResponse>, ForgeError> {
    state.limits.check_threadgen(&client.partition_key())?;
    let response = profile::analyze(&state.chat, request).await?;
    Ok(Json(response))
}

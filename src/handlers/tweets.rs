use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::ForgeError;
use crate::middleware::client_id::ClientId;
use crate::router::AppState;
use crate::service::improver;
use crate::types::tweet::{ImproveTweetRequest, ImproveTweetResponse, improvement_types};

pub async fn improve(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<ImproveTweetRequest>,
) -> Result<Json<ImproveTweetResponse>, ForgeError> {
    state.limits.check_threadgen(&client.partition_key())?;
    let response = improver::improve(&state.chat, request).await?;
    Ok(Json(response))
}

/// Static map of improvement type to description, for the front end.
pub async fn improvement_types_handler(
    State(state): State<AppState>,
    client: ClientId,
) -> Result<Json<Value>, ForgeError> {
    state.limits.check_general(&client.partition_key())?;
    let map: serde_json::Map<String, Value> = improvement_types::DESCRIPTIONS
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    Ok(Json(Value::Object(map)))
}

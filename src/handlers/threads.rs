use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use crate::ForgeError;
use crate::middleware::client_id::ClientId;
use crate::router::AppState;
use crate::service::threads;
use crate::types::thread::{
    DraftFeedbackRequest, GenerateThreadRequest, GenerateThreadResponse, HistoryDetail,
    HistoryListItem, HistoryQuery,
};

pub async fn generate(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<GenerateThreadRequest>,
) -> Result<Json<GenerateThreadResponse>, ForgeError> {
    state.limits.check_threadgen(&client.partition_key())?;
    let response = threads::generate(
        &state.chat,
        &state.search,
        &state.storage,
        request,
        client.as_str(),
    )
    .await?;
    Ok(Json(response))
}

pub async fn history_list(
    State(state): State<AppState>,
    client: ClientId,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryListItem>>, ForgeError> {
    state.limits.check_general(&client.partition_key())?;
    let items =
        threads::history_list(&state.storage, client.as_str(), query.limit, query.offset).await?;
    Ok(Json(items))
}

pub async fn history_detail(
    State(state): State<AppState>,
    client: ClientId,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryDetail>, ForgeError> {
    state.limits.check_general(&client.partition_key())?;
    let detail = threads::history_detail(&state.storage, id).await?;
    Ok(Json(detail))
}

pub async fn feedback(
    State(state): State<AppState>,
    client: ClientId,
    Path(id): Path<Uuid>,
    Json(request): Json<DraftFeedbackRequest>,
) -> Result<Json<serde_json::Value>, ForgeError> {
    state.limits.check_general(&client.partition_key())?;
    threads::apply_feedback(&state.storage, id, request).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

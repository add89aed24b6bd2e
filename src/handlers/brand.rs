use axum::Json;
use axum::extract::State;

use crate::ForgeError;
use crate::middleware::auth::RequireAdminKey;
use crate::middleware::client_id::ClientId;
use crate::router::AppState;
use crate::types::thread::BrandGuidelineBody;

pub async fn get(
    State(state): State<AppState>,
    client: ClientId,
) -> Result<Json<BrandGuidelineBody>, ForgeError> {
    state.limits.check_general(&client.partition_key())?;
    let text = state
        .storage
        .get_guideline()
        .await?
        .map(|g| g.text)
        .unwrap_or_default();
    Ok(Json(BrandGuidelineBody { text }))
}

/// Save the global brand guideline. Blank text clears it.
pub async fn upsert(
    State(state): State<AppState>,
    client: ClientId,
    _auth: RequireAdminKey,
    Json(body): Json<BrandGuidelineBody>,
) -> Result<Json<BrandGuidelineBody>, ForgeError> {
    state.limits.check_general(&client.partition_key())?;
    let text = body.text.trim().to_string();
    if text.chars().count() > 1500 {
        return Err(ForgeError::validation(
            "Brand guideline must not exceed 1500 characters",
        ));
    }

    if text.is_empty() {
        state.storage.delete_guideline().await?;
        return Ok(Json(BrandGuidelineBody {
            text: String::new(),
        }));
    }

    let saved = state.storage.upsert_guideline(&text).await?;
    Ok(Json(BrandGuidelineBody { text: saved.text }))
}

use crate::{error::ApiError, state::AppState};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use capfund_core::{AllocationRequest, AllocationResult};

/// Computes a capped allocation for the posted request.
///
/// Results are returned in the order of `coins` in the request.
///
/// # Errors
/// Returns `ApiError::InvalidRequest` for a body that does not parse,
/// `ApiError::TooManyAssets` above the configured limit, and
/// `ApiError::Allocation` when the engine rejects the request.
pub async fn calculate(
    State(state): State<AppState>,
    payload: Result<Json<AllocationRequest>, JsonRejection>,
) -> Result<Json<Vec<AllocationResult>>, ApiError> {
    let Json(request) = payload.inspect_err(|e| {
        tracing::warn!("Rejected allocation request body: {}", e.body_text());
    })?;

    if request.assets.len() > state.max_assets {
        tracing::warn!(
            "Rejected allocation request with {} assets (max {})",
            request.assets.len(),
            state.max_assets
        );
        return Err(ApiError::TooManyAssets {
            count: request.assets.len(),
            max: state.max_assets,
        });
    }

    tracing::info!(
        "Calculating allocation for {} assets at cap {}",
        request.assets.len(),
        request.asset_cap
    );

    let results = request.allocate().map_err(|e| {
        tracing::warn!("Allocation failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(results))
}

//! Token and proof lookup endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::extractors::validate_address;
use crate::response::{
    ApiError, EligibilityResponse, OwnershipResponse, ProofResponse, TokenResponse,
};
use crate::state::AppState;

/// Longest content id accepted on the proof route.
const MAX_CID_LEN: usize = 128;

fn parse_token_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(vec![format!("tokenId: invalid token id {:?}", raw)]))
}

fn is_content_id(raw: &str) -> bool {
    !raw.is_empty() && raw.len() <= MAX_CID_LEN && raw.chars().all(|c| c.is_ascii_alphanumeric())
}

fn check_address(raw: &str) -> Result<(), ApiError> {
    validate_address(raw).map_err(|e| {
        let msg = e
            .message
            .map(|m| m.into_owned())
            .unwrap_or_else(|| e.code.into_owned());
        ApiError::validation(vec![format!("userAddress: {}", msg)])
    })
}

/// GET /api/poa/:tokenId
pub async fn token_handler(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token_id = parse_token_id(&token_id)?;
    let data = state.token(token_id).await?;
    Ok(Json(TokenResponse {
        success: true,
        data,
    }))
}

/// GET /api/poa/proof/:cid
pub async fn proof_handler(
    State(state): State<AppState>,
    Path(cid): Path<String>,
) -> Result<Json<ProofResponse>, ApiError> {
    let cid = cid.trim();
    if !is_content_id(cid) {
        return Err(ApiError::validation(vec![format!(
            "cid: invalid content id {:?}",
            cid
        )]));
    }

    let data = state.pipeline.artifacts().fetch_proof(cid).await?;
    Ok(Json(ProofResponse {
        success: true,
        cid: cid.to_string(),
        data,
    }))
}

/// GET /api/poa/user/:userAddress/task/:taskId
pub async fn ownership_handler(
    State(state): State<AppState>,
    Path((user_address, task_id)): Path<(String, String)>,
) -> Result<Json<OwnershipResponse>, ApiError> {
    check_address(&user_address)?;
    let ownership = state
        .pipeline
        .issuer()
        .ownership(&user_address.to_lowercase(), &task_id)
        .await?;

    Ok(Json(OwnershipResponse {
        success: true,
        exists: ownership.exists,
        token_id: ownership.token_id,
    }))
}

/// GET /api/poa/user/:userAddress/eligibility
pub async fn eligibility_handler(
    State(state): State<AppState>,
    Path(user_address): Path<String>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    check_address(&user_address)?;
    let eligibility = state
        .pipeline
        .issuer()
        .eligibility(&user_address.to_lowercase())
        .await?;

    Ok(Json(EligibilityResponse {
        success: true,
        can_mint: eligibility.can_mint,
        time_remaining: eligibility.time_remaining,
    }))
}

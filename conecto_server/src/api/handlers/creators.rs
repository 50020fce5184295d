//! Handle claims, dashboard reads, and the preference write path.

use crate::api::errors::{ApiError, ApiResult};
use crate::api::validation::{validate_address, validate_handle};
use crate::api::AppState;
use crate::ledger::WebsitePreference;
use crate::preferences::ColorPalette;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ClaimHandleRequest {
    pub handle: String,
}

#[derive(Debug, Serialize)]
pub struct ClaimHandleResponse {
    pub handle: String,
    pub message: String,
}

/// `POST /api/claim-handle` — claim a handle through the server's signing
/// account.
pub async fn claim_handle(
    State(state): State<AppState>,
    Json(request): Json<ClaimHandleRequest>,
) -> ApiResult<(StatusCode, Json<ClaimHandleResponse>)> {
    validate_handle(&request.handle)?;

    if state.ledger.handle_claimed(&request.handle).await? {
        return Err(ApiError::handle_already_claimed(&request.handle));
    }

    state.ledger.claim_handle(&request.handle).await?;

    Ok((
        StatusCode::CREATED,
        Json(ClaimHandleResponse {
            handle: request.handle,
            message: "Handle claimed".to_string(),
        }),
    ))
}

/// Landing page content with palette colors as hex strings, as the client
/// edits them.
#[derive(Debug, Serialize, Deserialize)]
pub struct PreferenceBody {
    pub name: String,
    pub description: String,
    pub logo: String,
    pub colors: ColorPalette,
}

impl PreferenceBody {
    pub fn from_record(record: WebsitePreference) -> Self {
        Self {
            colors: ColorPalette::from_onchain(
                record.text_color,
                record.secondary_color,
                record.primary_color,
                record.bg_color,
            ),
            name: record.name,
            description: record.description,
            logo: record.logo,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub handle: String,
    pub subscription_contract: String,
    pub preferences: PreferenceBody,
    /// Phase of a pending publication, when one is parked mid-way
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_publication: Option<String>,
}

/// `GET /api/dashboard/{address}` — everything the editor needs to start a
/// session for a creator.
pub async fn dashboard(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<DashboardResponse>> {
    validate_address(&address)?;

    let record = state.ledger.creator_record(&address).await?;
    if record.handle.is_empty() {
        return Err(ApiError::not_found("No handle claimed for this address"));
    }

    let preferences = state.ledger.website_preferences(&record.handle).await?;
    let pending_publication = state.publications.pending_phase(&address).await;

    Ok(Json(DashboardResponse {
        handle: record.handle,
        subscription_contract: record.subscription_contract,
        preferences: PreferenceBody::from_record(preferences),
        pending_publication,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub address: String,
    #[serde(flatten)]
    pub preferences: PreferenceBody,
}

#[derive(Debug, Serialize)]
pub struct UpdatePreferencesResponse {
    pub message: String,
}

/// `PUT /api/preferences` — write a creator's landing page record, encoding
/// the hex palette into the on-chain color bytes.
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> ApiResult<Json<UpdatePreferencesResponse>> {
    validate_address(&request.address)?;

    let body = request.preferences;
    let (text_color, secondary_color, primary_color, bg_color) =
        body.colors.to_onchain().map_err(|e| {
            ApiError::unprocessable_entity(&e.to_string())
        })?;

    let record = WebsitePreference {
        name: body.name,
        description: body.description,
        logo: body.logo,
        text_color,
        secondary_color,
        primary_color,
        bg_color,
    };

    state
        .ledger
        .set_website_preferences(&request.address, &record)
        .await?;

    Ok(Json(UpdatePreferencesResponse {
        message: "Preferences saved".to_string(),
    }))
}

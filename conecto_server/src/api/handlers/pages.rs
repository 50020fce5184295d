//! Public pages: handle resolution and the preference read API.

use crate::api::errors::{ApiError, ApiResult};
use crate::api::handlers::creators::PreferenceBody;
use crate::api::AppState;
use crate::pages::{render_landing_page, render_not_found, LandingPage};
use crate::preferences::{ColorPalette, PreferenceStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};

/// `GET /{handle}` — the public landing page. An unclaimed handle renders a
/// 404 page rather than an indefinite placeholder.
pub async fn handle_page(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<(StatusCode, Html<String>)> {
    let record = state.ledger.website_preferences(&handle).await?;

    if record.is_empty() {
        return Ok((StatusCode::NOT_FOUND, Html(render_not_found(&handle))));
    }

    let colors = ColorPalette::from_onchain(
        record.text_color,
        record.secondary_color,
        record.primary_color,
        record.bg_color,
    );
    // Tier metadata lives on the subscription contract and is not rendered
    // on the public page yet, matching the read path of the editor preview.
    let html = render_landing_page(&LandingPage {
        logo: &record.logo,
        name: &record.name,
        description: &record.description,
        colors: &colors,
        tiers: &[],
    });

    Ok((StatusCode::OK, Html(html)))
}

/// `POST /api/preview` — render the editor's current store through the same
/// renderer that backs the public page, tiers included.
pub async fn preview(Json(store): Json<PreferenceStore>) -> Html<String> {
    Html(render_landing_page(&LandingPage {
        logo: &store.logo,
        name: &store.name,
        description: &store.description,
        colors: &store.colors,
        tiers: &store.tiers,
    }))
}

/// `GET /api/preferences/{handle}` — decoded preference record with palette
/// colors converted back to hex strings.
pub async fn preferences_by_handle(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Json<PreferenceBody>> {
    let record = state.ledger.website_preferences(&handle).await?;

    if record.is_empty() {
        return Err(ApiError::handle_not_found(&handle));
    }

    Ok(Json(PreferenceBody::from_record(record)))
}

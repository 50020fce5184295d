//! The subscription publication route.

use crate::api::errors::{ApiError, ApiResult};
use crate::api::validation::{validate_address, validate_handle, validate_price};
use crate::api::AppState;
use crate::publication::{Outcome, TierSpec};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub address: String,
    #[serde(rename = "slugName")]
    pub slug_name: String,
    pub subscriptions: Vec<TierSpec>,
}

#[derive(Debug, Serialize)]
pub struct CreateSubscriptionResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    pub deployed: bool,
    pub resumed: bool,
}

/// `POST /api/create-subscription` — publish a creator's tiers: ensure a
/// subscription contract exists, mint one token type per tier, and price
/// each tier's claim conditions.
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> ApiResult<Json<CreateSubscriptionResponse>> {
    validate_address(&request.address)?;
    validate_handle(&request.slug_name)?;
    for tier in &request.subscriptions {
        validate_price(tier.price)?;
    }

    let outcome = state
        .publications
        .publish(&request.address, &request.slug_name, request.subscriptions)
        .await
        .map_err(ApiError::from)?;

    let response = match outcome {
        Outcome::NoTiers => CreateSubscriptionResponse {
            message: "No subscriptions to add".to_string(),
            contract: None,
            deployed: false,
            resumed: false,
        },
        Outcome::Published {
            contract,
            deployed,
            resumed,
        } => CreateSubscriptionResponse {
            message: "Subscription created successfully".to_string(),
            contract: Some(contract),
            deployed,
            resumed,
        },
    };

    Ok(Json(response))
}

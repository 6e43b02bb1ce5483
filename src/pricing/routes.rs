//! HTTP routes for the pricing API.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::error::AppError;
use crate::AppState;

use super::requests::QuoteRequest;
use super::responses::QuoteResponse;
use super::services;

/// Router for the pricing API, merged into the application router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/pricing/quote", post(quote))
}

/// `POST /api/pricing/quote`
///
/// A malformed body or a missing/non-numeric `basePrice` is a 400 with
/// an error envelope; internal failures are a 500.
async fn quote(
    State(state): State<AppState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse>, AppError> {
    let Json(request) =
        payload.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

    let quote = services::price_quote(&state, request).await?;
    Ok(Json(QuoteResponse {
        quote: (*quote).clone(),
    }))
}

//! Quote service between the HTTP routes and the calculators.
//!
//! Validates the request, consults the quote cache and invokes the
//! engine. Quotes are deterministic in their inputs, so a cached entry
//! is always as good as a fresh computation.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::cache::AppCache;
use crate::error::AppError;
use crate::AppState;

use super::calculators::compute_price;
use super::models::PricingResult;
use super::requests::QuoteRequest;

/// Price one quote request.
pub async fn price_quote(
    state: &AppState,
    request: QuoteRequest,
) -> Result<Arc<PricingResult>, AppError> {
    validate(&request)?;
    let inputs = request.into_inputs();

    let key = AppCache::quote_key(&inputs)
        .map_err(|e| AppError::Internal(format!("failed to build quote cache key: {e}")))?;

    // Try cache first
    if let Some(cached) = state.cache.quotes.get(&key).await {
        debug!("Cache HIT for quote");
        return Ok(cached);
    }
    debug!("Cache MISS for quote");

    let result = Arc::new(compute_price(&inputs, &state.policy));
    state.cache.quotes.insert(key, result.clone()).await;

    Ok(result)
}

/// Input rejection the engine leaves to its caller: a negative base
/// price or distance is a malformed request, not a clampable value.
fn validate(request: &QuoteRequest) -> Result<(), AppError> {
    if request.base_price < Decimal::ZERO {
        return Err(AppError::InvalidRequest(
            "basePrice must be non-negative".to_string(),
        ));
    }
    if request.distance_km < Decimal::ZERO {
        return Err(AppError::InvalidRequest(
            "distanceKm must be non-negative".to_string(),
        ));
    }
    if let Some(pct) = request.service_fee_pct {
        if pct < Decimal::ZERO || pct > Decimal::ONE {
            return Err(AppError::InvalidRequest(
                "serviceFeePct must be a fraction in [0, 1]".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::policy::PricingPolicy;
    use rust_decimal_macros::dec;

    fn request_json(body: &str) -> QuoteRequest {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_price_quote_happy_path() {
        let state = AppState::new(PricingPolicy::default());
        let request = request_json(r#"{"basePrice": 100}"#);

        let result = price_quote(&state, request).await.unwrap();
        assert_eq!(result.total, dec!(110.00));
    }

    #[tokio::test]
    async fn test_price_quote_rejects_negative_base_price() {
        let state = AppState::new(PricingPolicy::default());
        let request = request_json(r#"{"basePrice": -1}"#);

        let err = price_quote(&state, request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_price_quote_rejects_negative_distance() {
        let state = AppState::new(PricingPolicy::default());
        let request = request_json(r#"{"basePrice": 100, "distanceKm": -2}"#);

        let err = price_quote(&state, request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_price_quote_rejects_out_of_range_fee_pct() {
        let state = AppState::new(PricingPolicy::default());
        let request = request_json(r#"{"basePrice": 100, "serviceFeePct": 1.5}"#);

        let err = price_quote(&state, request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_identical_requests_share_a_cache_entry() {
        let state = AppState::new(PricingPolicy::default());
        let body = r#"{"basePrice": 100, "addonsTotal": 20, "taxState": "CA"}"#;

        let first = price_quote(&state, request_json(body)).await.unwrap();
        let second = price_quote(&state, request_json(body)).await.unwrap();
        assert_eq!(*first, *second);

        state.cache.quotes.run_pending_tasks().await;
        assert_eq!(state.cache.quotes.entry_count(), 1);
    }
}

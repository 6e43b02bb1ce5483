//! Response DTOs for the pricing API.

use serde::Serialize;

use super::models::PricingResult;

/// Successful quote envelope: `{"quote": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub quote: PricingResult,
}

/// Error envelope: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

//! In-memory caching using moka
//!
//! Caches computed quotes keyed by their canonical inputs. The engine is
//! deterministic, so cached entries never go stale; the TTL only bounds
//! memory when input variety is high.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use tracing::info;

use crate::pricing::models::{PricingInputs, PricingResult};

/// Application cache holding computed quote breakdowns
#[derive(Clone)]
pub struct AppCache {
    /// Quotes (canonical inputs -> breakdown)
    pub quotes: Cache<String, Arc<PricingResult>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Quotes: 10k entries, 5 min TTL, 2 min idle
            quotes: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(5 * 60))
                .time_to_idle(Duration::from_secs(2 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            quotes_size: self.quotes.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.quotes.invalidate_all();
        info!("All caches invalidated");
    }

    /// Canonical cache key for a set of quote inputs.
    pub fn quote_key(inputs: &PricingInputs) -> serde_json::Result<String> {
        serde_json::to_string(inputs)
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub quotes_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn inputs(base_price: Decimal) -> PricingInputs {
        PricingInputs {
            base_price,
            addons_total: Decimal::ZERO,
            demand_index: Decimal::ZERO,
            utilization: Decimal::ONE,
            distance_km: Decimal::ZERO,
            free_radius_km: Decimal::ZERO,
            per_km_after_free: Decimal::ZERO,
            size_band: 1,
            bedrooms: 1,
            bathrooms: 1,
            pet: false,
            clutter: 0,
            first_time: false,
            month: None,
            lead_hours: None,
            jobs_in_cart: 1,
            recurring: None,
            city: None,
            state: None,
            service_fee_pct: None,
            tax_state: None,
            tax_city: None,
        }
    }

    #[test]
    fn test_quote_key_is_deterministic() {
        let a = AppCache::quote_key(&inputs(dec!(100))).unwrap();
        let b = AppCache::quote_key(&inputs(dec!(100))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_quote_key_distinguishes_inputs() {
        let a = AppCache::quote_key(&inputs(dec!(100))).unwrap();
        let b = AppCache::quote_key(&inputs(dec!(100.01))).unwrap();
        assert_ne!(a, b);
    }
}

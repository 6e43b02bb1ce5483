//! Request DTOs for the pricing API.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::models::{PricingInputs, Recurrence};

/// Body of `POST /api/pricing/quote`.
///
/// Field names are camelCase on the wire, matching the marketplace
/// clients. Only `basePrice` is required; everything else defaults.
/// Decimal fields accept JSON numbers or numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub base_price: Decimal,
    #[serde(default)]
    pub addons_total: Decimal,
    #[serde(default)]
    pub demand_index: Decimal,
    /// Defaults to 1.0: a fully booked market takes no off-peak discount.
    #[serde(default = "default_utilization")]
    pub utilization: Decimal,
    #[serde(default)]
    pub distance_km: Decimal,
    #[serde(default)]
    pub free_radius_km: Decimal,
    #[serde(default)]
    pub per_km_after_free: Decimal,
    #[serde(default = "default_count")]
    pub size_band: i32,
    #[serde(default = "default_count")]
    pub bedrooms: i32,
    #[serde(default = "default_count")]
    pub bathrooms: i32,
    #[serde(default)]
    pub pet: bool,
    #[serde(default)]
    pub clutter: i32,
    #[serde(default)]
    pub first_time: bool,
    #[serde(default)]
    pub month: Option<u8>,
    #[serde(default)]
    pub lead_hours: Option<Decimal>,
    #[serde(default = "default_count")]
    pub jobs_in_cart: i32,
    #[serde(default)]
    pub recurring: Option<Recurrence>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub service_fee_pct: Option<Decimal>,
    #[serde(default)]
    pub tax_state: Option<String>,
    #[serde(default)]
    pub tax_city: Option<String>,
}

fn default_utilization() -> Decimal {
    Decimal::ONE
}

fn default_count() -> i32 {
    1
}

impl QuoteRequest {
    /// Convert into engine inputs. Validation happens in the quote
    /// service before this point.
    pub fn into_inputs(self) -> PricingInputs {
        PricingInputs {
            base_price: self.base_price,
            addons_total: self.addons_total,
            demand_index: self.demand_index,
            utilization: self.utilization,
            distance_km: self.distance_km,
            free_radius_km: self.free_radius_km,
            per_km_after_free: self.per_km_after_free,
            size_band: self.size_band,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            pet: self.pet,
            clutter: self.clutter,
            first_time: self.first_time,
            month: self.month,
            lead_hours: self.lead_hours,
            jobs_in_cart: self.jobs_in_cart,
            recurring: self.recurring,
            city: self.city,
            state: self.state,
            service_fee_pct: self.service_fee_pct,
            tax_state: self.tax_state,
            tax_city: self.tax_city,
        }
    }
}

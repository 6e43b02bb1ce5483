//! Value types for the pricing engine.
//!
//! Everything here is a plain value with no identity or lifecycle.
//! A quote lives exactly as long as the call that computes it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Frequency of a recurring booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Weekly,
    Biweekly,
    Monthly,
}

/// Fully defaulted inputs for one quote.
///
/// Built from a `QuoteRequest` after validation. The engine clamps
/// out-of-range secondary values rather than erroring, so any
/// `PricingInputs` value produces a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingInputs {
    pub base_price: Decimal,
    pub addons_total: Decimal,
    pub demand_index: Decimal,
    pub utilization: Decimal,
    pub distance_km: Decimal,
    pub free_radius_km: Decimal,
    pub per_km_after_free: Decimal,
    pub size_band: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub pet: bool,
    pub clutter: i32,
    pub first_time: bool,
    /// Calendar month 1-12. Out-of-range or absent months price as neutral.
    pub month: Option<u8>,
    /// Hours between booking and service start. Absent means no rush pricing.
    pub lead_hours: Option<Decimal>,
    pub jobs_in_cart: i32,
    pub recurring: Option<Recurrence>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Platform service fee fraction. Absent takes the policy default.
    pub service_fee_pct: Option<Decimal>,
    pub tax_state: Option<String>,
    pub tax_city: Option<String>,
}

/// Itemized quote breakdown.
///
/// The line items always reconcile exactly:
/// `subtotal_before_fees + service_fee + tax_amount - discount_amount == total`.
/// Money fields are rounded to 2 decimal places, multipliers to 4.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    #[serde(with = "rust_decimal::serde::str")]
    pub base: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub addons_total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub surge_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub complexity_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub seasonal_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub locality_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub distance_fee: Decimal,
    /// Positive amount subtracted from the total.
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_amount: Decimal,
    /// Pre-discount subtotal: multiplied base plus add-ons plus distance fee.
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal_before_fees: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub service_fee: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

/// Per-category add-on subtotals for commission calculation.
///
/// Keyed by category name (e.g. "home_care", "pest_control"). A BTreeMap
/// keeps iteration order stable so summing is deterministic.
pub type CommissionBreakdown = BTreeMap<String, Decimal>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_recurrence_parses_snake_case() {
        let r: Recurrence = serde_json::from_str("\"weekly\"").unwrap();
        assert_eq!(r, Recurrence::Weekly);
        let r: Recurrence = serde_json::from_str("\"biweekly\"").unwrap();
        assert_eq!(r, Recurrence::Biweekly);
        assert!(serde_json::from_str::<Recurrence>("\"yearly\"").is_err());
    }

    #[test]
    fn test_pricing_result_serializes_camel_case_string_money() {
        let result = PricingResult {
            base: dec!(100),
            addons_total: dec!(20),
            surge_multiplier: dec!(1.14),
            complexity_multiplier: dec!(1.13),
            seasonal_multiplier: dec!(0.95),
            locality_multiplier: dec!(1),
            distance_fee: dec!(5.00),
            discount_amount: dec!(0),
            subtotal_before_fees: dec!(147.38),
            service_fee: dec!(14.74),
            tax_amount: dec!(12.71),
            total: dec!(174.83),
        };

        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["subtotalBeforeFees"], "147.38");
        assert_eq!(json["distanceFee"], "5.00");
        assert_eq!(json["surgeMultiplier"], "1.14");
        assert!(json.get("subtotal_before_fees").is_none());
    }
}

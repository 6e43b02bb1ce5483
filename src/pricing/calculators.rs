//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no I/O, no clock, no state.
//! `compute_price` runs the quote pipeline in a fixed stage order so an
//! itemized receipt can be explained line by line, and identical inputs
//! always reproduce the identical breakdown.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::models::{CommissionBreakdown, PricingInputs, PricingResult};
use super::policy::{ComplexityPolicy, PricingPolicy, SurgePolicy};

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is
/// exactly halfway between two possibilities. This reduces cumulative
/// rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use tidynest_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Compute an itemized quote from validated inputs.
///
/// Pipeline stages, in order: demand surge (with off-peak and rush folded
/// into the same multiplier), complexity, seasonal and locality factors,
/// distance fee, multi-job/recurring discount, service fee, tax.
///
/// The whole pipeline runs at full `Decimal` precision; each reported
/// line is rounded once at the end and the total is assembled from the
/// rounded lines, so
/// `subtotal_before_fees + service_fee + tax_amount - discount_amount == total`
/// holds exactly.
///
/// Tax applies to the discounted subtotal and excludes the platform
/// service fee.
///
/// Out-of-range secondary inputs (negative distance, unknown month or
/// jurisdiction) are clamped to neutral values instead of failing.
pub fn compute_price(inputs: &PricingInputs, policy: &PricingPolicy) -> PricingResult {
    let base = inputs.base_price.max(Decimal::ZERO);
    let addons = inputs.addons_total.max(Decimal::ZERO);

    let surge = surge_multiplier(inputs, &policy.surge);
    let complexity = complexity_multiplier(inputs, &policy.complexity);
    let seasonal = policy.seasonal_multiplier(inputs.month);
    let locality = policy.locality_multiplier(inputs.state.as_deref(), inputs.city.as_deref());

    let fee = distance_fee(inputs);

    // The multiplied core is what discounts apply to. Add-ons and the
    // distance fee ride on top at face value.
    let core = base * surge * complexity * seasonal * locality;
    let subtotal = (core + addons + fee).max(Decimal::ZERO);

    let discount_pct = (policy.discounts.multi_job_pct(inputs.jobs_in_cart)
        + policy.discounts.recurring_pct(inputs.recurring))
    .min(policy.discounts.max_total);
    let discount = (core * discount_pct).min(subtotal);

    let fee_pct = inputs
        .service_fee_pct
        .unwrap_or(policy.service_fee_default)
        .max(Decimal::ZERO);
    let service_fee = subtotal * fee_pct;

    let tax_rate = policy.tax_rate(inputs.tax_state.as_deref(), inputs.tax_city.as_deref());
    let tax = (subtotal - discount).max(Decimal::ZERO) * tax_rate;

    // Single rounding pass at the end of the pipeline.
    let subtotal_before_fees = round_money(subtotal, 2);
    let service_fee = round_money(service_fee, 2);
    let tax_amount = round_money(tax, 2);
    let discount_amount = round_money(discount, 2);
    let total = subtotal_before_fees + service_fee + tax_amount - discount_amount;

    PricingResult {
        base: round_money(base, 2),
        addons_total: round_money(addons, 2),
        surge_multiplier: round_money(surge, 4),
        complexity_multiplier: round_money(complexity, 4),
        seasonal_multiplier: round_money(seasonal, 4),
        locality_multiplier: round_money(locality, 4),
        distance_fee: round_money(fee, 2),
        discount_amount,
        subtotal_before_fees,
        service_fee,
        tax_amount,
        total,
    }
}

/// Total platform commission on add-on revenue, rounded to cents.
///
/// With a per-category breakdown, each category takes its override
/// percentage (else the default) and the results are summed. Without a
/// breakdown the default percentage applies to the flat amount. An empty
/// breakdown owes exactly zero.
pub fn calculate_addons_commission(
    amount: Decimal,
    breakdown: Option<&CommissionBreakdown>,
    policy: &PricingPolicy,
) -> Decimal {
    let commission = match breakdown {
        Some(lines) if !lines.is_empty() => lines
            .iter()
            .map(|(category, line_total)| {
                policy.commission.percent_for(Some(category.as_str()))
                    * (*line_total).max(Decimal::ZERO)
            })
            .sum(),
        _ => policy.commission.percent_for(None) * amount.max(Decimal::ZERO),
    };

    round_money(commission, 2)
}

/// Commission percentage for a named add-on category, or the platform
/// default when the category is absent or has no override.
///
/// Exposed for display alongside partner payouts ("you keep 82% of
/// add-on revenue").
pub fn addons_commission_percent(category: Option<&str>, policy: &PricingPolicy) -> Decimal {
    policy.commission.percent_for(category)
}

/// Demand surge with the off-peak discount and rush surcharge folded in.
///
/// The demand component clamps to [1.0, cap]; after folding, the combined
/// multiplier never drops below `1 - off_peak_discount`.
fn surge_multiplier(inputs: &PricingInputs, policy: &SurgePolicy) -> Decimal {
    let demand = inputs.demand_index.max(Decimal::ZERO);
    let mut surge = (Decimal::ONE + demand * policy.slope).clamp(Decimal::ONE, policy.cap);

    if inputs.utilization < policy.off_peak_threshold {
        surge *= Decimal::ONE - policy.off_peak_discount;
    }

    if let Some(lead) = inputs.lead_hours {
        surge *= Decimal::ONE + policy.rush_surcharge(lead);
    }

    surge.max(Decimal::ONE - policy.off_peak_discount)
}

/// Additive job difficulty factors over a base of 1.0, floored at 1.0.
fn complexity_multiplier(inputs: &PricingInputs, policy: &ComplexityPolicy) -> Decimal {
    let above_first = |count: i32| Decimal::from((count - 1).max(0));

    let mut pct = Decimal::ZERO;
    pct += policy.per_size_band * above_first(inputs.size_band);
    pct += policy.per_extra_bedroom * above_first(inputs.bedrooms);
    pct += policy.per_extra_bathroom * above_first(inputs.bathrooms);
    if inputs.pet {
        pct += policy.pet;
    }
    pct += policy.per_clutter_level * Decimal::from(inputs.clutter.clamp(0, policy.clutter_max));
    if inputs.first_time {
        pct += policy.first_time;
    }

    (Decimal::ONE + pct).max(Decimal::ONE)
}

/// Flat fee for kilometers beyond the free radius. Negative distances or
/// rates contribute nothing.
fn distance_fee(inputs: &PricingInputs) -> Decimal {
    let billable = (inputs.distance_km - inputs.free_radius_km).max(Decimal::ZERO);
    billable * inputs.per_km_after_free.max(Decimal::ZERO)
}

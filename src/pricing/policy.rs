//! Pricing policy: every tunable constant in one structure.
//!
//! The quote pipeline never hardcodes a rate. Surge slope, complexity
//! weights, the seasonal table, discount tiers, tax rates and commission
//! percentages all live here, so pricing changes are data changes.
//! Operators can override the built-in defaults with a JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::models::Recurrence;

/// Errors from loading or validating a policy file.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read pricing policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse pricing policy file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid pricing policy: {}", .errors.join("; "))]
    Invalid { errors: Vec<String> },
}

/// Demand, off-peak and rush constants folded into the surge multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurgePolicy {
    /// Multiplier gained per unit of demand index (0.2 demand => +14% at 0.7).
    pub slope: Decimal,
    /// Ceiling on the demand-driven multiplier.
    pub cap: Decimal,
    /// Utilization below this fraction takes the off-peak discount.
    pub off_peak_threshold: Decimal,
    /// Multiplier reduction when the market is off-peak.
    pub off_peak_discount: Decimal,
    /// Rush surcharges by lead time, shortest cutoff wins.
    pub rush_tiers: Vec<RushTier>,
}

/// One rush pricing tier: bookings with less lead time than the cutoff
/// take the surcharge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RushTier {
    pub max_lead_hours: Decimal,
    pub surcharge: Decimal,
}

impl Default for SurgePolicy {
    fn default() -> Self {
        Self {
            slope: dec!(0.7),
            cap: dec!(2.5),
            off_peak_threshold: dec!(0.5),
            off_peak_discount: dec!(0.10),
            rush_tiers: vec![
                RushTier {
                    max_lead_hours: dec!(24),
                    surcharge: dec!(0.20),
                },
                RushTier {
                    max_lead_hours: dec!(48),
                    surcharge: dec!(0.10),
                },
            ],
        }
    }
}

impl SurgePolicy {
    /// Surcharge for the given lead time. Tiers overlap, the largest
    /// matching surcharge applies.
    pub fn rush_surcharge(&self, lead_hours: Decimal) -> Decimal {
        self.rush_tiers
            .iter()
            .filter(|tier| lead_hours < tier.max_lead_hours)
            .map(|tier| tier.surcharge)
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Additive percentage weights for the job complexity multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityPolicy {
    /// Per size band above the first.
    pub per_size_band: Decimal,
    /// Per bedroom above the first.
    pub per_extra_bedroom: Decimal,
    /// Per bathroom above the first.
    pub per_extra_bathroom: Decimal,
    pub pet: Decimal,
    /// Per clutter severity level.
    pub per_clutter_level: Decimal,
    /// Clutter severity is clamped to this before weighting.
    pub clutter_max: i32,
    /// Extra setup time on a first visit.
    pub first_time: Decimal,
}

impl Default for ComplexityPolicy {
    fn default() -> Self {
        Self {
            per_size_band: dec!(0.05),
            per_extra_bedroom: dec!(0.05),
            per_extra_bathroom: dec!(0.05),
            pet: dec!(0.10),
            per_clutter_level: dec!(0.03),
            clutter_max: 5,
            first_time: dec!(0.15),
        }
    }
}

/// Multi-job and recurring discount schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountPolicy {
    /// Bulk tiers, largest matching percentage applies.
    pub multi_job: Vec<MultiJobTier>,
    pub weekly: Decimal,
    pub biweekly: Decimal,
    pub monthly: Decimal,
    /// Ceiling on the combined discount percentage.
    pub max_total: Decimal,
}

/// Bulk discount for carts with at least `min_jobs` jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiJobTier {
    pub min_jobs: i32,
    pub pct: Decimal,
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        Self {
            multi_job: vec![
                MultiJobTier {
                    min_jobs: 2,
                    pct: dec!(0.05),
                },
                MultiJobTier {
                    min_jobs: 4,
                    pct: dec!(0.08),
                },
            ],
            weekly: dec!(0.10),
            biweekly: dec!(0.07),
            monthly: dec!(0.05),
            max_total: dec!(0.15),
        }
    }
}

impl DiscountPolicy {
    pub fn multi_job_pct(&self, jobs_in_cart: i32) -> Decimal {
        self.multi_job
            .iter()
            .filter(|tier| jobs_in_cart >= tier.min_jobs)
            .map(|tier| tier.pct)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn recurring_pct(&self, recurring: Option<Recurrence>) -> Decimal {
        match recurring {
            Some(Recurrence::Weekly) => self.weekly,
            Some(Recurrence::Biweekly) => self.biweekly,
            Some(Recurrence::Monthly) => self.monthly,
            None => Decimal::ZERO,
        }
    }
}

/// Sales tax rates by jurisdiction.
///
/// Keys are normalized (trimmed, lowercased) on lookup. City rates are
/// nested under their state so "portland" in Oregon and Maine cannot
/// collide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxPolicy {
    pub state_rates: BTreeMap<String, Decimal>,
    pub city_rates: BTreeMap<String, BTreeMap<String, Decimal>>,
}

/// Market-rate multipliers by locality, same key scheme as [`TaxPolicy`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalityPolicy {
    pub state_multipliers: BTreeMap<String, Decimal>,
    pub city_multipliers: BTreeMap<String, BTreeMap<String, Decimal>>,
}

/// Platform commission on add-on revenue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionPolicy {
    pub default_pct: Decimal,
    /// Per-category percentage overrides, keyed by normalized category name.
    pub overrides: BTreeMap<String, Decimal>,
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        Self {
            default_pct: dec!(0.18),
            overrides: BTreeMap::new(),
        }
    }
}

impl CommissionPolicy {
    /// Commission percentage for a category, falling back to the default.
    pub fn percent_for(&self, category: Option<&str>) -> Decimal {
        match category {
            Some(name) => self
                .overrides
                .get(&normalize_key(name))
                .copied()
                .unwrap_or(self.default_pct),
            None => self.default_pct,
        }
    }
}

/// The full tunable configuration for the quote pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    pub surge: SurgePolicy,
    pub complexity: ComplexityPolicy,
    /// Seasonal demand factors, January first.
    pub seasonal: [Decimal; 12],
    pub locality: LocalityPolicy,
    pub discounts: DiscountPolicy,
    pub service_fee_default: Decimal,
    pub tax: TaxPolicy,
    pub commission: CommissionPolicy,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            surge: SurgePolicy::default(),
            complexity: ComplexityPolicy::default(),
            // Spring cleaning peaks in April/May, holidays lift December.
            seasonal: [
                dec!(0.95),
                dec!(0.95),
                dec!(1.05),
                dec!(1.10),
                dec!(1.10),
                dec!(1.05),
                dec!(1.00),
                dec!(1.00),
                dec!(1.00),
                dec!(1.00),
                dec!(1.05),
                dec!(1.10),
            ],
            locality: LocalityPolicy {
                state_multipliers: BTreeMap::new(),
                city_multipliers: BTreeMap::from([
                    (
                        "ca".to_string(),
                        BTreeMap::from([
                            ("san francisco".to_string(), dec!(1.15)),
                            ("los angeles".to_string(), dec!(1.10)),
                        ]),
                    ),
                    (
                        "ny".to_string(),
                        BTreeMap::from([("new york".to_string(), dec!(1.20))]),
                    ),
                    (
                        "wa".to_string(),
                        BTreeMap::from([("seattle".to_string(), dec!(1.10))]),
                    ),
                    (
                        "tx".to_string(),
                        BTreeMap::from([("austin".to_string(), dec!(1.05))]),
                    ),
                ]),
            },
            discounts: DiscountPolicy::default(),
            service_fee_default: dec!(0.10),
            tax: TaxPolicy {
                state_rates: BTreeMap::from([
                    ("az".to_string(), dec!(0.056)),
                    ("ca".to_string(), dec!(0.0725)),
                    ("co".to_string(), dec!(0.029)),
                    ("fl".to_string(), dec!(0.06)),
                    ("il".to_string(), dec!(0.0625)),
                    ("ny".to_string(), dec!(0.04)),
                    ("tx".to_string(), dec!(0.0625)),
                    ("wa".to_string(), dec!(0.065)),
                ]),
                city_rates: BTreeMap::from([
                    (
                        "ca".to_string(),
                        BTreeMap::from([
                            ("san francisco".to_string(), dec!(0.08625)),
                            ("los angeles".to_string(), dec!(0.095)),
                            ("san diego".to_string(), dec!(0.0775)),
                        ]),
                    ),
                    (
                        "il".to_string(),
                        BTreeMap::from([("chicago".to_string(), dec!(0.1025))]),
                    ),
                    (
                        "ny".to_string(),
                        BTreeMap::from([("new york".to_string(), dec!(0.08875))]),
                    ),
                    (
                        "tx".to_string(),
                        BTreeMap::from([
                            ("austin".to_string(), dec!(0.0825)),
                            ("houston".to_string(), dec!(0.0825)),
                        ]),
                    ),
                    (
                        "wa".to_string(),
                        BTreeMap::from([("seattle".to_string(), dec!(0.1035))]),
                    ),
                ]),
            },
            commission: CommissionPolicy::default(),
        }
    }
}

impl PricingPolicy {
    /// Load a policy override file (JSON). Missing fields keep their
    /// built-in defaults. The result still needs [`PricingPolicy::validate`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let raw = fs::read_to_string(path)?;
        let policy = serde_json::from_str(&raw)?;
        Ok(policy)
    }

    /// Reject a policy that could produce nonsense quotes.
    ///
    /// A bad table is a configuration bug and must fail loudly at
    /// startup, not surface as a strange price at request time.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let mut errors = Vec::new();

        if self.surge.slope < Decimal::ZERO {
            errors.push("surge.slope must be non-negative".to_string());
        }
        if self.surge.cap < Decimal::ONE {
            errors.push("surge.cap must be at least 1.0".to_string());
        }
        check_fraction("surge.off_peak_discount", self.surge.off_peak_discount, &mut errors);
        for tier in &self.surge.rush_tiers {
            check_fraction("surge.rush_tiers.surcharge", tier.surcharge, &mut errors);
            if tier.max_lead_hours <= Decimal::ZERO {
                errors.push("surge.rush_tiers.max_lead_hours must be positive".to_string());
            }
        }

        for (name, weight) in [
            ("complexity.per_size_band", self.complexity.per_size_band),
            ("complexity.per_extra_bedroom", self.complexity.per_extra_bedroom),
            ("complexity.per_extra_bathroom", self.complexity.per_extra_bathroom),
            ("complexity.pet", self.complexity.pet),
            ("complexity.per_clutter_level", self.complexity.per_clutter_level),
            ("complexity.first_time", self.complexity.first_time),
        ] {
            if weight < Decimal::ZERO {
                errors.push(format!("{name} must be non-negative"));
            }
        }
        if self.complexity.clutter_max < 0 {
            errors.push("complexity.clutter_max must be non-negative".to_string());
        }

        for (i, factor) in self.seasonal.iter().enumerate() {
            if *factor <= Decimal::ZERO {
                errors.push(format!("seasonal[{i}] must be positive"));
            }
        }

        for tier in &self.discounts.multi_job {
            check_fraction("discounts.multi_job.pct", tier.pct, &mut errors);
            if tier.min_jobs < 2 {
                errors.push("discounts.multi_job.min_jobs must be at least 2".to_string());
            }
        }
        check_fraction("discounts.weekly", self.discounts.weekly, &mut errors);
        check_fraction("discounts.biweekly", self.discounts.biweekly, &mut errors);
        check_fraction("discounts.monthly", self.discounts.monthly, &mut errors);
        check_fraction("discounts.max_total", self.discounts.max_total, &mut errors);

        check_fraction("service_fee_default", self.service_fee_default, &mut errors);

        for rate in self.tax.state_rates.values() {
            check_fraction("tax.state_rates", *rate, &mut errors);
        }
        for cities in self.tax.city_rates.values() {
            for rate in cities.values() {
                check_fraction("tax.city_rates", *rate, &mut errors);
            }
        }

        for factor in self.locality.state_multipliers.values() {
            if *factor <= Decimal::ZERO {
                errors.push("locality.state_multipliers must be positive".to_string());
            }
        }
        for cities in self.locality.city_multipliers.values() {
            for factor in cities.values() {
                if *factor <= Decimal::ZERO {
                    errors.push("locality.city_multipliers must be positive".to_string());
                }
            }
        }

        check_fraction("commission.default_pct", self.commission.default_pct, &mut errors);
        for pct in self.commission.overrides.values() {
            check_fraction("commission.overrides", *pct, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PolicyError::Invalid { errors })
        }
    }

    /// Seasonal factor for a calendar month, neutral when out of range.
    pub fn seasonal_multiplier(&self, month: Option<u8>) -> Decimal {
        match month {
            Some(m @ 1..=12) => self.seasonal[(m - 1) as usize],
            _ => Decimal::ONE,
        }
    }

    /// Tax rate for a jurisdiction: city rate, else state rate, else zero.
    pub fn tax_rate(&self, state: Option<&str>, city: Option<&str>) -> Decimal {
        let Some(state) = state else {
            return Decimal::ZERO;
        };
        let state_key = normalize_key(state);

        if let (Some(city), Some(cities)) = (city, self.tax.city_rates.get(&state_key)) {
            if let Some(rate) = cities.get(&normalize_key(city)) {
                return *rate;
            }
        }

        self.tax
            .state_rates
            .get(&state_key)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Market-rate factor for a locality: city, else state, else neutral.
    pub fn locality_multiplier(&self, state: Option<&str>, city: Option<&str>) -> Decimal {
        let Some(state) = state else {
            return Decimal::ONE;
        };
        let state_key = normalize_key(state);

        if let (Some(city), Some(cities)) = (city, self.locality.city_multipliers.get(&state_key)) {
            if let Some(factor) = cities.get(&normalize_key(city)) {
                return *factor;
            }
        }

        self.locality
            .state_multipliers
            .get(&state_key)
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}

fn check_fraction(name: &str, value: Decimal, errors: &mut Vec<String>) {
    if value < Decimal::ZERO || value > Decimal::ONE {
        errors.push(format!("{name} must be a fraction in [0, 1], got {value}"));
    }
}

/// Canonical form for jurisdiction and category keys.
pub(crate) fn normalize_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_validates() {
        PricingPolicy::default().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_out_of_range_fractions() {
        let mut policy = PricingPolicy::default();
        policy.service_fee_default = dec!(1.5);
        policy.commission.default_pct = dec!(-0.1);

        let err = policy.validate().unwrap_err();
        match err {
            PolicyError::Invalid { errors } => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("service_fee_default"));
                assert!(errors[1].contains("commission.default_pct"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_zero_seasonal_factor() {
        let mut policy = PricingPolicy::default();
        policy.seasonal[3] = Decimal::ZERO;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        // An operator file that only touches the commission table.
        let policy: PricingPolicy = serde_json::from_str(
            r#"{"commission": {"default_pct": "0.20", "overrides": {"pest_control": "0.25"}}}"#,
        )
        .unwrap();

        assert_eq!(policy.commission.default_pct, dec!(0.20));
        assert_eq!(policy.commission.percent_for(Some("pest_control")), dec!(0.25));
        // Untouched sections keep their built-in values.
        assert_eq!(policy.surge.slope, dec!(0.7));
        assert_eq!(policy.service_fee_default, dec!(0.10));
    }

    #[test]
    fn test_policy_serde_round_trip() {
        let policy = PricingPolicy::default();
        let json = serde_json::to_string(&policy).unwrap();
        let back: PricingPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seasonal, policy.seasonal);
        assert_eq!(back.tax.state_rates, policy.tax.state_rates);
        assert_eq!(back.discounts.max_total, policy.discounts.max_total);
    }

    // ==================== lookup tests ====================

    #[test]
    fn test_tax_rate_city_then_state_then_zero() {
        let policy = PricingPolicy::default();

        assert_eq!(
            policy.tax_rate(Some("CA"), Some("San Francisco")),
            dec!(0.08625)
        );
        // Unknown city falls back to the state rate.
        assert_eq!(policy.tax_rate(Some("CA"), Some("Fresno")), dec!(0.0725));
        assert_eq!(policy.tax_rate(Some("CA"), None), dec!(0.0725));
        // Unknown jurisdiction taxes at zero.
        assert_eq!(policy.tax_rate(Some("ZZ"), Some("Nowhere")), Decimal::ZERO);
        assert_eq!(policy.tax_rate(None, Some("San Francisco")), Decimal::ZERO);
    }

    #[test]
    fn test_tax_rate_is_case_and_whitespace_insensitive() {
        let policy = PricingPolicy::default();
        assert_eq!(
            policy.tax_rate(Some(" ca "), Some("SAN FRANCISCO")),
            dec!(0.08625)
        );
    }

    #[test]
    fn test_locality_multiplier_fallback_chain() {
        let policy = PricingPolicy::default();
        assert_eq!(
            policy.locality_multiplier(Some("NY"), Some("New York")),
            dec!(1.20)
        );
        assert_eq!(policy.locality_multiplier(Some("NY"), Some("Albany")), Decimal::ONE);
        assert_eq!(policy.locality_multiplier(None, None), Decimal::ONE);
    }

    #[test]
    fn test_seasonal_multiplier_neutral_out_of_range() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.seasonal_multiplier(Some(1)), dec!(0.95));
        assert_eq!(policy.seasonal_multiplier(Some(4)), dec!(1.10));
        assert_eq!(policy.seasonal_multiplier(Some(13)), Decimal::ONE);
        assert_eq!(policy.seasonal_multiplier(Some(0)), Decimal::ONE);
        assert_eq!(policy.seasonal_multiplier(None), Decimal::ONE);
    }

    #[test]
    fn test_rush_surcharge_tiers() {
        let surge = SurgePolicy::default();
        assert_eq!(surge.rush_surcharge(dec!(12)), dec!(0.20));
        assert_eq!(surge.rush_surcharge(dec!(24)), dec!(0.10));
        assert_eq!(surge.rush_surcharge(dec!(47.5)), dec!(0.10));
        assert_eq!(surge.rush_surcharge(dec!(48)), Decimal::ZERO);
        assert_eq!(surge.rush_surcharge(dec!(72)), Decimal::ZERO);
    }

    #[test]
    fn test_multi_job_pct_largest_tier_wins() {
        let discounts = DiscountPolicy::default();
        assert_eq!(discounts.multi_job_pct(1), Decimal::ZERO);
        assert_eq!(discounts.multi_job_pct(2), dec!(0.05));
        assert_eq!(discounts.multi_job_pct(3), dec!(0.05));
        assert_eq!(discounts.multi_job_pct(4), dec!(0.08));
        assert_eq!(discounts.multi_job_pct(10), dec!(0.08));
    }

    #[test]
    fn test_commission_percent_override_fallback() {
        let mut commission = CommissionPolicy::default();
        assert_eq!(commission.percent_for(None), dec!(0.18));
        assert_eq!(commission.percent_for(Some("home_care")), dec!(0.18));

        commission.overrides.insert("home_care".to_string(), dec!(0.25));
        assert_eq!(commission.percent_for(Some("home_care")), dec!(0.25));
        assert_eq!(commission.percent_for(Some(" HOME_CARE ")), dec!(0.25));
        assert_eq!(commission.percent_for(Some("pest_control")), dec!(0.18));
    }
}

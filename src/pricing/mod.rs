//! Pricing engine module for the TidyNest marketplace.
//!
//! Deterministic quote computation plus the HTTP surface the
//! marketplace application calls via HTTP/JSON.

pub mod calculators;
pub mod models;
pub mod policy;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{
    addons_commission_percent, calculate_addons_commission, compute_price, round_money,
};
pub use models::{CommissionBreakdown, PricingInputs, PricingResult, Recurrence};
pub use policy::PricingPolicy;
pub use routes::router;

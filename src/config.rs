//! Server configuration from environment variables.
//!
//! A `.env` file is honored (loaded in `main` via dotenvy) before these
//! are read.

use std::env;

use tracing::{info, warn};

pub struct Config {
    pub host: String,
    pub port: u16,
    /// Optional path to a JSON pricing policy override file.
    pub policy_path: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            host: env_or("TIDYNEST_HOST", "0.0.0.0"),
            port: parse_or("TIDYNEST_PORT", 8080),
            policy_path: env::var("TIDYNEST_PRICING_POLICY").ok(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse_or(key: &str, default: u16) -> u16 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

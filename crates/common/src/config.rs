//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. External collaborator
//! settings (identity verifier, generation backend, email) live in
//! their own crates' config types.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;

/// Default one-time access fee, denominated in WLD
const DEFAULT_ONE_TIME_FEE_WLD: &str = "0.01";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Wallet address payments must be sent to (surfaced to callers)
    pub payment_wallet_address: String,

    /// Fixed one-time access fee in WLD; notifications with any other
    /// amount are rejected
    pub one_time_fee_wld: Decimal,

    /// Operator mailbox that receives user feedback
    pub feedback_email: String,

    /// Delivery pacing: characters per chunk
    pub delivery_chunk_size: usize,

    /// Delivery pacing: milliseconds between chunks
    pub delivery_chunk_interval_ms: u64,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            payment_wallet_address: env::var("PAYMENT_WALLET_ADDRESS")
                .map_err(|_| anyhow::anyhow!("PAYMENT_WALLET_ADDRESS is required"))?,

            one_time_fee_wld: env::var("ONE_TIME_FEE_WLD")
                .unwrap_or_else(|_| DEFAULT_ONE_TIME_FEE_WLD.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("ONE_TIME_FEE_WLD is not a valid decimal: {}", e))?,

            feedback_email: env::var("FEEDBACK_EMAIL")
                .unwrap_or_else(|_| "feedback@appmint.app".to_string()),

            delivery_chunk_size: env::var("DELIVERY_CHUNK_SIZE")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),

            delivery_chunk_interval_ms: env::var("DELIVERY_CHUNK_INTERVAL_MS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "appmint=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }
}

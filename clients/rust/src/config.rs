//! Configuration types for the record store.
//!
//! This module provides configuration structs for rate limiting, retries,
//! and the main store configuration.

use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

/// Rate limiting configuration for RPC requests.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub max_rps: u32,
    /// Burst capacity for token bucket
    pub burst_size: u32,
    /// Whether to queue requests when rate limited
    pub queue_on_limit: bool,
    /// Maximum queue depth before rejecting
    pub max_queue_depth: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_rps: 10,
            burst_size: 20,
            queue_on_limit: true,
            max_queue_depth: 100,
        }
    }
}

/// Retry configuration for failed operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay between retries in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Transaction confirmation timeout in milliseconds
    pub confirmation_timeout_ms: u64,
    /// Delay between signature status polls in milliseconds
    pub confirmation_poll_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
            confirmation_timeout_ms: 60_000,
            confirmation_poll_ms: 500,
        }
    }
}

/// Main configuration for a record store session.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Solana RPC URL
    pub rpc_url: String,
    /// Program that owns the record accounts
    pub program_id: Pubkey,
    /// Commitment used for reads and confirmation
    pub commitment: CommitmentConfig,
    /// Poll for confirmation after sending (and report failures)
    pub await_confirmation: bool,
    /// Skip the RPC node's preflight simulation when sending
    pub skip_preflight: bool,
    /// Lamports added on top of the rent-exempt minimum for new accounts
    pub initial_lamports: u64,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// Retry configuration
    pub retry: RetryConfig,
}

impl StoreConfig {
    /// Configuration with defaults for everything but the endpoint and program.
    pub fn new(rpc_url: impl Into<String>, program_id: Pubkey) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            program_id,
            commitment: CommitmentConfig::confirmed(),
            await_confirmation: true,
            skip_preflight: true,
            initial_lamports: 0,
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Builder for StoreConfig.
#[derive(Default)]
pub struct StoreConfigBuilder {
    rpc_url: Option<String>,
    program_id: Option<Pubkey>,
    commitment: Option<CommitmentConfig>,
    await_confirmation: Option<bool>,
    skip_preflight: Option<bool>,
    initial_lamports: Option<u64>,
    rate_limit: Option<RateLimitConfig>,
    retry: Option<RetryConfig>,
}

impl StoreConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the RPC URL.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Set the record program ID.
    pub fn program_id(mut self, id: Pubkey) -> Self {
        self.program_id = Some(id);
        self
    }

    pub fn commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = Some(commitment);
        self
    }

    pub fn await_confirmation(mut self, await_confirmation: bool) -> Self {
        self.await_confirmation = Some(await_confirmation);
        self
    }

    pub fn skip_preflight(mut self, skip_preflight: bool) -> Self {
        self.skip_preflight = Some(skip_preflight);
        self
    }

    pub fn initial_lamports(mut self, lamports: u64) -> Self {
        self.initial_lamports = Some(lamports);
        self
    }

    /// Set the rate limiting configuration.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Set the retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Build the configuration.
    ///
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<StoreConfig, ConfigError> {
        let rpc_url = self.rpc_url.ok_or(ConfigError::MissingField("rpc_url"))?;
        if rpc_url.trim().is_empty() {
            return Err(ConfigError::Invalid("rpc_url is empty".to_string()));
        }
        let program_id = self.program_id.ok_or(ConfigError::MissingField("program_id"))?;

        let mut config = StoreConfig::new(rpc_url, program_id);
        if let Some(commitment) = self.commitment {
            config.commitment = commitment;
        }
        if let Some(await_confirmation) = self.await_confirmation {
            config.await_confirmation = await_confirmation;
        }
        if let Some(skip_preflight) = self.skip_preflight {
            config.skip_preflight = skip_preflight;
        }
        config.initial_lamports = self.initial_lamports.unwrap_or_default();
        config.rate_limit = self.rate_limit.unwrap_or_default();
        config.retry = self.retry.unwrap_or_default();
        Ok(config)
    }
}

/// Error type for configuration issues.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

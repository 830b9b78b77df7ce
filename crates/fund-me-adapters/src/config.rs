use alloy::primitives::{address, Address};
use thiserror::Error;

use fund_me_core::{ContractTarget, DEFAULT_RPC_URL};

/// First contract deployed by Anvil's default account.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

pub const ENV_RUNTIME_PROFILE: &str = "FUND_ME_RUNTIME_PROFILE";
pub const ENV_EIP1193_PROXY_URL: &str = "FUND_ME_EIP1193_PROXY_URL";
pub const ENV_CONTRACT_ADDRESS: &str = "FUND_ME_CONTRACT_ADDRESS";
pub const ENV_RPC_URL: &str = "FUND_ME_RPC_URL";
pub const ENV_PROVIDER_TIMEOUT_MS: &str = "FUND_ME_PROVIDER_TIMEOUT_MS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown runtime profile '{0}' (expected development or production)")]
    UnknownProfile(String),
    #[error("{var} is not a valid address: {value}")]
    InvalidAddress { var: &'static str, value: String },
    #[error("{var} is not a number of milliseconds: {value}")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Production unless `FUND_ME_RUNTIME_PROFILE` selects development, so the
/// in-memory provider is never picked implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeProfile {
    Development,
    #[default]
    Production,
}

impl std::str::FromStr for RuntimeProfile {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            other => Err(ConfigError::UnknownProfile(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunderConfig {
    pub runtime_profile: RuntimeProfile,
    pub eip1193_proxy_url: Option<String>,
    pub contract_address: Address,
    pub rpc_url: String,
    pub provider_timeout_ms: u64,
}

impl Default for FunderConfig {
    fn default() -> Self {
        Self {
            runtime_profile: RuntimeProfile::Production,
            eip1193_proxy_url: None,
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            rpc_url: DEFAULT_RPC_URL.to_owned(),
            provider_timeout_ms: 15_000,
        }
    }
}

impl FunderConfig {
    /// Reads overrides from the environment, falling back to defaults on bad input.
    pub fn from_env() -> Self {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring invalid environment configuration: {e}");
                Self::default()
            }
        }
    }

    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = non_empty(ENV_RUNTIME_PROFILE) {
            config.runtime_profile = raw.parse()?;
        }
        config.eip1193_proxy_url = non_empty(ENV_EIP1193_PROXY_URL);
        if let Some(raw) = non_empty(ENV_CONTRACT_ADDRESS) {
            config.contract_address = raw.trim().parse().map_err(|_| ConfigError::InvalidAddress {
                var: ENV_CONTRACT_ADDRESS,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = non_empty(ENV_RPC_URL) {
            config.rpc_url = raw.trim().to_owned();
        }
        if let Some(raw) = non_empty(ENV_PROVIDER_TIMEOUT_MS) {
            config.provider_timeout_ms = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                var: ENV_PROVIDER_TIMEOUT_MS,
                value: raw.clone(),
            })?;
        }
        Ok(config)
    }

    /// Production refuses to fall back to the deterministic provider.
    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }

    pub fn contract_target(&self) -> ContractTarget {
        ContractTarget {
            address: self.contract_address,
            rpc_url: self.rpc_url.clone(),
        }
    }
}

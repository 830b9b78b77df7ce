pub mod abi;
pub mod config;
pub mod eip1193;

pub use abi::{AbiAdapter, FUND_ME_ABI_JSON};
pub use config::{ConfigError, FunderConfig, RuntimeProfile, DEFAULT_CONTRACT_ADDRESS};
pub use eip1193::{classify_rpc_error, Eip1193Adapter, DETERMINISTIC_ACCOUNT, DETERMINISTIC_CHAIN_ID};

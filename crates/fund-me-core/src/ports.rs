use alloy::primitives::{Address, Bytes, U256};
use thiserror::Error;

use crate::domain::CallRequest;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("wallet provider not found: {0}")]
    NotFound(String),
    #[error("user rejected the request: {0}")]
    UserRejected(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("execution reverted: {reason}")]
    Reverted { reason: String, data: Option<Bytes> },
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("policy error: {0}")]
    Policy(String),
}

impl PortError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, PortError::UserRejected(_))
    }
}

pub trait ProviderPort {
    /// Whether a wallet provider exists in the current runtime at all.
    fn is_available(&self) -> bool;
    fn request_accounts(&self) -> Result<Vec<Address>, PortError>;
    fn chain_id(&self) -> Result<u64, PortError>;
    /// Executes `eth_call` against the latest block.
    fn call(&self, request: &CallRequest) -> Result<Bytes, PortError>;
}

pub trait AbiPort {
    fn encode_call(&self, function: &str, value: U256) -> Result<Bytes, PortError>;
    fn decode_revert(&self, data: &[u8]) -> Option<String>;
}

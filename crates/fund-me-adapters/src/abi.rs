use alloy::dyn_abi::JsonAbiExt;
use alloy::json_abi::{JsonAbi, StateMutability};
use alloy::primitives::{Bytes, U256};
use alloy::sol_types::decode_revert_reason;

use fund_me_core::{AbiPort, PortError};

/// Interface of the deployed `FundMe` contract.
pub const FUND_ME_ABI_JSON: &str = include_str!("../abi/FundMe.json");

#[derive(Debug, Clone)]
pub struct AbiAdapter {
    abi: JsonAbi,
}

impl AbiAdapter {
    pub fn fund_me() -> Result<Self, PortError> {
        Self::from_json(FUND_ME_ABI_JSON)
    }

    pub fn from_json(abi_json: &str) -> Result<Self, PortError> {
        let abi: JsonAbi = serde_json::from_str(abi_json)
            .map_err(|e| PortError::Validation(format!("invalid abi json: {e}")))?;
        Ok(Self { abi })
    }
}

impl AbiPort for AbiAdapter {
    /// Encodes a call to the no-argument overload of `function`.
    fn encode_call(&self, function: &str, value: U256) -> Result<Bytes, PortError> {
        let candidates = self
            .abi
            .function(function)
            .ok_or_else(|| PortError::Validation(format!("method not found: {function}")))?;
        let entry = candidates
            .iter()
            .find(|f| f.inputs.is_empty())
            .ok_or_else(|| {
                PortError::Validation(format!("method has no zero-argument overload: {function}"))
            })?;
        if !value.is_zero() && entry.state_mutability != StateMutability::Payable {
            return Err(PortError::Validation(format!(
                "method {function} is not payable but value {value} was attached"
            )));
        }

        let encoded = entry
            .abi_encode_input(&[])
            .map_err(|e| PortError::Validation(format!("abi encoding failed: {e}")))?;
        if !encoded.starts_with(entry.selector().as_slice()) {
            return Err(PortError::Validation("ABI_SELECTOR_MISMATCH".to_owned()));
        }
        Ok(Bytes::from(encoded))
    }

    fn decode_revert(&self, data: &[u8]) -> Option<String> {
        let selector = data.get(..4)?;
        // Contract-specific errors first: a 4-byte selector may also be valid UTF-8.
        if let Some(error) = self
            .abi
            .errors()
            .find(|e| e.selector().as_slice() == selector)
        {
            return Some(error.signature());
        }
        decode_revert_reason(data)
    }
}

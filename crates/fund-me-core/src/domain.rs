use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Label shown on the connect button before any connection attempt.
pub const CONNECT_LABEL: &str = "Connect";

/// Label shown whenever no wallet provider is present.
pub const INSTALL_PROMPT: &str = "Please install MetaMask!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    pub fn ether() -> Self {
        Self {
            name: "Ether".to_owned(),
            symbol: "ETH".to_owned(),
            decimals: 18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcEndpoint {
    pub http: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcUrls {
    pub default: RpcEndpoint,
}

/// Network metadata handed to the simulation call.
///
/// Serialises to the same shape as a JS `defineChain` object so the browser
/// runtime can pass it straight through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: RpcUrls,
}

impl ChainDescriptor {
    pub fn default_rpc_url(&self) -> Option<&str> {
        self.rpc_urls.default.http.first().map(String::as_str)
    }
}

/// A user-entered amount together with its base-unit value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingAmount {
    pub input: String,
    pub wei: U256,
}

/// `eth_call` parameters for a contract simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    pub chain: ChainDescriptor,
    pub amount: FundingAmount,
    pub request: CallRequest,
    pub return_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(Address),
    ProviderMissing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundOutcome {
    Simulated(SimulationOutcome),
    ProviderMissing,
}

/// Per-window connection state, passed explicitly into every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingSession {
    pub account: Option<Address>,
    pub button_label: String,
}

impl Default for FundingSession {
    fn default() -> Self {
        Self {
            account: None,
            button_label: CONNECT_LABEL.to_owned(),
        }
    }
}

impl FundingSession {
    pub fn mark_connected(&mut self, account: Address) {
        self.account = Some(account);
        self.button_label = format!("Connected: {account}");
    }

    pub fn mark_provider_missing(&mut self) {
        self.button_label = INSTALL_PROMPT.to_owned();
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

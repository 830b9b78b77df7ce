pub mod chain;
pub mod domain;
pub mod orchestrator;
pub mod ports;
pub mod units;

pub use chain::{
    describe_chain, local_chain, local_currency, resolve_chain, DEFAULT_RPC_URL, LOCAL_CHAIN_NAME,
};
pub use domain::{
    CallRequest, ChainDescriptor, ConnectOutcome, FundOutcome, FundingAmount, FundingSession,
    NativeCurrency, RpcEndpoint, RpcUrls, SimulationOutcome, CONNECT_LABEL, INSTALL_PROMPT,
};
pub use orchestrator::{
    first_account, CommandResult, ContractTarget, FundCommand, Orchestrator, FUND_FUNCTION,
};
pub use ports::{AbiPort, PortError, ProviderPort};
pub use units::parse_amount;

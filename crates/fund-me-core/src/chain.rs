use tracing::debug;

use crate::domain::{ChainDescriptor, NativeCurrency, RpcEndpoint, RpcUrls};
use crate::ports::{PortError, ProviderPort};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const LOCAL_CHAIN_NAME: &str = "Custom Chain";

/// Currency of the local network. Funding amounts are converted with its decimals.
pub fn local_currency() -> NativeCurrency {
    NativeCurrency::ether()
}

/// Builds the descriptor for the local development network.
///
/// Only the id varies: the name, currency metadata and RPC endpoint are fixed
/// because the app targets a single local node.
pub fn local_chain(id: u64, rpc_url: &str) -> ChainDescriptor {
    ChainDescriptor {
        id,
        name: LOCAL_CHAIN_NAME.to_owned(),
        native_currency: local_currency(),
        rpc_urls: RpcUrls {
            default: RpcEndpoint {
                http: vec![rpc_url.to_owned()],
            },
        },
    }
}

pub fn resolve_chain<P: ProviderPort>(
    provider: &P,
    rpc_url: &str,
) -> Result<ChainDescriptor, PortError> {
    let chain_id = provider.chain_id()?;
    Ok(describe_chain(chain_id, rpc_url))
}

/// The part of [`resolve_chain`] that runs once the chain id is known.
pub fn describe_chain(chain_id: u64, rpc_url: &str) -> ChainDescriptor {
    debug!(chain_id, rpc_url, "resolved active chain");
    local_chain(chain_id, rpc_url)
}

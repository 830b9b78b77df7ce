use alloy::primitives::{Address, Bytes};
use tracing::{debug, info, warn};

use crate::chain::{describe_chain, local_currency, resolve_chain, DEFAULT_RPC_URL};
use crate::domain::{
    CallRequest, ChainDescriptor, ConnectOutcome, FundOutcome, FundingAmount, FundingSession,
    SimulationOutcome,
};
use crate::ports::{AbiPort, PortError, ProviderPort};
use crate::units::parse_amount;

/// Contract entry point invoked by the Funder.
pub const FUND_FUNCTION: &str = "fund";

#[derive(Debug, Clone)]
pub enum FundCommand {
    Connect,
    Fund { amount: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Connect(ConnectOutcome),
    Fund(FundOutcome),
}

/// The deployed contract and the node it lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTarget {
    pub address: Address,
    pub rpc_url: String,
}

impl ContractTarget {
    pub fn local(address: Address) -> Self {
        Self {
            address,
            rpc_url: DEFAULT_RPC_URL.to_owned(),
        }
    }
}

#[derive(Debug)]
pub struct Orchestrator<P, A> {
    pub provider: P,
    pub abi: A,
    pub contract: ContractTarget,
}

impl<P, A> Orchestrator<P, A>
where
    P: ProviderPort,
    A: AbiPort,
{
    pub fn new(provider: P, abi: A, contract: ContractTarget) -> Self {
        Self {
            provider,
            abi,
            contract,
        }
    }

    /// Runs one UI command against `session`.
    ///
    /// Nothing guards against concurrent invocations: each call is an
    /// independent provider interaction and the session is last-write-wins.
    pub fn handle(
        &self,
        session: &mut FundingSession,
        command: FundCommand,
    ) -> Result<CommandResult, PortError> {
        match command {
            FundCommand::Connect => self.connect(session).map(CommandResult::Connect),
            FundCommand::Fund { amount } => self.fund(session, &amount).map(CommandResult::Fund),
        }
    }

    fn connect(&self, session: &mut FundingSession) -> Result<ConnectOutcome, PortError> {
        if !self.provider_present(session) {
            return Ok(ConnectOutcome::ProviderMissing);
        }
        let accounts = self.provider.request_accounts()?;
        let account = self.accept_connection(session, &accounts)?;
        Ok(ConnectOutcome::Connected(account))
    }

    fn fund(&self, session: &mut FundingSession, amount: &str) -> Result<FundOutcome, PortError> {
        let Some(amount) = self.begin_fund(session, amount)? else {
            return Ok(FundOutcome::ProviderMissing);
        };

        let accounts = self.provider.request_accounts()?;
        let account = self.accept_funder(session, &accounts)?;

        let chain = resolve_chain(&self.provider, &self.contract.rpc_url)?;
        let request = self.prepare_simulation(account, &amount)?;
        let return_data = self
            .provider
            .call(&request)
            .map_err(|e| self.explain_revert(e))?;

        Ok(FundOutcome::Simulated(self.finish_simulation(
            chain,
            amount,
            request,
            return_data,
        )))
    }

    /// Shows the install prompt and returns false when no provider exists.
    pub fn provider_present(&self, session: &mut FundingSession) -> bool {
        if self.provider.is_available() {
            return true;
        }
        warn!("no wallet provider available");
        session.mark_provider_missing();
        false
    }

    /// Connector step after `eth_requestAccounts`: renders the first account.
    pub fn accept_connection(
        &self,
        session: &mut FundingSession,
        accounts: &[Address],
    ) -> Result<Address, PortError> {
        let account = first_account(accounts)?;
        session.mark_connected(account);
        info!(%account, "wallet connected");
        Ok(account)
    }

    /// Funder steps before any provider request. `Ok(None)` means no provider.
    pub fn begin_fund(
        &self,
        session: &mut FundingSession,
        amount: &str,
    ) -> Result<Option<FundingAmount>, PortError> {
        info!("Funding with {amount} ETH...");
        if !self.provider_present(session) {
            return Ok(None);
        }
        self.parse_funding_amount(amount).map(Some)
    }

    /// Funder step after `eth_requestAccounts`: records the account, label untouched.
    pub fn accept_funder(
        &self,
        session: &mut FundingSession,
        accounts: &[Address],
    ) -> Result<Address, PortError> {
        let account = first_account(accounts)?;
        session.account = Some(account);
        Ok(account)
    }

    /// Descriptor for `chain_id` on the contract's node, as [`resolve_chain`] builds it.
    pub fn chain_for(&self, chain_id: u64) -> ChainDescriptor {
        describe_chain(chain_id, &self.contract.rpc_url)
    }

    pub fn parse_funding_amount(&self, amount: &str) -> Result<FundingAmount, PortError> {
        let wei = parse_amount(amount, local_currency().decimals)?;
        Ok(FundingAmount {
            input: amount.trim().to_owned(),
            wei,
        })
    }

    /// Builds the `eth_call` request for `fund()` with `amount` attached.
    pub fn prepare_simulation(
        &self,
        account: Address,
        amount: &FundingAmount,
    ) -> Result<CallRequest, PortError> {
        let data = self.abi.encode_call(FUND_FUNCTION, amount.wei)?;
        Ok(CallRequest {
            from: account,
            to: self.contract.address,
            data,
            value: amount.wei,
        })
    }

    pub fn finish_simulation(
        &self,
        chain: ChainDescriptor,
        amount: FundingAmount,
        request: CallRequest,
        return_data: Bytes,
    ) -> SimulationOutcome {
        info!(
            chain_id = chain.id,
            wei = %amount.wei,
            from = %request.from,
            "fund simulation succeeded"
        );
        SimulationOutcome {
            chain,
            amount,
            request,
            return_data,
        }
    }

    /// Replaces raw revert data with the reason the contract ABI describes.
    pub fn explain_revert(&self, err: PortError) -> PortError {
        match err {
            PortError::Reverted {
                reason,
                data: Some(data),
            } => {
                let reason = self.abi.decode_revert(&data).unwrap_or(reason);
                debug!(%reason, "simulation reverted");
                PortError::Reverted {
                    reason,
                    data: Some(data),
                }
            }
            other => other,
        }
    }
}

pub fn first_account(accounts: &[Address]) -> Result<Address, PortError> {
    accounts
        .first()
        .copied()
        .ok_or_else(|| PortError::Policy("NO_CONNECTED_ACCOUNT".to_owned()))
}

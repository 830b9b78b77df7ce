//! Bridge between the egui shell and the funding workspace crates.
//! This must remain the only shell-facing boundary for provider operations.

use std::sync::Arc;

use fund_me_adapters::{AbiAdapter, Eip1193Adapter, FunderConfig};
use fund_me_core::{
    CommandResult, FundCommand, FundingSession, Orchestrator, PortError, ProviderPort,
};

type FundingOrchestrator = Orchestrator<Eip1193Adapter, AbiAdapter>;

/// A finished command with the session it started from and the one it produced.
#[derive(Debug)]
pub struct BridgeReply {
    pub started_from: FundingSession,
    pub session: FundingSession,
    pub result: Result<CommandResult, PortError>,
}

#[derive(Clone)]
pub struct FundingBridge {
    orchestrator: Arc<FundingOrchestrator>,
}

impl FundingBridge {
    pub fn new(config: &FunderConfig) -> Result<Self, PortError> {
        Ok(Self {
            orchestrator: Arc::new(FundingOrchestrator::new(
                Eip1193Adapter::with_config(config),
                AbiAdapter::fund_me()?,
                config.contract_target(),
            )),
        })
    }

    pub fn provider_mode(&self) -> &'static str {
        self.orchestrator.provider.mode_name()
    }

    pub fn provider_available(&self) -> bool {
        self.orchestrator.provider.is_available()
    }

    pub fn contract_address(&self) -> String {
        self.orchestrator.contract.address.to_string()
    }

    pub fn connect(&self, started_from: FundingSession) -> BridgeReply {
        let mut session = started_from.clone();
        let result = self
            .orchestrator
            .handle(&mut session, FundCommand::Connect);
        BridgeReply {
            started_from,
            session,
            result,
        }
    }

    pub fn fund(&self, started_from: FundingSession, amount: String) -> BridgeReply {
        let mut session = started_from.clone();
        let result = self
            .orchestrator
            .handle(&mut session, FundCommand::Fund { amount });
        BridgeReply {
            started_from,
            session,
            result,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn connect_runtime_async(&self, started_from: FundingSession) -> BridgeReply {
        let mut session = started_from.clone();
        let result = self.connect_browser(&mut session).await;
        BridgeReply {
            started_from,
            session,
            result,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn fund_runtime_async(
        &self,
        started_from: FundingSession,
        amount: String,
    ) -> BridgeReply {
        let mut session = started_from.clone();
        let result = self.fund_browser(&mut session, &amount).await;
        BridgeReply {
            started_from,
            session,
            result,
        }
    }

    /// Browser counterpart of `FundCommand::Connect`, built from the same orchestrator steps.
    #[cfg(target_arch = "wasm32")]
    async fn connect_browser(
        &self,
        session: &mut FundingSession,
    ) -> Result<CommandResult, PortError> {
        use fund_me_core::ConnectOutcome;

        let orch = &self.orchestrator;
        if !orch.provider_present(session) {
            return Ok(CommandResult::Connect(ConnectOutcome::ProviderMissing));
        }
        let accounts = orch.provider.wasm_request_accounts_async().await?;
        let account = orch.accept_connection(session, &accounts)?;
        Ok(CommandResult::Connect(ConnectOutcome::Connected(account)))
    }

    /// Browser counterpart of `FundCommand::Fund`: the provider only answers asynchronously.
    #[cfg(target_arch = "wasm32")]
    async fn fund_browser(
        &self,
        session: &mut FundingSession,
        amount: &str,
    ) -> Result<CommandResult, PortError> {
        use fund_me_core::FundOutcome;

        let orch = &self.orchestrator;
        let Some(amount) = orch.begin_fund(session, amount)? else {
            return Ok(CommandResult::Fund(FundOutcome::ProviderMissing));
        };

        let accounts = orch.provider.wasm_request_accounts_async().await?;
        let account = orch.accept_funder(session, &accounts)?;

        let chain_id = orch.provider.wasm_chain_id_async().await?;
        let chain = orch.chain_for(chain_id);
        let request = orch.prepare_simulation(account, &amount)?;
        let return_data = orch
            .provider
            .wasm_call_async(&request)
            .await
            .map_err(|e| orch.explain_revert(e))?;

        Ok(CommandResult::Fund(FundOutcome::Simulated(
            orch.finish_simulation(chain, amount, request, return_data),
        )))
    }
}

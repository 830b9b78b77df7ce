#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use alloy::primitives::{keccak256, Address, Bytes, U256};

use fund_me_core::{
    AbiPort, CallRequest, ContractTarget, Orchestrator, PortError, ProviderPort,
};

/// Provider double that replays scripted responses and logs each request.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    pub available: bool,
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    pub requests: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<CallRequest>>,
    pub account_errors: Mutex<VecDeque<PortError>>,
    pub call_errors: Mutex<VecDeque<PortError>>,
}

impl ScriptedProvider {
    pub fn connected(accounts: Vec<Address>, chain_id: u64) -> Self {
        Self {
            available: true,
            accounts,
            chain_id,
            ..Self::default()
        }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|m| *m == method).count()
    }

    pub fn fail_next_accounts(&self, err: PortError) {
        self.account_errors
            .lock()
            .expect("account errors lock")
            .push_back(err);
    }

    pub fn fail_next_call(&self, err: PortError) {
        self.call_errors
            .lock()
            .expect("call errors lock")
            .push_back(err);
    }

    fn log(&self, method: &str) {
        self.requests
            .lock()
            .expect("requests lock")
            .push(method.to_owned());
    }
}

impl ProviderPort for ScriptedProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        self.log("eth_requestAccounts");
        if let Some(err) = self.account_errors.lock().expect("lock").pop_front() {
            return Err(err);
        }
        Ok(self.accounts.clone())
    }

    fn chain_id(&self) -> Result<u64, PortError> {
        self.log("eth_chainId");
        Ok(self.chain_id)
    }

    fn call(&self, request: &CallRequest) -> Result<Bytes, PortError> {
        self.log("eth_call");
        self.calls.lock().expect("calls lock").push(request.clone());
        if let Some(err) = self.call_errors.lock().expect("lock").pop_front() {
            return Err(err);
        }
        Ok(Bytes::new())
    }
}

/// Encodes only the selector, which is all `fund()` needs.
#[derive(Debug, Default)]
pub struct SelectorAbi;

impl AbiPort for SelectorAbi {
    fn encode_call(&self, function: &str, _value: U256) -> Result<Bytes, PortError> {
        let hash = keccak256(format!("{function}()").as_bytes());
        Ok(Bytes::copy_from_slice(&hash[..4]))
    }

    fn decode_revert(&self, data: &[u8]) -> Option<String> {
        (data == [0xde, 0xad]).then(|| "FundMe__NotEnoughEth()".to_owned())
    }
}

pub type TestOrchestrator = Orchestrator<ScriptedProvider, SelectorAbi>;

pub fn contract_address() -> Address {
    "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        .parse()
        .expect("valid contract address")
}

pub fn account_a() -> Address {
    "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        .parse()
        .expect("valid account a")
}

pub fn account_b() -> Address {
    "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
        .parse()
        .expect("valid account b")
}

pub fn new_orchestrator(provider: ScriptedProvider) -> TestOrchestrator {
    Orchestrator::new(provider, SelectorAbi, ContractTarget::local(contract_address()))
}

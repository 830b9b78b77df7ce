use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{address, Address, Bytes};
use serde_json::Value;
use tracing::{debug, warn};

use fund_me_core::{CallRequest, PortError, ProviderPort};

use crate::FunderConfig;

/// Anvil's first pre-funded account.
pub const DETERMINISTIC_ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const DETERMINISTIC_CHAIN_ID: u64 = 31337;

#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    mode: ProviderMode,
    state: Arc<Mutex<ProviderState>>,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    Deterministic,
    #[cfg(not(target_arch = "wasm32"))]
    Proxy(ProxyRuntime),
    #[cfg(target_arch = "wasm32")]
    Browser,
}

#[derive(Debug, Clone)]
#[cfg(not(target_arch = "wasm32"))]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug)]
struct ProviderState {
    accounts: Vec<Address>,
    chain_id: u64,
    call_result: Bytes,
    next_failure: Option<PortError>,
    request_log: Vec<String>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            accounts: vec![DETERMINISTIC_ACCOUNT],
            chain_id: DETERMINISTIC_CHAIN_ID,
            call_result: Bytes::new(),
            next_failure: None,
            request_log: Vec::new(),
        }
    }
}

impl Default for Eip1193Adapter {
    fn default() -> Self {
        Self::with_config(&FunderConfig::from_env())
    }
}

impl Eip1193Adapter {
    #[cfg_attr(target_arch = "wasm32", allow(unused_variables))]
    pub fn with_config(config: &FunderConfig) -> Self {
        #[cfg(target_arch = "wasm32")]
        let mode = if browser_provider().is_ok() {
            ProviderMode::Browser
        } else {
            ProviderMode::Disabled("window.ethereum missing".to_owned())
        };

        #[cfg(not(target_arch = "wasm32"))]
        let mode = if let Some(ref base_url) = config.eip1193_proxy_url {
            let timeout = std::time::Duration::from_millis(config.provider_timeout_ms);
            match reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
            {
                Ok(client) => ProviderMode::Proxy(ProxyRuntime {
                    base_url: base_url.clone(),
                    client,
                }),
                Err(e) if config.strict_runtime_required() => ProviderMode::Disabled(format!(
                    "failed to initialize EIP-1193 proxy client in production profile: {e}"
                )),
                Err(e) => {
                    warn!("EIP-1193 proxy client unavailable, using deterministic provider: {e}");
                    ProviderMode::Deterministic
                }
            }
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 proxy URL not configured in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        Self::from_mode(mode)
    }

    /// A provider that reports itself absent.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self::from_mode(ProviderMode::Disabled(reason.into()))
    }

    /// An in-memory provider answering as a fresh local Anvil node would.
    pub fn deterministic() -> Self {
        Self::from_mode(ProviderMode::Deterministic)
    }

    fn from_mode(mode: ProviderMode) -> Self {
        debug!(mode = mode_name(&mode), "initialized EIP-1193 adapter");
        Self {
            mode,
            state: Arc::new(Mutex::new(ProviderState::default())),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        mode_name(&self.mode)
    }

    fn check_mode(&self) -> Result<(), PortError> {
        if let ProviderMode::Disabled(reason) = &self.mode {
            return Err(PortError::NotFound(reason.clone()));
        }
        Ok(())
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, ProviderState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))
    }

    fn record_request(&self, method: &str) -> Result<(), PortError> {
        self.lock_state()?.request_log.push(method.to_owned());
        Ok(())
    }

    /// Methods sent to the provider, oldest first.
    pub fn request_log(&self) -> Result<Vec<String>, PortError> {
        Ok(self.lock_state()?.request_log.clone())
    }

    pub fn debug_inject_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        self.lock_state()?.accounts = accounts;
        Ok(())
    }

    pub fn debug_inject_chain_changed(&self, chain_id: u64) -> Result<(), PortError> {
        self.lock_state()?.chain_id = chain_id;
        Ok(())
    }

    pub fn debug_inject_call_result(&self, data: Bytes) -> Result<(), PortError> {
        self.lock_state()?.call_result = data;
        Ok(())
    }

    /// Makes the next deterministic request fail with `err`.
    pub fn debug_fail_next(&self, err: PortError) -> Result<(), PortError> {
        self.lock_state()?.next_failure = Some(err);
        Ok(())
    }

    fn take_deterministic_failure(&self) -> Result<(), PortError> {
        match self.lock_state()?.next_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn proxy_call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let proxy = match &self.mode {
            ProviderMode::Proxy(proxy) => proxy,
            ProviderMode::Disabled(reason) => return Err(PortError::NotFound(reason.clone())),
            _ => {
                return Err(PortError::NotImplemented(
                    "eip1193 proxy runtime not enabled",
                ))
            }
        };

        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        debug!(method, url = %proxy.base_url, "eip1193 proxy request");
        let response = proxy
            .client
            .post(&proxy.base_url)
            .json(&payload)
            .send()
            .map_err(|e| PortError::Transport(format!("eip1193 proxy request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("eip1193 proxy json decode failed: {e}")))?;
        if let Some(err) = body.get("error") {
            return Err(classify_rpc_error(err));
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "eip1193 proxy status {status}: {body}"
            )));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport("eip1193 proxy missing result".to_owned()))
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn wasm_request_accounts_async(&self) -> Result<Vec<Address>, PortError> {
        self.check_mode()?;
        let result = self
            .wasm_request("eth_requestAccounts", serde_json::json!([]))
            .await?;
        let accounts = json_accounts(&result)?;
        self.lock_state()?.accounts = accounts.clone();
        Ok(accounts)
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn wasm_chain_id_async(&self) -> Result<u64, PortError> {
        self.check_mode()?;
        let result = self
            .wasm_request("eth_chainId", serde_json::json!([]))
            .await?;
        let chain_id = json_chain_id_to_u64(&result)?;
        self.lock_state()?.chain_id = chain_id;
        Ok(chain_id)
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn wasm_call_async(&self, request: &CallRequest) -> Result<Bytes, PortError> {
        self.check_mode()?;
        let result = self.wasm_request("eth_call", call_params(request)?).await?;
        json_bytes(&result)
    }

    #[cfg(target_arch = "wasm32")]
    async fn wasm_request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        use wasm_bindgen::JsCast;

        self.record_request(method)?;
        let provider = browser_provider()?;
        let request_fn = get_prop(&provider, "request")
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            .ok_or(PortError::NotImplemented(
                "window.ethereum.request is unavailable",
            ))?;

        let request = serde_json::json!({
            "method": method,
            "params": params,
        });
        let request_js = serde_wasm_bindgen::to_value(&request)
            .map_err(|e| PortError::Transport(format!("failed to encode wasm request: {e}")))?;
        let promise_js = request_fn.call1(&provider, &request_js).map_err(|e| {
            PortError::Transport(format!("provider request dispatch failed: {e:?}"))
        })?;
        let promise = promise_js.dyn_into::<js_sys::Promise>().map_err(|_| {
            PortError::Transport("provider request did not return Promise".to_owned())
        })?;
        let result_js = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(|e| classify_rpc_error(&js_error_to_json(&e)))?;
        serde_wasm_bindgen::from_value(result_js)
            .map_err(|e| PortError::Transport(format!("failed to decode wasm response: {e}")))
    }
}

impl ProviderPort for Eip1193Adapter {
    fn is_available(&self) -> bool {
        !matches!(self.mode, ProviderMode::Disabled(_))
    }

    fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        self.check_mode()?;

        #[cfg(target_arch = "wasm32")]
        if matches!(self.mode, ProviderMode::Browser) {
            return Err(PortError::NotImplemented(
                "wasm sync request_accounts is unavailable; use wasm_request_accounts_async",
            ));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if matches!(self.mode, ProviderMode::Proxy(_)) {
            self.record_request("eth_requestAccounts")?;
            let result = self.proxy_call("eth_requestAccounts", serde_json::json!([]))?;
            let accounts = json_accounts(&result)?;
            self.lock_state()?.accounts = accounts.clone();
            return Ok(accounts);
        }

        self.record_request("eth_requestAccounts")?;
        self.take_deterministic_failure()?;
        Ok(self.lock_state()?.accounts.clone())
    }

    fn chain_id(&self) -> Result<u64, PortError> {
        self.check_mode()?;

        #[cfg(target_arch = "wasm32")]
        if matches!(self.mode, ProviderMode::Browser) {
            return Err(PortError::NotImplemented(
                "wasm sync chain_id is unavailable; use wasm_chain_id_async",
            ));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if matches!(self.mode, ProviderMode::Proxy(_)) {
            self.record_request("eth_chainId")?;
            let result = self.proxy_call("eth_chainId", serde_json::json!([]))?;
            let chain_id = json_chain_id_to_u64(&result)?;
            self.lock_state()?.chain_id = chain_id;
            return Ok(chain_id);
        }

        self.record_request("eth_chainId")?;
        self.take_deterministic_failure()?;
        Ok(self.lock_state()?.chain_id)
    }

    fn call(&self, request: &CallRequest) -> Result<Bytes, PortError> {
        self.check_mode()?;

        #[cfg(target_arch = "wasm32")]
        if matches!(self.mode, ProviderMode::Browser) {
            return Err(PortError::NotImplemented(
                "wasm sync call is unavailable; use wasm_call_async",
            ));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if matches!(self.mode, ProviderMode::Proxy(_)) {
            self.record_request("eth_call")?;
            let result = self.proxy_call("eth_call", call_params(request)?)?;
            return json_bytes(&result);
        }

        self.record_request("eth_call")?;
        self.take_deterministic_failure()?;
        debug!(to = %request.to, value = %request.value, "deterministic eth_call");
        Ok(self.lock_state()?.call_result.clone())
    }
}

/// Maps an EIP-1193 / JSON-RPC error object onto [`PortError`].
pub fn classify_rpc_error(error: &Value) -> PortError {
    let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown provider error")
        .to_owned();

    // Wallets wrap node errors in -32603 with the original under `data`.
    if code == -32603 {
        if let Some(inner) = error.get("data").filter(|d| d.get("code").is_some()) {
            return classify_rpc_error(inner);
        }
    }

    match code {
        4001 => PortError::UserRejected(message),
        4100 => PortError::Unauthorized(message),
        _ => {
            let data = revert_data(error.get("data"));
            if code == 3 || data.is_some() || message.contains("revert") {
                let reason = message
                    .strip_prefix("execution reverted: ")
                    .unwrap_or(&message)
                    .to_owned();
                PortError::Reverted { reason, data }
            } else {
                PortError::Rpc { code, message }
            }
        }
    }
}

fn revert_data(data: Option<&Value>) -> Option<Bytes> {
    let raw = match data? {
        Value::String(s) => s.as_str(),
        Value::Object(o) => o.get("data")?.as_str()?,
        _ => return None,
    };
    raw.parse::<Bytes>().ok().filter(|b| !b.is_empty())
}

fn call_params(request: &CallRequest) -> Result<Value, PortError> {
    let request = serde_json::to_value(request)
        .map_err(|e| PortError::Validation(format!("call request serialization failed: {e}")))?;
    Ok(serde_json::json!([request, "latest"]))
}

fn json_accounts(value: &Value) -> Result<Vec<Address>, PortError> {
    let arr = value.as_array().ok_or_else(|| {
        PortError::Transport("eth_requestAccounts: array expected".to_owned())
    })?;
    arr.iter()
        .map(|item| -> Result<Address, PortError> {
            let raw = item.as_str().ok_or_else(|| {
                PortError::Transport("eth_requestAccounts: string expected".to_owned())
            })?;
            raw.parse()
                .map_err(|e| PortError::Validation(format!("invalid account address: {e}")))
        })
        .collect()
}

fn json_bytes(value: &Value) -> Result<Bytes, PortError> {
    let raw = value
        .as_str()
        .ok_or_else(|| PortError::Transport("eth_call must return hex string".to_owned()))?;
    raw.parse()
        .map_err(|e| PortError::Validation(format!("invalid eth_call result hex: {e}")))
}

fn json_chain_id_to_u64(value: &Value) -> Result<u64, PortError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| PortError::Validation("chain id must be string or number".to_owned()))?;
    parse_chain_id_str(s)
}

fn parse_chain_id_str(raw: &str) -> Result<u64, PortError> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
            .map_err(|e| PortError::Validation(format!("invalid hex chain id: {e}")))
    } else {
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid chain id: {e}")))
    }
}

fn mode_name(mode: &ProviderMode) -> &'static str {
    match mode {
        ProviderMode::Disabled(_) => "disabled",
        ProviderMode::Deterministic => "deterministic",
        #[cfg(not(target_arch = "wasm32"))]
        ProviderMode::Proxy(_) => "proxy",
        #[cfg(target_arch = "wasm32")]
        ProviderMode::Browser => "browser",
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_provider() -> Result<wasm_bindgen::JsValue, PortError> {
    let window =
        web_sys::window().ok_or_else(|| PortError::Transport("missing window".to_owned()))?;
    let provider = get_prop(&window.into(), "ethereum")?;
    if provider.is_null() || provider.is_undefined() {
        return Err(PortError::NotFound("window.ethereum missing".to_owned()));
    }
    Ok(provider)
}

#[cfg(target_arch = "wasm32")]
fn get_prop(target: &wasm_bindgen::JsValue, key: &str) -> Result<wasm_bindgen::JsValue, PortError> {
    js_sys::Reflect::get(target, &wasm_bindgen::JsValue::from_str(key))
        .map_err(|e| PortError::Transport(format!("read provider property {key} failed: {e:?}")))
}

/// Error objects thrown by wallets keep `message` non-enumerable, so read fields directly.
#[cfg(target_arch = "wasm32")]
fn js_error_to_json(err: &wasm_bindgen::JsValue) -> Value {
    let code = get_prop(err, "code").ok().and_then(|v| v.as_f64());
    let message = get_prop(err, "message")
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| format!("provider request rejected: {err:?}"));
    let data = get_prop(err, "data")
        .ok()
        .and_then(|v| serde_wasm_bindgen::from_value::<Value>(v).ok())
        .unwrap_or(Value::Null);
    serde_json::json!({
        "code": code.map(|c| c as i64),
        "message": message,
        "data": data,
    })
}

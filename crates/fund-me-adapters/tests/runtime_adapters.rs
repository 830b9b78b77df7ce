use alloy::primitives::{Address, Bytes, U256};
use serde_json::json;

use fund_me_adapters::{
    classify_rpc_error, ConfigError, Eip1193Adapter, FunderConfig, RuntimeProfile,
    DEFAULT_CONTRACT_ADDRESS, DETERMINISTIC_ACCOUNT, DETERMINISTIC_CHAIN_ID,
};
use fund_me_core::{CallRequest, PortError, ProviderPort, DEFAULT_RPC_URL};

fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_owned())
    }
}

#[test]
fn deterministic_provider_answers_like_fresh_anvil() {
    let adapter = Eip1193Adapter::deterministic();

    assert!(adapter.is_available());
    assert_eq!(adapter.mode_name(), "deterministic");
    assert_eq!(
        adapter.request_accounts().expect("accounts"),
        vec![DETERMINISTIC_ACCOUNT]
    );
    assert_eq!(adapter.chain_id().expect("chain"), DETERMINISTIC_CHAIN_ID);

    let request = CallRequest {
        from: DETERMINISTIC_ACCOUNT,
        to: DEFAULT_CONTRACT_ADDRESS,
        data: Bytes::new(),
        value: U256::ZERO,
    };
    assert!(adapter.call(&request).expect("call").is_empty());
    assert_eq!(
        adapter.request_log().expect("log"),
        vec!["eth_requestAccounts", "eth_chainId", "eth_call"]
    );
}

#[test]
fn deterministic_injection_is_visible_to_next_request() {
    let adapter = Eip1193Adapter::deterministic();
    let other: Address = "0x2000000000000000000000000000000000000002"
        .parse()
        .expect("address");

    adapter
        .debug_inject_accounts_changed(vec![other])
        .expect("inject accounts");
    adapter.debug_inject_chain_changed(8453).expect("inject chain");
    adapter
        .debug_fail_next(PortError::UserRejected("denied".to_owned()))
        .expect("inject failure");

    assert!(adapter
        .request_accounts()
        .expect_err("first request fails")
        .is_user_rejection());
    assert_eq!(adapter.request_accounts().expect("accounts"), vec![other]);
    assert_eq!(adapter.chain_id().expect("chain"), 8453);
}

#[test]
fn disabled_provider_is_absent_and_refuses_requests() {
    let adapter = Eip1193Adapter::disabled("window.ethereum missing");

    assert!(!adapter.is_available());
    let err = adapter.request_accounts().expect_err("must fail");
    assert!(matches!(err, PortError::NotFound(ref m) if m == "window.ethereum missing"));
    assert!(adapter.request_log().expect("log").is_empty());
}

#[test]
fn production_profile_without_proxy_is_disabled() {
    let adapter = Eip1193Adapter::with_config(&FunderConfig::default());
    assert!(!adapter.is_available());
    assert_eq!(adapter.mode_name(), "disabled");

    let config = FunderConfig {
        runtime_profile: RuntimeProfile::Development,
        ..FunderConfig::default()
    };
    let dev = Eip1193Adapter::with_config(&config);
    assert!(dev.is_available());
    assert_eq!(dev.mode_name(), "deterministic");
}

#[test]
fn empty_environment_has_no_provider() {
    let config = FunderConfig::from_lookup(|_| None).expect("config");
    assert_eq!(config.runtime_profile, RuntimeProfile::Production);

    let adapter = Eip1193Adapter::with_config(&config);
    assert!(!adapter.is_available());
    assert!(matches!(
        adapter.request_accounts().expect_err("no provider"),
        PortError::NotFound(_)
    ));
}

#[test]
fn deterministic_provider_requires_explicit_development_profile() {
    let config = FunderConfig::from_lookup(lookup(&[("FUND_ME_RUNTIME_PROFILE", "development")]))
        .expect("config");
    assert_eq!(config.runtime_profile, RuntimeProfile::Development);
    assert_eq!(
        Eip1193Adapter::with_config(&config).mode_name(),
        "deterministic"
    );
}

#[test]
fn rpc_error_classification() {
    assert!(matches!(
        classify_rpc_error(&json!({ "code": 4001, "message": "User rejected" })),
        PortError::UserRejected(_)
    ));
    assert!(matches!(
        classify_rpc_error(&json!({ "code": 4100, "message": "not authorized" })),
        PortError::Unauthorized(_)
    ));
    assert!(matches!(
        classify_rpc_error(&json!({ "code": -32601, "message": "Method not found" })),
        PortError::Rpc { code: -32601, .. }
    ));

    let wrapped = classify_rpc_error(&json!({
        "code": -32603,
        "message": "Internal JSON-RPC error.",
        "data": { "code": 3, "message": "execution reverted", "data": "0x30cd7471" }
    }));
    match wrapped {
        PortError::Reverted { reason, data } => {
            assert_eq!(reason, "execution reverted");
            assert_eq!(data, Some(Bytes::from(vec![0x30, 0xcd, 0x74, 0x71])));
        }
        other => panic!("expected revert, got {other}"),
    }

    let bare = classify_rpc_error(&json!({
        "code": -32000,
        "message": "execution reverted: You need to spend more ETH!"
    }));
    assert!(matches!(
        bare,
        PortError::Reverted { ref reason, data: None } if reason == "You need to spend more ETH!"
    ));
}

#[test]
fn config_defaults_target_local_anvil() {
    let config = FunderConfig::default();
    assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
    assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS);
    assert_eq!(config.runtime_profile, RuntimeProfile::Production);
    assert!(config.strict_runtime_required());

    let target = config.contract_target();
    assert_eq!(target.address, DEFAULT_CONTRACT_ADDRESS);
    assert_eq!(target.rpc_url, "http://localhost:8545");
}

#[test]
fn config_reads_overrides() {
    let pairs = [
        ("FUND_ME_RUNTIME_PROFILE", "dev"),
        ("FUND_ME_EIP1193_PROXY_URL", "http://127.0.0.1:9545"),
        (
            "FUND_ME_CONTRACT_ADDRESS",
            "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512",
        ),
        ("FUND_ME_RPC_URL", " http://127.0.0.1:9545 "),
        ("FUND_ME_PROVIDER_TIMEOUT_MS", "2500"),
    ];
    let config = FunderConfig::from_lookup(lookup(&pairs)).expect("config");

    assert_eq!(config.runtime_profile, RuntimeProfile::Development);
    assert_eq!(
        config.eip1193_proxy_url.as_deref(),
        Some("http://127.0.0.1:9545")
    );
    assert_eq!(
        config.contract_address,
        "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
            .parse::<Address>()
            .expect("address")
    );
    assert_eq!(config.rpc_url, "http://127.0.0.1:9545");
    assert_eq!(config.provider_timeout_ms, 2_500);
}

#[test]
fn config_rejects_bad_values() {
    let err = FunderConfig::from_lookup(lookup(&[("FUND_ME_RUNTIME_PROFILE", "staging")]))
        .expect_err("bad profile");
    assert_eq!(err, ConfigError::UnknownProfile("staging".to_owned()));

    let err = FunderConfig::from_lookup(lookup(&[("FUND_ME_CONTRACT_ADDRESS", "0x1234")]))
        .expect_err("bad address");
    assert!(matches!(err, ConfigError::InvalidAddress { .. }));

    let err = FunderConfig::from_lookup(lookup(&[("FUND_ME_PROVIDER_TIMEOUT_MS", "soon")]))
        .expect_err("bad timeout");
    assert!(err.to_string().contains("FUND_ME_PROVIDER_TIMEOUT_MS"));

    let blank = FunderConfig::from_lookup(lookup(&[("FUND_ME_EIP1193_PROXY_URL", "  ")]))
        .expect("blank is ignored");
    assert_eq!(blank.eip1193_proxy_url, None);
}

#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value};
use tiny_http::{Response, Server, StatusCode};

use fund_me_adapters::{FunderConfig, RuntimeProfile};

pub type Handler = Box<dyn Fn(&str, &Value) -> Value + Send>;

/// Minimal JSON-RPC node: answers `max_requests` requests through `handler`,
/// which returns either `{"result": ..}` or `{"error": ..}`.
pub fn spawn_rpc_server(
    methods: Arc<Mutex<Vec<String>>>,
    max_requests: usize,
    handler: Handler,
) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    let join = thread::spawn(move || {
        for _ in 0..max_requests {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let method = payload["method"].as_str().unwrap_or_default().to_owned();
            if let Ok(mut g) = methods.lock() {
                g.push(method.clone());
            }

            let mut reply = handler(&method, &payload["params"]);
            if let Some(obj) = reply.as_object_mut() {
                obj.insert("jsonrpc".to_owned(), json!("2.0"));
                obj.insert("id".to_owned(), payload["id"].clone());
            }
            let response =
                Response::from_string(reply.to_string()).with_status_code(StatusCode(200));
            let _ = req.respond(response);
        }
    });

    (addr, join)
}

/// Replies the way a fresh Anvil node does for the methods the funder uses.
pub fn anvil_like(method: &str, _params: &Value) -> Value {
    match method {
        "eth_requestAccounts" => json!({
            "result": [
                "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
            ]
        }),
        "eth_chainId" => json!({ "result": "0x7a69" }),
        "eth_call" => json!({ "result": "0x" }),
        _ => json!({ "error": { "code": -32601, "message": "Method not found" } }),
    }
}

pub fn proxy_config(url: String) -> FunderConfig {
    FunderConfig {
        runtime_profile: RuntimeProfile::Production,
        eip1193_proxy_url: Some(url),
        provider_timeout_ms: 5_000,
        ..FunderConfig::default()
    }
}

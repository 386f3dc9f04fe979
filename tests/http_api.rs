//! End-to-end tests over a real listener: REST through `reqwest`, the
//! event stream through `tokio-tungstenite`.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

use dex_wrapper::api::build_app;
use dex_wrapper::app_state::AppState;
use dex_wrapper::config::DexConfig;
use dex_wrapper::domain::EventBus;
use dex_wrapper::service::{Deployment, DexService};

const CALLER: &str = "x-caller-address";

struct Harness {
    base: String,
    addr: SocketAddr,
    cfg: DexConfig,
    client: reqwest::Client,
}

impl Harness {
    async fn start() -> Self {
        let Ok(local) = "127.0.0.1:0".parse() else {
            panic!("valid socket address");
        };
        let Ok(cfg) = DexConfig::local(local) else {
            panic!("valid defaults");
        };
        let Ok(deployment) = Deployment::new(&cfg) else {
            panic!("deployment failed");
        };
        let event_bus = EventBus::new(cfg.event_bus_capacity);
        let state = AppState {
            dex_service: Arc::new(DexService::new(
                deployment,
                event_bus.clone(),
                cfg.default_deadline_secs,
            )),
            event_bus,
        };
        let Ok(listener) = tokio::net::TcpListener::bind(cfg.listen_addr).await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local address");
        };
        let timeout = cfg.request_timeout();
        tokio::spawn(async move {
            let _ = axum::serve(listener, build_app(state, timeout)).await;
        });
        Self {
            base: format!("http://{addr}"),
            addr,
            cfg,
            client: reqwest::Client::new(),
        }
    }

    fn owner(&self) -> String {
        self.cfg.initial_owner.to_string()
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let Ok(resp) = self.client.get(format!("{}{path}", self.base)).send().await else {
            panic!("GET {path} failed");
        };
        let status = resp.status().as_u16();
        let Ok(body) = resp.json::<Value>().await else {
            panic!("GET {path} returned no JSON");
        };
        (status, body)
    }

    async fn post(&self, path: &str, caller: Option<&str>, body: &Value) -> (u16, Value) {
        let mut req = self.client.post(format!("{}{path}", self.base)).json(body);
        if let Some(caller) = caller {
            req = req.header(CALLER, caller);
        }
        let Ok(resp) = req.send().await else {
            panic!("POST {path} failed");
        };
        let status = resp.status().as_u16();
        let Ok(body) = resp.json::<Value>().await else {
            panic!("POST {path} returned no JSON");
        };
        (status, body)
    }

    /// Approves the wrapper for both configured assets and deposits.
    async fn provide(&self, amount: &str) -> Value {
        let owner = self.owner();
        for asset in [self.cfg.asset_a.address(), self.cfg.asset_b.address()] {
            let (status, _) = self
                .post(
                    &format!("/api/v1/assets/{asset}/approve"),
                    Some(&owner),
                    &json!({ "spender": self.cfg.dex_address.to_string(), "amount": amount }),
                )
                .await;
            assert_eq!(status, 200);
        }
        let (status, body) = self
            .post(
                "/api/v1/liquidity/add",
                Some(&owner),
                &json!({ "amount_a_desired": amount, "amount_b_desired": amount }),
            )
            .await;
        assert_eq!(status, 200, "{body}");
        body
    }
}

fn str_at<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

#[tokio::test]
async fn health_and_deployment() {
    let h = Harness::start().await;
    let (status, body) = h.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "status"), "healthy");

    let (status, body) = h.get("/deployment").await;
    assert_eq!(status, 200);
    assert_eq!(str_at(&body, "owner"), h.owner());
    assert_eq!(str_at(&body, "asset_a"), h.cfg.asset_a.address().to_string());
    assert!(body.get("pair_id").is_some_and(Value::is_null));
}

#[tokio::test]
async fn pair_lifecycle() {
    let h = Harness::start().await;
    let (_, body) = h.get("/api/v1/pair").await;
    assert!(body.get("pair_id").is_some_and(Value::is_null));

    let owner = h.owner();
    let (status, created) = h.post("/api/v1/pair", Some(&owner), &json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(created.get("created"), Some(&Value::Bool(true)));

    let (_, again) = h.post("/api/v1/pair", Some(&owner), &json!({})).await;
    assert_eq!(again.get("created"), Some(&Value::Bool(false)));
    assert_eq!(str_at(&again, "pair_id"), str_at(&created, "pair_id"));

    let (_, body) = h.get("/api/v1/pair").await;
    assert_eq!(str_at(&body, "pair_id"), str_at(&created, "pair_id"));
}

#[tokio::test]
async fn deposit_swap_and_balances() {
    // Whole tokens at the default 18 decimals.
    const HUNDRED: &str = "100000000000000000000";
    const TWENTY: &str = "20000000000000000000";
    const TEN: &str = "10000000000000000000";

    let h = Harness::start().await;
    let deposit = h.provide(HUNDRED).await;
    assert_eq!(str_at(&deposit, "amount_a"), HUNDRED);

    let (_, pair) = h.get("/api/v1/pair").await;
    let detail = pair.get("pair").cloned().unwrap_or_default();
    assert_eq!(str_at(&detail, "reserve0"), HUNDRED);

    let a = h.cfg.asset_a.address().to_string();
    let b = h.cfg.asset_b.address().to_string();
    let (status, quote) = h
        .post(
            "/api/v1/swap/quote",
            None,
            &json!({ "amount_in": TWENTY, "path": [a, b] }),
        )
        .await;
    assert_eq!(status, 200);

    let owner = h.owner();
    let (status, _) = h
        .post(
            &format!("/api/v1/assets/{a}/approve"),
            Some(&owner),
            &json!({ "spender": h.cfg.dex_address.to_string(), "amount": TWENTY }),
        )
        .await;
    assert_eq!(status, 200);

    let (_, before) = h.get(&format!("/api/v1/assets/{b}/balances/{owner}")).await;
    let (status, swap) = h
        .post(
            "/api/v1/swap",
            Some(&owner),
            &json!({ "amount_in": TWENTY, "amount_out_min": TEN, "path": [a, b] }),
        )
        .await;
    assert_eq!(status, 200, "{swap}");
    assert_eq!(str_at(&swap, "amount_out"), str_at(&quote, "amount_out"));

    let (_, after) = h.get(&format!("/api/v1/assets/{b}/balances/{owner}")).await;
    let parse = |v: &Value| str_at(v, "balance").parse::<u128>().unwrap_or_default();
    let out = str_at(&swap, "amount_out").parse::<u128>().unwrap_or_default();
    assert!(out >= 10_000_000_000_000_000_000);
    assert_eq!(parse(&after), parse(&before) + out);
}

#[tokio::test]
async fn errors_are_structured() {
    let h = Harness::start().await;

    let (status, body) = h
        .post(
            "/api/v1/liquidity/add",
            None,
            &json!({ "amount_a_desired": "1", "amount_b_desired": "1" }),
        )
        .await;
    assert_eq!(status, 400);
    let code = body.pointer("/error/code").and_then(Value::as_u64);
    assert_eq!(code, Some(1001));

    let (status, body) = h
        .post(
            "/api/v1/liquidity/add",
            Some(&h.owner()),
            &json!({ "amount_a_desired": "1000", "amount_b_desired": "1000" }),
        )
        .await;
    assert_eq!(status, 422);
    assert_eq!(
        body.pointer("/error/category").and_then(Value::as_str),
        Some("request")
    );

    let stranger = "0x4242424242424242424242424242424242424242";
    let (status, body) = h
        .post(
            "/api/v1/admin/ownership",
            Some(stranger),
            &json!({ "new_owner": stranger }),
        )
        .await;
    assert_eq!(status, 403);
    assert_eq!(
        body.pointer("/error/category").and_then(Value::as_str),
        Some("forbidden")
    );
    let (_, info) = h.get("/deployment").await;
    assert_eq!(str_at(&info, "owner"), h.owner());
}

#[tokio::test]
async fn websocket_streams_subscribed_topics() {
    let h = Harness::start().await;
    let Ok((mut ws, _)) = tokio_tungstenite::connect_async(format!("ws://{}/ws", h.addr)).await
    else {
        panic!("ws connect failed");
    };

    let subscribe = json!({
        "id": "sub-1",
        "type": "command",
        "timestamp": chrono::Utc::now(),
        "payload": { "command": "subscribe", "topics": ["liquidity"] },
    });
    let Ok(()) = ws.send(Message::text(subscribe.to_string())).await else {
        panic!("ws send failed");
    };
    let reply = next_json(&mut ws).await;
    assert_eq!(str_at(&reply, "type"), "response");
    assert_eq!(str_at(&reply, "id"), "sub-1");

    h.provide("5000000").await;

    // The pair event is filtered out; the first delivered event is the deposit.
    let event = next_json(&mut ws).await;
    assert_eq!(str_at(&event, "type"), "event");
    assert_eq!(
        event.pointer("/payload/event_type").and_then(Value::as_str),
        Some("liquidity_added")
    );
}

async fn next_json<S>(ws: &mut S) -> Value
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let Some(Ok(msg)) = ws.next().await else {
            panic!("ws closed early");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                panic!("ws sent invalid JSON");
            };
            return value;
        }
    }
}

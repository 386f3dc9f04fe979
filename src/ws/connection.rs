//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::{SubscriptionManager, parse_topics};
use crate::api::dto::{PairDetail, QuoteBody, QuoteResponse};
use crate::domain::DexEvent;
use crate::service::DexService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards events whose topic the client subscribed to.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<DexEvent>,
    dex_service: Arc<DexService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &dex_service).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(dex_event) => {
                        if subs.matches(dex_event.topic()) {
                            let msg = WsMessage::new(
                                uuid::Uuid::new_v4().to_string(),
                                WsMessageType::Event,
                                serde_json::to_value(&dex_event).unwrap_or_default(),
                            );
                            let Some(json) = msg.to_json() else { continue };
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON
/// response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    dex_service: &DexService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON").to_json();
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command").to_json();
    };

    let reply = match command {
        WsCommand::Subscribe { topics } => {
            let (topics, wildcard, unknown) = parse_topics(&topics);
            subs.subscribe(&topics, wildcard);
            respond(
                msg.id,
                serde_json::json!({
                    "subscribed": subs.topics(),
                    "wildcard": subs.is_subscribed_all(),
                    "unknown": unknown,
                }),
            )
        }
        WsCommand::Unsubscribe { topics } => {
            let (topics, wildcard, unknown) = parse_topics(&topics);
            subs.unsubscribe(&topics, wildcard);
            respond(
                msg.id,
                serde_json::json!({
                    "remaining": subs.topics(),
                    "wildcard": subs.is_subscribed_all(),
                    "unknown": unknown,
                }),
            )
        }
        WsCommand::GetPair => {
            let pair = dex_service.get_pair().await.map(PairDetail::from);
            respond(msg.id, serde_json::json!({ "pair": pair }))
        }
        WsCommand::Quote { amount_in, path } => {
            let body = QuoteBody { amount_in, path };
            let quoted = match body.parse() {
                Ok((amount_in, path)) => dex_service
                    .quote_swap(amount_in, path)
                    .await
                    .map(|amounts| QuoteResponse::new(amount_in, &amounts)),
                Err(err) => Err(err),
            };
            match quoted {
                Ok(quote) => respond(msg.id, serde_json::to_value(quote).unwrap_or_default()),
                Err(err) => WsMessage::error(msg.id, err.error_code(), err.to_string()),
            }
        }
    };
    reply.to_json()
}

fn respond(id: String, payload: serde_json::Value) -> WsMessage {
    WsMessage::new(id, WsMessageType::Response, payload)
}

//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::api::dto::GiveawayDetailResponse;
use crate::domain::{GiveawayEvent, GiveawayId};
use crate::service::GiveawayService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<GiveawayEvent>,
    giveaways: Arc<GiveawayService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &giveaways).await;
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
                    Ok(giveaway_event) => {
                        if subs.matches(giveaway_event.giveaway_id()) {
                            let msg = WsMessage::new(
                                uuid::Uuid::new_v4().to_string(),
                                WsMessageType::Event,
                                serde_json::to_value(&giveaway_event).unwrap_or_default(),
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

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    giveaways: &GiveawayService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON").to_json();
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command").to_json();
    };

    let payload = match command {
        WsCommand::Subscribe { giveaway_ids } => {
            let wildcard = giveaway_ids.iter().any(|s| s == "*");
            let ids = parse_ids(&giveaway_ids);
            subs.subscribe(&ids, wildcard);
            serde_json::json!({
                "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::Unsubscribe { giveaway_ids } => {
            let ids = parse_ids(&giveaway_ids);
            subs.unsubscribe(&ids);
            serde_json::json!({
                "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "remaining_count": subs.count(),
            })
        }
        WsCommand::GetGiveaway { giveaway_id } => {
            let Ok(id) = giveaway_id.parse::<GiveawayId>() else {
                return WsMessage::error(msg.id, 400, "invalid giveaway id").to_json();
            };
            match giveaways.get_details(id).await {
                Ok(details) => {
                    serde_json::to_value(GiveawayDetailResponse::from(&details)).unwrap_or_default()
                }
                Err(e) => return WsMessage::error(msg.id, e.error_code(), &e.to_string()).to_json(),
            }
        }
    };

    WsMessage::new(msg.id, WsMessageType::Response, payload).to_json()
}

fn parse_ids(raw: &[String]) -> Vec<GiveawayId> {
    raw.iter()
        .filter_map(|s| s.parse::<GiveawayId>().ok())
        .collect()
}

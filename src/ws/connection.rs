//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single authenticated connection:
//! dispatches incoming commands, forwards visible domain events and pushes
//! feed snapshots while the `feed` topic is active.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::app_state::AppState;
use crate::domain::{FeedEntry, Identity};
use crate::service::FeedSubscription;

/// Runs the read/write loop for a single WebSocket connection.
pub async fn run_connection(socket: WebSocket, state: AppState, caller: Identity) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut event_rx = state.event_bus.subscribe();
    let mut subs = SubscriptionManager::new();
    let mut feed: Option<FeedSubscription> = None;
    tracing::debug!(user_id = %caller.user_id, "ws connection opened");

    loop {
        let outgoing = tokio::select! {
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let reply = handle_text_message(&text, &mut subs);
                    sync_feed(&state, &caller, &subs, &mut feed).await;
                    let mut out = vec![reply];
                    if let Some(initial) = feed.as_ref().filter(|_| is_new_feed(&out)) {
                        out.push(feed_message(&initial.current()));
                    }
                    out
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => continue,
            },
            event = event_rx.recv() => match event {
                Ok(event) if subs.matches(&event, &caller) => {
                    vec![WsMessage::event(serde_json::json!({
                        "topic": "events",
                        "event": event,
                    }))]
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, user_id = %caller.user_id, "ws client lagged behind event bus");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            snapshot = next_feed(&mut feed) => match snapshot {
                Some(entries) => vec![feed_message(&entries)],
                None => {
                    feed = None;
                    continue;
                }
            },
        };

        for msg in outgoing {
            let Some(json) = msg.to_json() else {
                continue;
            };
            if ws_tx.send(Message::text(json)).await.is_err() {
                tracing::debug!(user_id = %caller.user_id, "ws connection closed");
                return;
            }
        }
    }

    tracing::debug!(user_id = %caller.user_id, "ws connection closed");
}

/// Waits for the next feed snapshot, or forever without a subscription.
async fn next_feed(feed: &mut Option<FeedSubscription>) -> Option<Arc<[FeedEntry]>> {
    match feed {
        Some(sub) => sub.changed().await,
        None => std::future::pending().await,
    }
}

/// Starts or stops the feed subscription to match the topic set.
async fn sync_feed(
    state: &AppState,
    caller: &Identity,
    subs: &SubscriptionManager,
    feed: &mut Option<FeedSubscription>,
) {
    match (subs.wants_feed(), feed.is_some()) {
        (true, false) => *feed = Some(state.feed.subscribe(caller.user_id.clone()).await),
        (false, true) => {
            if let Some(sub) = feed.take() {
                sub.unsubscribe();
            }
        }
        _ => {}
    }
}

fn is_new_feed(replies: &[WsMessage]) -> bool {
    replies.iter().any(|m| {
        m.msg_type == WsMessageType::Response
            && m.payload
                .get("subscribed")
                .and_then(|v| v.as_array())
                .is_some_and(|topics| topics.iter().any(|t| t == "feed"))
    })
}

fn feed_message(entries: &[FeedEntry]) -> WsMessage {
    WsMessage::event(serde_json::json!({
        "topic": "feed",
        "entries": entries,
    }))
}

/// Handles a text frame from the client and returns the reply.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command message");
    }
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { topics } => {
            let added: Vec<_> = topics
                .iter()
                .copied()
                .filter(|t| !subs.topics().contains(t))
                .collect();
            subs.subscribe(&topics);
            WsMessage::response(
                msg.id,
                serde_json::json!({ "subscribed": added, "topics": subs.topics() }),
            )
        }
        WsCommand::Unsubscribe { topics } => {
            subs.unsubscribe(&topics);
            WsMessage::response(
                msg.id,
                serde_json::json!({ "unsubscribed": topics, "topics": subs.topics() }),
            )
        }
        WsCommand::Ping => WsMessage::response(msg.id, serde_json::json!({ "pong": true })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::messages::Topic;

    fn command(payload: serde_json::Value) -> String {
        serde_json::json!({
            "id": "req-7",
            "type": "command",
            "timestamp": "2026-01-01T00:00:00Z",
            "payload": payload,
        })
        .to_string()
    }

    #[test]
    fn subscribe_reports_new_topics_only() {
        let mut subs = SubscriptionManager::new();
        let first = handle_text_message(
            &command(serde_json::json!({"command": "subscribe", "topics": ["feed"]})),
            &mut subs,
        );
        assert_eq!(first.id, "req-7");
        assert!(is_new_feed(&[first]));

        let again = handle_text_message(
            &command(serde_json::json!({"command": "subscribe", "topics": ["feed", "events"]})),
            &mut subs,
        );
        assert!(!is_new_feed(&[again]));
        assert_eq!(subs.topics(), vec![Topic::Feed, Topic::Events]);
    }

    #[test]
    fn unsubscribe_drops_topic() {
        let mut subs = SubscriptionManager::new();
        subs.subscribe(&[Topic::Feed]);
        let reply = handle_text_message(
            &command(serde_json::json!({"command": "unsubscribe", "topics": ["feed"]})),
            &mut subs,
        );
        assert_eq!(reply.msg_type, WsMessageType::Response);
        assert!(!subs.wants_feed());
    }

    #[test]
    fn malformed_and_unknown_input_yield_errors() {
        let mut subs = SubscriptionManager::new();
        let bad = handle_text_message("{not json", &mut subs);
        assert_eq!(bad.msg_type, WsMessageType::Error);

        let unknown = handle_text_message(
            &command(serde_json::json!({"command": "teleport"})),
            &mut subs,
        );
        assert_eq!(unknown.msg_type, WsMessageType::Error);
        assert_eq!(unknown.payload["code"], 404);
    }

    #[test]
    fn ping_gets_pong() {
        let mut subs = SubscriptionManager::new();
        let reply = handle_text_message(&command(serde_json::json!({"command": "ping"})), &mut subs);
        assert_eq!(reply.payload["pong"], true);
    }
}

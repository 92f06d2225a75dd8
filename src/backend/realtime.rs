use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use uuid::Uuid;

use crate::common::ChatMessage;

use super::error::BackendError;

/// The channel topic scoping the subscription to the message table.
const MESSAGES_TOPIC: &str = "realtime:public:messages";

/// Phoenix expects a heartbeat or it drops the socket.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// One frame of the channel protocol, client to server.
#[derive(Debug, Serialize)]
struct OutboundFrame<'a> {
    topic: &'a str,
    event: &'a str,
    payload: Value,
    #[serde(rename = "ref")]
    frame_ref: String,
}

/// One frame of the channel protocol, server to client.
#[derive(Debug, Deserialize)]
struct InboundFrame {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(rename = "ref", default)]
    frame_ref: Option<String>,
}

fn new_ref() -> String {
    Uuid::new_v4().to_string()
}

/// Derive the websocket endpoint from the backend base URL.
fn websocket_url(base_url: &str, anon_key: &str) -> Result<String, BackendError> {
    let base = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(BackendError::InvalidUrl(base_url.to_string()));
    };

    Ok(format!(
        "{ws_base}/realtime/v1/websocket?apikey={anon_key}&vsn=1.0.0"
    ))
}

fn join_frame(access_token: &str, frame_ref: String) -> OutboundFrame<'static> {
    OutboundFrame {
        topic: MESSAGES_TOPIC,
        event: "phx_join",
        payload: json!({
            "config": {
                "postgres_changes": [
                    { "event": "INSERT", "schema": "public", "table": "messages" }
                ]
            },
            "access_token": access_token,
        }),
        frame_ref,
    }
}

fn decode_frame(text: &str) -> Result<InboundFrame, BackendError> {
    Ok(serde_json::from_str(text)?)
}

/// Extract the inserted row from a change-feed frame, if that is what
/// the frame carries.
fn insert_from_frame(frame: &InboundFrame) -> Option<ChatMessage> {
    if frame.topic != MESSAGES_TOPIC || frame.event != "postgres_changes" {
        return None;
    }
    let data = frame.payload.get("data")?;
    if data.get("type").and_then(Value::as_str) != Some("INSERT") {
        return None;
    }
    let record = data.get("record")?.clone();
    match serde_json::from_value::<ChatMessage>(record) {
        Ok(message) => Some(message),
        Err(err) => {
            log::warn!("Dropping undecodable change record: {err}");
            None
        }
    }
}

fn reply_is_ok(frame: &InboundFrame) -> bool {
    frame.payload.get("status").and_then(Value::as_str) == Some("ok")
}

/// A standing subscription to message inserts. Opened after sign-in,
/// closed on sign-out; there is no reconnection.
pub struct RealtimeSubscription {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl RealtimeSubscription {
    /// Connect, join the message channel, and wait for the server to
    /// acknowledge the subscription.
    pub async fn connect(
        base_url: &str,
        anon_key: &str,
        access_token: &str,
    ) -> Result<Self, BackendError> {
        let url = websocket_url(base_url, anon_key)?;
        let (stream, _) = connect_async(url.as_str()).await?;
        let mut subscription = Self { stream };

        let join_ref = new_ref();
        subscription
            .send_frame(&join_frame(access_token, join_ref.clone()))
            .await?;
        subscription.wait_for_join_ack(&join_ref).await?;

        log::info!("Realtime subscription established on {MESSAGES_TOPIC}");
        Ok(subscription)
    }

    async fn send_frame(&mut self, frame: &OutboundFrame<'_>) -> Result<(), BackendError> {
        let json = serde_json::to_string(frame)?;
        self.stream.send(Message::text(json)).await?;
        Ok(())
    }

    async fn wait_for_join_ack(&mut self, join_ref: &str) -> Result<(), BackendError> {
        let ack = async {
            while let Some(message) = self.stream.next().await {
                let Message::Text(text) = message? else {
                    continue;
                };
                let frame = decode_frame(text.as_str())?;
                if frame.event == "phx_reply" && frame.frame_ref.as_deref() == Some(join_ref) {
                    if reply_is_ok(&frame) {
                        return Ok(());
                    }
                    return Err(BackendError::Api {
                        status: 0,
                        message: format!("channel join rejected: {}", frame.payload),
                    });
                }
            }
            Err(BackendError::Api {
                status: 0,
                message: "websocket closed during channel join".to_string(),
            })
        };

        tokio::time::timeout(JOIN_TIMEOUT, ack)
            .await
            .map_err(|_| BackendError::Timeout)?
    }

    /// Next pushed insert, or `None` once the subscription is gone.
    /// Replies, heartbeat acks, and unknown events are skipped.
    pub async fn next_insert(&mut self) -> Option<ChatMessage> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => match decode_frame(text.as_str()) {
                    Ok(frame) => {
                        if let Some(message) = insert_from_frame(&frame) {
                            return Some(message);
                        }
                    }
                    Err(err) => log::warn!("Undecodable realtime frame: {err}"),
                },
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(err) => {
                    log::warn!("Realtime stream error: {err}");
                    return None;
                }
            }
        }
    }

    pub async fn send_heartbeat(&mut self) -> Result<(), BackendError> {
        let frame = OutboundFrame {
            topic: "phoenix",
            event: "heartbeat",
            payload: json!({}),
            frame_ref: new_ref(),
        };
        self.send_frame(&frame).await
    }

    /// Tear the subscription down. Errors are irrelevant at this
    /// point; the socket is going away either way.
    pub async fn shutdown(mut self) {
        let frame = OutboundFrame {
            topic: MESSAGES_TOPIC,
            event: "phx_leave",
            payload: json!({}),
            frame_ref: new_ref(),
        };
        let _ = self.send_frame(&frame).await;
        let _ = self.stream.close(None).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_url_maps_schemes() {
        assert_eq!(
            websocket_url("https://chat.example.co/", "key").unwrap(),
            "wss://chat.example.co/realtime/v1/websocket?apikey=key&vsn=1.0.0"
        );
        assert_eq!(
            websocket_url("http://127.0.0.1:54321", "key").unwrap(),
            "ws://127.0.0.1:54321/realtime/v1/websocket?apikey=key&vsn=1.0.0"
        );
        assert!(matches!(
            websocket_url("ftp://chat.example.co", "key"),
            Err(BackendError::InvalidUrl(_))
        ));
    }

    #[test]
    fn join_frame_subscribes_to_message_inserts() {
        let frame = join_frame("token-abc", "ref-1".to_string());
        let json = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["topic"], "realtime:public:messages");
        assert_eq!(json["event"], "phx_join");
        assert_eq!(json["ref"], "ref-1");
        assert_eq!(json["payload"]["access_token"], "token-abc");
        assert_eq!(
            json["payload"]["config"]["postgres_changes"][0],
            serde_json::json!({ "event": "INSERT", "schema": "public", "table": "messages" })
        );
    }

    #[test]
    fn insert_frame_yields_the_record() {
        let frame = decode_frame(
            r#"{
                "topic": "realtime:public:messages",
                "event": "postgres_changes",
                "payload": {
                    "data": {
                        "type": "INSERT",
                        "schema": "public",
                        "table": "messages",
                        "commit_timestamp": "2026-08-01T09:30:01Z",
                        "record": {
                            "id": "m3",
                            "content": "sup",
                            "username": "alice",
                            "user_id": "user-1",
                            "created_at": "2026-08-01T09:30:01+00:00"
                        }
                    },
                    "ids": [1]
                },
                "ref": null
            }"#,
        )
        .unwrap();

        let message = insert_from_frame(&frame).unwrap();
        assert_eq!(message.id, "m3");
        assert_eq!(message.content, "sup");
    }

    #[test]
    fn non_insert_frames_yield_nothing() {
        let reply = decode_frame(
            r#"{"topic": "phoenix", "event": "phx_reply", "payload": {"status": "ok", "response": {}}, "ref": "1"}"#,
        )
        .unwrap();
        assert!(insert_from_frame(&reply).is_none());
        assert!(reply_is_ok(&reply));

        let update = decode_frame(
            r#"{
                "topic": "realtime:public:messages",
                "event": "postgres_changes",
                "payload": { "data": { "type": "UPDATE", "record": {} } },
                "ref": null
            }"#,
        )
        .unwrap();
        assert!(insert_from_frame(&update).is_none());
    }
}

//! Phoenix-channel realtime feed for message changes of one conversation.

use std::{sync::mpsc::Sender, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::{runtime::Runtime, sync::watch};
use tokio_tungstenite::{connect_async, tungstenite::Message as Frame};

use crate::{
    backend::rest::{Endpoint, RestBackend},
    domain::events::{ChangeKind, ChangeNotification},
    usecases::contracts::{BackendError, ChangeFeed, Subscription},
};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const PROTOCOL_VERSION: &str = "1.0.0";

const REALTIME_CHANNEL_STARTED: &str = "REALTIME_CHANNEL_STARTED";
const REALTIME_CHANNEL_STOPPED: &str = "REALTIME_CHANNEL_STOPPED";
const REALTIME_CONNECT_FAILED: &str = "REALTIME_CONNECT_FAILED";
const REALTIME_SEND_FAILED: &str = "REALTIME_SEND_FAILED";
const REALTIME_READ_FAILED: &str = "REALTIME_READ_FAILED";
const REALTIME_SIGNAL_SEND_FAILED: &str = "REALTIME_SIGNAL_SEND_FAILED";

#[derive(Debug)]
pub struct RealtimeSubscription {
    conversation_id: String,
    stop_tx: Option<watch::Sender<bool>>,
}

impl RealtimeSubscription {
    pub fn start(
        runtime: &Runtime,
        endpoint: &Endpoint,
        conversation_id: &str,
        sink: Sender<ChangeNotification>,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let channel = Channel {
            url: websocket_url(&endpoint.base_url, &endpoint.anon_key),
            access_token: endpoint.access_token.clone(),
            conversation_id: conversation_id.to_owned(),
        };
        runtime.spawn(run_channel(channel, sink, stop_rx));

        tracing::info!(
            code = REALTIME_CHANNEL_STARTED,
            conversation_id,
            "realtime channel started"
        );

        Self {
            conversation_id: conversation_id.to_owned(),
            stop_tx: Some(stop_tx),
        }
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
            tracing::debug!(
                conversation_id = %self.conversation_id,
                "realtime channel stop signal sent"
            );
        }
    }
}

impl Subscription for RealtimeSubscription {
    fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    fn unsubscribe(&mut self) {
        self.stop();
    }
}

impl Drop for RealtimeSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

impl ChangeFeed for RestBackend {
    fn subscribe(
        &self,
        conversation_id: &str,
        sink: Sender<ChangeNotification>,
    ) -> Result<Box<dyn Subscription>, BackendError> {
        Ok(Box::new(RealtimeSubscription::start(
            &self.runtime,
            &self.endpoint,
            conversation_id,
            sink,
        )))
    }
}

struct Channel {
    url: String,
    access_token: Option<String>,
    conversation_id: String,
}

async fn run_channel(
    channel: Channel,
    sink: Sender<ChangeNotification>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let conversation_id = channel.conversation_id.as_str();
    let topic = channel_topic(conversation_id);

    let (stream, _) = match connect_async(channel.url.as_str()).await {
        Ok(connected) => connected,
        Err(error) => {
            tracing::warn!(
                code = REALTIME_CONNECT_FAILED,
                conversation_id,
                error = %error,
                "realtime connect failed; thread refreshes only on demand"
            );
            return;
        }
    };
    let (mut write, mut read) = stream.split();

    let mut next_ref: u64 = 1;
    let join = join_frame(conversation_id, channel.access_token.as_deref(), next_ref);
    if let Err(error) = write.send(Frame::Text(join.to_string().into())).await {
        tracing::warn!(code = REALTIME_SEND_FAILED, conversation_id, error = %error, "channel join failed");
        return;
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;

    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    next_ref += 1;
                    let leave = leave_frame(conversation_id, next_ref);
                    let _ = write.send(Frame::Text(leave.to_string().into())).await;
                    let _ = write.close().await;
                    tracing::info!(
                        code = REALTIME_CHANNEL_STOPPED,
                        conversation_id,
                        "realtime channel stopped"
                    );
                    return;
                }
            }
            _ = heartbeat.tick() => {
                next_ref += 1;
                let frame = heartbeat_frame(next_ref);
                if let Err(error) = write.send(Frame::Text(frame.to_string().into())).await {
                    tracing::warn!(
                        code = REALTIME_SEND_FAILED,
                        conversation_id,
                        error = %error,
                        "heartbeat send failed; closing channel"
                    );
                    return;
                }
            }
            incoming = read.next() => {
                match incoming {
                    Some(Ok(Frame::Text(text))) => {
                        let Some(kind) = parse_frame(&text, &topic) else {
                            continue;
                        };
                        tracing::debug!(conversation_id, kind = kind.as_str(), "message change observed");

                        let notification = ChangeNotification {
                            conversation_id: conversation_id.to_owned(),
                            kind,
                        };
                        if let Err(error) = sink.send(notification) {
                            tracing::warn!(
                                code = REALTIME_SIGNAL_SEND_FAILED,
                                conversation_id,
                                error = %error,
                                "change notification receiver is gone"
                            );
                            return;
                        }
                    }
                    Some(Ok(Frame::Close(_))) | None => {
                        tracing::info!(
                            code = REALTIME_CHANNEL_STOPPED,
                            conversation_id,
                            "realtime socket closed by server"
                        );
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        tracing::warn!(
                            code = REALTIME_READ_FAILED,
                            conversation_id,
                            error = %error,
                            "realtime read failed; closing channel"
                        );
                        return;
                    }
                }
            }
        }
    }
}

pub fn channel_topic(conversation_id: &str) -> String {
    format!("realtime:messages:{conversation_id}")
}

/// `http(s)://host` becomes `ws(s)://host/realtime/v1/websocket?...`.
pub fn websocket_url(base_url: &str, anon_key: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let socket_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_owned()
    };
    format!("{socket_base}/realtime/v1/websocket?apikey={anon_key}&vsn={PROTOCOL_VERSION}")
}

pub fn join_frame(conversation_id: &str, access_token: Option<&str>, reference: u64) -> Value {
    let mut payload = json!({
        "config": {
            "broadcast": { "ack": false, "self": false },
            "presence": { "key": "" },
            "postgres_changes": [{
                "event": "*",
                "schema": "public",
                "table": "messages",
                "filter": format!("conversation_id=eq.{conversation_id}"),
            }],
            "private": false,
        }
    });
    if let Some(token) = access_token {
        payload["access_token"] = Value::String(token.to_owned());
    }

    json!({
        "topic": channel_topic(conversation_id),
        "event": "phx_join",
        "payload": payload,
        "ref": reference.to_string(),
        "join_ref": reference.to_string(),
    })
}

fn leave_frame(conversation_id: &str, reference: u64) -> Value {
    json!({
        "topic": channel_topic(conversation_id),
        "event": "phx_leave",
        "payload": {},
        "ref": reference.to_string(),
    })
}

pub fn heartbeat_frame(reference: u64) -> Value {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": reference.to_string(),
    })
}

/// Change kind carried by a `postgres_changes` frame for `topic`; replies,
/// presence and other topics yield `None`.
pub fn parse_frame(text: &str, topic: &str) -> Option<ChangeKind> {
    let frame: Value = serde_json::from_str(text).ok()?;
    if frame.get("topic")?.as_str()? != topic {
        return None;
    }
    if frame.get("event")?.as_str()? != "postgres_changes" {
        return None;
    }
    let kind = frame.pointer("/payload/data/type")?.as_str()?;
    ChangeKind::parse(kind)
}

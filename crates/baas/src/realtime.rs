//! Realtime table change notifications.
//!
//! Changes reach the application in two ways: the REST backend's websocket
//! listener ([`listen`]) decodes `postgres_changes` messages pushed by the
//! BaaS, and [`MemoryBaas`](crate::MemoryBaas) publishes one event per write.
//! Both feed a [`RealtimeHub`], which fans events out to [`Subscription`]s
//! keyed by table and event type.

use std::time::Duration;

use angohost_core::Table;
use futures::{SinkExt, Stream, StreamExt};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::BaasConfig;
use crate::error::BaasError;

/// Phoenix heartbeat interval expected by the realtime server.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Pause before the listener reconnects after the socket drops.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Buffered events per hub before slow subscribers start lagging.
const HUB_CAPACITY: usize = 256;

/// The kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    /// Wire spelling (`INSERT`, `UPDATE`, `DELETE`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Which change kinds a subscription wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// `*`
    #[default]
    All,
    Only(ChangeKind),
}

impl EventFilter {
    /// Wire spelling: `*` or a change kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "*",
            Self::Only(kind) => kind.as_str(),
        }
    }

    #[must_use]
    pub fn accepts(self, kind: ChangeKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == kind,
        }
    }
}

/// One row change on one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub record: Option<Value>,
    pub old_record: Option<Value>,
}

impl ChangeEvent {
    #[must_use]
    pub const fn new(table: Table, kind: ChangeKind, record: Option<Value>) -> Self {
        Self {
            table,
            kind,
            record,
            old_record: None,
        }
    }
}

/// Fan-out point for change events.
#[derive(Debug, Clone)]
pub struct RealtimeHub {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(HUB_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        // send only fails when nobody is listening
        let _ = self.sender.send(event);
    }

    /// Subscribe to changes on `table`.
    #[must_use]
    pub fn subscribe(&self, table: Table, filter: EventFilter) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            tables: vec![table],
            filter,
        }
    }

    /// Subscribe to every kind of change on several tables at once.
    #[must_use]
    pub fn subscribe_many(&self, tables: &[Table]) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            tables: tables.to_vec(),
            filter: EventFilter::All,
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    tables: Vec<Table>,
    filter: EventFilter,
}

impl Subscription {
    /// Next matching event, or `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.wants(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Realtime subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn wants(&self, event: &ChangeEvent) -> bool {
        self.tables.contains(&event.table) && self.filter.accepts(event.kind)
    }

    /// Turn the subscription into a stream of events.
    pub fn into_stream(mut self) -> impl Stream<Item = ChangeEvent> + Send + 'static {
        async_stream::stream! {
            while let Some(event) = self.recv().await {
                yield event;
            }
        }
    }
}

// =============================================================================
// Websocket listener
// =============================================================================

#[derive(Debug, Deserialize)]
struct PhoenixMessage {
    event: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Deserialize)]
struct ChangePayload {
    table: String,
    #[serde(rename = "type", alias = "eventType")]
    kind: String,
    #[serde(default)]
    record: Option<Value>,
    #[serde(default)]
    old_record: Option<Value>,
}

/// Decode one text frame from the realtime socket.
///
/// Returns `None` for replies, heartbeats, system messages and changes on
/// tables the application does not know.
#[must_use]
pub fn decode_message(text: &str) -> Option<ChangeEvent> {
    let message: PhoenixMessage = serde_json::from_str(text).ok()?;
    if message.event != "postgres_changes" {
        return None;
    }
    let data = message.payload.get("data")?.clone();
    let change: ChangePayload = serde_json::from_value(data).ok()?;
    Some(ChangeEvent {
        table: Table::from_name(&change.table)?,
        kind: ChangeKind::parse(&change.kind)?,
        record: change.record.filter(|r| !r.is_null()),
        old_record: change.old_record.filter(|r| !r.is_null()),
    })
}

/// `phx_join` frame subscribing to every change on `table`.
#[must_use]
pub fn join_message(table: Table, reference: u64) -> Value {
    json!({
        "topic": format!("realtime:public:{table}"),
        "event": "phx_join",
        "payload": {
            "config": {
                "postgres_changes": [
                    { "event": EventFilter::All.as_str(), "schema": "public", "table": table.name() }
                ]
            }
        },
        "ref": reference.to_string(),
    })
}

fn heartbeat_message(reference: u64) -> Value {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": reference.to_string(),
    })
}

/// Websocket URL of the realtime endpoint.
///
/// # Errors
///
/// Returns [`BaasError::Url`] if the configured base URL is malformed.
pub fn socket_url(config: &BaasConfig) -> Result<url::Url, BaasError> {
    let mut url = url::Url::parse(&config.base_url())?.join("realtime/v1/websocket")?;
    let scheme = if url.scheme() == "http" { "ws" } else { "wss" };
    url.set_scheme(scheme)
        .map_err(|()| BaasError::Realtime(format!("cannot use {scheme} for {url}")))?;
    url.query_pairs_mut()
        .append_pair("apikey", config.service_key.expose_secret())
        .append_pair("vsn", "1.0.0");
    Ok(url)
}

/// Listen for changes on `tables` and publish them to `hub`.
///
/// Never returns; a dropped socket is reopened after a short pause. Spawn
/// it as a background task.
pub async fn listen(config: BaasConfig, tables: Vec<Table>, hub: RealtimeHub) {
    loop {
        match listen_once(&config, &tables, &hub).await {
            Ok(()) => info!("Realtime socket closed"),
            Err(e) => warn!(error = %e, "Realtime socket failed"),
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn listen_once(
    config: &BaasConfig,
    tables: &[Table],
    hub: &RealtimeHub,
) -> Result<(), BaasError> {
    let url = socket_url(config)?;
    let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| BaasError::Realtime(e.to_string()))?;
    let (mut sink, mut stream) = socket.split();

    let mut reference = 0_u64;
    for table in tables {
        reference += 1;
        sink.send(Message::text(join_message(*table, reference).to_string()))
            .await
            .map_err(|e| BaasError::Realtime(e.to_string()))?;
    }
    info!(tables = tables.len(), "Realtime channels joined");

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                reference += 1;
                sink.send(Message::text(heartbeat_message(reference).to_string()))
                    .await
                    .map_err(|e| BaasError::Realtime(e.to_string()))?;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Some(event) = decode_message(text.as_str()) {
                        debug!(table = %event.table, kind = event.kind.as_str(), "Change received");
                        hub.publish(event);
                    }
                }
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(BaasError::Realtime(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_postgres_change() {
        let text = r#"{
            "topic": "realtime:public:orders",
            "event": "postgres_changes",
            "payload": {
                "data": {
                    "table": "orders",
                    "type": "UPDATE",
                    "record": {"id": "1", "status": "completed"},
                    "old_record": {"id": "1"}
                },
                "ids": [1]
            },
            "ref": null
        }"#;
        let event = decode_message(text).unwrap();
        assert_eq!(event.table, Table::Orders);
        assert_eq!(event.kind, ChangeKind::Update);
        assert_eq!(event.record.unwrap()["status"], "completed");
    }

    #[test]
    fn test_decode_ignores_replies_and_unknown_tables() {
        assert!(decode_message(r#"{"event":"phx_reply","payload":{"status":"ok"}}"#).is_none());
        assert!(
            decode_message(
                r#"{"event":"postgres_changes","payload":{"data":{"table":"audit","type":"INSERT"}}}"#
            )
            .is_none()
        );
        assert!(decode_message("not json").is_none());
    }

    #[test]
    fn test_join_message_shape() {
        let join = join_message(Table::PaymentMethods, 3);
        assert_eq!(join["topic"], "realtime:public:payment_methods");
        assert_eq!(join["event"], "phx_join");
        assert_eq!(
            join["payload"]["config"]["postgres_changes"][0]["table"],
            "payment_methods"
        );
        assert_eq!(join["ref"], "3");
    }

    #[test]
    fn test_socket_url() {
        let config = BaasConfig::new(
            "https://proj.example.co",
            secrecy::SecretString::from("key".to_string()),
        );
        let url = socket_url(&config).unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/realtime/v1/websocket");
        assert!(url.query().unwrap().contains("apikey=key"));
    }

    #[tokio::test]
    async fn test_subscription_filters_table_and_kind() {
        let hub = RealtimeHub::new();
        let mut inserts = hub.subscribe(Table::Orders, EventFilter::Only(ChangeKind::Insert));

        hub.publish(ChangeEvent::new(Table::Invoices, ChangeKind::Insert, None));
        hub.publish(ChangeEvent::new(Table::Orders, ChangeKind::Delete, None));
        hub.publish(ChangeEvent::new(Table::Orders, ChangeKind::Insert, None));

        let event = inserts.recv().await.unwrap();
        assert_eq!(event.table, Table::Orders);
        assert_eq!(event.kind, ChangeKind::Insert);
    }

    #[tokio::test]
    async fn test_subscription_ends_when_hub_dropped() {
        let hub = RealtimeHub::new();
        let mut sub = hub.subscribe(Table::Tickets, EventFilter::All);
        drop(hub);
        assert!(sub.recv().await.is_none());
    }
}

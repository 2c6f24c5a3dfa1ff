// ============================================================================
// MERIDIAN - EVENT SUBSCRIBER
// ============================================================================
// Module: shared/src/events/subscriber.rs
// Description: Consumer-group stream consumption with manual acknowledgement
// ============================================================================

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::publisher::decode_payload;
use super::{DomainEvent, EventType};
use crate::error::{Error, Result};

/// Event handler port. Handlers must be idempotent: the bus is
/// at-least-once and redelivers unacknowledged entries.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle a received event.
    async fn handle(&self, event: &DomainEvent) -> Result<()>;

    /// Event types this handler wants. Empty means all.
    fn event_types(&self) -> Vec<EventType>;

    /// Handler name for logging
    fn name(&self) -> String;
}

/// Subscription configuration
#[derive(Debug, Clone)]
pub struct SubscriptionConfig {
    pub group: String,
    pub consumer: String,
    pub streams: Vec<String>,
    pub batch_size: usize,
    pub block: Duration,
    /// How many recently-processed event ids to remember for deduplication.
    pub dedupe_capacity: usize,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            group: "meridian".to_string(),
            consumer: format!("consumer-{}", Uuid::new_v4()),
            streams: vec![],
            batch_size: 10,
            block: Duration::from_secs(1),
            dedupe_capacity: 10_000,
        }
    }
}

/// Bounded window of processed event ids.
struct DedupeWindow {
    seen: HashSet<Uuid>,
    order: VecDeque<Uuid>,
    capacity: usize,
}

impl DedupeWindow {
    fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Returns false if the id was already present.
    fn insert(&mut self, id: Uuid) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
        true
    }

    fn contains(&self, id: &Uuid) -> bool {
        self.seen.contains(id)
    }
}

/// Consumer-group subscriber over the event streams.
///
/// One consume loop runs per stream. Entries are acknowledged only after
/// every interested handler succeeded; failed entries stay pending and are
/// redelivered when the group rebalances.
pub struct EventSubscriber {
    redis: ConnectionManager,
    config: SubscriptionConfig,
    handlers: Vec<Arc<dyn EventHandler>>,
    dedupe: Arc<Mutex<DedupeWindow>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl EventSubscriber {
    pub async fn connect(redis_url: &str, config: SubscriptionConfig) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| Error::Configuration(format!("invalid Redis URL: {e}")))?;
        let redis = ConnectionManager::new(client).await.map_err(Error::Redis)?;

        let dedupe = Arc::new(Mutex::new(DedupeWindow::new(config.dedupe_capacity)));
        Ok(Self {
            redis,
            config,
            handlers: Vec::new(),
            dedupe,
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        info!(
            handler = %handler.name(),
            event_types = ?handler.event_types(),
            "registered event handler"
        );
        self.handlers.push(handler);
    }

    /// Start one consume loop per configured stream.
    pub async fn start(&self) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        for stream in &self.config.streams {
            ensure_group(self.redis.clone(), stream, &self.config.group).await?;

            let loop_ctx = ConsumeLoop {
                redis: self.redis.clone(),
                stream: stream.clone(),
                config: self.config.clone(),
                handlers: self.handlers.clone(),
                dedupe: Arc::clone(&self.dedupe),
                cancel: self.cancel.child_token(),
            };
            tasks.push(tokio::spawn(loop_ctx.run()));
        }
        info!(
            group = %self.config.group,
            streams = ?self.config.streams,
            "event subscriber started"
        );
        Ok(())
    }

    /// Stop all consume loops and join them.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("consume loop join failed: {e}");
            }
        }
        info!("event subscriber stopped");
    }
}

struct ConsumeLoop {
    redis: ConnectionManager,
    stream: String,
    config: SubscriptionConfig,
    handlers: Vec<Arc<dyn EventHandler>>,
    dedupe: Arc<Mutex<DedupeWindow>>,
    cancel: CancellationToken,
}

impl ConsumeLoop {
    async fn run(self) {
        let mut conn = self.redis.clone();
        loop {
            let reply = tokio::select! {
                _ = self.cancel.cancelled() => break,
                r = read_batch(&mut conn, &self.stream, &self.config) => r,
            };

            let entries = match reply {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(stream = %self.stream, "stream read failed: {e}");
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        _ = sleep(Duration::from_secs(1)) => continue,
                    }
                }
            };

            for entry in entries {
                self.process(&mut conn, entry).await;
            }
        }
        debug!(stream = %self.stream, "consume loop exited");
    }

    async fn process(&self, conn: &mut ConnectionManager, entry: StreamEntry) {
        let event = match decode_entry(&entry) {
            Ok(event) => event,
            Err(e) => {
                // A poison entry can never succeed; ack it out of the way.
                error!(stream = %self.stream, entry = %entry.id, "undecodable event: {e}");
                ack(conn, &self.stream, &self.config.group, &entry.id).await;
                return;
            }
        };

        {
            let dedupe = self.dedupe.lock().await;
            if dedupe.contains(&event.event_id) {
                debug!(event_id = %event.event_id, "duplicate delivery, acking");
                ack(conn, &self.stream, &self.config.group, &entry.id).await;
                return;
            }
        }

        let mut all_succeeded = true;
        for handler in &self.handlers {
            let wanted = handler.event_types();
            if !wanted.is_empty() && !wanted.contains(&event.event_type) {
                continue;
            }
            if let Err(e) = handler.handle(&event).await {
                all_succeeded = false;
                error!(
                    handler = %handler.name(),
                    event_id = %event.event_id,
                    event_type = %event.event_type,
                    "handler failed: {e}"
                );
            }
        }

        if all_succeeded {
            self.dedupe.lock().await.insert(event.event_id);
            ack(conn, &self.stream, &self.config.group, &entry.id).await;
        }
        // Not acked on failure: the entry stays pending and is redelivered.
    }
}

async fn ensure_group(mut conn: ConnectionManager, stream: &str, group: &str) -> Result<()> {
    let created: std::result::Result<(), redis::RedisError> = redis::cmd("XGROUP")
        .arg("CREATE")
        .arg(stream)
        .arg(group)
        .arg("0")
        .arg("MKSTREAM")
        .query_async(&mut conn)
        .await;

    match created {
        Ok(()) => Ok(()),
        // BUSYGROUP means the group already exists, which is fine.
        Err(e) if e.to_string().contains("BUSYGROUP") => Ok(()),
        Err(e) => Err(Error::Redis(e)),
    }
}

async fn ack(conn: &mut ConnectionManager, stream: &str, group: &str, entry_id: &str) {
    let result: std::result::Result<i64, redis::RedisError> = redis::cmd("XACK")
        .arg(stream)
        .arg(group)
        .arg(entry_id)
        .query_async(conn)
        .await;
    if let Err(e) = result {
        warn!(stream, entry_id, "ack failed: {e}");
    }
}

#[derive(Debug)]
struct StreamEntry {
    id: String,
    fields: HashMap<String, Vec<u8>>,
}

async fn read_batch(
    conn: &mut ConnectionManager,
    stream: &str,
    config: &SubscriptionConfig,
) -> Result<Vec<StreamEntry>> {
    let reply: Value = redis::cmd("XREADGROUP")
        .arg("GROUP")
        .arg(&config.group)
        .arg(&config.consumer)
        .arg("COUNT")
        .arg(config.batch_size)
        .arg("BLOCK")
        .arg(config.block.as_millis() as u64)
        .arg("STREAMS")
        .arg(stream)
        .arg(">")
        .query_async(conn)
        .await
        .map_err(Error::Redis)?;

    Ok(parse_stream_reply(reply))
}

/// Flattens the nested XREADGROUP reply into entries. A Nil reply is a
/// block timeout with nothing to read.
fn parse_stream_reply(value: Value) -> Vec<StreamEntry> {
    let mut entries = Vec::new();
    let Value::Bulk(streams) = value else {
        return entries;
    };

    for stream in streams {
        let Value::Bulk(pair) = stream else { continue };
        let Some(Value::Bulk(raw_entries)) = pair.into_iter().nth(1) else {
            continue;
        };

        for raw in raw_entries {
            let Value::Bulk(mut parts) = raw else { continue };
            if parts.len() != 2 {
                continue;
            }
            let Value::Bulk(kvs) = parts.remove(1) else {
                continue;
            };
            let Value::Data(id) = parts.remove(0) else {
                continue;
            };

            let mut fields = HashMap::new();
            let mut iter = kvs.into_iter();
            while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                if let (Value::Data(k), Value::Data(v)) = (k, v) {
                    fields.insert(String::from_utf8_lossy(&k).into_owned(), v);
                }
            }

            entries.push(StreamEntry {
                id: String::from_utf8_lossy(&id).into_owned(),
                fields,
            });
        }
    }
    entries
}

fn decode_entry(entry: &StreamEntry) -> Result<DomainEvent> {
    let payload = entry
        .fields
        .get("event")
        .ok_or_else(|| Error::Internal("stream entry missing event field".to_string()))?;
    let encoding = entry
        .fields
        .get("encoding")
        .map(|raw| String::from_utf8_lossy(raw).into_owned())
        .unwrap_or_else(|| "json".to_string());
    decode_payload(payload, &encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_window_evicts() {
        let mut window = DedupeWindow::new(2);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        assert!(window.insert(a));
        assert!(!window.insert(a));
        assert!(window.insert(b));
        assert!(window.insert(c));

        // a was evicted by capacity, so it reads as new again
        assert!(!window.contains(&a));
        assert!(window.contains(&b));
        assert!(window.contains(&c));
    }

    #[test]
    fn test_parse_stream_reply() {
        let reply = Value::Bulk(vec![Value::Bulk(vec![
            Value::Data(b"order-events".to_vec()),
            Value::Bulk(vec![Value::Bulk(vec![
                Value::Data(b"1-0".to_vec()),
                Value::Bulk(vec![
                    Value::Data(b"event".to_vec()),
                    Value::Data(b"{}".to_vec()),
                    Value::Data(b"encoding".to_vec()),
                    Value::Data(b"json".to_vec()),
                ]),
            ])]),
        ])]);

        let entries = parse_stream_reply(reply);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "1-0");
        assert_eq!(entries[0].fields["encoding"], b"json".to_vec());
    }

    #[test]
    fn test_parse_nil_reply() {
        assert!(parse_stream_reply(Value::Nil).is_empty());
    }
}

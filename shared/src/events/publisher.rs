// ============================================================================
// MERIDIAN - EVENT PUBLISHER
// ============================================================================
// Module: shared/src/events/publisher.rs
// Description: Redis Streams publishing with retry and payload compression
// ============================================================================

use async_trait::async_trait;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::Rng;
use redis::aio::ConnectionManager;
use std::io::{Read, Write};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use super::DomainEvent;
use crate::error::{Error, Result};

/// Payloads above this size are gzip-compressed before hitting the wire.
pub const COMPRESSION_THRESHOLD: usize = 4 * 1024;

const ENCODING_JSON: &str = "json";
const ENCODING_GZIP: &str = "gzip";

/// Port for publishing domain events to the bus.
///
/// Implementations must only report success once the event is durably
/// appended; transient transport errors are retried internally.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, stream: &str, event: &DomainEvent) -> Result<()>;
}

/// Redis Streams publisher. Events are appended with XADD; the returned
/// entry id is the append acknowledgement.
pub struct RedisEventPublisher {
    redis: ConnectionManager,
    service: String,
    environment: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl RedisEventPublisher {
    pub async fn connect(
        redis_url: &str,
        service: impl Into<String>,
        environment: impl Into<String>,
    ) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| Error::Configuration(format!("invalid Redis URL: {e}")))?;
        let redis = ConnectionManager::new(client).await.map_err(Error::Redis)?;

        Ok(Self {
            redis,
            service: service.into(),
            environment: environment.into(),
            max_retries: 3,
            retry_delay: Duration::from_millis(250),
        })
    }

    async fn append(&self, stream: &str, event: &DomainEvent) -> Result<String> {
        let mut event = event.clone();
        event.metadata.service = self.service.clone();
        event.metadata.environment = self.environment.clone();
        event.metadata.stream = Some(stream.to_string());

        let (payload, encoding) = encode_payload(&event)?;

        let mut conn = self.redis.clone();
        let entry_id: String = redis::cmd("XADD")
            .arg(stream)
            .arg("*")
            .arg("event")
            .arg(payload)
            .arg("encoding")
            .arg(encoding)
            .arg("event_type")
            .arg(event.event_type.as_str())
            .arg("event_id")
            .arg(event.event_id.to_string())
            .arg("aggregate_id")
            .arg(event.aggregate_id.to_string())
            .arg("actor_id")
            .arg(
                event
                    .actor_id
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            )
            .query_async(&mut conn)
            .await
            .map_err(Error::Redis)?;

        Ok(entry_id)
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, stream: &str, event: &DomainEvent) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.append(stream, event).await {
                Ok(entry_id) => {
                    debug!(
                        stream,
                        entry_id = %entry_id,
                        event_type = %event.event_type,
                        aggregate_id = %event.aggregate_id,
                        "event published"
                    );
                    return Ok(());
                }
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        stream,
                        attempt,
                        event_id = %event.event_id,
                        "event publish failed, retrying: {e}"
                    );
                    sleep(backoff_delay(self.retry_delay, attempt)).await;
                }
                Err(e) => {
                    return Err(Error::Unavailable(format!(
                        "event publish failed after {} retries: {e}",
                        self.max_retries
                    )));
                }
            }
        }
    }
}

/// Exponential backoff with a little jitter so retrying replicas spread out.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exp = base * 2_u32.pow(attempt.saturating_sub(1));
    let jitter = rand::thread_rng().gen_range(0..=exp.as_millis() as u64 / 4);
    exp + Duration::from_millis(jitter)
}

fn encode_payload(event: &DomainEvent) -> Result<(Vec<u8>, &'static str)> {
    let json = serde_json::to_vec(event).map_err(Error::Serialization)?;
    if json.len() <= COMPRESSION_THRESHOLD {
        return Ok((json, ENCODING_JSON));
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .and_then(|_| encoder.finish())
        .map(|compressed| (compressed, ENCODING_GZIP))
        .map_err(|e| Error::Internal(format!("event compression failed: {e}")))
}

/// Decodes a stream payload according to its `encoding` field.
pub(crate) fn decode_payload(payload: &[u8], encoding: &str) -> Result<DomainEvent> {
    let json = match encoding {
        ENCODING_GZIP => {
            let mut decoder = GzDecoder::new(payload);
            let mut buf = Vec::new();
            decoder
                .read_to_end(&mut buf)
                .map_err(|e| Error::Internal(format!("event decompression failed: {e}")))?;
            buf
        }
        _ => payload.to_vec(),
    };
    serde_json::from_slice(&json).map_err(Error::Serialization)
}

/// Publisher that records events in memory. Used by tests and by tooling
/// that runs an engine without a bus attached.
#[derive(Default)]
pub struct InMemoryEventPublisher {
    published: Mutex<Vec<(String, DomainEvent)>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn events(&self) -> Vec<(String, DomainEvent)> {
        self.published.lock().await.clone()
    }

    pub async fn events_of(&self, event_type: super::EventType) -> Vec<DomainEvent> {
        self.published
            .lock()
            .await
            .iter()
            .filter(|(_, e)| e.event_type == event_type)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, stream: &str, event: &DomainEvent) -> Result<()> {
        self.published
            .lock()
            .await
            .push((stream.to_string(), event.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventType;
    use uuid::Uuid;

    #[test]
    fn test_small_payload_stays_json() {
        let event = DomainEvent::builder(EventType::OrderCreated, Uuid::new_v4()).build();
        let (payload, encoding) = encode_payload(&event).unwrap();
        assert_eq!(encoding, ENCODING_JSON);

        let decoded = decode_payload(&payload, encoding).unwrap();
        assert_eq!(decoded.event_id, event.event_id);
    }

    #[test]
    fn test_large_payload_is_compressed() {
        let blob_len = COMPRESSION_THRESHOLD * 2;
        let event = DomainEvent::builder(EventType::OrderCreated, Uuid::new_v4())
            .data(serde_json::json!({ "blob": "x".repeat(blob_len) }))
            .unwrap()
            .build();

        let (payload, encoding) = encode_payload(&event).unwrap();
        assert_eq!(encoding, ENCODING_GZIP);
        assert!(payload.len() < blob_len);

        let decoded = decode_payload(&payload, encoding).unwrap();
        assert_eq!(decoded.data["blob"].as_str().unwrap().len(), blob_len);
    }

    #[tokio::test]
    async fn test_in_memory_publisher_records() {
        let publisher = InMemoryEventPublisher::new();
        let event = DomainEvent::builder(EventType::OrderPaid, Uuid::new_v4()).build();

        publisher.publish("order-events", &event).await.unwrap();

        let seen = publisher.events().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "order-events");
        assert_eq!(seen[0].1.event_id, event.event_id);
    }
}

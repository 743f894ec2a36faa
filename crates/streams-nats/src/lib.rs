//! NATS JetStream implementation of the Switchyard stream reader.
//!
//! Every read creates a short-lived durable consumer, pulls one bounded
//! batch under a wall-clock deadline and releases the consumer on the way
//! out. Deletion is deferred by a short grace period so late inflight acks
//! drain without error, and it is fire-and-forget: a failed delete is
//! logged, never surfaced.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::time::Duration;

use async_nats::jetstream;
use async_nats::jetstream::consumer::pull::Config as PullConfig;
use async_nats::jetstream::consumer::{AckPolicy, DeliverPolicy};
use async_nats::jetstream::context::GetStreamErrorKind;
use async_nats::jetstream::ErrorCode;
use chrono::DateTime;
use futures::StreamExt;
use switchyard_streams::{
    plan_window, Error, ReadOutcome, ReadRequest, RecentReader, Result, StoredRecord, StreamState,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Grace period between unsubscribe and consumer deletion, letting inflight
/// acks drain.
const CONSUMER_RELEASE_GRACE: Duration = Duration::from_millis(500);

/// Reads bounded windows of recent records from JetStream streams.
#[derive(Clone, Debug)]
pub struct NatsStreamReader {
    jetstream: jetstream::Context,
}

impl NatsStreamReader {
    /// Creates a reader over the given client's JetStream context.
    #[must_use]
    pub fn new(client: async_nats::Client) -> Self {
        Self {
            jetstream: jetstream::new(client),
        }
    }
}

/// Releases the session's consumer when dropped, on every exit path.
struct ConsumerRelease {
    jetstream: jetstream::Context,
    stream_name: String,
    durable_name: String,
}

impl Drop for ConsumerRelease {
    fn drop(&mut self) {
        let jetstream = self.jetstream.clone();
        let stream_name = std::mem::take(&mut self.stream_name);
        let durable_name = std::mem::take(&mut self.durable_name);
        tokio::spawn(async move {
            tokio::time::sleep(CONSUMER_RELEASE_GRACE).await;
            if let Err(err) = jetstream
                .delete_consumer_from_stream(&durable_name, &stream_name)
                .await
            {
                warn!(%stream_name, %durable_name, "failed to delete reader consumer: {err}");
            }
        });
    }
}

fn record_from_message(message: &jetstream::Message) -> Result<StoredRecord> {
    let info = message
        .info()
        .map_err(|err| Error::MalformedDelivery(err.to_string()))?;
    // The ack-reply carries the stored sequence and the raw nanosecond
    // publish timestamp; the transport parses both.
    let nanos = i64::try_from(info.published.unix_timestamp_nanos())
        .map_err(|_| Error::MalformedDelivery("publish timestamp out of range".into()))?;

    Ok(StoredRecord {
        subject: message.subject.to_string(),
        sequence: info.stream_sequence,
        payload: message.payload.clone(),
        time: DateTime::from_timestamp_nanos(nanos),
    })
}

#[async_trait::async_trait]
impl RecentReader for NatsStreamReader {
    async fn read_recent(&self, request: ReadRequest) -> Result<ReadOutcome> {
        let stream = match self.jetstream.get_stream(&request.stream).await {
            Ok(stream) => stream,
            Err(err) => {
                return Err(match err.kind() {
                    GetStreamErrorKind::JetStream(js)
                        if js.error_code() == ErrorCode::STREAM_NOT_FOUND =>
                    {
                        Error::StreamNotFound(request.stream.clone())
                    }
                    kind => Error::StreamInfo(kind.to_string()),
                });
            }
        };

        let info = stream.cached_info();
        let state = StreamState {
            messages: info.state.messages,
            first_sequence: info.state.first_sequence,
            last_sequence: info.state.last_sequence,
        };
        let window = plan_window(request.mode, state, request.want);
        if window.want == 0 {
            return Ok(ReadOutcome {
                records: Vec::new(),
                window,
                state,
            });
        }

        let durable_name = format!("$switchyard_fetch_consumer_{}", Uuid::new_v4().simple());
        let consumer = stream
            .create_consumer(PullConfig {
                durable_name: Some(durable_name.clone()),
                deliver_policy: DeliverPolicy::ByStartSequence {
                    start_sequence: window.start_sequence,
                },
                ack_policy: AckPolicy::Explicit,
                num_replicas: 1,
                filter_subject: request.filter_subject.clone().unwrap_or_default(),
                ..Default::default()
            })
            .await
            .map_err(|err| Error::ConsumerCreate(err.to_string()))?;

        // From here on the consumer exists on the broker; the release guard
        // covers every exit path below.
        let _release = ConsumerRelease {
            jetstream: self.jetstream.clone(),
            stream_name: request.stream.clone(),
            durable_name,
        };

        // One "next N" request bounded by the deadline.
        let mut deliveries = consumer
            .fetch()
            .max_messages(usize::try_from(window.want).unwrap_or(usize::MAX))
            .expires(request.timeout)
            .messages()
            .await
            .map_err(|err| Error::Subscribe(err.to_string()))?;

        // The dispatch side does nothing beyond parse-and-forward; the
        // channel holds a single record so a stalled reader exerts
        // back-pressure instead of buffering.
        let (record_tx, mut record_rx) = mpsc::channel::<StoredRecord>(1);
        let forwarder = tokio::spawn(async move {
            while let Some(delivery) = deliveries.next().await {
                let message = match delivery {
                    Ok(message) => message,
                    Err(err) => {
                        debug!("delivery stream ended: {err}");
                        break;
                    }
                };
                let record = match record_from_message(&message) {
                    Ok(record) => record,
                    Err(err) => {
                        warn!("dropping delivery: {err}");
                        continue;
                    }
                };
                let _ = message.ack().await;
                if record_tx.send(record).await.is_err() {
                    break;
                }
            }
        });

        let timer = tokio::time::sleep(request.timeout);
        tokio::pin!(timer);

        let mut records = Vec::new();
        while (records.len() as u64) < window.want {
            tokio::select! {
                () = &mut timer => break,
                delivery = record_rx.recv() => match delivery {
                    Some(record) => records.push(record),
                    None => break,
                },
            }
        }

        // Unsubscribe; the guard schedules the deferred consumer delete.
        forwarder.abort();

        Ok(ReadOutcome {
            records,
            window,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_never_share_a_durable_name() {
        let a = format!("$switchyard_fetch_consumer_{}", Uuid::new_v4().simple());
        let b = format!("$switchyard_fetch_consumer_{}", Uuid::new_v4().simple());
        assert_ne!(a, b);
        assert!(a.starts_with("$switchyard_fetch_consumer_"));
    }
}

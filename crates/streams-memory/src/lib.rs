//! In-memory (single node) implementation of the Switchyard stream reader.
//!
//! Streams live in a shared map guarded by an async mutex; reads honour the
//! same window planning and subject-filter semantics as the JetStream
//! implementation, without consumer sessions to tear down. Used for local
//! development and by the test suites of the crates built on the reader.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use switchyard_streams::{
    plan_window, Error, ReadOutcome, ReadRequest, RecentReader, Result, StoredRecord, StreamState,
};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct StoredStream {
    next_sequence: u64,
    records: Vec<StoredRecord>,
}

impl StoredStream {
    fn state(&self) -> StreamState {
        StreamState {
            messages: self.records.len() as u64,
            first_sequence: self.records.first().map_or(0, |record| record.sequence),
            last_sequence: self.records.last().map_or(0, |record| record.sequence),
        }
    }
}

/// Returns whether `subject` matches a NATS-style `filter` (`*` matches one
/// token, a trailing `>` matches the rest).
#[must_use]
pub fn subject_matches(filter: &str, subject: &str) -> bool {
    let mut filter_tokens = filter.split('.');
    let mut subject_tokens = subject.split('.');
    loop {
        match (filter_tokens.next(), subject_tokens.next()) {
            (None, None) => return true,
            (Some(">"), _) => return true,
            (Some(filter_token), Some(subject_token)) => {
                if filter_token != "*" && filter_token != subject_token {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// A process-local set of streams readable through [`RecentReader`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStreams {
    streams: Arc<Mutex<HashMap<String, StoredStream>>>,
}

impl MemoryStreams {
    /// Creates an empty set of streams.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stream if it does not exist yet.
    pub async fn create_stream(&self, name: impl Into<String>) {
        self.streams
            .lock()
            .await
            .entry(name.into())
            .or_insert_with(|| StoredStream {
                next_sequence: 1,
                records: Vec::new(),
            });
    }

    /// Appends a record, assigning the next sequence and the current time.
    ///
    /// Returns the assigned sequence.
    pub async fn publish(
        &self,
        stream: &str,
        subject: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Result<u64> {
        self.publish_at(stream, subject, payload, Utc::now()).await
    }

    /// Appends a record with an explicit stored-at time.
    pub async fn publish_at(
        &self,
        stream: &str,
        subject: impl Into<String>,
        payload: impl Into<Bytes>,
        time: DateTime<Utc>,
    ) -> Result<u64> {
        let mut streams = self.streams.lock().await;
        let stored = streams
            .get_mut(stream)
            .ok_or_else(|| Error::StreamNotFound(stream.to_string()))?;
        let sequence = stored.next_sequence;
        stored.next_sequence += 1;
        stored.records.push(StoredRecord {
            subject: subject.into(),
            sequence,
            payload: payload.into(),
            time,
        });
        Ok(sequence)
    }

    /// Drops all records with a sequence below `sequence`, emulating
    /// retention trimming.
    pub async fn purge_below(&self, stream: &str, sequence: u64) -> Result<()> {
        let mut streams = self.streams.lock().await;
        let stored = streams
            .get_mut(stream)
            .ok_or_else(|| Error::StreamNotFound(stream.to_string()))?;
        stored.records.retain(|record| record.sequence >= sequence);
        Ok(())
    }
}

#[async_trait]
impl RecentReader for MemoryStreams {
    async fn read_recent(&self, request: ReadRequest) -> Result<ReadOutcome> {
        let streams = self.streams.lock().await;
        let stored = streams
            .get(&request.stream)
            .ok_or_else(|| Error::StreamNotFound(request.stream.clone()))?;

        let state = stored.state();
        let window = plan_window(request.mode, state, request.want);

        let records: Vec<StoredRecord> = stored
            .records
            .iter()
            .filter(|record| record.sequence >= window.start_sequence)
            .filter(|record| {
                request
                    .filter_subject
                    .as_deref()
                    .map_or(true, |filter| subject_matches(filter, &record.subject))
            })
            .take(usize::try_from(window.want).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(ReadOutcome {
            records,
            window,
            state,
        })
    }
}

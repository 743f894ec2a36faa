//! Stream-reader seam for Switchyard's internal streams.
//!
//! Monitoring queries never hold long-lived subscriptions; they read a
//! bounded window of recent records through the [`RecentReader`] trait and
//! let the implementation tear its session down. This crate carries the
//! record and request types plus the pure read-window planner shared by the
//! NATS-backed and in-memory implementations.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// One record read from a stream, with the metadata the stream assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRecord {
    /// Subject the record was published on.
    pub subject: String,
    /// Stream sequence of the record.
    pub sequence: u64,
    /// Raw payload bytes.
    pub payload: Bytes,
    /// Time the stream stored the record.
    pub time: DateTime<Utc>,
}

/// How the start sequence of a read window is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadMode {
    /// Read the whole stream, oldest record first.
    All,
    /// Read the newest `want` records.
    TailLast,
    /// Read `want` records ending at a previously observed sequence.
    FromSeqBack {
        /// Upper bound of the window (inclusive).
        last_known_seq: u64,
    },
}

/// A bounded read of recent records from one stream.
#[derive(Clone, Debug)]
pub struct ReadRequest {
    /// Stream to read from.
    pub stream: String,
    /// Upper bound on records wanted; capped by the stream's message count.
    pub want: u64,
    /// Upper bound on wall-clock wait.
    pub timeout: Duration,
    /// Start-sequence policy.
    pub mode: ReadMode,
    /// Optional subject filter applied by the consumer.
    pub filter_subject: Option<String>,
}

impl ReadRequest {
    /// Creates an unfiltered read request.
    #[must_use]
    pub fn new(stream: impl Into<String>, want: u64, timeout: Duration, mode: ReadMode) -> Self {
        Self {
            stream: stream.into(),
            want,
            timeout,
            mode,
            filter_subject: None,
        }
    }

    /// Restricts the read to records matching a subject filter.
    #[must_use]
    pub fn with_filter_subject(mut self, filter_subject: impl Into<String>) -> Self {
        self.filter_subject = Some(filter_subject.into());
        self
    }
}

/// Stream state observed when a read was planned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamState {
    /// Number of records currently retained.
    pub messages: u64,
    /// Sequence of the oldest retained record.
    pub first_sequence: u64,
    /// Sequence of the newest record.
    pub last_sequence: u64,
}

/// The resolved start sequence and record count of one read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadWindow {
    /// First sequence the consumer delivers from.
    pub start_sequence: u64,
    /// Number of records requested.
    pub want: u64,
}

/// Resolves a read window against observed stream state.
///
/// Sequences are 1-based; every branch clamps to 1 so that a window larger
/// than the stream never wraps below the first sequence.
#[must_use]
pub fn plan_window(mode: ReadMode, state: StreamState, want: u64) -> ReadWindow {
    let want = want.min(state.messages);
    match mode {
        ReadMode::All => ReadWindow {
            start_sequence: state.first_sequence.max(1),
            want: state.messages,
        },
        ReadMode::TailLast => {
            let start_sequence = if want >= state.last_sequence {
                1
            } else {
                state.last_sequence - want + 1
            };
            ReadWindow {
                start_sequence,
                want,
            }
        }
        ReadMode::FromSeqBack { last_known_seq } => {
            if want >= last_known_seq {
                ReadWindow {
                    start_sequence: 1,
                    want: last_known_seq,
                }
            } else {
                ReadWindow {
                    start_sequence: last_known_seq - want + 1,
                    want,
                }
            }
        }
    }
}

/// Records returned by one read, plus the window and stream state that
/// produced them.
#[derive(Clone, Debug)]
pub struct ReadOutcome {
    /// Records that arrived before the deadline, in delivery order.
    pub records: Vec<StoredRecord>,
    /// The window the read was planned with.
    pub window: ReadWindow,
    /// Stream state at planning time.
    pub state: StreamState,
}

impl ReadOutcome {
    /// Whether a caller should retry once with a doubled window.
    ///
    /// True when the read came back short even though the stream holds more
    /// records than were asked for and retention had not yet trimmed past
    /// the chosen start.
    #[must_use]
    pub fn came_back_short(&self) -> bool {
        (self.records.len() as u64) < self.window.want
            && self.state.messages > self.window.want
            && self.state.first_sequence < self.window.start_sequence
    }
}

/// Bounded "read the last N records within T" over an internal stream.
///
/// Implementations own the consumer session: whatever happens during the
/// read, the session must be released before or shortly after the call
/// returns, and an expired deadline yields the partial result rather than
/// an error.
#[async_trait]
pub trait RecentReader: Send + Sync {
    /// Reads up to `request.want` recent records under `request.timeout`.
    async fn read_recent(&self, request: ReadRequest) -> Result<ReadOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(messages: u64, first: u64, last: u64) -> StreamState {
        StreamState {
            messages,
            first_sequence: first,
            last_sequence: last,
        }
    }

    #[test]
    fn all_mode_starts_at_first_sequence_and_wants_everything() {
        let window = plan_window(ReadMode::All, state(250, 11, 260), 50);
        assert_eq!(window.start_sequence, 11);
        assert_eq!(window.want, 250);
    }

    #[test]
    fn all_mode_clamps_zero_first_sequence() {
        let window = plan_window(ReadMode::All, state(0, 0, 0), 10);
        assert_eq!(window.start_sequence, 1);
        assert_eq!(window.want, 0);
    }

    #[test]
    fn tail_mode_takes_newest_records() {
        let window = plan_window(ReadMode::TailLast, state(250, 1, 250), 50);
        assert_eq!(window.start_sequence, 201);
        assert_eq!(window.want, 50);
    }

    #[test]
    fn tail_mode_clamps_instead_of_wrapping() {
        // want exceeds last_seq; the unsigned subtraction would wrap.
        let window = plan_window(ReadMode::TailLast, state(3, 1, 3), 1000);
        assert_eq!(window.start_sequence, 1);
        assert_eq!(window.want, 3);
    }

    #[test]
    fn from_seq_back_counts_backwards_from_known_sequence() {
        let window = plan_window(
            ReadMode::FromSeqBack {
                last_known_seq: 200,
            },
            state(300, 1, 300),
            50,
        );
        assert_eq!(window.start_sequence, 151);
        assert_eq!(window.want, 50);
    }

    #[test]
    fn from_seq_back_reduces_want_when_window_reaches_stream_head() {
        let window = plan_window(
            ReadMode::FromSeqBack { last_known_seq: 30 },
            state(300, 1, 300),
            50,
        );
        assert_eq!(window.start_sequence, 1);
        assert_eq!(window.want, 30);
    }

    #[test]
    fn want_is_capped_by_message_count() {
        let window = plan_window(ReadMode::TailLast, state(10, 1, 10), 1_000_000);
        assert_eq!(window.want, 10);
        assert_eq!(window.start_sequence, 1);
    }

    #[test]
    fn short_read_retries_only_when_retention_kept_the_window() {
        let outcome = ReadOutcome {
            records: Vec::new(),
            window: ReadWindow {
                start_sequence: 151,
                want: 50,
            },
            state: state(300, 1, 300),
        };
        assert!(outcome.came_back_short());

        // Retention already trimmed past the start: nothing more to gain.
        let trimmed = ReadOutcome {
            state: state(300, 180, 480),
            ..outcome.clone()
        };
        assert!(!trimmed.came_back_short());

        // The stream holds no more than was asked for.
        let small = ReadOutcome {
            state: state(40, 1, 40),
            ..outcome
        };
        assert!(!small.came_back_short());
    }
}

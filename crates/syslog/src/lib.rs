//! Paginated queries over the Switchyard system-log stream.
//!
//! Log records are published by every component onto one stream with
//! token-delimited subjects (`$switchyard_syslogs.<source>.<level>`). The
//! query wraps the bounded stream reader with subject parsing, level
//! filters, tail/from-sequence/all ordering and a single adaptive refetch
//! when retention raced the read.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use switchyard_streams::{ReadMode, ReadRequest, RecentReader, StoredRecord};
use tracing::debug;

/// Name of the system-log stream.
pub const SYSLOG_STREAM_NAME: &str = "$switchyard_syslogs";

/// Source token used by components publishing through the external-log
/// ingress.
pub const EXTERNAL_SOURCE_TOKEN: &str = "extern";

/// Cap on records returned by paginated (non-`all`) queries.
pub const MAX_RETURNED_LOGS: usize = 100;

/// One system-log record as returned to the dashboard.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Log {
    /// Stream sequence of the record.
    pub message_seq: u64,
    /// Log level parsed from the subject.
    #[serde(rename = "type")]
    pub log_type: String,
    /// Emitting component parsed from the subject.
    pub source: String,
    /// Log line.
    pub data: String,
    /// Time the stream stored the record.
    #[serde(rename = "created_at")]
    pub time_sent: DateTime<Utc>,
}

/// Splits a log subject into `(source, log_type)`.
///
/// Three shapes exist on the stream: two tokens are legacy broker logs,
/// three tokens are `stream.source.level`, four or more carry an extra
/// routing token before the level.
#[must_use]
pub fn parse_subject(subject: &str) -> (String, String) {
    let tokens: Vec<&str> = subject.split('.').collect();
    let (source, log_type) = match tokens.as_slice() {
        [] | [_] => ("broker", *tokens.last().unwrap_or(&"")),
        [_, log_type] => ("broker", *log_type),
        [_, source, log_type] => (*source, *log_type),
        [_, source, _, log_type, ..] => (*source, *log_type),
    };
    (source.to_string(), log_type.to_string())
}

/// Maps a dashboard log-type selector onto a subject filter.
///
/// # Errors
///
/// Returns [`Error::UnknownLogType`] for selectors outside the known set.
pub fn filter_for_log_type(log_type: &str) -> Result<Option<String>> {
    match log_type {
        "all" => Ok(None),
        "err" | "warn" | "info" => Ok(Some(format!("{SYSLOG_STREAM_NAME}.*.{log_type}"))),
        "external" => Ok(Some(format!(
            "{SYSLOG_STREAM_NAME}.{EXTERNAL_SOURCE_TOKEN}.>"
        ))),
        other => Err(Error::UnknownLogType(other.to_string())),
    }
}

fn record_to_log(record: &StoredRecord) -> Log {
    let (source, log_type) = parse_subject(&record.subject);
    Log {
        message_seq: record.sequence,
        log_type,
        source,
        data: String::from_utf8_lossy(&record.payload).into_owned(),
        time_sent: record.time,
    }
}

/// Query surface over the system-log stream.
#[derive(Clone)]
pub struct LogQuery {
    reader: Arc<dyn RecentReader>,
    stream_name: String,
}

impl LogQuery {
    /// Creates a query over the default syslog stream.
    #[must_use]
    pub fn new(reader: Arc<dyn RecentReader>) -> Self {
        Self::with_stream(reader, SYSLOG_STREAM_NAME)
    }

    /// Creates a query over a named stream.
    #[must_use]
    pub fn with_stream(reader: Arc<dyn RecentReader>, stream_name: impl Into<String>) -> Self {
        Self {
            reader,
            stream_name: stream_name.into(),
        }
    }

    /// Fetches a window of logs.
    ///
    /// Mode `all` returns the whole stream ascending by sequence; the other
    /// modes return newest-first, capped at [`MAX_RETURNED_LOGS`]. A read
    /// that came back short while the stream still held more is retried
    /// exactly once with a doubled window, re-anchored at the last known
    /// sequence; the doubling is latency protection, not a loop.
    ///
    /// # Errors
    ///
    /// Stream absence and transport failures propagate; an expired deadline
    /// does not.
    pub async fn fetch(
        &self,
        want: u64,
        timeout: Duration,
        mode: ReadMode,
        filter_subject: Option<String>,
    ) -> Result<Vec<Log>> {
        let mut request = ReadRequest::new(&self.stream_name, want, timeout, mode);
        request.filter_subject.clone_from(&filter_subject);

        let mut outcome = self.reader.read_recent(request).await?;
        if outcome.came_back_short() {
            let last_known_seq = match mode {
                ReadMode::FromSeqBack { last_known_seq } => last_known_seq,
                ReadMode::All | ReadMode::TailLast => outcome.state.last_sequence,
            };
            debug!(
                stream = %self.stream_name,
                want,
                "log read came back short, refetching once with a doubled window"
            );
            let mut retry = ReadRequest::new(
                &self.stream_name,
                want.saturating_mul(2),
                timeout,
                ReadMode::FromSeqBack { last_known_seq },
            );
            retry.filter_subject = filter_subject;
            outcome = self.reader.read_recent(retry).await?;
        }

        let mut logs: Vec<Log> = outcome.records.iter().map(record_to_log).collect();
        if matches!(mode, ReadMode::All) {
            logs.sort_by_key(|log| log.message_seq);
        } else {
            logs.sort_by_key(|log| std::cmp::Reverse(log.message_seq));
            logs.truncate(MAX_RETURNED_LOGS);
        }
        Ok(logs)
    }

    /// Renders the entire log stream as plain text, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates read failures.
    pub async fn download(&self, timeout: Duration, filter_subject: Option<String>) -> Result<String> {
        let logs = self
            .fetch(u64::MAX, timeout, ReadMode::All, filter_subject)
            .await?;

        let mut rendered = String::new();
        for log in logs {
            let _ = writeln!(
                rendered,
                "[{}] {} ({}): {}",
                log.time_sent.to_rfc3339(),
                log.source,
                log.log_type,
                log.data.trim_end()
            );
        }
        Ok(rendered)
    }
}

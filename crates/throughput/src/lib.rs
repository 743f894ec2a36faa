//! Aggregation of per-broker throughput samples into aligned series.
//!
//! Brokers publish one sample per second onto the throughput stream, each
//! carrying per-tenant read and write byte counts. The overview wants them
//! grouped by broker, aligned on a fixed-length time axis and summed into a
//! synthetic `total` row whose axis matches the per-broker rows.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use switchyard_streams::StoredRecord;

/// Name of the synthetic summed series, always first in the result.
pub const TOTAL_SERIES_NAME: &str = "total";

/// Wire form of one broker's throughput sample.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BrokerSample {
    /// Reporting broker.
    pub name: String,
    /// Bytes read in the sample window, keyed by tenant.
    #[serde(default)]
    pub read: HashMap<String, i64>,
    /// Bytes written in the sample window, keyed by tenant.
    #[serde(default)]
    pub write: HashMap<String, i64>,
}

/// A decoded sample paired with the time the stream stored it.
#[derive(Clone, Debug)]
pub struct TimedSample {
    /// The broker's sample.
    pub sample: BrokerSample,
    /// Stream-assigned timestamp.
    pub time: DateTime<Utc>,
}

/// Decodes a stored throughput record.
///
/// # Errors
///
/// Returns an error when the payload is not a valid sample.
pub fn decode_record(record: &StoredRecord) -> Result<TimedSample> {
    let sample: BrokerSample = serde_json::from_slice(&record.payload)?;
    Ok(TimedSample {
        sample,
        time: record.time,
    })
}

/// One point on the read axis.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReadPoint {
    /// Sample time.
    pub timestamp: DateTime<Utc>,
    /// Bytes read.
    pub read: i64,
}

/// One point on the write axis.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct WritePoint {
    /// Sample time.
    pub timestamp: DateTime<Utc>,
    /// Bytes written.
    pub write: i64,
}

/// One broker's throughput over the rolling window, read and write aligned
/// index for index.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AlignedSeries {
    /// Broker name, or [`TOTAL_SERIES_NAME`].
    pub name: String,
    /// Read points, oldest first.
    pub read: Vec<ReadPoint>,
    /// Write points, oldest first.
    pub write: Vec<WritePoint>,
}

impl AlignedSeries {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Groups samples by broker and synthesises the `total` row.
///
/// Only the caller's tenant is read out of the per-tenant maps; a tenant
/// absent from a sample counts as zero. The `total` row always has exactly
/// `window` points, zero-filled past the last sample; per-broker rows are as
/// long as their sample runs. Rows after `total` are sorted by broker name.
#[must_use]
pub fn aggregate(mut samples: Vec<TimedSample>, tenant: &str, window: usize) -> Vec<AlignedSeries> {
    samples.sort_by_key(|timed| timed.time);

    let mut by_broker: BTreeMap<String, AlignedSeries> = BTreeMap::new();
    for timed in samples {
        let series = by_broker
            .entry(timed.sample.name.clone())
            .or_insert_with(|| AlignedSeries::named(timed.sample.name.clone()));
        series.read.push(ReadPoint {
            timestamp: timed.time,
            read: timed.sample.read.get(tenant).copied().unwrap_or_default(),
        });
        series.write.push(WritePoint {
            timestamp: timed.time,
            write: timed.sample.write.get(tenant).copied().unwrap_or_default(),
        });
    }

    let zero_time = DateTime::UNIX_EPOCH;
    let mut total = AlignedSeries::named(TOTAL_SERIES_NAME);
    total.read = vec![
        ReadPoint {
            timestamp: zero_time,
            read: 0,
        };
        window
    ];
    total.write = vec![
        WritePoint {
            timestamp: zero_time,
            write: 0,
        };
        window
    ];

    // All brokers sample on the same cadence, so index i means the same
    // instant in every row; a short row is a shorter run, not a hole.
    for series in by_broker.values() {
        for (i, point) in series.read.iter().take(window).enumerate() {
            total.read[i].timestamp = point.timestamp;
            total.read[i].read += point.read;
        }
        for (i, point) in series.write.iter().take(window).enumerate() {
            total.write[i].timestamp = point.timestamp;
            total.write[i].write += point.write;
        }
    }

    let mut result = Vec::with_capacity(by_broker.len() + 1);
    result.push(total);
    result.extend(by_broker.into_values());
    result
}

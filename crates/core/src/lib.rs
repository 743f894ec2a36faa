//! Control-plane monitoring core of the Switchyard broker.
//!
//! Answers "what is happening across the cluster right now": the main and
//! per-station overview composites, bounded system-log queries and the
//! replica count, served over a small JSON surface. Stream access, resource
//! probing and the metadata/message stores are consumed through the
//! collaborator crates; this crate owns composition, error policy and the
//! HTTP routing.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod auth;
mod config;
mod error;
mod handlers;
pub mod overview;
mod preview;
pub mod router;
pub mod station;
mod state;
#[cfg(test)]
mod test_support;

pub use auth::AuthenticatedUser;
pub use config::{Config, MetadataDbConfig};
pub use error::{Error, Result, SHOWABLE_ERROR_STATUS};
pub use overview::{main_overview, MainOverviewData, THROUGHPUT_STREAM_NAME};
pub use preview::{preview_cgs, preview_producers};
pub use router::monitoring_router;
pub use state::{MonitoringContext, MonitoringContextOptions};
pub use station::{station_overview, StationOverview};

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Client-side metric aggregation with timer-driven delivery.
//!
//! `metron` buffers application measurements in memory, merges repeated
//! observations of the same named, dimensioned metric into one accumulated
//! record, and flushes the accumulated records to a remote ingestion API
//! through an injected [`Transport`]. Each flush is split into batches of at
//! most [`MAX_BATCH_ENTRIES`] entries, delivered strictly one at a time.
//!
//! The entry point is [`MetricCollector`]. In automatic mode it arms a
//! recurring flush timer at construction; in manual mode the caller drives
//! [`flush`](MetricCollector::flush) itself. Either way,
//! [`stop`](MetricCollector::stop) cancels the timer and performs one final
//! flush.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use metron::{MetricBatch, MetricCollector, Observation, Transport, TransportError, Unit};
//!
//! struct StdoutTransport;
//!
//! #[async_trait::async_trait]
//! impl Transport for StdoutTransport {
//!     async fn put_metrics(&self, batch: &MetricBatch) -> Result<(), TransportError> {
//!         let body = serde_json::to_string(batch).map_err(TransportError::new)?;
//!         println!("{body}");
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let collector = MetricCollector::builder("MyService")
//!     .automatic(true)
//!     .flush_interval(Duration::from_secs(5))
//!     .transport(Arc::new(StdoutTransport))
//!     .build()?;
//!
//! collector.add_metric(
//!     Observation::new("eventCount", 1.0)
//!         .dimension("eventName", "signIn")
//!         .unit(Unit::Count),
//! )?;
//!
//! // On shutdown, deliver whatever is still buffered.
//! collector.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Delivery is fail-fast and unretried: a failed flush surfaces the
//! transport error to the caller with the cycle's records already dropped
//! from memory. Retry and timeout policy belong to the [`Transport`]
//! implementation.

pub mod collector;
pub mod dispatch;
mod key;
#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use collector::{CollectorBuilder, MetricCollector};
pub use dispatch::{Dispatcher, MAX_BATCH_ENTRIES};
pub use metron_core::{
    Dimension, MetricBatch, MetricDatum, MetricRecord, MetricsError, Observation, ObservedValue,
    StatisticSet, Transport, TransportError, Unit, ValidationError,
};

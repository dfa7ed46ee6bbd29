// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Data model and capability seams for the `metron` metric aggregation
//! layer.
//!
//! This crate defines the types shared between metric producers and the
//! machinery in `metron`:
//!
//! - [`Observation`]: one raw measurement supplied by a caller, carrying a
//!   name, ordered [`Dimension`]s, a scalar or pre-sampled
//!   [`ObservedValue`], and an optional [`Unit`] and timestamp.
//! - [`MetricRecord`]: the in-memory merge of every observation that shares
//!   an identity key.
//! - The wire shapes ([`MetricBatch`], [`MetricDatum`], [`StatisticSet`])
//!   accepted by the remote ingestion API.
//! - The [`Transport`] capability through which batches leave the process,
//!   and the error types ([`ValidationError`], [`TransportError`],
//!   [`MetricsError`]) surfaced along the way.
//!
//! Most applications depend on `metron` directly, which re-exports
//! everything here.

mod error;
mod observation;
mod record;
mod transport;
mod unit;
mod validate;
pub mod wire;

pub use error::MetricsError;
pub use observation::{Dimension, Observation, ObservedValue};
pub use record::MetricRecord;
pub use transport::{Transport, TransportError};
pub use unit::Unit;
pub use validate::{ValidationError, ValidationErrorBuilder};
pub use wire::{MetricBatch, MetricDatum, StatisticSet};

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Wire shapes submitted to the ingestion API.
//!
//! Field names serialize in `PascalCase` and optional fields are omitted
//! entirely rather than sent as null, matching what the remote API accepts.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::{Dimension, MetricRecord, Unit};

/// One request-sized batch of metric data, published under a namespace.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricBatch {
    /// Namespace the entries are published under.
    pub namespace: String,
    /// Up to the per-request limit of wire entries, in record order.
    pub metric_data: Vec<MetricDatum>,
}

/// A single metric entry inside a batch.
///
/// Exactly one of `value` and `statistic_values` is set: a record holding
/// one sample emits `Value`, a record holding several emits
/// `StatisticValues`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDatum {
    /// Metric name.
    pub metric_name: String,
    /// Dimension pairs in record order; empty when the record has none.
    pub dimensions: Vec<Dimension>,
    /// The sole sample, when the record holds exactly one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Summary of the samples, when the record holds more than one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistic_values: Option<StatisticSet>,
    /// Epoch-millisecond timestamp, only when the record carries one.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_epoch_millis"
    )]
    pub timestamp: Option<SystemTime>,
    /// Unit, only when the record carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

/// Statistical summary of a multi-sample record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatisticSet {
    /// Largest sample.
    pub maximum: f64,
    /// Smallest sample.
    pub minimum: f64,
    /// Number of samples.
    pub sample_count: f64,
    /// Sum over all samples.
    pub sum: f64,
}

impl StatisticSet {
    /// Summarize a non-empty sample sequence.
    pub fn from_samples(samples: &[f64]) -> Self {
        let mut summary = Self {
            maximum: f64::NEG_INFINITY,
            minimum: f64::INFINITY,
            sample_count: samples.len() as f64,
            sum: 0.0,
        };
        for &sample in samples {
            summary.maximum = summary.maximum.max(sample);
            summary.minimum = summary.minimum.min(sample);
            summary.sum += sample;
        }
        summary
    }
}

impl From<&MetricRecord> for MetricDatum {
    fn from(record: &MetricRecord) -> Self {
        let (value, statistic_values) = match record.values.as_slice() {
            [single] => (Some(*single), None),
            samples => (None, Some(StatisticSet::from_samples(samples))),
        };
        Self {
            metric_name: record.name.clone(),
            dimensions: record.dimensions.clone(),
            value,
            statistic_values,
            timestamp: record.timestamp,
            unit: record.unit,
        }
    }
}

// Only invoked when the field is present; `skip_serializing_if` filters out
// the `None` case first.
fn serialize_epoch_millis<S>(
    timestamp: &Option<SystemTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let millis = timestamp
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0);
    serializer.serialize_u64(millis)
}

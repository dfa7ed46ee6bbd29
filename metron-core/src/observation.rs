// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::time::SystemTime;

use serde::Serialize;

use crate::Unit;

/// One dimension name/value pair used to sub-categorize a metric (region,
/// tenant, event name, and so on).
///
/// Also the wire shape of a dimension inside a [`MetricDatum`], hence the
/// `PascalCase` field names on the wire.
///
/// [`MetricDatum`]: crate::wire::MetricDatum
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    /// Dimension name.
    pub name: String,
    /// Dimension value.
    pub value: String,
}

impl Dimension {
    /// Create a dimension pair.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Value carried by a single observation: either one scalar measurement, or
/// a pre-sampled statistical observation holding several samples at once.
///
/// A `Sampled` value must carry at least one sample; emptiness is rejected
/// when the observation is added to a collector.
#[derive(Clone, Debug, PartialEq)]
pub enum ObservedValue {
    /// One scalar measurement.
    Single(f64),
    /// Several samples observed together.
    Sampled(Vec<f64>),
}

impl From<f64> for ObservedValue {
    fn from(value: f64) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<f64>> for ObservedValue {
    fn from(samples: Vec<f64>) -> Self {
        Self::Sampled(samples)
    }
}

impl From<&[f64]> for ObservedValue {
    fn from(samples: &[f64]) -> Self {
        Self::Sampled(samples.to_vec())
    }
}

/// One raw measurement supplied by a caller.
///
/// Observations are transient: the collector merges them into
/// [`MetricRecord`]s by identity key and never stores the observation
/// itself.
///
/// ```
/// use metron_core::{Observation, Unit};
///
/// let observation = Observation::new("requestLatency", vec![12.0, 15.5, 9.0])
///     .dimension("operation", "GetItem")
///     .unit(Unit::Milliseconds);
/// assert_eq!(observation.dimensions.len(), 1);
/// ```
///
/// [`MetricRecord`]: crate::MetricRecord
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    /// Metric name. Must not be empty.
    pub name: String,
    /// Insertion-ordered dimensions. Defaults to none.
    pub dimensions: Vec<Dimension>,
    /// The measured value(s).
    pub value: ObservedValue,
    /// Optional unit tag.
    pub unit: Option<Unit>,
    /// Optional point-in-time marker. Only meaningful at the dispatch
    /// boundary; never part of the aggregation identity.
    pub timestamp: Option<SystemTime>,
}

impl Observation {
    /// Create an observation with no dimensions, unit, or timestamp.
    pub fn new(name: impl Into<String>, value: impl Into<ObservedValue>) -> Self {
        Self {
            name: name.into(),
            dimensions: Vec::new(),
            value: value.into(),
            unit: None,
            timestamp: None,
        }
    }

    /// Set a dimension. Setting a name that is already present replaces its
    /// value in place; insertion order is otherwise preserved.
    pub fn dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.dimensions.iter_mut().find(|d| d.name == name) {
            Some(existing) => existing.value = value,
            None => self.dimensions.push(Dimension { name, value }),
        }
        self
    }

    /// Tag the observation with a unit.
    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Attach a timestamp, emitted with the wire entry at dispatch.
    pub fn timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Dimension, Observation, ObservedValue};

    #[test]
    fn scalar_and_sampled_conversions() {
        assert_eq!(ObservedValue::from(2.5), ObservedValue::Single(2.5));
        assert_eq!(
            ObservedValue::from(vec![1.0, 2.0]),
            ObservedValue::Sampled(vec![1.0, 2.0])
        );
    }

    #[test]
    fn dimensions_keep_insertion_order() {
        let observation = Observation::new("metric", 1.0)
            .dimension("region", "eu-west-1")
            .dimension("tenant", "acme");
        assert_eq!(
            observation.dimensions,
            vec![
                Dimension::new("region", "eu-west-1"),
                Dimension::new("tenant", "acme"),
            ]
        );
    }

    #[test]
    fn resetting_a_dimension_replaces_in_place() {
        let observation = Observation::new("metric", 1.0)
            .dimension("region", "eu-west-1")
            .dimension("tenant", "acme")
            .dimension("region", "us-east-1");
        assert_eq!(
            observation.dimensions,
            vec![
                Dimension::new("region", "us-east-1"),
                Dimension::new("tenant", "acme"),
            ]
        );
    }
}

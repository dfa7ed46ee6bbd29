// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::time::SystemTime;

use crate::{Dimension, Observation, ObservedValue, Unit};

/// The in-memory merge of every observation sharing an identity key.
///
/// `name`, `dimensions`, `unit` and `timestamp` come from the first
/// observation that created the record; later merges only ever append to
/// `values`, even when they disagree on unit or timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRecord {
    /// Metric name.
    pub name: String,
    /// Dimensions in the order the first observation carried them.
    pub dimensions: Vec<Dimension>,
    /// Unit of the first observation, if it carried one.
    pub unit: Option<Unit>,
    /// Timestamp of the first observation, if it carried one.
    pub timestamp: Option<SystemTime>,
    /// Every raw sample added under this record's key, in arrival order.
    pub values: Vec<f64>,
}

impl MetricRecord {
    /// Seed a record from the first observation under a new key.
    pub fn seed(observation: Observation) -> Self {
        let mut record = Self {
            name: observation.name,
            dimensions: observation.dimensions,
            unit: observation.unit,
            timestamp: observation.timestamp,
            values: Vec::new(),
        };
        record.merge_value(observation.value);
        record
    }

    /// Append one more observation's samples in arrival order. All other
    /// fields are left untouched.
    pub fn merge_value(&mut self, value: ObservedValue) {
        match value {
            ObservedValue::Single(v) => self.values.push(v),
            ObservedValue::Sampled(samples) => self.values.extend(samples),
        }
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use metron_core::Observation;

const KEY_SEPARATOR: char = ':';

/// Derive the identity key that decides which accumulated record an
/// observation merges into: the metric name joined with the dimension
/// *values* in insertion order, e.g. `eventCount:signIn:eu-west-1`.
///
/// Deterministic and total for well-formed input. Dimension names are not
/// part of the key, so two observations with different dimension-name sets
/// but identical value sequences share a record; callers that need distinct
/// records must vary the dimension values themselves.
pub(crate) fn observation_key(observation: &Observation) -> String {
    let mut key = observation.name.clone();
    for dimension in &observation.dimensions {
        key.push(KEY_SEPARATOR);
        key.push_str(&dimension.value);
    }
    key
}

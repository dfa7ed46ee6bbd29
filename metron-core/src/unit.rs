// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Unit attached to a metric value.
///
/// This is the closed vocabulary the ingestion API accepts; the wire format
/// carries the strings returned by [`Unit::name`] verbatim.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    /// No unit.
    #[default]
    None,
    /// A discrete count.
    Count,
    /// A duration in milliseconds.
    Milliseconds,
}

impl Unit {
    /// The public name the ingestion API defines for this unit.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Count => "Count",
            Self::Milliseconds => "Milliseconds",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl serde::Serialize for Unit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(self.name(), serializer)
    }
}

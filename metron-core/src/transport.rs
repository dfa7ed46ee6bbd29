// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt;

use async_trait::async_trait;

use crate::wire::MetricBatch;

/// Error returned by a [`Transport`] when a batch could not be delivered.
///
/// The payload is opaque to the core: it is logged once by the dispatcher at
/// the point of failure and otherwise forwarded unchanged, so callers of
/// `flush`/`stop` should not log it again.
pub struct TransportError(Box<dyn Error + Send + Sync>);

impl TransportError {
    /// Wrap an arbitrary delivery error.
    pub fn new(source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TransportError").field(&self.0).finish()
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let source: &(dyn Error + 'static) = self.0.as_ref();
        Some(source)
    }
}

impl From<String> for TransportError {
    fn from(reason: String) -> Self {
        Self(reason.into())
    }
}

impl From<&str> for TransportError {
    fn from(reason: &str) -> Self {
        Self(reason.into())
    }
}

/// Delivers one wire-format batch to the remote ingestion API.
///
/// The concrete network client lives outside this crate; anything that can
/// deliver a [`MetricBatch`] can stand in, including the in-memory transport
/// in `metron::test_util`. Implementations own any timeout or retry policy,
/// the dispatcher imposes none and submits at most one batch at a time.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver a single batch, reporting success or a delivery error.
    async fn put_metrics(&self, batch: &MetricBatch) -> Result<(), TransportError>;
}

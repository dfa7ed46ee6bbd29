// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! In-memory [`Transport`] for exercising collectors and dispatchers in
//! tests.
//!
//! This requires that the `test-util` feature be enabled.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use metron_core::{MetricBatch, Transport, TransportError};

/// A [`Transport`] that records every batch it receives instead of sending
/// it anywhere, with an optional injected failure mode.
///
/// Wrap it in an [`Arc`](std::sync::Arc) and hand a clone of the `Arc` to
/// the collector builder; the original stays available for inspection.
///
/// ```
/// use std::sync::Arc;
///
/// use metron::MetricCollector;
/// use metron::test_util::TestTransport;
///
/// let transport = Arc::new(TestTransport::new());
/// let collector = MetricCollector::builder("MyService")
///     .transport(transport.clone())
///     .build()
///     .unwrap();
/// // ... drive the collector ...
/// assert_eq!(transport.batch_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct TestTransport {
    batches: Mutex<Vec<MetricBatch>>,
    calls: AtomicUsize,
    fail_after: Option<usize>,
}

impl TestTransport {
    /// A transport that accepts every batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that accepts the first `accepted` batches and rejects
    /// every one after that. `failing_after(0)` rejects everything.
    pub fn failing_after(accepted: usize) -> Self {
        Self {
            fail_after: Some(accepted),
            ..Self::default()
        }
    }

    /// Every batch delivered so far, in submission order. Rejected batches
    /// are not included.
    pub fn batches(&self) -> Vec<MetricBatch> {
        self.batches.lock().unwrap().clone()
    }

    /// Number of delivered batches.
    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    /// Number of `put_metrics` calls observed, including rejected ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for TestTransport {
    async fn put_metrics(&self, batch: &MetricBatch) -> Result<(), TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(accepted) = self.fail_after {
            if call >= accepted {
                return Err(TransportError::from("transport rejected the batch"));
            }
        }
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Encodes accumulated records into wire batches and drives delivery.

use std::fmt;
use std::sync::Arc;

use metron_core::{MetricBatch, MetricDatum, MetricRecord, MetricsError, Transport};

/// Hard cap on wire entries per transport call, matching the ingestion
/// API's per-request limit.
pub const MAX_BATCH_ENTRIES: usize = 20;

/// Turns accumulated records into wire batches and submits them one at a
/// time through the transport capability.
///
/// Owned by a [`MetricCollector`], which hands it each flush cycle's
/// snapshot; it can also be driven directly when aggregation isn't wanted.
///
/// [`MetricCollector`]: crate::MetricCollector
pub struct Dispatcher {
    namespace: String,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    /// Create a dispatcher publishing under `namespace`.
    pub fn new(namespace: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            namespace: namespace.into(),
            transport,
        }
    }

    /// Deliver `records`, split into consecutive batches of at most
    /// [`MAX_BATCH_ENTRIES`] entries with order preserved across and within
    /// batches.
    ///
    /// Batches are submitted strictly in sequence; a batch is not sent until
    /// the previous call settled, bounding outbound load to one in-flight
    /// request. The first failure is logged here together with the offending
    /// batch and returned immediately, aborting the remaining batches —
    /// batches already delivered stay delivered. Callers must not log the
    /// returned error again.
    pub async fn send_metrics(&self, records: Vec<MetricRecord>) -> Result<(), MetricsError> {
        for chunk in records.chunks(MAX_BATCH_ENTRIES) {
            let batch = MetricBatch {
                namespace: self.namespace.clone(),
                metric_data: chunk.iter().map(MetricDatum::from).collect(),
            };
            tracing::debug!(
                namespace = %self.namespace,
                entries = batch.metric_data.len(),
                batch = %serde_json::to_string(&batch).unwrap_or_default(),
                "submitting metric batch"
            );
            if let Err(err) = self.transport.put_metrics(&batch).await {
                tracing::error!(%err, ?batch, "failed to deliver metric batch");
                return Err(err.into());
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The metric collector: in-memory aggregation plus the flush lifecycle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use indexmap::IndexMap;
use metron_core::{
    MetricRecord, MetricsError, Observation, ObservedValue, Transport, ValidationError,
};
use tokio::task::JoinHandle;

use crate::dispatch::Dispatcher;
use crate::key::observation_key;

const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(20);

/// Builder for [`MetricCollector`].
pub struct CollectorBuilder {
    namespace: String,
    automatic: bool,
    flush_interval: Duration,
    transport: Option<Arc<dyn Transport>>,
}

impl CollectorBuilder {
    fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            automatic: false,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            transport: None,
        }
    }

    /// Enable automatic mode: the collector arms a recurring flush timer at
    /// construction and starts in the running state. Defaults to manual
    /// flushing, where the collector starts stopped with no timer armed.
    pub fn automatic(mut self, automatic: bool) -> Self {
        self.automatic = automatic;
        self
    }

    /// Period of the recurring flush timer. Defaults to 20 seconds.
    pub fn flush_interval(mut self, flush_interval: Duration) -> Self {
        assert!(
            flush_interval > Duration::ZERO,
            "flush_interval must be non-zero"
        );
        self.flush_interval = flush_interval;
        self
    }

    /// The capability that delivers wire batches to the remote API.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate the configuration and build the collector.
    ///
    /// Fails when the namespace is empty or no transport was supplied. With
    /// automatic mode enabled this must run inside a Tokio runtime, since it
    /// arms the first flush timer.
    pub fn build(self) -> Result<MetricCollector, ValidationError> {
        if self.namespace.is_empty() {
            return Err(
                ValidationError::invalid("service namespace must not be empty")
                    .for_field("namespace"),
            );
        }
        let transport = self
            .transport
            .ok_or_else(|| ValidationError::invalid("a transport is required").for_field("transport"))?;
        let collector = MetricCollector {
            inner: Arc::new(Inner {
                namespace: self.namespace.clone(),
                automatic: self.automatic,
                flush_interval: self.flush_interval,
                stopped: AtomicBool::new(!self.automatic),
                records: Mutex::new(IndexMap::new()),
                timer: Mutex::new(None),
                dispatcher: Dispatcher::new(self.namespace, transport),
            }),
        };
        if collector.inner.automatic {
            collector.rearm_flush_timer();
        }
        Ok(collector)
    }
}

impl fmt::Debug for CollectorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorBuilder")
            .field("namespace", &self.namespace)
            .field("automatic", &self.automatic)
            .field("flush_interval", &self.flush_interval)
            .finish_non_exhaustive()
    }
}

/// Buffers observations in memory, merging repeated observations of the
/// same named, dimensioned metric, and flushes the accumulated records to
/// the transport.
///
/// Cloning is cheap; clones share the same record map and flush timer.
/// Addition is always accepted into memory, unbounded — there is no
/// back-pressure on callers.
#[derive(Clone)]
pub struct MetricCollector {
    inner: Arc<Inner>,
}

struct Inner {
    namespace: String,
    automatic: bool,
    flush_interval: Duration,
    // Initially set for manual collectors: the running state is only ever
    // entered by constructing in automatic mode.
    stopped: AtomicBool,
    records: Mutex<IndexMap<String, MetricRecord>>,
    // Armed iff automatic and not stopped.
    timer: Mutex<Option<JoinHandle<()>>>,
    dispatcher: Dispatcher,
}

impl MetricCollector {
    /// Start building a collector publishing under `namespace`.
    pub fn builder(namespace: impl Into<String>) -> CollectorBuilder {
        CollectorBuilder::new(namespace)
    }

    /// The namespace every flushed batch is published under.
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Record one observation. No I/O happens here.
    ///
    /// The observation merges into the accumulated record with the same
    /// identity key, or seeds a new one. Chainable.
    pub fn add_metric(&self, observation: Observation) -> Result<&Self, ValidationError> {
        validate_observation(&observation)?;
        self.insert(observation);
        Ok(self)
    }

    /// Record a batch of observations in order. Chainable.
    ///
    /// The whole batch is validated before anything is inserted, so a
    /// rejected batch (empty, or containing a malformed observation) leaves
    /// no partial state behind.
    pub fn add_metrics(&self, observations: Vec<Observation>) -> Result<&Self, ValidationError> {
        if observations.is_empty() {
            return Err(ValidationError::invalid(
                "at least one observation is required",
            ));
        }
        for observation in &observations {
            validate_observation(observation)?;
        }
        for observation in observations {
            self.insert(observation);
        }
        Ok(self)
    }

    fn insert(&self, observation: Observation) {
        let key = observation_key(&observation);
        let mut records = self.inner.records.lock().unwrap();
        match records.entry(key) {
            indexmap::map::Entry::Occupied(mut entry) => {
                entry.get_mut().merge_value(observation.value);
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(MetricRecord::seed(observation));
            }
        }
    }

    /// Snapshot the accumulated records in insertion order, without
    /// clearing them.
    pub fn get_metrics(&self) -> Vec<MetricRecord> {
        self.inner.records.lock().unwrap().values().cloned().collect()
    }

    /// Drop every accumulated record. Chainable.
    pub fn clear_metrics(&self) -> &Self {
        self.inner.records.lock().unwrap().clear();
        self
    }

    /// Discard any armed flush timer and arm a fresh one-shot that fires
    /// [`flush`](Self::flush) after the flush interval. Renewal happens
    /// inside `flush`, never here, so firings cannot stack.
    fn rearm_flush_timer(&self) {
        let weak = Arc::downgrade(&self.inner);
        let flush_interval = self.inner.flush_interval;
        let task = tokio::spawn(async move {
            tokio::time::sleep(flush_interval).await;
            let Some(inner) = weak.upgrade() else {
                // Every collector handle is gone; automatic flushing ends
                // with them.
                return;
            };
            // Release our own handle slot first, so the rearm inside the
            // flush below doesn't abort the very task running it.
            inner.timer.lock().unwrap().take();
            let collector = MetricCollector { inner };
            // Delivery failures were already logged by the dispatcher, and
            // a timer-driven flush has no caller to surface them to.
            let _ = collector.flush().await;
        });
        let mut timer = self.inner.timer.lock().unwrap();
        if let Some(stale) = timer.replace(task) {
            stale.abort();
        }
    }

    /// Drain the accumulated records and submit them to the transport.
    ///
    /// The map is cleared before the transport call starts, so observations
    /// added while a flush is in flight land in the next cycle rather than
    /// being lost or double-counted. In automatic mode (and only while not
    /// stopped) the flush timer is rearmed here. An empty snapshot resolves
    /// successfully without contacting the transport.
    ///
    /// A failed flush surfaces the transport error with the cycle's records
    /// already dropped; delivery is not retried.
    pub async fn flush(&self) -> Result<(), MetricsError> {
        let records: Vec<MetricRecord> = {
            let mut map = self.inner.records.lock().unwrap();
            map.drain(..).map(|(_, record)| record).collect()
        };
        if self.inner.automatic && !self.inner.stopped.load(Ordering::SeqCst) {
            self.rearm_flush_timer();
        }
        if records.is_empty() {
            return Ok(());
        }
        self.inner.dispatcher.send_metrics(records).await
    }

    /// Stop automatic collection and perform one final flush, propagating
    /// its outcome.
    ///
    /// Idempotent: once stopped, later calls return immediately with no
    /// side effects. Cancels only the recurring timer — a flush already in
    /// flight runs to completion. There is no way to restart a stopped
    /// collector; construct a new one instead.
    pub async fn stop(&self) -> Result<(), MetricsError> {
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(timer) = self.inner.timer.lock().unwrap().take() {
            timer.abort();
        }
        tracing::info!(
            namespace = %self.inner.namespace,
            "stopping metric collector, flushing remaining metrics"
        );
        self.flush().await
    }
}

impl fmt::Debug for MetricCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricCollector")
            .field("namespace", &self.inner.namespace)
            .field("automatic", &self.inner.automatic)
            .field("stopped", &self.inner.stopped.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

fn validate_observation(observation: &Observation) -> Result<(), ValidationError> {
    let mut errors = ValidationError::builder();
    if observation.name.is_empty() {
        errors.invalid_mut("metric name must not be empty");
    }
    if let ObservedValue::Sampled(samples) = &observation.value {
        if samples.is_empty() {
            errors.invalid_mut("a sampled value must carry at least one sample");
        }
    }
    errors.build()
}

//! Operation counters.
//!
//! Services report through the [`CounterSink`] trait; production wiring uses
//! [`PrometheusCounterSink`] and tests use [`RecordingCounterSink`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use prometheus::{IntCounterVec, Opts, Registry, TextEncoder};

/// Names of the counters bumped by the cake service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterName {
    FindAll,
    FindById,
    Save,
    Update,
    Delete,
}

impl CounterName {
    pub const ALL: [CounterName; 5] = [
        CounterName::FindAll,
        CounterName::FindById,
        CounterName::Save,
        CounterName::Update,
        CounterName::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CounterName::FindAll => "find_all",
            CounterName::FindById => "find_by_id",
            CounterName::Save => "save",
            CounterName::Update => "update",
            CounterName::Delete => "delete",
        }
    }
}

impl fmt::Display for CounterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget sink for named occurrence counters.
pub trait CounterSink: Send + Sync {
    fn increment(&self, name: CounterName);
}

/// Prometheus-backed sink: one `IntCounterVec` labelled by counter name.
pub struct PrometheusCounterSink {
    operations: IntCounterVec,
}

impl PrometheusCounterSink {
    /// Register `<namespace>_cake_operations_total` on `registry`.
    pub fn new(registry: &Registry, namespace: &str) -> prometheus::Result<Self> {
        let operations = IntCounterVec::new(
            Opts::new("cake_operations_total", "Completed cake service operations by counter name")
                .namespace(namespace),
            &["counter"],
        )?;
        registry.register(Box::new(operations.clone()))?;
        // pre-create every series so scrapes show zeroes before first use
        for name in CounterName::ALL {
            operations.with_label_values(&[name.as_str()]);
        }
        Ok(Self { operations })
    }

    pub fn get(&self, name: CounterName) -> u64 {
        self.operations.with_label_values(&[name.as_str()]).get()
    }
}

impl CounterSink for PrometheusCounterSink {
    fn increment(&self, name: CounterName) {
        self.operations.with_label_values(&[name.as_str()]).inc();
    }
}

/// In-memory sink that remembers every increment.
#[derive(Default)]
pub struct RecordingCounterSink {
    counts: Mutex<HashMap<CounterName, u64>>,
}

impl RecordingCounterSink {
    pub fn count(&self, name: CounterName) -> u64 {
        self.counts
            .lock()
            .map(|c| c.get(&name).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.lock().map(|c| c.values().sum()).unwrap_or(0)
    }
}

impl CounterSink for RecordingCounterSink {
    fn increment(&self, name: CounterName) {
        if let Ok(mut counts) = self.counts.lock() {
            *counts.entry(name).or_insert(0) += 1;
        }
    }
}

/// Render a registry in the Prometheus text exposition format.
pub fn encode_metrics(registry: &Registry) -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    Ok(encoder.encode_to_string(&metric_families)?)
}

use serde::Serialize;
use std::sync::Mutex;

/// Running totals of classification cycles.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub classified: usize,
    /// Classified events whose label is outside the known vocabulary.
    pub unrecognized: usize,
    pub failed: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_classified(&self, recognized: bool) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.classified += 1;
            if !recognized {
                metrics.unrecognized += 1;
            }
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failed += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

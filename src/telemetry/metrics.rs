//! Metrics
//!
//! Grant store metrics collection interfaces and implementations.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// Metric labels.
pub type MetricLabels = HashMap<String, String>;

/// Grant store metrics interface.
pub trait GrantStoreMetrics: Send + Sync {
    /// Record a newly minted grant.
    fn record_grant_created(&self, grant_type: &str);

    /// Record a write under a caller-supplied handle.
    fn record_grant_stored(&self, grant_type: &str);

    /// Record a lookup by handle.
    fn record_lookup(&self, grant_type: &str, found: bool);

    /// Record a payload that could not be deserialized.
    fn record_deserialization_failure(&self, grant_type: &str);

    /// Record a handle that resolved to a grant of another type.
    fn record_type_mismatch(&self, expected: &str, actual: &str);

    /// Record removed grants.
    fn record_grants_removed(&self, grant_type: &str, count: u64);

    /// Record a legacy record upgraded on read.
    fn record_migration(&self, grant_type: &str, from_version: u32, persisted: bool);
}

/// No-op metrics implementation.
pub struct NoOpMetrics;

impl GrantStoreMetrics for NoOpMetrics {
    fn record_grant_created(&self, _grant_type: &str) {}
    fn record_grant_stored(&self, _grant_type: &str) {}
    fn record_lookup(&self, _grant_type: &str, _found: bool) {}
    fn record_deserialization_failure(&self, _grant_type: &str) {}
    fn record_type_mismatch(&self, _expected: &str, _actual: &str) {}
    fn record_grants_removed(&self, _grant_type: &str, _count: u64) {}
    fn record_migration(&self, _grant_type: &str, _from_version: u32, _persisted: bool) {}
}

/// No-op metrics singleton.
pub fn no_op_metrics() -> NoOpMetrics {
    NoOpMetrics
}

/// Metric entry for in-memory storage.
#[derive(Debug, Clone)]
pub struct MetricEntry {
    pub name: String,
    pub value: f64,
    pub labels: MetricLabels,
    pub timestamp: i64,
}

/// In-memory metrics for testing.
#[derive(Default)]
pub struct InMemoryMetrics {
    entries: Mutex<Vec<MetricEntry>>,
}

impl InMemoryMetrics {
    /// Create new in-memory metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded entries.
    pub fn get_entries(&self) -> Vec<MetricEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Get entries by name.
    pub fn get_entries_by_name(&self, name: &str) -> Vec<MetricEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Sum of values recorded under a name.
    pub fn total(&self, name: &str) -> f64 {
        self.get_entries_by_name(name).iter().map(|e| e.value).sum()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    fn record(&self, name: &str, value: f64, labels: MetricLabels) {
        self.entries.lock().unwrap().push(MetricEntry {
            name: name.to_string(),
            value,
            labels,
            timestamp: Utc::now().timestamp_millis(),
        });
    }
}

fn grant_type_labels(grant_type: &str) -> MetricLabels {
    let mut labels = MetricLabels::new();
    labels.insert("grant_type".to_string(), grant_type.to_string());
    labels
}

impl GrantStoreMetrics for InMemoryMetrics {
    fn record_grant_created(&self, grant_type: &str) {
        self.record("grants_created_total", 1.0, grant_type_labels(grant_type));
    }

    fn record_grant_stored(&self, grant_type: &str) {
        self.record("grants_stored_total", 1.0, grant_type_labels(grant_type));
    }

    fn record_lookup(&self, grant_type: &str, found: bool) {
        let mut labels = grant_type_labels(grant_type);
        labels.insert("found".to_string(), found.to_string());
        self.record("grant_lookups_total", 1.0, labels);
    }

    fn record_deserialization_failure(&self, grant_type: &str) {
        self.record(
            "grant_deserialization_failures_total",
            1.0,
            grant_type_labels(grant_type),
        );
    }

    fn record_type_mismatch(&self, expected: &str, actual: &str) {
        let mut labels = grant_type_labels(expected);
        labels.insert("actual".to_string(), actual.to_string());
        self.record("grant_type_mismatches_total", 1.0, labels);
    }

    fn record_grants_removed(&self, grant_type: &str, count: u64) {
        self.record(
            "grants_removed_total",
            count as f64,
            grant_type_labels(grant_type),
        );
    }

    fn record_migration(&self, grant_type: &str, from_version: u32, persisted: bool) {
        let mut labels = grant_type_labels(grant_type);
        labels.insert("from_version".to_string(), from_version.to_string());
        labels.insert("persisted".to_string(), persisted.to_string());
        self.record("grant_migrations_total", 1.0, labels);
    }
}

/// Create in-memory metrics for testing.
pub fn create_in_memory_metrics() -> InMemoryMetrics {
    InMemoryMetrics::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_op_metrics() {
        let metrics = no_op_metrics();
        metrics.record_grant_created("refresh_token");
        metrics.record_lookup("refresh_token", false);
        metrics.record_grants_removed("refresh_token", 3);
    }

    #[test]
    fn test_in_memory_metrics() {
        let metrics = InMemoryMetrics::new();

        metrics.record_grant_created("refresh_token");
        metrics.record_lookup("refresh_token", true);
        metrics.record_grants_removed("refresh_token", 3);

        assert_eq!(metrics.get_entries().len(), 3);
        assert_eq!(metrics.total("grants_removed_total"), 3.0);

        let lookups = metrics.get_entries_by_name("grant_lookups_total");
        assert_eq!(lookups[0].labels.get("found"), Some(&"true".to_string()));
    }

    #[test]
    fn test_clear_entries() {
        let metrics = InMemoryMetrics::new();
        metrics.record_deserialization_failure("refresh_token");

        assert!(!metrics.get_entries().is_empty());
        metrics.clear();
        assert!(metrics.get_entries().is_empty());
    }
}

//! Prometheus-backed counters and the snapshot the CLI prints in JSON output.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes only the counters relevant to volume maintenance and identity resolution.

use std::sync::Arc;

use prometheus::{IntCounterVec, Opts, Registry};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

const VOLUME_OPERATIONS: &str = "volume_operations_total";
const CAPACITY_CHECKS: &str = "capacity_checks_total";
const IDENTITY_RESOLUTIONS: &str = "identity_resolutions_total";

/// Prometheus-backed metrics registry shared by the worker components.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    #[cfg_attr(not(test), allow(dead_code))]
    registry: Registry,
    volume_operations_total: IntCounterVec,
    capacity_checks_total: IntCounterVec,
    identity_resolutions_total: IntCounterVec,
}

/// Snapshot of selected counters for CLI output and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Successful volume operations (initialize and clean).
    pub volume_operations_ok: u64,
    /// Failed volume operations.
    pub volume_operations_failed: u64,
    /// Capacity checks that classified the disk as within budget.
    pub capacity_ok: u64,
    /// Capacity checks that classified the disk as full.
    pub capacity_full: u64,
    /// Capacity checks that failed to measure.
    pub capacity_unknown: u64,
    /// Successful identity resolutions.
    pub identity_resolved: u64,
    /// Failed identity resolutions.
    pub identity_failed: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let volume_operations_total = counter_vec(
            &registry,
            VOLUME_OPERATIONS,
            "Volume maintenance operations by operation and status",
            &["operation", "status"],
        )?;
        let capacity_checks_total = counter_vec(
            &registry,
            CAPACITY_CHECKS,
            "Disk capacity checks by classification",
            &["state"],
        )?;
        let identity_resolutions_total = counter_vec(
            &registry,
            IDENTITY_RESOLUTIONS,
            "Identity resolution attempts by outcome",
            &["outcome"],
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                volume_operations_total,
                capacity_checks_total,
                identity_resolutions_total,
            }),
        })
    }

    /// Count a volume operation (`initialize`, `clean`) with its status (`ok`, `failed`, `skipped`).
    pub fn inc_volume_operation(&self, operation: &str, status: &str) {
        self.inner
            .volume_operations_total
            .with_label_values(&[operation, status])
            .inc();
    }

    /// Count a capacity check by its classification (`ok`, `full`, `unknown`).
    pub fn inc_capacity_check(&self, state: &str) {
        self.inner
            .capacity_checks_total
            .with_label_values(&[state])
            .inc();
    }

    /// Count an identity resolution by outcome (`resolved`, `not_found`, `local_agent`, `cluster_query`).
    pub fn inc_identity_resolution(&self, outcome: &str) {
        self.inner
            .identity_resolutions_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Take a point-in-time snapshot of the counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let volumes = &self.inner.volume_operations_total;
        let sum_status = |status: &str| {
            ["initialize", "clean"]
                .iter()
                .map(|operation| volumes.with_label_values(&[*operation, status]).get())
                .sum::<u64>()
        };
        let capacity = |state: &str| {
            self.inner
                .capacity_checks_total
                .with_label_values(&[state])
                .get()
        };
        let identity = &self.inner.identity_resolutions_total;
        let identity_failed = ["not_found", "local_agent", "cluster_query"]
            .iter()
            .map(|outcome| identity.with_label_values(&[*outcome]).get())
            .sum::<u64>();

        MetricsSnapshot {
            volume_operations_ok: sum_status("ok"),
            volume_operations_failed: sum_status("failed"),
            capacity_ok: capacity("ok"),
            capacity_full: capacity("full"),
            capacity_unknown: capacity("unknown"),
            identity_resolved: identity.with_label_values(&["resolved"]).get(),
            identity_failed,
        }
    }
}

fn counter_vec(
    registry: &Registry,
    name: &'static str,
    help: &str,
    labels: &[&str],
) -> Result<IntCounterVec> {
    let collector = IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::Counter { name, source })?;
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::Counter { name, source })?;
    Ok(collector)
}

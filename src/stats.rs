use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters behind `GET /metrics`.
#[derive(Default)]
pub struct PredictionStats {
    total: AtomicU64,
    rejected: AtomicU64,
    logins: AtomicU64,
    failed_logins: AtomicU64,
    by_label: DashMap<String, u64>,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct StatsSnapshot {
    pub predictions_total: u64,
    pub predictions_rejected: u64,
    pub logins: u64,
    pub failed_logins: u64,
    pub by_label: BTreeMap<String, u64>,
}

impl PredictionStats {
    pub fn record_prediction(&self, label: &str) {
        self.total.fetch_add(1, Ordering::Relaxed);
        *self.by_label.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_login(&self, success: bool) {
        if success {
            self.logins.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_logins.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            predictions_total: self.total.load(Ordering::Relaxed),
            predictions_rejected: self.rejected.load(Ordering::Relaxed),
            logins: self.logins.load(Ordering::Relaxed),
            failed_logins: self.failed_logins.load(Ordering::Relaxed),
            by_label: self
                .by_label
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
        }
    }
}

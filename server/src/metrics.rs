// Synthesis counters and the /metrics payload

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug)]
pub struct SynthesisMetrics {
    synthesis_count: AtomicU64,
    error_count: AtomicU64,
    total_synthesis_ms: AtomicU64,
    total_lock_wait_ms: AtomicU64,
    min_synthesis_ms: AtomicU64,
    max_synthesis_ms: AtomicU64,
}

impl SynthesisMetrics {
    pub fn new() -> Self {
        Self {
            synthesis_count: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            total_synthesis_ms: AtomicU64::new(0),
            total_lock_wait_ms: AtomicU64::new(0),
            min_synthesis_ms: AtomicU64::new(u64::MAX),
            max_synthesis_ms: AtomicU64::new(0),
        }
    }

    pub fn record_synthesis(&self, synthesis_ms: u64, lock_wait_ms: u64) {
        self.synthesis_count.fetch_add(1, Ordering::Relaxed);
        self.total_synthesis_ms.fetch_add(synthesis_ms, Ordering::Relaxed);
        self.total_lock_wait_ms.fetch_add(lock_wait_ms, Ordering::Relaxed);
        self.min_synthesis_ms.fetch_min(synthesis_ms, Ordering::Relaxed);
        self.max_synthesis_ms.fetch_max(synthesis_ms, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let count = self.synthesis_count.load(Ordering::Relaxed);
        let total = self.total_synthesis_ms.load(Ordering::Relaxed);
        let wait = self.total_lock_wait_ms.load(Ordering::Relaxed);
        let min = self.min_synthesis_ms.load(Ordering::Relaxed);

        let avg = |sum: u64| if count == 0 { 0.0 } else { sum as f64 / count as f64 };

        MetricsSnapshot {
            synthesis_count: count,
            error_count: self.error_count.load(Ordering::Relaxed),
            avg_synthesis_ms: avg(total),
            avg_lock_wait_ms: avg(wait),
            min_synthesis_ms: if min == u64::MAX { 0 } else { min },
            max_synthesis_ms: self.max_synthesis_ms.load(Ordering::Relaxed),
        }
    }
}

impl Default for SynthesisMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub synthesis_count: u64,
    pub error_count: u64,
    pub avg_synthesis_ms: f64,
    pub avg_lock_wait_ms: f64,
    pub min_synthesis_ms: u64,
    pub max_synthesis_ms: u64,
}

#[derive(Serialize)]
pub struct SystemMetrics {
    pub cpu_usage_percent: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub uptime_seconds: u64,
}

impl SystemMetrics {
    pub fn collect(uptime_seconds: u64) -> Self {
        let mut system = sysinfo::System::new();
        system.refresh_cpu();
        system.refresh_memory();

        Self {
            cpu_usage_percent: system.global_cpu_info().cpu_usage(),
            memory_used_mb: system.used_memory() / 1024 / 1024,
            memory_total_mb: system.total_memory() / 1024 / 1024,
            uptime_seconds,
        }
    }
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub timestamp: DateTime<Utc>,
    pub system: SystemMetrics,
    pub synthesis: MetricsSnapshot,
}

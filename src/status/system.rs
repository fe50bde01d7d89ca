//! CPU and memory sampling for the server-status endpoint.

use sysinfo::System;

/// A point-in-time usage sample, both values in percent.
#[derive(Debug, Clone, Copy)]
pub struct UsageSample {
    pub cpu_usage: f32,
    pub memory_usage: f32,
}

/// Sample global CPU and memory usage.
///
/// CPU usage needs two refreshes separated by the minimum update interval
/// to produce a meaningful delta.
pub async fn sample() -> UsageSample {
    let mut sys = System::new();

    sys.refresh_cpu_usage();
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_cpu_usage();
    sys.refresh_memory();

    let cpu_usage = sys.global_cpu_usage();
    let total = sys.total_memory();
    let memory_usage = if total == 0 {
        0.0
    } else {
        (sys.used_memory() as f32 / total as f32) * 100.0
    };

    UsageSample {
        cpu_usage,
        memory_usage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sample_is_in_range() {
        let usage = sample().await;
        assert!(usage.cpu_usage >= 0.0);
        assert!((0.0..=100.0).contains(&usage.memory_usage));
    }
}

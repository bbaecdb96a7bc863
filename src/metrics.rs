//! Prometheus metrics for monitoring
//!
//! Counters and gauges for the watch loop and relaunch path.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Counter metric (monotonically increasing)
pub struct Counter {
    value: AtomicU64,
    name: &'static str,
    help: &'static str,
}

impl Counter {
    /// Create a new counter
    pub fn new(name: &'static str, help: &'static str) -> Self {
        Self {
            value: AtomicU64::new(0),
            name,
            help,
        }
    }

    /// Increment by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Format as Prometheus metric
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP {} {}\n# TYPE {} counter\n{} {}\n",
            self.name, self.help, self.name, self.name, self.get()
        )
    }
}

/// Gauge metric (can go up or down)
pub struct Gauge {
    value: AtomicI64,
    name: &'static str,
    help: &'static str,
}

impl Gauge {
    /// Create a new gauge
    pub fn new(name: &'static str, help: &'static str) -> Self {
        Self {
            value: AtomicI64::new(0),
            name,
            help,
        }
    }

    /// Set value
    pub fn set(&self, val: i64) {
        self.value.store(val, Ordering::Relaxed);
    }

    /// Get current value
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Format as Prometheus metric
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP {} {}\n# TYPE {} gauge\n{} {}\n",
            self.name, self.help, self.name, self.name, self.get()
        )
    }
}

/// Standard Surge metrics
pub mod standard {
    use super::*;
    use std::sync::LazyLock;

    pub static WATCH_CYCLES: LazyLock<Counter> = LazyLock::new(|| {
        Counter::new("surge_watch_cycles_total", "Total membership watch cycles run")
    });

    pub static SCALE_UP_EVENTS: LazyLock<Counter> = LazyLock::new(|| {
        Counter::new("surge_scale_up_events_total", "Total scale-up events detected")
    });

    pub static SCALE_DOWN_EVENTS: LazyLock<Counter> = LazyLock::new(|| {
        Counter::new("surge_scale_down_events_total", "Total scale-down events detected")
    });

    pub static RELAUNCHES_SPAWNED: LazyLock<Counter> = LazyLock::new(|| {
        Counter::new("surge_relaunches_spawned_total", "Total restart commands spawned")
    });

    pub static CLUSTER_SIZE: LazyLock<Gauge> = LazyLock::new(|| {
        Gauge::new("surge_cluster_size", "Number of nodes in the current membership")
    });
}

/// Gather all standard metrics in Prometheus text format
pub fn gather_metrics() -> String {
    let mut output = String::new();

    output.push_str(&standard::WATCH_CYCLES.to_prometheus());
    output.push_str(&standard::SCALE_UP_EVENTS.to_prometheus());
    output.push_str(&standard::SCALE_DOWN_EVENTS.to_prometheus());
    output.push_str(&standard::RELAUNCHES_SPAWNED.to_prometheus());
    output.push_str(&standard::CLUSTER_SIZE.to_prometheus());

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let counter = Counter::new("test_counter", "Test counter");
        assert_eq!(counter.get(), 0);

        counter.inc();
        counter.inc();
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_gauge() {
        let gauge = Gauge::new("test_gauge", "Test gauge");
        assert_eq!(gauge.get(), 0);

        gauge.set(4);
        assert_eq!(gauge.get(), 4);

        gauge.set(-1);
        assert_eq!(gauge.get(), -1);
    }

    #[test]
    fn test_prometheus_format() {
        let counter = Counter::new("test_total", "A test");
        counter.inc();

        let text = counter.to_prometheus();
        assert!(text.contains("# TYPE test_total counter"));
        assert!(text.contains("test_total 1"));
    }

    #[test]
    fn test_gather_includes_standard_metrics() {
        let text = gather_metrics();
        assert!(text.contains("surge_watch_cycles_total"));
        assert!(text.contains("surge_cluster_size"));
    }
}

//! Tick timing and structured logging setup.

use ruleweaver_data::PopulationStats;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Ticks between two summary log lines.
pub const SUMMARY_INTERVAL: u64 = 100;

/// Running timing and count metrics for the tick driver.
#[derive(Debug)]
pub struct TickMetrics {
    tick_count: u64,
    population: usize,
    resources: usize,
    total_duration: Duration,
    slowest_tick: Duration,
    counters: BTreeMap<&'static str, u64>,
    start_time: Instant,
}

impl Default for TickMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TickMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: 0,
            population: 0,
            resources: 0,
            total_duration: Duration::ZERO,
            slowest_tick: Duration::ZERO,
            counters: BTreeMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&mut self, tick: u64, duration: Duration, stats: &PopulationStats) {
        self.tick_count += 1;
        self.population = stats.population;
        self.resources = stats.resources;
        self.total_duration += duration;
        self.slowest_tick = self.slowest_tick.max(duration);

        if tick > 0 && tick % SUMMARY_INTERVAL == 0 {
            tracing::info!(
                tick,
                population = stats.population,
                resources = stats.resources,
                herbivores = stats.counts.herbivores,
                carnivores = stats.counts.carnivores,
                traders = stats.counts.traders,
                max_generation = stats.max_generation,
                avg_tick_us = self.average_tick().as_micros() as u64,
                slowest_tick_us = self.slowest_tick.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    /// Increments a named counter.
    pub fn increment_counter(&mut self, name: &'static str) {
        self.add_to_counter(name, 1);
    }

    pub fn add_to_counter(&mut self, name: &'static str, amount: u64) {
        *self.counters.entry(name).or_insert(0) += amount;
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.population
    }

    #[must_use]
    pub fn average_tick(&self) -> Duration {
        if self.tick_count == 0 {
            Duration::ZERO
        } else {
            let nanos = self.total_duration.as_nanos() / u128::from(self.tick_count);
            Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
        }
    }

    /// Wall-clock time since the metrics were created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default
/// `info` filter. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = TickMetrics::new();
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.average_tick(), Duration::ZERO);
    }

    #[test]
    fn test_record_tick() {
        let mut metrics = TickMetrics::new();
        let stats = PopulationStats {
            population: 12,
            ..Default::default()
        };
        metrics.record_tick(1, Duration::from_millis(4), &stats);
        metrics.record_tick(2, Duration::from_millis(8), &stats);
        assert_eq!(metrics.tick_count(), 2);
        assert_eq!(metrics.population(), 12);
        assert_eq!(metrics.average_tick(), Duration::from_millis(6));
    }

    #[test]
    fn test_average_tick_over_many_ticks() {
        let mut metrics = TickMetrics::new();
        metrics.tick_count = 1 << 32;
        metrics.total_duration = Duration::from_secs(3 << 32);
        assert_eq!(metrics.average_tick(), Duration::from_secs(3));
        metrics.tick_count = 3;
        metrics.total_duration = Duration::from_nanos(10);
        assert_eq!(metrics.average_tick(), Duration::from_nanos(3));
    }

    #[test]
    fn test_increment_counter() {
        let mut metrics = TickMetrics::new();
        metrics.increment_counter("births");
        metrics.increment_counter("births");
        assert_eq!(metrics.counter("births"), 2);
        assert_eq!(metrics.counter("hunts"), 0);
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }
}

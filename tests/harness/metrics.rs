// SPDX-License-Identifier: Apache-2.0

//! Outcome counting for abuse simulation runs.

use std::collections::HashMap;

/// How the gate handled one simulated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    RateLimited,
    ValidationFailed,
    CooldownBlocked,
    StoreFailed,
}

/// Collects per-outcome and per-IP counts during a simulated flood.
#[derive(Debug, Default)]
pub struct FloodMetrics {
    outcomes: HashMap<Outcome, usize>,
    requests_per_ip: HashMap<String, usize>,
}

impl FloodMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome, ip: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_ip.entry(ip.to_string()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn unique_ips(&self) -> usize {
        self.requests_per_ip.len()
    }

    /// Ratio of requests that did not get through, 0.0 to 1.0.
    pub fn block_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Allowed)) as f64 / total as f64
    }
}

impl std::fmt::Display for FloodMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Flood Report ===")?;
        writeln!(f, "Total:             {}", self.total())?;
        writeln!(f, "Allowed:           {}", self.count(Outcome::Allowed))?;
        writeln!(f, "Rate Limited:      {}", self.count(Outcome::RateLimited))?;
        writeln!(f, "Validation Failed: {}", self.count(Outcome::ValidationFailed))?;
        writeln!(f, "Cooldown Blocked:  {}", self.count(Outcome::CooldownBlocked))?;
        writeln!(f, "Store Failed:      {}", self.count(Outcome::StoreFailed))?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate() * 100.0)?;
        writeln!(f, "Unique IPs:        {}", self.unique_ips())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_block_rate() {
        let mut metrics = FloodMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Allowed, "10.0.0.1");
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimited, "10.0.0.1");
        }

        assert_eq!(metrics.total(), 10);
        assert_eq!(metrics.unique_ips(), 1);
        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }
}

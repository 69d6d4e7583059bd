//! Summary statistics over per-trial timings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Aggregate statistics of a timing series, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    /// Number of samples
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    /// Sum of all samples
    pub sum: f64,
    /// Smallest sample
    pub min: f64,
    /// 25th percentile
    pub q25: f64,
    /// Median
    pub q50: f64,
    /// 75th percentile
    pub q75: f64,
    /// Largest sample
    pub max: f64,
}

impl TimingStats {
    /// Compute statistics over `samples`. Returns `None` for an empty series.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();
        let mean = sum / count as f64;
        let variance = sorted
            .iter()
            .map(|sample| {
                let delta = sample - mean;
                delta * delta
            })
            .sum::<f64>()
            / count as f64;

        Some(Self {
            count,
            mean,
            std: variance.sqrt(),
            sum,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.50),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

/// Quantile of an ascending slice with linear interpolation between the two
/// closest ranks (`q * (n - 1)`), the default numpy method.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

impl fmt::Display for TimingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TIME (in seconds)")?;
        writeln!(f, "  AVG: {}", self.mean)?;
        writeln!(f, "  STD: {}", self.std)?;
        writeln!(f, "  TOT: {}", self.sum)?;
        writeln!(f, "  MIN: {}", self.min)?;
        writeln!(f, "  Q25: {}", self.q25)?;
        writeln!(f, "  Q50: {}", self.q50)?;
        writeln!(f, "  Q75: {}", self.q75)?;
        write!(f, "  MAX: {}", self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_empty_series() {
        assert!(TimingStats::from_samples(&[]).is_none());
    }

    #[test]
    fn test_single_sample() {
        let stats = TimingStats::from_samples(&[0.5]).unwrap();
        assert_eq!(stats.count, 1);
        assert!(approx(stats.mean, 0.5));
        assert!(approx(stats.std, 0.0));
        assert!(approx(stats.q25, 0.5));
        assert!(approx(stats.max, 0.5));
    }

    #[test]
    fn test_known_values() {
        // numpy: mean 2.5, std 1.118033988749895, q25 1.75, q50 2.5, q75 3.25
        let stats = TimingStats::from_samples(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert!(approx(stats.mean, 2.5));
        assert!(approx(stats.std, 1.118033988749895));
        assert!(approx(stats.sum, 10.0));
        assert!(approx(stats.min, 1.0));
        assert!(approx(stats.q25, 1.75));
        assert!(approx(stats.q50, 2.5));
        assert!(approx(stats.q75, 3.25));
        assert!(approx(stats.max, 4.0));
    }

    #[test]
    fn test_ordering_invariants() {
        let samples: Vec<f64> = (0..37).map(|i| ((i * 7919) % 101) as f64 / 1000.0).collect();
        let stats = TimingStats::from_samples(&samples).unwrap();
        assert!(stats.min <= stats.q25);
        assert!(stats.q25 <= stats.q50);
        assert!(stats.q50 <= stats.q75);
        assert!(stats.q75 <= stats.max);
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
    }

    #[test]
    fn test_display_block() {
        let stats = TimingStats::from_samples(&[1.0, 1.0]).unwrap();
        let text = stats.to_string();
        assert!(text.starts_with("TIME (in seconds)\n  AVG: 1\n"));
        assert!(text.contains("  Q75: 1\n"));
        assert!(text.ends_with("  MAX: 1"));
    }
}

//! Travel-time summary statistics

use serde::{Deserialize, Serialize};

/// Count, mean, standard deviation, min, quartiles and max of a sample.
///
/// Quartiles use linear interpolation between order statistics, and the
/// standard deviation is the sample (n - 1) estimate, absent for a single
/// sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelTimeSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Linear-interpolated quantile of sorted data, `p` in `[0, 1]`
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

impl TravelTimeSummary {
    /// Summarize `samples`; `None` when there are no samples.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let min = sorted[0];
        let max = sorted[n - 1];
        // Rounding can push the mean of identical values just outside [min, max]
        let mean = (sorted.iter().sum::<f64>() / n as f64).clamp(min, max);
        let std_dev = (n > 1).then(|| {
            let ss: f64 = sorted.iter().map(|t| (t - mean) * (t - mean)).sum();
            (ss / (n - 1) as f64).sqrt()
        });

        Some(Self {
            count: n,
            mean,
            std_dev,
            min,
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max,
        })
    }
}

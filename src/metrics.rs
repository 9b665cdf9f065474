use serde::Serialize;

/// Median of unsorted samples; the mean of the two middle values when the count is even.
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Cost figures used by the financial report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostSummary {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    /// Smallest non-zero cost; 0 when no cost is positive.
    pub min_positive: f64,
}

/// Summary over all costs. An empty set yields zeros.
pub fn cost_summary(costs: &[f64]) -> CostSummary {
    let Some(median) = median(costs) else {
        return CostSummary {
            count: 0,
            total: 0.0,
            mean: 0.0,
            median: 0.0,
            max: 0.0,
            min_positive: 0.0,
        };
    };
    let total: f64 = costs.iter().sum();
    CostSummary {
        count: costs.len(),
        total,
        mean: total / costs.len() as f64,
        median,
        max: costs.iter().copied().fold(f64::MIN, f64::max),
        min_positive: costs
            .iter()
            .copied()
            .filter(|c| *c > 0.0)
            .min_by(f64::total_cmp)
            .unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_and_even_counts() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[4.0]), Some(4.0));
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn cost_summary_skips_zero_for_minimum() {
        let s = cost_summary(&[0.0, 250_000.0, 80_000.0, 150_000.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.total, 480_000.0);
        assert_eq!(s.mean, 120_000.0);
        assert_eq!(s.median, 115_000.0);
        assert_eq!(s.max, 250_000.0);
        assert_eq!(s.min_positive, 80_000.0);
    }

    #[test]
    fn cost_summary_of_nothing_is_zero() {
        let s = cost_summary(&[]);
        assert_eq!((s.count, s.total, s.max, s.min_positive), (0, 0.0, 0.0, 0.0));
        assert_eq!(cost_summary(&[0.0]).min_positive, 0.0);
    }
}

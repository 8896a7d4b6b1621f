use crate::libs::jaccard::JaccardIndex;
use crate::libs::pair::PairRecord;
use crate::libs::params::DistParams;

/// Min/max distance estimate for a pair of contig ends
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceEstimate {
    pub min_dist: i64,
    pub max_dist: i64,
    pub jaccard: f64,
}

/// Quantile of sorted values, interpolating linearly between the two
/// bracketing order statistics (rank `q * (n - 1)`).
///
/// ```
/// use bcdist::libs::estimate::quantile;
/// let values = [10.0, 20.0, 30.0, 40.0];
/// assert_eq!(quantile(&values, 0.0), 10.0);
/// assert_eq!(quantile(&values, 0.5), 25.0);
/// assert_eq!(quantile(&values, 1.0), 40.0);
/// ```
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=1.0).contains(&q));

    let rank = q * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;

    sorted[low] + (rank - low as f64) * (sorted[high] - sorted[low])
}

/// Estimates the distance between two contig ends from the intra-contig
/// samples with a similar Jaccard index.
///
/// Returns `None` when no bound is available: the index is empty, the pair
/// never met the requirements for estimation, or no sample falls in the window.
pub fn estimate_distance(
    rec: &PairRecord,
    index: &JaccardIndex,
    params: &DistParams,
) -> Option<DistanceEstimate> {
    if index.is_empty() {
        return None;
    }

    let jaccard = rec.jaccard()?;
    debug_assert!((0.0..=1.0).contains(&jaccard), "jaccard {}", jaccard);

    let mut distances: Vec<f64> = index
        .window(jaccard, params.dist_bin_size)
        .iter()
        .map(|(_, sample)| sample.distance as f64)
        .collect();
    if distances.is_empty() {
        return None;
    }
    distances.sort_by(|a, b| a.total_cmp(b));

    // 1st and 99th percentiles as the bounds
    Some(DistanceEstimate {
        min_dist: quantile(&distances, 0.01).floor() as i64,
        max_dist: quantile(&distances, 0.99).ceil() as i64,
        jaccard,
    })
}

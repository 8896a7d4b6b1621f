use crate::libs::sample::{DistSample, DistSampleMap};

// Slack on both window edges for rounding in the key subtraction
const EDGE_TOLERANCE: f64 = 1e-12;

/// Distance samples ordered by the Jaccard index of their head/tail barcodes.
///
/// Several samples may share the same key; all of them are kept. Entries with
/// equal keys are ordered by the sample itself, so the index built from the
/// same samples is identical regardless of the order they arrive in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JaccardIndex {
    entries: Vec<(f64, DistSample)>,
}

impl JaccardIndex {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_samples(samples: &DistSampleMap) -> Self {
        samples.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, DistSample)> {
        self.entries.iter()
    }

    /// Entries whose keys lie within `half_width` of `key`, on both sides.
    ///
    /// The search starts at the insertion point of `key` and walks outward
    /// while the key distance stays within the bin.
    ///
    /// ```
    /// use bcdist::libs::jaccard::JaccardIndex;
    /// use bcdist::libs::sample::DistSample;
    /// let index: JaccardIndex = [(1, 4), (1, 2), (2, 2), (1, 1)]
    ///     .iter()
    ///     .map(|&(intersect, union)| DistSample {
    ///         distance: 100 * union,
    ///         barcodes_union: union,
    ///         barcodes_intersect: intersect,
    ///         ..Default::default()
    ///     })
    ///     .collect();
    /// // keys: 0.25, 0.5, 1.0, 1.0
    /// assert_eq!(index.window(0.45, 0.1).len(), 1);
    /// assert_eq!(index.window(0.9, 0.1).len(), 2);
    /// assert!(index.window(0.75, 0.1).is_empty());
    /// ```
    pub fn window(&self, key: f64, half_width: f64) -> &[(f64, DistSample)] {
        let pos = self.entries.partition_point(|(k, _)| *k < key);
        let limit = half_width + EDGE_TOLERANCE;

        let mut lower = pos;
        while lower > 0 && key - self.entries[lower - 1].0 <= limit {
            lower -= 1;
        }

        let mut upper = pos;
        while upper < self.entries.len() && self.entries[upper].0 - key <= limit {
            upper += 1;
        }

        &self.entries[lower..upper]
    }
}

impl FromIterator<DistSample> for JaccardIndex {
    fn from_iter<I: IntoIterator<Item = DistSample>>(iter: I) -> Self {
        let mut entries: Vec<(f64, DistSample)> = iter
            .into_iter()
            .map(|sample| (sample.jaccard(), sample))
            .collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sample(distance: usize, intersect: usize, union: usize) -> DistSample {
        DistSample {
            distance,
            barcodes_head: union,
            barcodes_tail: intersect,
            barcodes_union: union,
            barcodes_intersect: intersect,
        }
    }

    #[test]
    fn test_duplicate_keys_kept() {
        let mut samples = DistSampleMap::default();
        for (i, d) in [80, 90, 100, 100, 110, 120].iter().enumerate() {
            samples.insert(format!("ctg{}", i), sample(*d, 1, 2));
        }

        let index = JaccardIndex::from_samples(&samples);
        assert_eq!(index.len(), 6);
        assert!(index.iter().all(|(k, _)| *k == 0.5));

        let distances: Vec<usize> = index.iter().map(|(_, s)| s.distance).collect();
        assert_eq!(distances, vec![80, 90, 100, 100, 110, 120]);
    }

    #[test]
    fn test_order_independent() {
        let mut samples: Vec<DistSample> = (1..=30)
            .map(|i| sample(i * 7 % 50, i % 4, 4 + i % 3))
            .collect();
        let expected: JaccardIndex = samples.iter().copied().collect();

        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..5 {
            samples.shuffle(&mut rng);
            let index: JaccardIndex = samples.iter().copied().collect();
            assert_eq!(index, expected);
        }

        let keys: Vec<f64> = expected.iter().map(|(k, _)| *k).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_window() {
        // keys: 0.0, 0.2, 0.25, 0.5, 0.5, 1.0
        let index: JaccardIndex = [
            sample(10, 0, 3),
            sample(20, 1, 5),
            sample(30, 1, 4),
            sample(40, 1, 2),
            sample(50, 2, 4),
            sample(60, 3, 3),
        ]
        .into_iter()
        .collect();

        let distances = |key: f64, width: f64| -> Vec<usize> {
            index.window(key, width).iter().map(|(_, s)| s.distance).collect()
        };

        assert_eq!(distances(0.5, 0.0), vec![40, 50]);
        assert_eq!(distances(0.22, 0.05), vec![20, 30]);
        assert_eq!(distances(0.0, 0.1), vec![10]);
        assert_eq!(distances(1.0, 0.6), vec![40, 50, 60]);
        assert_eq!(distances(0.5, 1.0), vec![10, 20, 30, 40, 50, 60]);
        assert!(distances(0.75, 0.2).is_empty());
    }

    #[test]
    fn test_window_symmetric_edges() {
        // keys 3/10 and 1/2, each exactly 1/10 away from 2/5
        let index: JaccardIndex = [sample(300, 3, 10), sample(500, 1, 2), sample(900, 9, 10)]
            .into_iter()
            .collect();

        let distances: Vec<usize> = index
            .window(2.0 / 5.0, 0.1)
            .iter()
            .map(|(_, s)| s.distance)
            .collect();
        assert_eq!(distances, vec![300, 500]);

        let distances: Vec<usize> = index
            .window(3.0 / 5.0, 0.1)
            .iter()
            .map(|(_, s)| s.distance)
            .collect();
        assert_eq!(distances, vec![500]);
    }

    #[test]
    fn test_empty_index() {
        let index = JaccardIndex::new();
        assert!(index.is_empty());
        assert!(index.window(0.5, 1.0).is_empty());
    }
}

/// Thresholds shared by the sample builder, the pairwise engine and the estimator.
///
/// The set is immutable for a run and is handed to every component by reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistParams {
    /// Inclusive lower bound on barcode multiplicity
    pub min_mult: usize,
    /// Inclusive upper bound on barcode multiplicity
    pub max_mult: usize,
    /// Minimum number of read pairs supporting a barcode on a contig end
    pub min_reads: usize,
    /// Length of the head and tail regions of a contig
    pub end_length: usize,
    /// Half-width of the Jaccard window used for calibration
    pub dist_bin_size: f64,
}

impl Default for DistParams {
    fn default() -> Self {
        Self {
            min_mult: 1,
            max_mult: 100,
            min_reads: 5,
            end_length: 30000,
            dist_bin_size: 0.05,
        }
    }
}

impl DistParams {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_mult > self.max_mult {
            anyhow::bail!(
                "min_mult ({}) is larger than max_mult ({})",
                self.min_mult,
                self.max_mult
            );
        }
        if !self.dist_bin_size.is_finite() || self.dist_bin_size < 0.0 {
            anyhow::bail!("invalid bin size: {}", self.dist_bin_size);
        }
        Ok(())
    }

    /// Is a barcode touching `mult` contig ends used at all?
    pub fn accepts_multiplicity(&self, mult: usize) -> bool {
        mult >= self.min_mult && mult <= self.max_mult
    }

    /// Contigs shorter than this have no independent head and tail regions.
    pub fn min_contig_length(&self) -> usize {
        2 * self.end_length
    }

    /// Can a barcode observation on a contig end be used in distance calculations?
    ///
    /// ```
    /// use bcdist::libs::params::DistParams;
    /// let params = DistParams {
    ///     min_reads: 2,
    ///     end_length: 50,
    ///     ..Default::default()
    /// };
    /// assert!(params.valid_mapping(100, 2));
    /// assert!(!params.valid_mapping(99, 2));
    /// assert!(!params.valid_mapping(100, 1));
    /// ```
    pub fn valid_mapping(&self, contig_length: usize, pairs: usize) -> bool {
        pairs >= self.min_reads && contig_length >= self.min_contig_length()
    }
}

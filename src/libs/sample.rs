use crate::libs::barcode::{
    contig_length, multiplicity_of, BarcodeMultiplicity, BarcodeTable, ContigLengths, EndCounts,
};
use crate::libs::params::DistParams;
use fxhash::FxHashMap;
use itertools::Itertools;
use rayon::prelude::*;
use std::io::Write;

/// Records the distance between the head and tail regions of the same
/// contig along with the barcodes seen on either region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DistSample {
    /// contig length minus both end regions
    pub distance: usize,
    pub barcodes_head: usize,
    pub barcodes_tail: usize,
    pub barcodes_union: usize,
    pub barcodes_intersect: usize,
}

impl DistSample {
    /// Jaccard index of the head and tail barcode sets.
    ///
    /// ```
    /// use bcdist::libs::sample::DistSample;
    /// let sample = DistSample {
    ///     distance: 100,
    ///     barcodes_head: 3,
    ///     barcodes_tail: 2,
    ///     barcodes_union: 4,
    ///     barcodes_intersect: 1,
    /// };
    /// assert_eq!(sample.jaccard(), 0.25);
    /// ```
    pub fn jaccard(&self) -> f64 {
        debug_assert!(self.barcodes_union > 0, "sample without barcodes");
        self.barcodes_intersect as f64 / self.barcodes_union as f64
    }

    fn merge(&mut self, other: &DistSample) {
        self.distance = other.distance;
        self.barcodes_head += other.barcodes_head;
        self.barcodes_tail += other.barcodes_tail;
        self.barcodes_union += other.barcodes_union;
        self.barcodes_intersect += other.barcodes_intersect;
    }
}

/// Contig => distance sample
pub type DistSampleMap = FxHashMap<String, DistSample>;

/// Measures head/tail distances of contigs against their barcode overlap.
///
/// Barcodes are processed independently and the partial maps are merged,
/// so the result does not depend on the size of the rayon pool.
pub fn calc_dist_samples(
    table: &BarcodeTable,
    lengths: &ContigLengths,
    mult: &BarcodeMultiplicity,
    params: &DistParams,
) -> anyhow::Result<DistSampleMap> {
    let samples = table
        .par_iter()
        .try_fold(
            DistSampleMap::default,
            |mut samples, (barcode, ends)| -> anyhow::Result<DistSampleMap> {
                if params.accepts_multiplicity(multiplicity_of(mult, barcode)?) {
                    add_barcode(&mut samples, ends, lengths, params)?;
                }
                Ok(samples)
            },
        )
        .try_reduce(DistSampleMap::default, |mut acc, other| {
            for (id, sample) in other {
                acc.entry(id).or_default().merge(&sample);
            }
            Ok(acc)
        })?;

    log::debug!("{} distance samples from {} barcodes", samples.len(), table.len());

    Ok(samples)
}

fn add_barcode(
    samples: &mut DistSampleMap,
    ends: &EndCounts,
    lengths: &ContigLengths,
    params: &DistParams,
) -> anyhow::Result<()> {
    for (end, &pairs) in ends {
        if pairs < params.min_reads {
            continue;
        }

        // uniform head/tail length
        let length = contig_length(lengths, &end.id)?;
        if length < params.min_contig_length() {
            continue;
        }

        let sample = samples.entry(end.id.clone()).or_default();
        sample.distance = length - params.min_contig_length();

        if end.is_head {
            sample.barcodes_head += 1;
        } else {
            sample.barcodes_tail += 1;
        }

        // A barcode on both ends is counted once, while visiting the head
        let found_other = ends
            .get(&end.other_end())
            .is_some_and(|&other| other >= params.min_reads);

        if found_other && end.is_head {
            sample.barcodes_intersect += 1;
            sample.barcodes_union += 1;
        } else if !found_other {
            sample.barcodes_union += 1;
        }
    }

    Ok(())
}

/// Writes the samples as a TSV report, sorted by contig id.
pub fn write_dist_samples<W: Write + ?Sized>(
    writer: &mut W,
    samples: &DistSampleMap,
) -> anyhow::Result<()> {
    writeln!(
        writer,
        "contig_id\tdistance\tbarcodes_head\tbarcodes_tail\tbarcodes_union\tbarcodes_intersect"
    )?;

    for (id, sample) in samples.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            id,
            sample.distance,
            sample.barcodes_head,
            sample.barcodes_tail,
            sample.barcodes_union,
            sample.barcodes_intersect
        )?;
    }

    Ok(())
}

use crate::libs::barcode::{
    contig_length, multiplicity_of, BarcodeMultiplicity, BarcodeTable, ContigEnd, ContigLengths,
    EndCounts,
};
use crate::libs::params::DistParams;
use fxhash::FxHashMap;
use rayon::prelude::*;

/// Relative orientation of two contig ends, in the order stored in a [`PairRecords`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    HeadHead,
    HeadTail,
    TailHead,
    TailTail,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::HeadHead,
        Orientation::HeadTail,
        Orientation::TailHead,
        Orientation::TailTail,
    ];

    pub fn from_ends(head1: bool, head2: bool) -> Self {
        match (head1, head2) {
            (true, true) => Orientation::HeadHead,
            (true, false) => Orientation::HeadTail,
            (false, true) => Orientation::TailHead,
            (false, false) => Orientation::TailTail,
        }
    }

    /// Is each of the two contigs joined at its head?
    pub fn ends(self) -> (bool, bool) {
        match self {
            Orientation::HeadHead => (true, true),
            Orientation::HeadTail => (true, false),
            Orientation::TailHead => (false, true),
            Orientation::TailTail => (false, false),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::HeadHead => "HH",
            Orientation::HeadTail => "HT",
            Orientation::TailHead => "TH",
            Orientation::TailTail => "TT",
        }
    }
}

/// Shared barcode statistics for one orientation of a contig pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairRecord {
    /// distinct barcodes on the end of the first contig
    pub barcodes1: usize,
    /// distinct barcodes on the end of the second contig
    pub barcodes2: usize,
    pub barcodes_intersect: usize,
    pub barcodes_union: usize,
}

impl PairRecord {
    /// Both ends carry qualifying barcodes
    pub fn is_supported(&self) -> bool {
        self.barcodes1 > 0 && self.barcodes2 > 0
    }

    /// `None` when the pair never met the requirements for estimation
    pub fn jaccard(&self) -> Option<f64> {
        if self.barcodes_union == 0 {
            None
        } else {
            Some(self.barcodes_intersect as f64 / self.barcodes_union as f64)
        }
    }
}

/// Contig ids, the lexicographically smaller first
pub type ContigPair = (String, String);

/// One record per [`Orientation`], indexed by [`Orientation::index`]
pub type PairRecords = [PairRecord; 4];

/// Contig pair => records of all four orientations.
///
/// A contig is also paired with itself. Its HT and TH records count barcodes
/// seen on both of its ends, while HH and TT join an end to itself and never
/// share a barcode, see [`joins_end_to_itself`].
pub type PairTable = FxHashMap<ContigPair, PairRecords>;

/// Does this orientation of `pair` join a contig end to itself?
/// Such records carry no distance information.
pub fn joins_end_to_itself(pair: &ContigPair, orientation: Orientation) -> bool {
    pair.0 == pair.1 && matches!(orientation, Orientation::HeadHead | Orientation::TailTail)
}

#[derive(Debug, Default)]
struct PairCounts {
    intersect: FxHashMap<ContigPair, [usize; 4]>,
    end_barcodes: FxHashMap<ContigEnd, usize>,
}

impl PairCounts {
    fn add_barcode(
        &mut self,
        ends: &EndCounts,
        lengths: &ContigLengths,
        params: &DistParams,
    ) -> anyhow::Result<()> {
        let mut valid: Vec<&ContigEnd> = Vec::with_capacity(ends.len());
        for (end, &pairs) in ends {
            let length = contig_length(lengths, &end.id)?;
            if params.valid_mapping(length, pairs) {
                valid.push(end);
            }
        }

        for &end in &valid {
            *self.end_barcodes.entry(end.clone()).or_insert(0) += 1;
        }

        for (i, end1) in valid.iter().enumerate() {
            for (j, end2) in valid.iter().enumerate() {
                // the two ends of one contig are visited in both orders
                if i == j || end1.id > end2.id {
                    continue;
                }

                let counts = self
                    .intersect
                    .entry((end1.id.clone(), end2.id.clone()))
                    .or_insert([0; 4]);
                counts[Orientation::from_ends(end1.is_head, end2.is_head).index()] += 1;
            }
        }

        Ok(())
    }

    fn merge(mut self, other: PairCounts) -> Self {
        for (pair, counts) in other.intersect {
            let acc = self.intersect.entry(pair).or_insert([0; 4]);
            for (a, c) in acc.iter_mut().zip(counts) {
                *a += c;
            }
        }
        for (end, count) in other.end_barcodes {
            *self.end_barcodes.entry(end).or_insert(0) += count;
        }
        self
    }

    fn into_table(self) -> PairTable {
        let end_barcodes = self.end_barcodes;
        let count_of = |id: &str, is_head: bool| {
            end_barcodes
                .get(&ContigEnd::new(id, is_head))
                .copied()
                .unwrap_or(0)
        };

        self.intersect
            .into_iter()
            .map(|(pair, intersect)| {
                let records = Orientation::ALL.map(|orientation| {
                    let (head1, head2) = orientation.ends();
                    let barcodes1 = count_of(&pair.0, head1);
                    let barcodes2 = count_of(&pair.1, head2);
                    let barcodes_intersect = intersect[orientation.index()];

                    // an end without qualifying barcodes forms no record
                    if barcodes1 == 0 || barcodes2 == 0 {
                        debug_assert_eq!(barcodes_intersect, 0);
                        return PairRecord::default();
                    }

                    debug_assert!(
                        barcodes1 + barcodes2 >= barcodes_intersect,
                        "negative barcode union for {:?} {}",
                        pair,
                        orientation.as_str()
                    );
                    PairRecord {
                        barcodes1,
                        barcodes2,
                        barcodes_intersect,
                        barcodes_union: (barcodes1 + barcodes2).saturating_sub(barcodes_intersect),
                    }
                });
                (pair, records)
            })
            .collect()
    }
}

/// Counts shared barcodes for every pair of contig ends seen under one barcode.
///
/// Each barcode contributes its pairs independently; the partial counts are
/// merged before the per-end totals and unions are filled in.
pub fn calc_pair_stats(
    table: &BarcodeTable,
    lengths: &ContigLengths,
    mult: &BarcodeMultiplicity,
    params: &DistParams,
) -> anyhow::Result<PairTable> {
    let counts = table
        .par_iter()
        .try_fold(
            PairCounts::default,
            |mut counts, (barcode, ends)| -> anyhow::Result<PairCounts> {
                if params.accepts_multiplicity(multiplicity_of(mult, barcode)?) {
                    counts.add_barcode(ends, lengths, params)?;
                }
                Ok(counts)
            },
        )
        .try_reduce(PairCounts::default, |acc, other| Ok(acc.merge(other)))?;

    log::debug!(
        "{} contig pairs, {} contig ends with barcodes",
        counts.intersect.len(),
        counts.end_barcodes.len()
    );

    Ok(counts.into_table())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::barcode::{derive_multiplicity, insert_observation};

    fn build(rows: &[(&str, &str, bool, usize)]) -> BarcodeTable {
        let mut table = BarcodeTable::default();
        for &(barcode, contig, is_head, pairs) in rows {
            insert_observation(&mut table, barcode, contig, is_head, pairs);
        }
        table
    }

    fn lengths(ids: &[&str], len: usize) -> ContigLengths {
        ids.iter().map(|id| (id.to_string(), len)).collect()
    }

    fn params() -> DistParams {
        DistParams {
            min_mult: 1,
            max_mult: 100,
            min_reads: 1,
            end_length: 50,
            dist_bin_size: 0.1,
        }
    }

    fn key(a: &str, b: &str) -> ContigPair {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn test_orientation() {
        for o in Orientation::ALL {
            let (h1, h2) = o.ends();
            assert_eq!(Orientation::from_ends(h1, h2), o);
            assert_eq!(Orientation::ALL[o.index()], o);
        }
        assert_eq!(Orientation::HeadTail.as_str(), "HT");
    }

    #[test]
    fn test_head_tail_pair() -> anyhow::Result<()> {
        let table = build(&[
            ("BX1", "A", true, 2),
            ("BX1", "B", false, 2),
            ("BX2", "A", false, 2),
            ("BX3", "B", true, 2),
        ]);
        let lengths = lengths(&["A", "B"], 1000);
        let mult = derive_multiplicity(&table);

        let pairs = calc_pair_stats(&table, &lengths, &mult, &params())?;
        assert_eq!(pairs.len(), 1);

        let records = &pairs[&key("A", "B")];
        assert_eq!(
            records[Orientation::HeadTail.index()],
            PairRecord {
                barcodes1: 1,
                barcodes2: 1,
                barcodes_intersect: 1,
                barcodes_union: 1,
            }
        );
        for o in [
            Orientation::HeadHead,
            Orientation::TailHead,
            Orientation::TailTail,
        ] {
            let rec = records[o.index()];
            assert_eq!(rec.barcodes_intersect, 0);
            assert_eq!(rec.barcodes_union, 2);
            assert_eq!(rec.jaccard(), Some(0.0));
        }

        Ok(())
    }

    #[test]
    fn test_unsupported_ends_are_empty() -> anyhow::Result<()> {
        let table = build(&[("BX1", "B", true, 2), ("BX1", "A", true, 2)]);
        let lengths = lengths(&["A", "B"], 1000);
        let mult = derive_multiplicity(&table);

        let pairs = calc_pair_stats(&table, &lengths, &mult, &params())?;
        let records = &pairs[&key("A", "B")];
        assert_eq!(records[Orientation::HeadHead.index()].barcodes_union, 1);
        assert!(records[Orientation::HeadHead.index()].is_supported());
        for o in [
            Orientation::HeadTail,
            Orientation::TailHead,
            Orientation::TailTail,
        ] {
            assert!(!records[o.index()].is_supported());
            assert_eq!(records[o.index()].jaccard(), None);
        }

        Ok(())
    }

    #[test]
    fn test_same_contig_ends() -> anyhow::Result<()> {
        let table = build(&[("BX1", "A", true, 2), ("BX1", "A", false, 2)]);
        let lengths = lengths(&["A"], 1000);
        let mult = derive_multiplicity(&table);

        let pairs = calc_pair_stats(&table, &lengths, &mult, &params())?;
        let records = &pairs[&key("A", "A")];
        assert_eq!(records[Orientation::HeadHead.index()].barcodes_intersect, 0);
        assert_eq!(records[Orientation::TailTail.index()].barcodes_intersect, 0);
        assert_eq!(records[Orientation::HeadTail.index()].barcodes_intersect, 1);
        assert_eq!(records[Orientation::TailHead.index()].barcodes_intersect, 1);

        let pair = key("A", "A");
        assert!(joins_end_to_itself(&pair, Orientation::HeadHead));
        assert!(joins_end_to_itself(&pair, Orientation::TailTail));
        assert!(!joins_end_to_itself(&pair, Orientation::HeadTail));
        assert!(!joins_end_to_itself(&key("A", "B"), Orientation::HeadHead));

        Ok(())
    }

    #[test]
    fn test_filters() -> anyhow::Result<()> {
        let table = build(&[
            // short contig S
            ("BX1", "A", true, 3),
            ("BX1", "S", true, 3),
            // too few reads on B
            ("BX2", "A", true, 3),
            ("BX2", "B", true, 1),
            // too many contig ends
            ("BX3", "A", false, 3),
            ("BX3", "B", false, 3),
            ("BX3", "C", false, 3),
        ]);
        let mut lengths = lengths(&["A", "B", "C"], 1000);
        lengths.insert("S".to_string(), 80);
        let mult = derive_multiplicity(&table);
        let params = DistParams {
            min_reads: 2,
            max_mult: 2,
            ..params()
        };

        let pairs = calc_pair_stats(&table, &lengths, &mult, &params)?;
        assert!(pairs.is_empty());

        Ok(())
    }

    #[test]
    fn test_invariants_and_canonical_keys() -> anyhow::Result<()> {
        let contigs = ["C3", "C1", "C4", "C2", "C0"];
        let names: Vec<String> = (0..40).map(|i| format!("BX{:02}", i)).collect();
        let mut rows = vec![];
        for (i, barcode) in names.iter().enumerate() {
            for (j, contig) in contigs.iter().enumerate() {
                if (i + j) % 3 != 0 {
                    rows.push((barcode.as_str(), *contig, (i * j) % 2 == 0, 1 + (i + 2 * j) % 3));
                }
            }
        }
        let table = build(&rows);
        let lengths = lengths(&contigs, 500);
        let mult = derive_multiplicity(&table);
        let params = DistParams {
            min_reads: 2,
            ..params()
        };

        let pairs = calc_pair_stats(&table, &lengths, &mult, &params)?;
        assert!(!pairs.is_empty());
        for ((id1, id2), records) in &pairs {
            assert!(id1 <= id2);
            if id1 != id2 {
                assert!(!pairs.contains_key(&(id2.clone(), id1.clone())));
            }
            for rec in records {
                assert!(rec.barcodes_intersect <= rec.barcodes_union);
                if rec.is_supported() {
                    assert_eq!(
                        rec.barcodes_union,
                        rec.barcodes1 + rec.barcodes2 - rec.barcodes_intersect
                    );
                } else {
                    assert_eq!(*rec, PairRecord::default());
                }
            }
        }

        Ok(())
    }

    #[test]
    fn test_thread_count_independent() -> anyhow::Result<()> {
        let names: Vec<String> = (0..200).map(|i| format!("BX{}", i)).collect();
        let contigs: Vec<String> = (0..12).map(|i| format!("ctg{}", i)).collect();
        let mut rows = vec![];
        for (i, barcode) in names.iter().enumerate() {
            for k in 0..4 {
                let contig = &contigs[(i * 7 + k * 5) % contigs.len()];
                rows.push((barcode.as_str(), contig.as_str(), (i + k) % 2 == 0, 1 + k));
            }
        }
        let table = build(&rows);
        let lengths: ContigLengths = contigs.iter().map(|id| (id.clone(), 1000)).collect();
        let mult = derive_multiplicity(&table);

        let single = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()?
            .install(|| calc_pair_stats(&table, &lengths, &mult, &params()))?;
        let multi = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()?
            .install(|| calc_pair_stats(&table, &lengths, &mult, &params()))?;
        assert_eq!(single, multi);

        Ok(())
    }

    #[test]
    fn test_missing_multiplicity_is_fatal() {
        let table = build(&[("BX1", "A", true, 2)]);
        let lengths = lengths(&["A"], 1000);
        let result = calc_pair_stats(&table, &lengths, &BarcodeMultiplicity::default(), &params());
        assert!(result.is_err());
    }
}

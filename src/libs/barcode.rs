use anyhow::Context;
use fxhash::FxHashMap;
use indexmap::IndexMap;
use std::io::BufRead;

/// The head or the tail region of a contig
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContigEnd {
    pub id: String,
    pub is_head: bool,
}

impl ContigEnd {
    pub fn new(id: &str, is_head: bool) -> Self {
        Self {
            id: id.to_string(),
            is_head,
        }
    }

    pub fn head(id: &str) -> Self {
        Self::new(id, true)
    }

    pub fn tail(id: &str) -> Self {
        Self::new(id, false)
    }

    pub fn other_end(&self) -> Self {
        Self {
            id: self.id.clone(),
            is_head: !self.is_head,
        }
    }
}

/// Contig end => number of read pairs carrying one barcode
pub type EndCounts = FxHashMap<ContigEnd, usize>;

/// Barcode => contig ends it was observed on
pub type BarcodeTable = FxHashMap<String, EndCounts>;

/// Contig => length in bases
pub type ContigLengths = IndexMap<String, usize>;

/// Barcode => number of distinct contig ends it touches
pub type BarcodeMultiplicity = FxHashMap<String, usize>;

/// Records `pairs` read pairs of `barcode` on one end of `contig`.
/// Repeated observations of the same end are summed.
pub fn insert_observation(
    table: &mut BarcodeTable,
    barcode: &str,
    contig: &str,
    is_head: bool,
    pairs: usize,
) {
    let ends = table.entry(barcode.to_string()).or_default();
    *ends.entry(ContigEnd::new(contig, is_head)).or_insert(0) += pairs;
}

fn parse_end(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "h" | "head" => Some(true),
        "t" | "tail" => Some(false),
        _ => None,
    }
}

/// Loads `barcode<TAB>contig<TAB>end<TAB>pairs` rows.
pub fn load_barcodes(input: &str) -> anyhow::Result<BarcodeTable> {
    let mut table = BarcodeTable::default();

    for (i, line) in crate::reader(input)?.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            anyhow::bail!(
                "{}:{}: expected `barcode<TAB>contig<TAB>end<TAB>pairs`",
                input,
                i + 1
            );
        }
        let is_head = parse_end(fields[2])
            .with_context(|| format!("{}:{}: invalid contig end `{}`", input, i + 1, fields[2]))?;
        let pairs = fields[3]
            .trim()
            .parse::<usize>()
            .with_context(|| format!("{}:{}: invalid read pairs `{}`", input, i + 1, fields[3]))?;
        if pairs == 0 {
            continue;
        }

        insert_observation(&mut table, fields[0], fields[1], is_head, pairs);
    }

    Ok(table)
}

/// Loads `barcode<TAB>multiplicity` rows.
pub fn load_multiplicity(input: &str) -> anyhow::Result<BarcodeMultiplicity> {
    let mut mult = BarcodeMultiplicity::default();

    for (i, line) in crate::reader(input)?.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 2 {
            anyhow::bail!("{}:{}: expected `barcode<TAB>multiplicity`", input, i + 1);
        }
        let count = fields[1].trim().parse::<usize>().with_context(|| {
            format!("{}:{}: invalid multiplicity `{}`", input, i + 1, fields[1])
        })?;
        mult.insert(fields[0].to_string(), count);
    }

    Ok(mult)
}

/// Loads a `contig<TAB>length` sizes file.
pub fn load_lengths(input: &str) -> anyhow::Result<ContigLengths> {
    let mut lengths = ContigLengths::new();
    for (id, len) in intspan::read_sizes(input) {
        let len = usize::try_from(len)
            .with_context(|| format!("{}: negative length {} for `{}`", input, len, id))?;
        lengths.insert(id, len);
    }

    Ok(lengths)
}

/// Multiplicity as the number of distinct contig ends touched by each barcode
pub fn derive_multiplicity(table: &BarcodeTable) -> BarcodeMultiplicity {
    table
        .iter()
        .map(|(barcode, ends)| (barcode.clone(), ends.len()))
        .collect()
}

pub fn contig_length(lengths: &ContigLengths, id: &str) -> anyhow::Result<usize> {
    lengths
        .get(id)
        .copied()
        .with_context(|| format!("contig `{}` is absent from the length table", id))
}

pub fn multiplicity_of(mult: &BarcodeMultiplicity, barcode: &str) -> anyhow::Result<usize> {
    mult.get(barcode)
        .copied()
        .with_context(|| format!("barcode `{}` is absent from the multiplicity table", barcode))
}

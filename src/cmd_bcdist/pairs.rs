use bcdist::libs::estimate::estimate_distance;
use bcdist::libs::jaccard::JaccardIndex;
use bcdist::libs::pair::{calc_pair_stats, joins_end_to_itself, Orientation};
use bcdist::libs::sample::{calc_dist_samples, write_dist_samples};
use clap::*;
use itertools::Itertools;
use std::io::Write;

use super::utils;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("pairs")
        .about("Shared barcodes and distance estimates for contig end pairs")
        .after_help(
            r###"
Count the barcodes shared by every pair of contig ends, in all four orientations
(HH, HT, TH, TT; H = head, T = tail), and estimate the distance between the ends from
intra-contig samples with a similar barcode Jaccard index.

Output columns:
contig1  contig2  orientation  barcodes1  barcodes2  barcodes_intersect  barcodes_union
jaccard  min_dist  max_dist

* contig1 is the lexicographically smaller contig id
* min_dist/max_dist are the 1st/99th percentiles of the calibrating samples
* NA marks a pair without an available estimate
* HH and TT of a contig paired with itself join an end to itself and are never estimated

Examples:
1. Pairs sharing at least 3 barcodes, with distance estimates:
   bcdist pairs barcodes.tsv --sizes contigs.sizes --min-shared 3

2. Only barcode statistics, all orientations:
   bcdist pairs barcodes.tsv --sizes contigs.sizes --no-estimate --all

3. Also save the calibration samples:
   bcdist pairs barcodes.tsv --sizes contigs.sizes --samples samples.tsv

"###,
        )
        .arg(
            Arg::new("min_shared")
                .long("min-shared")
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(usize))
                .help("Minimum number of barcodes shared by a pair of ends"),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .action(ArgAction::SetTrue)
                .conflicts_with("min_shared")
                .help("Output every orientation, including ends sharing no barcodes"),
        )
        .arg(
            Arg::new("no_estimate")
                .long("no-estimate")
                .action(ArgAction::SetTrue)
                .help("Skip distance estimation"),
        )
        .arg(
            Arg::new("samples")
                .long("samples")
                .num_args(1)
                .help("Also write the intra-contig distance samples to this file"),
        );

    utils::add_common_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let params = utils::dist_params(args)?;
    utils::init_pool(args)?;

    let opt_min_shared = if args.get_flag("all") {
        0
    } else {
        *args.get_one::<usize>("min_shared").unwrap()
    };
    let is_estimate = !args.get_flag("no_estimate");

    //----------------------------
    // Ops
    //----------------------------
    let inputs = utils::load_inputs(args)?;

    let index = if is_estimate || args.contains_id("samples") {
        let samples = calc_dist_samples(&inputs.table, &inputs.lengths, &inputs.mult, &params)?;
        log::info!("Built {} distance samples", samples.len());

        if let Some(file) = args.get_one::<String>("samples") {
            let mut writer = bcdist::writer(file)?;
            write_dist_samples(&mut writer, &samples)?;
            writer.flush()?;
        }

        JaccardIndex::from_samples(&samples)
    } else {
        JaccardIndex::new()
    };
    if is_estimate && index.is_empty() {
        log::warn!("No contig meets the requirements for distance samples");
    }

    let pairs = calc_pair_stats(&inputs.table, &inputs.lengths, &inputs.mult, &params)?;
    log::info!("Found {} contig pairs sharing barcodes", pairs.len());

    //----------------------------
    // Output
    //----------------------------
    let mut writer = bcdist::writer(args.get_one::<String>("outfile").unwrap())?;

    write!(
        writer,
        "contig1\tcontig2\torientation\tbarcodes1\tbarcodes2\tbarcodes_intersect\tbarcodes_union\tjaccard"
    )?;
    if is_estimate {
        write!(writer, "\tmin_dist\tmax_dist")?;
    }
    writeln!(writer)?;

    for (pair, records) in pairs.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        for orientation in Orientation::ALL {
            let rec = &records[orientation.index()];
            if rec.barcodes_intersect < opt_min_shared {
                continue;
            }

            let jaccard = match rec.jaccard() {
                Some(j) => format!("{:.4}", j),
                None => "NA".to_string(),
            };
            write!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                pair.0,
                pair.1,
                orientation.as_str(),
                rec.barcodes1,
                rec.barcodes2,
                rec.barcodes_intersect,
                rec.barcodes_union,
                jaccard
            )?;

            if is_estimate {
                let estimate = if joins_end_to_itself(pair, orientation) {
                    None
                } else {
                    estimate_distance(rec, &index, &params)
                };
                match estimate {
                    Some(est) => write!(writer, "\t{}\t{}", est.min_dist, est.max_dist)?,
                    None => write!(writer, "\tNA\tNA")?,
                }
            }
            writeln!(writer)?;
        }
    }
    writer.flush()?;

    Ok(())
}

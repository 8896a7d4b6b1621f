use bcdist::libs::sample::{calc_dist_samples, write_dist_samples};
use clap::*;
use std::io::Write;

use super::utils;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("samples")
        .about("Intra-contig distance samples vs. head/tail barcode overlap")
        .after_help(
            r###"
For every contig at least 2 * --end-length long, measure the distance between its head
and tail regions, and count the barcodes seen on the head, on the tail, on either
(union) and on both (intersection).

Output columns:
contig_id  distance  barcodes_head  barcodes_tail  barcodes_union  barcodes_intersect

Notes:
* Supports both plain text and gzipped (.gz) files
* Reads from stdin if input file is 'stdin'

Examples:
1. Distance samples of 10X barcodes:
   bcdist samples barcodes.tsv --sizes contigs.sizes -c 5 -e 30000

2. Use a precomputed barcode multiplicity table:
   bcdist samples barcodes.tsv --sizes contigs.sizes --mult mult.tsv --min-mult 2

"###,
        );

    utils::add_common_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let params = utils::dist_params(args)?;
    utils::init_pool(args)?;

    let inputs = utils::load_inputs(args)?;
    let samples = calc_dist_samples(&inputs.table, &inputs.lengths, &inputs.mult, &params)?;
    log::info!("Built {} distance samples", samples.len());

    let mut writer = bcdist::writer(args.get_one::<String>("outfile").unwrap())?;
    write_dist_samples(&mut writer, &samples)?;
    writer.flush()?;

    Ok(())
}

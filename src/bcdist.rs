extern crate clap;
use clap::*;

mod cmd_bcdist;

fn main() -> anyhow::Result<()> {
    let app = Command::new("bcdist")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`bcdist` - Contig-end distances from shared linked-read barcodes")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase logging verbosity (-v info, -vv debug)"),
        )
        .subcommand(cmd_bcdist::samples::make_subcommand())
        .subcommand(cmd_bcdist::pairs::make_subcommand())
        .after_help(
            r###"Subcommands:

* samples - Intra-contig head/tail distances vs. barcode overlap
* pairs   - Shared barcodes and distance estimates for contig end pairs

Input:
* barcodes: barcode<TAB>contig<TAB>end (H/T)<TAB>read pairs
* sizes:    contig<TAB>length

"###,
        );

    let matches = app.get_matches();

    let level = match matches.get_count("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Check which subcomamnd the user ran...
    match matches.subcommand() {
        Some(("samples", sub_matches)) => cmd_bcdist::samples::execute(sub_matches),
        Some(("pairs", sub_matches)) => cmd_bcdist::pairs::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}

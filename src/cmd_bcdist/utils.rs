use bcdist::libs::barcode::{
    derive_multiplicity, load_barcodes, load_lengths, load_multiplicity, BarcodeMultiplicity,
    BarcodeTable, ContigLengths,
};
use bcdist::libs::params::DistParams;
use clap::*;

/// Inputs shared by all subcommands
pub struct Inputs {
    pub table: BarcodeTable,
    pub lengths: ContigLengths,
    pub mult: BarcodeMultiplicity,
}

// Arguments for the inputs and the parameter set
pub fn add_common_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("infile")
            .required(true)
            .num_args(1)
            .index(1)
            .help("Barcode to contig-end TSV: barcode, contig, end (H/T), read pairs"),
    )
    .arg(
        Arg::new("sizes")
            .long("sizes")
            .short('s')
            .required(true)
            .num_args(1)
            .help("Contig sizes file: contig, length"),
    )
    .arg(
        Arg::new("mult")
            .long("mult")
            .num_args(1)
            .help("Barcode multiplicity file: barcode, count. Derived from <infile> if absent"),
    )
    .arg(
        Arg::new("min_mult")
            .long("min-mult")
            .num_args(1)
            .default_value("1")
            .value_parser(value_parser!(usize))
            .help("Minimum barcode multiplicity"),
    )
    .arg(
        Arg::new("max_mult")
            .long("max-mult")
            .num_args(1)
            .default_value("100")
            .value_parser(value_parser!(usize))
            .help("Maximum barcode multiplicity"),
    )
    .arg(
        Arg::new("min_reads")
            .long("min-reads")
            .short('c')
            .num_args(1)
            .default_value("5")
            .value_parser(value_parser!(usize))
            .help("Minimum read pairs of a barcode on a contig end"),
    )
    .arg(
        Arg::new("end_length")
            .long("end-length")
            .short('e')
            .num_args(1)
            .default_value("30000")
            .value_parser(value_parser!(usize))
            .help("Length of the head and tail regions of contigs"),
    )
    .arg(
        Arg::new("bin_size")
            .long("bin-size")
            .short('B')
            .num_args(1)
            .default_value("0.05")
            .value_parser(value_parser!(f64))
            .help("Half-width of the Jaccard window used in distance estimation"),
    )
    .arg(
        Arg::new("parallel")
            .long("parallel")
            .short('p')
            .num_args(1)
            .default_value("1")
            .value_parser(value_parser!(usize))
            .help("Number of threads for parallel processing"),
    )
    .arg(
        Arg::new("outfile")
            .long("outfile")
            .short('o')
            .num_args(1)
            .default_value("stdout")
            .help("Output filename. [stdout] for screen"),
    )
}

pub fn dist_params(args: &ArgMatches) -> anyhow::Result<DistParams> {
    let params = DistParams {
        min_mult: *args.get_one::<usize>("min_mult").unwrap(),
        max_mult: *args.get_one::<usize>("max_mult").unwrap(),
        min_reads: *args.get_one::<usize>("min_reads").unwrap(),
        end_length: *args.get_one::<usize>("end_length").unwrap(),
        dist_bin_size: *args.get_one::<f64>("bin_size").unwrap(),
    };
    params.validate()?;

    Ok(params)
}

pub fn init_pool(args: &ArgMatches) -> anyhow::Result<()> {
    let opt_parallel = *args.get_one::<usize>("parallel").unwrap();
    rayon::ThreadPoolBuilder::new()
        .num_threads(opt_parallel)
        .build_global()?;

    Ok(())
}

pub fn load_inputs(args: &ArgMatches) -> anyhow::Result<Inputs> {
    let infile = args.get_one::<String>("infile").unwrap();
    let sizes = args.get_one::<String>("sizes").unwrap();

    let lengths = load_lengths(sizes)?;
    log::info!("Loaded {} contig sizes from {}", lengths.len(), sizes);

    let table = load_barcodes(infile)?;
    log::info!("Loaded {} barcodes from {}", table.len(), infile);

    let mult = match args.get_one::<String>("mult") {
        Some(file) => load_multiplicity(file)?,
        None => derive_multiplicity(&table),
    };

    Ok(Inputs {
        table,
        lengths,
        mult,
    })
}

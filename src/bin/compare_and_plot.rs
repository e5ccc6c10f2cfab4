// LASTZPLOT v0.1.0
// Licensed under the MIT license (http://opensource.org/licenses/MIT).
// This file may not be copied, modified, or distributed except according to those terms.

//! compare_and_plot REF QUERY --output [-o] dir [--gnuplot] [--tmp dir] [--keeptmp] [--verbose] [--debug]
//!
//! REF and QUERY are fasta files (possibly gzipped) with any number of sequences.
//! Each reference sequence is aligned to each query sequence with lastz. A query matches a reference
//! if alignments cover more than 12% of the reference, in which case a dot-plot is drawn and saved in
//! the output directory as ref_query.pdf (ref_query.png with --gnuplot).
//!
//! For each reference a line `ref: len=L matches=N data=q1,q2` is printed followed by a line per match.
//! parameters.json and matches.json are dumped in the output directory.
//!
//! --tmp : directory in which the temporary directory is created, default is the system one.
//! --keeptmp : do not remove the temporary directory.
//! --verbose / --debug : log level info / debug, default warn (RUST_LOG is used when none is given).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use env_logger::Builder;
use log::LevelFilter;

use lastzplot::compare::{dump_matches_json, PairwiseComparison};
use lastzplot::runner::SystemRunner;
use lastzplot::utils::*;
use lastzplot::workdir::WorkDir;

// install a logger facility, flags take precedence over RUST_LOG
fn init_log(level: Option<LevelFilter>) {
    let mut builder = Builder::from_default_env();
    match level {
        Some(level) => {
            builder.filter_level(level);
        }
        None => {
            if std::env::var("RUST_LOG").is_err() {
                builder.filter_level(LevelFilter::Warn);
            }
        }
    }
    builder.init();
}

fn log_level(matches: &ArgMatches) -> Option<LevelFilter> {
    if matches.get_flag("debug") {
        Some(LevelFilter::Debug)
    } else if matches.get_flag("verbose") {
        Some(LevelFilter::Info)
    } else {
        None
    }
}

// everything done in the temporary directory
fn compare_in(workdir: &WorkDir, reffile: &Path, queryfile: &Path, outdir: &Path, params: &RunParams) -> anyhow::Result<()> {
    let query_records = split_fasta(queryfile, workdir.path(), "query").context("splitting query file")?;
    let ref_records = split_fasta(reffile, workdir.path(), "ref").context("splitting reference file")?;
    //
    let runner = SystemRunner;
    let comparison = PairwiseComparison::new(&runner, params, workdir.path(), Some(outdir));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let results = comparison.run(&ref_records, &query_records, &mut out)?;
    //
    params.dump_json(outdir)?;
    dump_matches_json(&results, outdir)?;
    Ok(())
} // end of compare_in

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let reffile = matches.get_one::<PathBuf>("REF").context("REF is mandatory")?;
    let queryfile = matches.get_one::<PathBuf>("QUERY").context("QUERY is mandatory")?;
    let outdir = matches.get_one::<PathBuf>("output").context("--output is mandatory")?;
    let tmp = matches.get_one::<PathBuf>("tmp").cloned().unwrap_or_else(std::env::temp_dir);
    //
    check_input_file(reffile)?;
    check_input_file(queryfile)?;
    fs::create_dir_all(outdir).with_context(|| format!("creating output directory {:?}", outdir))?;
    //
    let renderer = if matches.get_flag("gnuplot") { RendererKind::Gnuplot } else { RendererKind::R };
    let params = RunParams::new(AlignmentOptions::summary(), renderer, PlotFormat::Pdf, matches.get_flag("keeptmp"));
    //
    let workdir = WorkDir::create(&tmp, "compareAndPlot_", params.keep_tmp())?;
    let res = compare_in(&workdir, reffile, queryfile, outdir, &params);
    let cleanup = workdir.finish();
    res?;
    cleanup?;
    Ok(())
} // end of run

fn main() {
    let matches = Command::new("compare_and_plot")
        .about("Align every query sequence to every reference sequence with lastz and plot matching pairs")
        .version("0.1.0")
        .arg_required_else_help(true)
        .arg(Arg::new("REF").help("Reference file").required(true).value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("QUERY").help("Query file").required(true).value_parser(value_parser!(PathBuf)))
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output directory")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("tmp")
                .long("tmp")
                .help("Where to write temp directory (must exist)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(Arg::new("keeptmp").long("keeptmp").help("Keep temporary directory").action(ArgAction::SetTrue))
        .arg(Arg::new("gnuplot").long("gnuplot").help("Use GNU plot instead of R").action(ArgAction::SetTrue))
        .arg(Arg::new("verbose").long("verbose").help("Verbose output").action(ArgAction::SetTrue))
        .arg(Arg::new("debug").long("debug").help("Debug output").action(ArgAction::SetTrue))
        .get_matches();
    //
    init_log(log_level(&matches));
    let start_t = chrono::Local::now();
    log::info!("compare_and_plot begins at time:{:#?}", start_t);
    //
    if let Err(e) = run(&matches) {
        log::error!("{:#}", e);
        eprintln!("compare_and_plot failed: {:#}", e);
        std::process::exit(1);
    }
    //
    let end_t = chrono::Local::now();
    log::info!("compare_and_plot ends at time:{:#?}", end_t);
} // end of main

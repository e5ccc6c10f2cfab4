// LASTZPLOT v0.1.0
// Licensed under the MIT license (http://opensource.org/licenses/MIT).
// This file may not be copied, modified, or distributed except according to those terms.

//! lastz_plot DB QUERY --basename [-o] name [--plotname [-n] name] [--gnuplot] [--pdf] [--tmp dir] [--keeptmp] [--verbose] [--debug]
//!
//! Aligns two sequence files with lastz and draws the dot-plot with R (default) or gnuplot.
//! The plot is written in basename.png, or basename.pdf with --pdf (R only).
//!
//! --plotname : name of the gnuplot data file, it appears in the plot key. Default Contig_alignment

use std::path::PathBuf;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use env_logger::Builder;
use log::LevelFilter;

use lastzplot::compare::single_pair;
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

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let db = matches.get_one::<PathBuf>("DB").context("DB is mandatory")?;
    let query = matches.get_one::<PathBuf>("QUERY").context("QUERY is mandatory")?;
    let basename = matches.get_one::<String>("basename").context("--basename is mandatory")?;
    let plotname = matches.get_one::<String>("plotname").context("plotname has a default")?;
    let tmp = matches.get_one::<PathBuf>("tmp").cloned().unwrap_or_else(std::env::temp_dir);
    //
    check_input_file(db)?;
    check_input_file(query)?;
    //
    let renderer = if matches.get_flag("gnuplot") { RendererKind::Gnuplot } else { RendererKind::R };
    let format = if matches.get_flag("pdf") { PlotFormat::Pdf } else { PlotFormat::Png };
    let params = RunParams::new(AlignmentOptions::summary(), renderer, format, matches.get_flag("keeptmp"));
    //
    let workdir = WorkDir::create(&tmp, "lastzPlot_", params.keep_tmp())?;
    log::info!("Temporary directory: {}", workdir.path().display());
    let runner = SystemRunner;
    let res = single_pair(&runner, db, query, basename, plotname, &params, workdir.path());
    let cleanup = workdir.finish();
    let plot = res?;
    cleanup?;
    println!("{}", plot.display());
    Ok(())
} // end of run

fn main() {
    let matches = Command::new("lastz_plot")
        .about("Align two sequences with lastz and plot the results with R or gnuplot")
        .version("0.1.0")
        .arg_required_else_help(true)
        .arg(Arg::new("DB").help("Reference database in FASTA format").required(true).value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("QUERY").help("Query sequence in FASTA format").required(true).value_parser(value_parser!(PathBuf)))
        .arg(
            Arg::new("basename")
                .short('o')
                .long("basename")
                .help("Output file basename")
                .required(true)
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("plotname")
                .short('n')
                .long("plotname")
                .help("Plot file name")
                .default_value("Contig_alignment")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("tmp")
                .long("tmp")
                .help("Where to write temp directory (must exist)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(Arg::new("keeptmp").long("keeptmp").help("Keep temporary directory").action(ArgAction::SetTrue))
        .arg(Arg::new("gnuplot").long("gnuplot").help("Use GNU plot instead of R").action(ArgAction::SetTrue))
        .arg(Arg::new("pdf").long("pdf").help("Save in PDF format (only with R)").action(ArgAction::SetTrue))
        .arg(Arg::new("verbose").long("verbose").help("Print verbose output").action(ArgAction::SetTrue))
        .arg(Arg::new("debug").long("debug").help("Print debug output").action(ArgAction::SetTrue))
        .get_matches();
    //
    init_log(log_level(&matches));
    let start_t = chrono::Local::now();
    log::info!("lastz_plot begins at time:{:#?}", start_t);
    //
    if let Err(e) = run(&matches) {
        log::error!("{:#}", e);
        eprintln!("lastz_plot failed: {:#}", e);
        std::process::exit(1);
    }
    //
    let end_t = chrono::Local::now();
    log::info!("lastz_plot ends at time:{:#?}", end_t);
} // end of main

//! Pairwise comparison of reference and query sequences.
//!
//! For each reference, each query is aligned with lastz in general format. If the aligned part of the
//! reference covers more than [COVERAGE_THRESHOLD] percent of it, the query is recorded as a match,
//! lastz is run again in rdotplot format and a dot-plot is rendered.
//! When all queries have been seen for a reference, a report is written :
//!
//! ```text
//! refA: len=1000 matches=1 data=queryA
//! 1  ctg=queryA len=500
//! ```
//! The rank on the detail lines runs over the whole comparison.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use cpu_time::ProcessTime;
use serde::{Deserialize, Serialize};

use crate::coverage::{evaluate, Verdict, COVERAGE_THRESHOLD};
use crate::errors::LastzPlotError;
use crate::lastz::lastz;
use crate::plot::{make_renderer, PlotRenderer, PlotRequest};
use crate::runner::CommandRunner;
use crate::summary::parse_alignment;
use crate::utils::files::{string_to_filename, SequenceRecord};
use crate::utils::parameters::{RunParams, DOTPLOT_FORMAT};

/// The queries matching one reference, in the order they were compared.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub reference_id: String,
    pub reference_len: usize,
    pub matches: Vec<String>,
}

impl MatchResult {
    pub fn new(reference: &SequenceRecord) -> Self {
        MatchResult { reference_id: reference.get_id().to_string(), reference_len: reference.get_len(), matches: Vec::new() }
    }
}

/// Writes the summary line of a reference and one line per match. rank is the running match counter,
/// lengths of matches are searched by id among queries ("?" if absent).
pub fn write_reference_report<W: Write>(
    out: &mut W,
    result: &MatchResult,
    queries: &[SequenceRecord],
    rank: &mut usize,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{}: len={} matches={} data={}",
        result.reference_id,
        result.reference_len,
        result.matches.len(),
        result.matches.join(",")
    )?;
    for m in &result.matches {
        let len = queries
            .iter()
            .find(|q| q.get_id() == m)
            .map(|q| q.get_len().to_string())
            .unwrap_or_else(|| String::from("?"));
        *rank += 1;
        writeln!(out, "{}  ctg={} len={}", rank, m, len)?;
    }
    Ok(())
} // end of write_reference_report

/// dumps results in dirpath/matches.json
pub fn dump_matches_json(results: &[MatchResult], dirpath: &Path) -> Result<(), LastzPlotError> {
    let filepath = dirpath.join("matches.json");
    log::info!("dumping matches in json file : {:?}", filepath);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&filepath)
        .map_err(|e| LastzPlotError::io(&filepath, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), results)
        .map_err(|e| LastzPlotError::io(&filepath, std::io::Error::other(e)))
} // end of dump_matches_json

/// Base name of the files of a pair, `<ref>_<query>` with ids reduced to alphanumerics.
/// If two pairs reduce to the same name, ranks are appended to the later one.
fn unique_pair_name(reference: &SequenceRecord, query: &SequenceRecord, used: &mut HashSet<String>) -> String {
    let name = format!("{}_{}", string_to_filename(reference.get_id()), string_to_filename(query.get_id()));
    if used.insert(name.clone()) {
        return name;
    }
    let ranked = format!("{}_{}_{}", name, reference.get_rank(), query.get_rank());
    log::warn!("{} - {} already names a pair, using {}", reference.get_id(), query.get_id(), ranked);
    used.insert(ranked.clone());
    ranked
} // end of unique_pair_name

/// rename, falling back to copy and remove when source and destination are on different file systems
pub fn move_file(from: &Path, to: &Path) -> Result<(), LastzPlotError> {
    if fs::rename(from, to).is_err() {
        fs::copy(from, to).map_err(|e| LastzPlotError::io(to, e))?;
        fs::remove_file(from).map_err(|e| LastzPlotError::io(from, e))?;
    }
    Ok(())
}

//===========================================================================

/// Runs the all-pairs comparison. Intermediate files go in workdir, plots are copied in outdir if given.
pub struct PairwiseComparison<'a, R: CommandRunner> {
    runner: &'a R,
    params: &'a RunParams,
    workdir: &'a Path,
    outdir: Option<&'a Path>,
} // end of PairwiseComparison

impl<'a, R: CommandRunner> PairwiseComparison<'a, R> {
    pub fn new(runner: &'a R, params: &'a RunParams, workdir: &'a Path, outdir: Option<&'a Path>) -> Self {
        PairwiseComparison { runner, params, workdir, outdir }
    }

    /// Compares every reference to every query, writing the report of each reference to out
    /// as soon as its queries are exhausted. The first error aborts the comparison.
    pub fn run<W: Write>(
        &self,
        references: &[SequenceRecord],
        queries: &[SequenceRecord],
        out: &mut W,
    ) -> Result<Vec<MatchResult>, LastzPlotError> {
        let start_t = SystemTime::now();
        let cpu_start = ProcessTime::now();
        let renderer = make_renderer(self.params.get_renderer(), self.runner, None);
        let mut results = Vec::<MatchResult>::with_capacity(references.len());
        let mut rank = 0;
        let mut pair_names = HashSet::<String>::new();
        //
        for reference in references {
            log::info!("Ref file: {}", reference.get_id());
            let mut result = MatchResult::new(reference);
            for query in queries {
                let pair_name = unique_pair_name(reference, query, &mut pair_names);
                if self.compare_pair(reference, query, &pair_name, renderer.as_ref())? {
                    result.matches.push(query.get_id().to_string());
                }
            }
            write_reference_report(out, &result, queries, &mut rank)
                .map_err(|e| LastzPlotError::io("report", e))?;
            results.push(result);
        }
        //
        let cpu_time = cpu_start.elapsed().as_secs();
        log::info!("pairwise comparison : cpu time(s) {}", cpu_time);
        if let Ok(elapsed) = start_t.elapsed() {
            log::info!("pairwise comparison : elapsed time(s) {}", elapsed.as_secs());
        }
        Ok(results)
    } // end of run

    /// aligns one pair, plots it if it matches. Returns true on match.
    fn compare_pair(
        &self,
        reference: &SequenceRecord,
        query: &SequenceRecord,
        pair_name: &str,
        renderer: &dyn PlotRenderer,
    ) -> Result<bool, LastzPlotError> {
        log::info!("  query file: {}", query.get_id());
        let tmpout = self.workdir.join(format!("{}.out", pair_name));
        log::debug!("Lastz to: {}", tmpout.display());
        let summary_opts = self.params.get_alignment_options();
        lastz(self.runner, reference.get_path(), query.get_path(), &tmpout, summary_opts)?;
        let summary = parse_alignment(&tmpout)?;
        //
        let ratios = match evaluate(&summary, reference.get_len(), query.get_len()) {
            Verdict::NoAlignment => {
                log::debug!("No alignments found for {} and {}", reference.get_id(), query.get_id());
                return Ok(false);
            }
            Verdict::Below(ratios) => {
                log::debug!("ratio {:.3} below threshold {} for {}", ratios.target, COVERAGE_THRESHOLD, query.get_id());
                return Ok(false);
            }
            Verdict::Match(ratios) => ratios,
        };
        log::info!(
            "Ratio: {:.3} : {} - {} | Ratio: {:.3} : {} - {}",
            ratios.target,
            reference.get_len(),
            summary.target_span,
            ratios.query,
            query.get_len(),
            summary.query_span
        );
        log::info!(
            "Aligned: {} query, {} target [{} mismatches]",
            summary.query_span,
            summary.target_span,
            summary.mismatches
        );
        //
        let format = self.params.get_format();
        let plotfile = self.workdir.join(format!("{}.out.plot", pair_name));
        let image = self.workdir.join(format!("{}.out.{}", pair_name, format.extension()));
        log::debug!("Printing {} to: {}", format, image.display());
        let plot_opts = summary_opts.with_format(DOTPLOT_FORMAT);
        lastz(self.runner, reference.get_path(), query.get_path(), &plotfile, &plot_opts)?;
        let request = PlotRequest {
            reference: reference.get_path(),
            query: query.get_path(),
            dotfile: &plotfile,
            output: &image,
            format,
        };
        renderer.render(&request)?;
        //
        if let Some(outdir) = self.outdir {
            let dest = outdir.join(format!("{}.{}", pair_name, format.extension()));
            fs::copy(&image, &dest).map_err(|e| LastzPlotError::io(&dest, e))?;
            log::info!("plot saved in {}", dest.display());
        }
        Ok(true)
    } // end of compare_pair
} // end of impl PairwiseComparison

//===========================================================================

/// Aligns query on db, logs the alignment summary and renders a dot-plot moved to basename.ext.
/// plotname names the gnuplot data file. Returns the path of the plot.
pub fn single_pair<R: CommandRunner>(
    runner: &R,
    db: &Path,
    query: &Path,
    basename: &str,
    plotname: &str,
    params: &RunParams,
    workdir: &Path,
) -> Result<PathBuf, LastzPlotError> {
    let format = params.get_format();
    log::info!("Output extension: {}", format);
    let lastz_tmpfile = workdir.join("lastz.rdotplot");
    let lastz_tmpaln = workdir.join("lastz.aln");
    let plotfile_tmp = workdir.join(format!("Plot_Alignment.{}", format.extension()));
    //
    let aln_opts = params.get_alignment_options();
    let plot_opts = aln_opts.with_format(DOTPLOT_FORMAT);
    log::info!("LastZ options: {:?}", plot_opts.as_args());
    lastz(runner, db, query, &lastz_tmpfile, &plot_opts)?;
    log::debug!("{:?}", aln_opts.as_args());
    lastz(runner, query, db, &lastz_tmpaln, aln_opts)?;
    let summary = parse_alignment(&lastz_tmpaln)?;
    log::info!(
        "Aligned: {} query, {} target [{} mismatches]",
        summary.query_span,
        summary.target_span,
        summary.mismatches
    );
    //
    let renderer = make_renderer(params.get_renderer(), runner, Some(plotname));
    if !renderer.check_dependency() {
        return Err(LastzPlotError::tool(renderer.program(), "not found in PATH"));
    }
    let request = PlotRequest { reference: db, query, dotfile: &lastz_tmpfile, output: &plotfile_tmp, format };
    renderer.render(&request)?;
    //
    let destination = PathBuf::from(format!("{}.{}", basename, format.extension()));
    log::info!("Moving {} to {}", plotfile_tmp.display(), destination.display());
    move_file(&plotfile_tmp, &destination)?;
    log::info!("Plotting result: {}", destination.display());
    Ok(destination)
} // end of single_pair

//===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{Capture, CommandStatus, ExternalCommand};
    use crate::utils::parameters::{AlignmentOptions, PlotFormat, RendererKind};
    use std::cell::RefCell;

    /// lastz answers with a summary giving target_span, or a small dot-plot.
    /// Rscript writes the image at the path found in its script.
    struct FakeRunner {
        target_span: i64,
        query_span: i64,
        plotter_missing: bool,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        fn new(target_span: i64, query_span: i64) -> Self {
            FakeRunner { target_span, query_span, plotter_missing: false, calls: RefCell::new(vec![]) }
        }

        fn programs(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn execute(&self, cmd: &ExternalCommand) -> Result<CommandStatus, LastzPlotError> {
            self.calls.borrow_mut().push(cmd.get_program().to_string());
            let args: Vec<String> = cmd.get_args().iter().map(|a| a.to_string_lossy().into_owned()).collect();
            match cmd.get_program() {
                "lastz" => {
                    let content = if args[0] == "--format=rdotplot" {
                        String::from("s1\ts2\n1\t1\n50\t60\nNA\tNA\n")
                    } else {
                        format!(
                            "#nmismatch\tname1\tstrand1\tstart1\tend1\tname2\tstrand2\tstart2\tend2\n\
                             3\tr\t+\t100\t{}\tq\t+\t10\t{}\n",
                            100 + self.target_span,
                            10 + self.query_span
                        )
                    };
                    if let Capture::ToFile(path) = cmd.get_capture() {
                        fs::write(path, content).unwrap();
                    }
                }
                "Rscript" if args.len() > 3 => {
                    // the image path is the argument of the graphic device call
                    let script = &args[3];
                    let start = script.find("pdf(\"").unwrap() + 5;
                    let end = start + script[start..].find('"').unwrap();
                    fs::write(&script[start..end], "%PDF").unwrap();
                }
                "Rscript" if self.plotter_missing => {
                    return Err(LastzPlotError::tool("Rscript", "could not execute"));
                }
                _ => {}
            }
            Ok(CommandStatus { code: Some(0) })
        }
    }

    fn record(dir: &Path, rank: usize, id: &str, len: usize) -> SequenceRecord {
        let path = dir.join(format!("{}.fasta", id));
        fs::write(&path, format!(">{}\n{}", id, "A".repeat(len))).unwrap();
        SequenceRecord::new(rank, id.to_string(), len, path)
    }

    fn params() -> RunParams {
        RunParams::new(AlignmentOptions::summary(), RendererKind::R, PlotFormat::Pdf, false)
    }

    #[test]
    fn matching_pair_is_reported_and_plotted() {
        let work = tempfile::tempdir().unwrap();
        let outdir = tempfile::tempdir().unwrap();
        let references = vec![record(work.path(), 1, "refA", 1000)];
        let queries = vec![record(work.path(), 1, "queryA", 500)];
        let runner = FakeRunner::new(200, 100);
        let params = params();
        let comparison = PairwiseComparison::new(&runner, &params, work.path(), Some(outdir.path()));
        let mut report = Vec::<u8>::new();
        let results = comparison.run(&references, &queries, &mut report).unwrap();
        //
        assert_eq!(String::from_utf8(report).unwrap(), "refA: len=1000 matches=1 data=queryA\n1  ctg=queryA len=500\n");
        assert_eq!(results[0].matches, vec![String::from("queryA")]);
        assert_eq!(runner.programs(), vec!["lastz", "lastz", "Rscript"]);
        assert!(outdir.path().join("refA_queryA.pdf").is_file());
    }

    #[test]
    fn ids_reduced_to_same_name_keep_distinct_plots() {
        let work = tempfile::tempdir().unwrap();
        let outdir = tempfile::tempdir().unwrap();
        let references = vec![record(work.path(), 1, "refA", 1000)];
        let queries = vec![record(work.path(), 1, "ctg_1", 500), record(work.path(), 2, "ctg1", 500)];
        let runner = FakeRunner::new(200, 100);
        let params = params();
        let comparison = PairwiseComparison::new(&runner, &params, work.path(), Some(outdir.path()));
        let mut report = Vec::<u8>::new();
        comparison.run(&references, &queries, &mut report).unwrap();
        assert!(outdir.path().join("refA_ctg1.pdf").is_file());
        assert!(outdir.path().join("refA_ctg1_1_2.pdf").is_file());
    }

    #[test]
    fn low_coverage_is_not_plotted() {
        let work = tempfile::tempdir().unwrap();
        let references = vec![record(work.path(), 1, "refA", 1000)];
        let queries = vec![record(work.path(), 1, "queryA", 500)];
        let runner = FakeRunner::new(50, 40);
        let params = params();
        let comparison = PairwiseComparison::new(&runner, &params, work.path(), None);
        let mut report = Vec::<u8>::new();
        let results = comparison.run(&references, &queries, &mut report).unwrap();
        assert_eq!(String::from_utf8(report).unwrap(), "refA: len=1000 matches=0 data=\n");
        assert!(results[0].matches.is_empty());
        assert_eq!(runner.programs(), vec!["lastz"]);
    }

    #[test]
    fn zero_span_is_skipped() {
        let work = tempfile::tempdir().unwrap();
        let references = vec![record(work.path(), 1, "refA", 1000)];
        let queries = vec![record(work.path(), 1, "q1", 500), record(work.path(), 2, "q2", 300)];
        let runner = FakeRunner::new(0, 0);
        let params = params();
        let comparison = PairwiseComparison::new(&runner, &params, work.path(), None);
        let mut report = Vec::<u8>::new();
        comparison.run(&references, &queries, &mut report).unwrap();
        assert_eq!(runner.programs(), vec!["lastz", "lastz"]);
        assert_eq!(String::from_utf8(report).unwrap(), "refA: len=1000 matches=0 data=\n");
    }

    #[test]
    fn detail_rank_runs_across_references() {
        let work = tempfile::tempdir().unwrap();
        let references = vec![record(work.path(), 1, "r1", 1000), record(work.path(), 2, "r2", 1000)];
        let queries = vec![record(work.path(), 1, "q1", 500), record(work.path(), 2, "q2", 300)];
        let runner = FakeRunner::new(500, 100);
        let params = params();
        let comparison = PairwiseComparison::new(&runner, &params, work.path(), None);
        let mut report = Vec::<u8>::new();
        comparison.run(&references, &queries, &mut report).unwrap();
        let expected = "r1: len=1000 matches=2 data=q1,q2\n1  ctg=q1 len=500\n2  ctg=q2 len=300\n\
                        r2: len=1000 matches=2 data=q1,q2\n3  ctg=q1 len=500\n4  ctg=q2 len=300\n";
        assert_eq!(String::from_utf8(report).unwrap(), expected);
    }

    #[test]
    fn unknown_match_has_unknown_length() {
        let result = MatchResult { reference_id: String::from("r"), reference_len: 10, matches: vec![String::from("x")] };
        let mut out = Vec::<u8>::new();
        let mut rank = 4;
        write_reference_report(&mut out, &result, &[], &mut rank).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "r: len=10 matches=1 data=x\n5  ctg=x len=?\n");
    }

    #[test]
    fn matches_are_dumped() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![MatchResult { reference_id: String::from("r"), reference_len: 10, matches: vec![] }];
        dump_matches_json(&results, dir.path()).unwrap();
        let content = fs::read_to_string(dir.path().join("matches.json")).unwrap();
        let reloaded: Vec<MatchResult> = serde_json::from_str(&content).unwrap();
        assert_eq!(reloaded, results);
    }

    #[test]
    fn single_pair_moves_plot_to_basename() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let db = record(work.path(), 1, "db", 1000);
        let query = record(work.path(), 1, "contig", 400);
        let runner = FakeRunner::new(300, 300);
        let params = params();
        let basename = out.path().join("result");
        let plot = single_pair(
            &runner,
            db.get_path(),
            query.get_path(),
            basename.to_str().unwrap(),
            "Contig_alignment",
            &params,
            work.path(),
        )
        .unwrap();
        assert_eq!(plot, out.path().join("result.pdf"));
        assert!(plot.is_file());
        assert!(!work.path().join("Plot_Alignment.pdf").exists());
        // dot-plot alignment, summary alignment, dependency probe, rendering
        assert_eq!(runner.programs(), vec!["lastz", "lastz", "Rscript", "Rscript"]);
    }

    #[test]
    fn single_pair_without_plotter_fails_before_rendering() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let db = record(work.path(), 1, "db", 1000);
        let query = record(work.path(), 1, "contig", 400);
        let mut runner = FakeRunner::new(300, 300);
        runner.plotter_missing = true;
        let params = params();
        let basename = out.path().join("result");
        let err = single_pair(
            &runner,
            db.get_path(),
            query.get_path(),
            basename.to_str().unwrap(),
            "Contig_alignment",
            &params,
            work.path(),
        )
        .unwrap_err();
        assert!(matches!(err, LastzPlotError::ExternalTool { ref program, .. } if program == "Rscript"));
        assert_eq!(runner.programs(), vec!["lastz", "lastz", "Rscript"]);
        assert!(!out.path().join("result.pdf").exists());
    }
}

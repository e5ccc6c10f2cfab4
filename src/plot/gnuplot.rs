//! Rendering with gnuplot.
//!
//! The rdotplot file is converted to a 4 columns vector file, a gnuplot script is written beside it
//! and gnuplot is run from that directory. Paths in the script are relative to it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::dotplot::rdotplot_to_vectors;
use crate::errors::LastzPlotError;
use crate::plot::{absolute_path, check_plot_output, PlotRenderer, PlotRequest};
use crate::runner::{Capture, CommandRunner, ExternalCommand};
use crate::utils::files::sequence_label;
use crate::utils::parameters::PlotFormat;

const GNUPLOT: &str = "gnuplot";

/// gnuplot script drawing datafile as vectors without arrow heads
pub fn gnuplot_script(reference_label: &str, query_label: &str, datafile: &str, plotfile: &str) -> String {
    format!(
        "set terminal png;\n\
         set xlabel '{}';\n\
         set ylabel '{}';\n\
         set output \"{}\";\n\
         set xtics rotate;\n\
         plot \"{}\" using 1:2:3:4 with vectors nohead\n",
        query_label, reference_label, plotfile, datafile
    )
} // end of gnuplot_script

/// path as written in a script run from dir
fn relative_to(path: &Path, dir: &Path) -> String {
    match path.strip_prefix(dir) {
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

pub struct GnuplotRenderer<'a, R: CommandRunner> {
    runner: &'a R,
    /// name of vector file, it appears in the plot key. Derived from the dot file if None
    data_name: Option<String>,
}

impl<'a, R: CommandRunner> GnuplotRenderer<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        GnuplotRenderer { runner, data_name: None }
    }

    pub fn with_data_name(self, name: &str) -> Self {
        GnuplotRenderer { data_name: Some(name.to_string()), ..self }
    }

    /// vector data file and script file, both in the directory of the dot file
    fn working_files(&self, dotfile: &Path) -> Result<(PathBuf, PathBuf), LastzPlotError> {
        let dotfile = absolute_path(dotfile)?;
        let dir = dotfile.parent().map(Path::to_path_buf).unwrap_or_default();
        let data = match &self.data_name {
            Some(name) => dir.join(name),
            None => dotfile.with_extension("gnuplot"),
        };
        let script = dir.join(format!(
            "{}.gnu",
            data.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default()
        ));
        Ok((data, script))
    }
} // end of impl GnuplotRenderer

impl<'a, R: CommandRunner> PlotRenderer for GnuplotRenderer<'a, R> {
    fn program(&self) -> &'static str {
        GNUPLOT
    }

    fn check_dependency(&self) -> bool {
        let found = self.runner.is_available(GNUPLOT, "--version");
        if found {
            log::info!("Found dependency: {}", GNUPLOT);
        } else {
            log::error!("Missing dependency: {}", GNUPLOT);
        }
        found
    }

    fn render(&self, request: &PlotRequest) -> Result<(), LastzPlotError> {
        if request.format != PlotFormat::Png {
            log::warn!("gnuplot renders png only, {} asked", request.format);
        }
        let (data, script) = self.working_files(request.dotfile)?;
        let workdir = script.parent().map(Path::to_path_buf).unwrap_or_default();
        //
        log::info!("[GNUPLOT] Converting rplot to gnuplot: {}", data.display());
        rdotplot_to_vectors(request.dotfile, &data)?;
        //
        log::info!("[GNUPLOT] Generating GNU plot script: {}", script.display());
        let output = absolute_path(request.output)?;
        let text = gnuplot_script(
            &sequence_label(request.reference),
            &sequence_label(request.query),
            &relative_to(&data, &workdir),
            &relative_to(&output, &workdir),
        );
        fs::write(&script, text).map_err(|e| LastzPlotError::io(&script, e))?;
        //
        log::info!("[GNUPLOT] Generating GNU plot: {}", output.display());
        let cmd = ExternalCommand::new(GNUPLOT)
            .arg(&script)
            .current_dir(&workdir)
            .capture(Capture::Inherit);
        let status = self.runner.execute(&cmd)?;
        check_plot_output(GNUPLOT, status, &output)
    } // end of render
} // end of impl PlotRenderer for GnuplotRenderer

//! Dot-plot rendering by external programs.
//!
//! Two backends are provided, [rscript::RScriptRenderer] which draws the raw rdotplot output with R,
//! and [gnuplot::GnuplotRenderer] which first converts it to vectors (see [crate::dotplot]).

pub mod gnuplot;
pub mod rscript;

use std::path::{Path, PathBuf};

use crate::errors::LastzPlotError;
use crate::runner::{CommandRunner, CommandStatus};
use crate::utils::files::file_exists_not_empty;
use crate::utils::parameters::{PlotFormat, RendererKind};

pub use gnuplot::GnuplotRenderer;
pub use rscript::RScriptRenderer;

/// What to draw and where.
pub struct PlotRequest<'a> {
    /// sequence file aligned as target, its name labels the y axis
    pub reference: &'a Path,
    /// sequence file aligned as query, its name labels the x axis
    pub query: &'a Path,
    /// lastz output in rdotplot format
    pub dotfile: &'a Path,
    /// image to produce
    pub output: &'a Path,
    pub format: PlotFormat,
}

/// Capability of rendering a 2d line plot from a tabular file to an image.
pub trait PlotRenderer {
    /// name of the program used, for messages
    fn program(&self) -> &'static str;

    /// true if the program can be run
    fn check_dependency(&self) -> bool;

    /// Draws the plot. The output must exist and be non empty when this returns Ok.
    fn render(&self, request: &PlotRequest) -> Result<(), LastzPlotError>;
}

/// allocates the renderer corresponding to kind. data_name, if given, names the gnuplot data file
/// (and so the plot legend).
pub fn make_renderer<'a, R: CommandRunner + 'a>(
    kind: RendererKind,
    runner: &'a R,
    data_name: Option<&str>,
) -> Box<dyn PlotRenderer + 'a> {
    match kind {
        RendererKind::R => Box::new(RScriptRenderer::new(runner)),
        RendererKind::Gnuplot => {
            let renderer = GnuplotRenderer::new(runner);
            match data_name {
                Some(name) => Box::new(renderer.with_data_name(name)),
                None => Box::new(renderer),
            }
        }
    }
} // end of make_renderer

/// absolute version of path, without requiring it exists
pub(crate) fn absolute_path(path: &Path) -> Result<PathBuf, LastzPlotError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| LastzPlotError::io(path, e))?;
    Ok(cwd.join(path))
}

/// common postcondition of renderers
pub(crate) fn check_plot_output(program: &str, status: CommandStatus, output: &Path) -> Result<(), LastzPlotError> {
    if !status.success() {
        return Err(LastzPlotError::tool(
            program,
            format!("exit status {:?} rendering {}", status.code, output.display()),
        ));
    }
    if !file_exists_not_empty(output) {
        return Err(LastzPlotError::tool(program, format!("{} is empty", output.display())));
    }
    Ok(())
} // end of check_plot_output

//! Rendering with R : the rdotplot file is read as a table and drawn as a line plot.

use std::path::Path;

use crate::errors::LastzPlotError;
use crate::plot::{absolute_path, check_plot_output, PlotRenderer, PlotRequest};
use crate::runner::{Capture, CommandRunner, ExternalCommand};
use crate::utils::parameters::PlotFormat;

const RSCRIPT: &str = "Rscript";

/// R program drawing dotfile in output. The graphic device has the name of the format.
pub fn r_script(dotfile: &Path, output: &Path, format: PlotFormat) -> String {
    format!(
        "plotData <- read.delim(\"{}\");\n{}(\"{}\");\nplot(plotData, type=\"l\");\ndev.off();\n",
        dotfile.display(),
        format.extension(),
        output.display()
    )
}

pub struct RScriptRenderer<'a, R: CommandRunner> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> RScriptRenderer<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        RScriptRenderer { runner }
    }
}

impl<'a, R: CommandRunner> PlotRenderer for RScriptRenderer<'a, R> {
    fn program(&self) -> &'static str {
        RSCRIPT
    }

    fn check_dependency(&self) -> bool {
        let found = self.runner.is_available(RSCRIPT, "--version");
        if found {
            log::info!("Found dependency: {}", RSCRIPT);
        } else {
            log::error!("Missing dependency: {}", RSCRIPT);
        }
        found
    }

    fn render(&self, request: &PlotRequest) -> Result<(), LastzPlotError> {
        let dotfile = absolute_path(request.dotfile)?;
        let output = absolute_path(request.output)?;
        let script = r_script(&dotfile, &output, request.format);
        let cmd = ExternalCommand::new(RSCRIPT)
            .args(["--vanilla", "--no-save", "-e"])
            .arg(script)
            .capture(Capture::Discard);
        log::info!("running: {}", cmd.display());
        let status = self.runner.execute(&cmd)?;
        check_plot_output(RSCRIPT, status, &output)
    } // end of render
} // end of impl PlotRenderer for RScriptRenderer

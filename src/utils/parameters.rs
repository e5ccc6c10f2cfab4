//! structures related to processing parameters

use std::fmt;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::to_writer_pretty;

use crate::errors::LastzPlotError;

/// lastz general format giving mismatches and coordinates of each block on both sequences
pub const SUMMARY_FORMAT: &str = "general:nmismatch,name1,strand1,start1,end1,name2,strand2,start2,end2";

/// lastz format giving segments as triplets of lines, as read by R
pub const DOTPLOT_FORMAT: &str = "rdotplot";

/// Options passed to lastz. A value is never modified, a variant is obtained by [AlignmentOptions::with_format].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentOptions {
    /// --format
    format: String,
    /// --strand
    strand: String,
    /// --step
    step: usize,
    /// --nogapped
    nogapped: bool,
    /// --notransition
    notransition: bool,
} // end of struct AlignmentOptions

impl Default for AlignmentOptions {
    fn default() -> Self {
        AlignmentOptions {
            format: String::from(SUMMARY_FORMAT),
            strand: String::from("both"),
            step: 20,
            nogapped: true,
            notransition: true,
        }
    }
} // end of impl Default for AlignmentOptions

impl AlignmentOptions {
    pub fn new(format: &str, strand: &str, step: usize, nogapped: bool, notransition: bool) -> Self {
        AlignmentOptions { format: format.to_string(), strand: strand.to_string(), step, nogapped, notransition }
    }

    /// the options used to get the tabular summary of a pair
    pub fn summary() -> Self {
        AlignmentOptions::default()
    }

    /// the options used to get dot-plot segments of a pair
    pub fn dotplot() -> Self {
        AlignmentOptions::default().with_format(DOTPLOT_FORMAT)
    }

    /// returns a copy of self with format overriden
    pub fn with_format(&self, format: &str) -> Self {
        AlignmentOptions { format: format.to_string(), ..self.clone() }
    }

    pub fn get_format(&self) -> &str {
        &self.format
    }

    pub fn get_strand(&self) -> &str {
        &self.strand
    }

    pub fn get_step(&self) -> usize {
        self.step
    }

    /// lastz arguments in the order format, strand, step, then flags that are set
    pub fn as_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--format={}", self.format),
            format!("--strand={}", self.strand),
            format!("--step={}", self.step),
        ];
        if self.nogapped {
            args.push(String::from("--nogapped"));
        }
        if self.notransition {
            args.push(String::from("--notransition"));
        }
        args
    } // end of as_args
} // end of impl AlignmentOptions

//===========================================================

/// The external program used to draw dot-plots
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RendererKind {
    /// Rscript, reads the rdotplot output directly
    R,
    /// gnuplot, needs the rdotplot output converted to vectors
    Gnuplot,
}

/// image format of plots
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotFormat {
    Png,
    Pdf,
}

impl PlotFormat {
    /// file extension, also the name of the R graphic device
    pub fn extension(&self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Pdf => "pdf",
        }
    }
} // end of impl PlotFormat

impl fmt::Display for PlotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

//===========================================================

/// Gathers parameters of a run. Dumped in output directory to keep track of how plots were obtained.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunParams {
    /// options of the summary alignment, the dot-plot options only differ by format
    alignment: AlignmentOptions,
    ///
    renderer: RendererKind,
    ///
    format: PlotFormat,
    /// do we keep the temporary directory
    keep_tmp: bool,
} // end of struct RunParams

impl RunParams {
    /// gnuplot only produces png, asking for pdf with gnuplot falls back to png
    pub fn new(alignment: AlignmentOptions, renderer: RendererKind, format: PlotFormat, keep_tmp: bool) -> Self {
        let format = match renderer {
            RendererKind::Gnuplot => {
                if format == PlotFormat::Pdf {
                    log::warn!("pdf output is only available with R, using png");
                }
                PlotFormat::Png
            }
            RendererKind::R => format,
        };
        RunParams { alignment, renderer, format, keep_tmp }
    }

    pub fn get_alignment_options(&self) -> &AlignmentOptions {
        &self.alignment
    }

    pub fn get_renderer(&self) -> RendererKind {
        self.renderer
    }

    pub fn get_format(&self) -> PlotFormat {
        self.format
    }

    pub fn keep_tmp(&self) -> bool {
        self.keep_tmp
    }

    /// dumps parameters in dirpath/parameters.json
    pub fn dump_json(&self, dirpath: &Path) -> Result<(), LastzPlotError> {
        let filepath = dirpath.join("parameters.json");
        log::info!("dumping RunParams in json file : {:?}", filepath);
        //
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&filepath)
            .map_err(|e| LastzPlotError::io(&filepath, e))?;
        let mut writer = BufWriter::new(file);
        to_writer_pretty(&mut writer, &self)
            .map_err(|e| LastzPlotError::io(&filepath, std::io::Error::other(e)))?;
        Ok(())
    } // end of dump_json
} // end of impl RunParams

//===========================================================

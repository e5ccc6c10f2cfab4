//! error type shared by all modules of the crate.

use std::path::PathBuf;

/// Every fatal condition of a run. Nothing is retried, binaries exit with code 1 on any of these.
#[derive(thiserror::Error, Debug)]
pub enum LastzPlotError {
    /// an input file given on the command line does not exist
    #[error("input file does not exist: {0:?}")]
    MissingInput(PathBuf),
    /// an external program could not be launched, exited with failure or produced no output
    #[error("{program} failed: {reason}")]
    ExternalTool { program: String, reason: String },
    /// a line of an aligner output could not be decoded
    #[error("malformed data in {file:?} line {line}: {msg}")]
    MalformedData { file: PathBuf, line: usize, msg: String },
    /// working directory could not be removed
    #[error("could not remove temporary directory {dir:?}: {source}")]
    Cleanup {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
} // end of LastzPlotError

impl LastzPlotError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LastzPlotError::Io { path: path.into(), source }
    }

    pub fn tool(program: &str, reason: impl Into<String>) -> Self {
        LastzPlotError::ExternalTool { program: program.to_string(), reason: reason.into() }
    }
} // end of impl LastzPlotError

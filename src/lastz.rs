//! Running lastz on a pair of sequence files.

use std::path::Path;

use crate::errors::LastzPlotError;
use crate::runner::{Capture, CommandRunner, ExternalCommand};
use crate::utils::files::file_exists_not_empty;
use crate::utils::parameters::AlignmentOptions;

/// name of the aligner executable, searched in PATH
pub const LASTZ: &str = "lastz";

/// builds the lastz invocation: options first, then target and query files
pub fn lastz_command(reference: &Path, query: &Path, outfile: &Path, options: &AlignmentOptions) -> ExternalCommand {
    ExternalCommand::new(LASTZ)
        .args(options.as_args())
        .arg(reference)
        .arg(query)
        .capture(Capture::ToFile(outfile.to_path_buf()))
}

/// Aligns query on reference, lastz output goes in outfile.
/// A failed exit status or an empty outfile is an error.
pub fn lastz<R: CommandRunner>(
    runner: &R,
    reference: &Path,
    query: &Path,
    outfile: &Path,
    options: &AlignmentOptions,
) -> Result<(), LastzPlotError> {
    log::info!("Running LastZ: {}", outfile.display());
    let cmd = lastz_command(reference, query, outfile, options);
    let status = runner.execute(&cmd)?;
    if !status.success() {
        return Err(LastzPlotError::tool(
            LASTZ,
            format!("exit status {:?} writing {}", status.code, outfile.display()),
        ));
    }
    if !file_exists_not_empty(outfile) {
        return Err(LastzPlotError::tool(LASTZ, format!("{} is empty", outfile.display())));
    }
    Ok(())
} // end of lastz

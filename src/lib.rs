// LASTZPLOT v0.1.0
// Licensed under the MIT license (http://opensource.org/licenses/MIT).
// This file may not be copied, modified, or distributed except according to those terms.

//! Pairwise comparison of fasta sequences with lastz.
//!
//! Every reference sequence is aligned against every query sequence. The lastz general
//! tabular output gives the aligned spans, a pair is kept when the aligned part of the reference
//! covers more than 12% of it, and kept pairs get a dot-plot rendered by R or gnuplot.
//!
//! The crate never aligns nor draws anything itself, all the work is done by external programs
//! invoked through [runner::CommandRunner].

pub mod errors;
pub mod utils;
pub mod runner;
pub mod workdir;
pub mod lastz;
pub mod summary;
pub mod coverage;
pub mod dotplot;
pub mod plot;
pub mod compare;

pub use errors::LastzPlotError;

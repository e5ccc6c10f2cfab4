//! Parsing of the lastz general tabular output.
//!
//! The file looks like :
//!
//! ```text
//! #nmismatch  name1      strand1 start1 end1 name2          strand2 start2 end2
//! 2           contig_22  +       202    405  Contig005504   +       1      204
//! ```
//! Lines beginning with '#' are headers. Columns are tab separated.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::LastzPlotError;

/// minimal number of columns of a data line
const NB_SUMMARY_FIELDS: usize = 9;

/// Sums over all blocks of one lastz run
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignmentSummary {
    /// total number of mismatches
    pub mismatches: i64,
    /// sum of end2 - start2
    pub query_span: i64,
    /// sum of end1 - start1
    pub target_span: i64,
}

impl AlignmentSummary {
    /// adds one data line. line_num is used in error messages only.
    fn add_line(&mut self, line: &str, file: &Path, line_num: usize) -> Result<(), LastzPlotError> {
        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.len() < NB_SUMMARY_FIELDS {
            return Err(LastzPlotError::MalformedData {
                file: file.to_path_buf(),
                line: line_num,
                msg: format!("expected {} fields, got {}", NB_SUMMARY_FIELDS, fields.len()),
            });
        }
        let malformed = |msg: String| LastzPlotError::MalformedData { file: file.to_path_buf(), line: line_num, msg };
        let get = |i: usize| -> Result<i64, LastzPlotError> {
            fields[i]
                .trim()
                .parse::<i64>()
                .map_err(|_| malformed(format!("field {} is not an integer : {:?}", i + 1, fields[i])))
        };
        let overflow = || malformed(String::from("coordinates out of range"));
        let target = get(4)?.checked_sub(get(3)?).ok_or_else(overflow)?;
        let query = get(8)?.checked_sub(get(7)?).ok_or_else(overflow)?;
        self.mismatches = self.mismatches.checked_add(get(0)?).ok_or_else(overflow)?;
        self.target_span = self.target_span.checked_add(target).ok_or_else(overflow)?;
        self.query_span = self.query_span.checked_add(query).ok_or_else(overflow)?;
        Ok(())
    } // end of add_line
} // end of impl AlignmentSummary

/// Reads a lastz general format output and accumulates mismatches and spans.
/// Any malformed line aborts the parsing.
pub fn parse_alignment(alnfile: &Path) -> Result<AlignmentSummary, LastzPlotError> {
    let file = File::open(alnfile).map_err(|e| LastzPlotError::io(alnfile, e))?;
    let reader = BufReader::new(file);
    let mut summary = AlignmentSummary::default();
    let mut nb_blocks = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| LastzPlotError::io(alnfile, e))?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        summary.add_line(&line, alnfile, i + 1)?;
        nb_blocks += 1;
    }
    log::debug!("parse_alignment {:?} : {} blocks, {:?}", alnfile, nb_blocks, summary);
    Ok(summary)
} // end of parse_alignment

//! Conversion of the lastz rdotplot output into vectors gnuplot can draw.
//!
//! rdotplot writes a header line with the two sequence names then, for each segment, a line with the start
//! coordinates, a line with the end coordinates and a line of NA separating segments.
//! Read by groups of 3 lines, the concatenated fields of a group always have start coordinates at
//! index 2,3 and end coordinates at index 4,5 :
//!
//! ```text
//! seq1  seq2
//! 10    20
//! 15    25
//! NA    NA
//! 110   220
//! 115   225
//! NA    NA
//! ```
//! Each group gives the vector (start1, start2, end1 - start1, end2 - start2).
//! The last separator line is a group of one line and is dropped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::errors::LastzPlotError;

/// number of physical lines in a logical record
const LINES_BY_POINT: usize = 3;

/// A segment as drawn by gnuplot `with vectors`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DotPlotPoint {
    pub target_start: i64,
    pub query_start: i64,
    pub target_delta: i64,
    pub query_delta: i64,
}

impl DotPlotPoint {
    /// tab separated representation, as written in the vector file
    pub fn to_line(&self) -> String {
        format!("{}\t{}\t{}\t{}", self.target_start, self.query_start, self.target_delta, self.query_delta)
    }
}

/// a group of lines that cannot be converted
#[derive(thiserror::Error, Debug)]
#[error("line {line} : {msg}")]
pub struct DotPlotError {
    /// last line of the group
    pub line: usize,
    pub msg: String,
}

/// builds a point from the fields of 3 lines. line is the last line of the group.
fn point_from_fields(fields: &[String], line: usize) -> Result<DotPlotPoint, DotPlotError> {
    if fields.len() < 6 {
        let msg = format!("group has {} fields, expected at least 6", fields.len());
        return Err(DotPlotError { line, msg });
    }
    let get = |i: usize| -> Result<i64, DotPlotError> {
        fields[i].trim().parse::<i64>().map_err(|_| DotPlotError { line, msg: format!("not an integer {:?}", fields[i]) })
    };
    let (start1, start2, end1, end2) = (get(2)?, get(3)?, get(4)?, get(5)?);
    let delta = |end: i64, start: i64| {
        end.checked_sub(start).ok_or_else(|| DotPlotError { line, msg: format!("segment {} - {} out of range", start, end) })
    };
    Ok(DotPlotPoint {
        target_start: start1,
        query_start: start2,
        target_delta: delta(end1, start1)?,
        query_delta: delta(end2, start2)?,
    })
} // end of point_from_fields

/// true if a trailing partial group only contains segment separators
fn is_separator_group(fields: &[String]) -> bool {
    fields.iter().all(|f| f.trim().is_empty() || f.trim() == "NA")
}

/// Groups lines by 3 and converts each group to a point. A trailing group of 1 or 2 lines is dropped.
/// Errors only carry the line number, the caller adds file context.
pub fn transform_lines<I, S>(lines: I) -> Result<Vec<DotPlotPoint>, DotPlotError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut points = Vec::<DotPlotPoint>::new();
    let mut fields = Vec::<String>::with_capacity(2 * LINES_BY_POINT);
    let mut nb_lines = 0;
    for line in lines {
        nb_lines += 1;
        fields.extend(line.as_ref().trim().split('\t').map(String::from));
        if nb_lines % LINES_BY_POINT == 0 {
            points.push(point_from_fields(&fields, nb_lines)?);
            fields.clear();
        }
    }
    if nb_lines % LINES_BY_POINT != 0 {
        if is_separator_group(&fields) {
            log::debug!("dropping trailing separator, {} lines", nb_lines % LINES_BY_POINT);
        } else {
            log::warn!("dropping trailing incomplete record at end of dot-plot data : {:?}", fields);
        }
    }
    Ok(points)
} // end of transform_lines

/// reads a rdotplot file and converts it to points
pub fn read_dotplot(input: &Path) -> Result<Vec<DotPlotPoint>, LastzPlotError> {
    let file = File::open(input).map_err(|e| LastzPlotError::io(input, e))?;
    let lines = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| LastzPlotError::io(input, e))?;
    transform_lines(&lines).map_err(|e| {
        log::error!("dot-plot conversion of {:?} failed : {}", input, e);
        LastzPlotError::MalformedData { file: input.to_path_buf(), line: e.line, msg: e.msg }
    })
} // end of read_dotplot

/// Converts the rdotplot file input into a tab separated 4 columns file output.
/// Returns the number of vectors written.
pub fn rdotplot_to_vectors(input: &Path, output: &Path) -> Result<usize, LastzPlotError> {
    let points = read_dotplot(input)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(output)
        .map_err(|e| LastzPlotError::io(output, e.into()))?;
    for point in &points {
        writer.serialize(point).map_err(|e| LastzPlotError::io(output, e.into()))?;
    }
    writer.flush().map_err(|e| LastzPlotError::io(output, e))?;
    if log::log_enabled!(log::Level::Debug) {
        let sum_target = points.iter().fold(0i64, |acc, p| acc.saturating_add(p.target_delta));
        let sum_query = points.iter().fold(0i64, |acc, p| acc.saturating_add(p.query_delta));
        log::debug!("{} vectors written in {:?}, lengths : {}, {}", points.len(), output, sum_target, sum_query);
    }
    Ok(points.len())
} // end of rdotplot_to_vectors

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn one_group_gives_one_vector() {
        let points = transform_lines(["s1\ts2", "10\t20", "15\t25"]).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].to_line(), "10\t20\t5\t5");
    }

    #[test]
    fn separators_shift_into_next_group() {
        let lines = ["seq1\tseq2", "10\t20", "15\t25", "NA\tNA", "100\t300", "140\t260", "NA\tNA"];
        let points = transform_lines(lines).unwrap();
        assert_eq!(
            points,
            vec![
                DotPlotPoint { target_start: 10, query_start: 20, target_delta: 5, query_delta: 5 },
                DotPlotPoint { target_start: 100, query_start: 300, target_delta: 40, query_delta: -40 },
            ]
        );
    }

    #[test]
    fn trailing_partial_group_is_dropped() {
        let points = transform_lines(["s1\ts2", "10\t20", "15\t25", "1\t2", "3\t4"]).unwrap();
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn bad_number_reports_field() {
        let err = transform_lines(["s1\ts2", "1O\t20", "15\t25"]).unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.msg.contains("1O"));
        assert_eq!(err.to_string(), "line 3 : not an integer \"1O\"");
    }

    #[test]
    fn out_of_range_segment_is_an_error() {
        let start = format!("{}\t0", i64::MIN);
        let end = format!("{}\t5", i64::MAX);
        let err = transform_lines(["s1\ts2", start.as_str(), end.as_str()]).unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.msg.contains("out of range"));
    }

    #[test]
    fn too_few_fields_is_an_error() {
        assert!(transform_lines(["a", "b", "c"]).is_err());
    }

    #[test]
    fn file_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pair.out.plot");
        let output = dir.path().join("pair.gnuplot");
        fs::write(&input, "seq1\tseq2\n10\t20\n15\t25\nNA\tNA\n100\t300\n140\t260\nNA\tNA\n").unwrap();
        let nb = rdotplot_to_vectors(&input, &output).unwrap();
        assert_eq!(nb, 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "10\t20\t5\t5\n100\t300\t40\t-40\n");
    }

    #[test]
    fn malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.plot");
        fs::write(&input, "seq1\tseq2\nx\t20\n15\t25\n").unwrap();
        let err = rdotplot_to_vectors(&input, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, LastzPlotError::MalformedData { .. }));
    }
}

//! This file contains fasta splitting and small file utilities

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::LastzPlotError;

/// A sequence of an input file, written alone in its own fasta file in the working directory.
#[derive(Clone, Debug)]
pub struct SequenceRecord {
    /// rank of the record in its source file, starting at 1
    rank: usize,
    /// first whitespace delimited token of the header
    id: String,
    /// number of residues
    len: usize,
    /// file containing only this record
    path: PathBuf,
} // end of SequenceRecord

impl SequenceRecord {
    pub fn new(rank: usize, id: String, len: usize, path: PathBuf) -> Self {
        SequenceRecord { rank, id, len, path }
    }

    pub fn get_rank(&self) -> usize {
        self.rank
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_len(&self) -> usize {
        self.len
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }
} // end of impl SequenceRecord

/// returns an error if path is not a regular file
pub fn check_input_file(path: &Path) -> Result<(), LastzPlotError> {
    if !path.is_file() {
        log::error!("input file does not exist: {:?}", path);
        return Err(LastzPlotError::MissingInput(path.to_path_buf()));
    }
    Ok(())
}

/// true if path is a file with at least one byte
pub fn file_exists_not_empty(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}

/// keeps only ascii alphanumeric characters so an identifier can be used in a file name
pub fn string_to_filename(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// name used as axis label: file basename up to the first dot, '_' and '-' replaced by spaces
pub fn sequence_label(path: &Path) -> String {
    let basename = path.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
    let stem = basename.split('.').next().unwrap_or("");
    stem.replace(['_', '-'], " ")
}

/// Reads a fasta file (possibly gzipped) with needletail and writes each record in
/// destdir/tag_{rank:09}.fasta. Returns records in file order.
pub fn split_fasta(file: &Path, destdir: &Path, tag: &str) -> Result<Vec<SequenceRecord>, LastzPlotError> {
    log::debug!("splitting fasta file {:?} in {:?}", file, destdir);
    let destdir = fs::canonicalize(destdir).map_err(|e| LastzPlotError::io(destdir, e))?;
    let mut reader = needletail::parse_fastx_file(file).map_err(|e| LastzPlotError::MalformedData {
        file: file.to_path_buf(),
        line: 0,
        msg: e.to_string(),
    })?;
    let mut records = Vec::<SequenceRecord>::new();
    while let Some(record) = reader.next() {
        let seqrec = record.map_err(|e| LastzPlotError::MalformedData {
            file: file.to_path_buf(),
            line: records.len() + 1,
            msg: e.to_string(),
        })?;
        let rank = records.len() + 1;
        let header = String::from_utf8_lossy(seqrec.id()).into_owned();
        let id = header.split_whitespace().next().unwrap_or("").to_string();
        let seq = seqrec.seq();
        //
        let output = destdir.join(format!("{}_{:09}.fasta", tag, rank));
        let out = File::create(&output).map_err(|e| LastzPlotError::io(&output, e))?;
        let mut writer = BufWriter::new(out);
        writeln!(writer, ">{}", id).map_err(|e| LastzPlotError::io(&output, e))?;
        writer.write_all(&seq).map_err(|e| LastzPlotError::io(&output, e))?;
        writer.flush().map_err(|e| LastzPlotError::io(&output, e))?;
        //
        log::trace!("record {} id {} len {} -> {:?}", rank, id, seq.len(), output);
        records.push(SequenceRecord::new(rank, id, seq.len(), output));
    } // end while
    log::info!("split {:?} : {} records", file, records.len());
    Ok(records)
} // end of split_fasta

//=========================================================================

//! # Dataset and Result I/O
//!
//! Thin wrappers around the numeric core: CSV ingestion of the interaction
//! matrix, plain-text score group files for the significance test, and the
//! one-integer-per-line p-index output format of the original tool.
//!
//! Failures are assumed to be user-input errors and carry enough context
//! (file line, offending value) to be actionable.

use ndarray::Array1;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::sparse::{SparseColMatrix, SparseError};

/// Errors raised while reading or writing the supported file formats.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("expected header 'item,user,plays', found '{found}'")]
    BadHeader { found: String },
    #[error("line {line}: expected 3 fields (item,user,plays), found {found}")]
    BadFieldCount { line: u64, found: usize },
    #[error("line {line}: could not parse '{value}' as {expected}")]
    BadNumber {
        line: u64,
        value: String,
        expected: &'static str,
    },
    #[error("the matrix file contains no entries")]
    EmptyMatrix,
    #[error(transparent)]
    Sparse(#[from] SparseError),
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    line: u64,
    expected: &'static str,
) -> Result<T, IoError> {
    field.trim().parse().map_err(|_| IoError::BadNumber {
        line,
        value: field.to_string(),
        expected,
    })
}

/// Loads an interaction matrix from a CSV file with header `item,user,plays`.
///
/// Dimensions are inferred from the largest indices seen; zero-play entries
/// are dropped by the matrix constructor.
pub fn load_interaction_matrix(path: &Path) -> Result<SparseColMatrix, IoError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?;
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    if normalized != ["item", "user", "plays"] {
        return Err(IoError::BadHeader {
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut entries: Vec<(u32, u32, f64)> = Vec::new();
    let mut max_item = 0u32;
    let mut max_user = 0u32;
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        if record.len() != 3 {
            return Err(IoError::BadFieldCount {
                line,
                found: record.len(),
            });
        }
        let item: u32 = parse_field(&record[0], line, "an item index")?;
        let user: u32 = parse_field(&record[1], line, "a user index")?;
        let plays: f64 = parse_field(&record[2], line, "a play count")?;
        max_item = max_item.max(item);
        max_user = max_user.max(user);
        entries.push((item, user, plays));
    }
    if entries.is_empty() {
        return Err(IoError::EmptyMatrix);
    }

    let matrix = SparseColMatrix::from_triplets(
        max_item as usize + 1,
        max_user as usize + 1,
        &entries,
    )?;
    log::info!(
        "loaded {} x {} interaction matrix with {} nonzeros from {}",
        matrix.rows(),
        matrix.cols(),
        matrix.nnz(),
        path.display()
    );
    Ok(matrix)
}

/// Reads a score group from a plain text file, one score per line.
///
/// Blank lines are skipped.
pub fn read_score_group(path: &Path) -> Result<Array1<f64>, IoError> {
    let reader = BufReader::new(File::open(path)?);
    let mut scores = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        scores.push(parse_field(trimmed, index as u64 + 1, "a score")?);
    }
    Ok(Array1::from_vec(scores))
}

/// Writes p-index values one per line, in user/column order.
pub fn write_pindex(path: &Path, values: &[u8]) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for value in values {
        writeln!(writer, "{value}")?;
    }
    writer.flush()?;
    Ok(())
}

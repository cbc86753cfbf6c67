//! # Sparse Column Matrix
//!
//! This module provides the sparse item-by-user membership structure that the
//! popularity-index computation runs over. Rows are items, columns are users.
//! Interaction magnitudes (play counts) are irrelevant to every downstream
//! consumer, so they are dropped at construction time: only the positions of
//! nonzero entries are stored, in compressed-sparse-column form with sorted
//! row indices per column.
//!
//! The performance-critical primitive is [`SparseColMatrix::intersection_count`],
//! a merge walk over two sorted index slices. Nothing in this module ever
//! materializes a dense representation.

use thiserror::Error;

/// Errors raised while assembling a [`SparseColMatrix`] from raw parts.
#[derive(Error, Debug)]
pub enum SparseError {
    #[error("row index {row} out of bounds for matrix with {rows} rows")]
    RowIndexOutOfBounds { row: u32, rows: usize },
    #[error("column index {col} out of bounds for matrix with {cols} columns")]
    ColIndexOutOfBounds { col: u32, cols: usize },
    #[error(
        "CSR value array has {values} entries but the index array has {indices}; they must match"
    )]
    ValueIndexMismatch { values: usize, indices: usize },
    #[error("CSR row pointer array must hold one entry per row plus one; found {found}")]
    RowPtrLength { found: usize },
    #[error("CSR row pointer array is not monotonically non-decreasing at position {position}")]
    RowPtrNotMonotone { position: usize },
    #[error(
        "CSR row pointer array ends at {last} but there are {nnz} stored entries; they must match"
    )]
    RowPtrTerminator { last: usize, nnz: usize },
}

/// An immutable boolean membership matrix in compressed-sparse-column form.
///
/// Shape is `rows x cols` (items x users). `col(j)` yields the sorted row
/// indices of the items user `j` has interacted with.
#[derive(Debug, Clone)]
pub struct SparseColMatrix {
    rows: usize,
    cols: usize,
    /// Length `cols + 1`; column `j` occupies `row_idx[col_ptr[j]..col_ptr[j + 1]]`.
    col_ptr: Vec<usize>,
    /// Row indices of nonzero entries, sorted ascending within each column.
    row_idx: Vec<u32>,
}

impl SparseColMatrix {
    /// Builds the matrix from `(item, user, value)` triplets.
    ///
    /// Entries with a zero value are skipped (membership is binary), and
    /// duplicate `(item, user)` positions collapse to a single entry.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        entries: &[(u32, u32, f64)],
    ) -> Result<Self, SparseError> {
        let mut per_col: Vec<Vec<u32>> = vec![Vec::new(); cols];
        for &(item, user, value) in entries {
            if value == 0.0 {
                continue;
            }
            if item as usize >= rows {
                return Err(SparseError::RowIndexOutOfBounds { row: item, rows });
            }
            let column = per_col
                .get_mut(user as usize)
                .ok_or(SparseError::ColIndexOutOfBounds { col: user, cols })?;
            column.push(item);
        }

        let mut col_ptr = Vec::with_capacity(cols + 1);
        let mut row_idx = Vec::new();
        col_ptr.push(0);
        for column in &mut per_col {
            column.sort_unstable();
            column.dedup();
            row_idx.extend_from_slice(column);
            col_ptr.push(row_idx.len());
        }

        Ok(Self {
            rows,
            cols,
            col_ptr,
            row_idx,
        })
    }

    /// Builds the matrix from the persisted CSR triple of the original
    /// dataset: `values`, per-entry column (user) indices, and per-row
    /// pointer offsets. `rows` is implied by `indptr.len() - 1`.
    ///
    /// The CSR layout is transposed into CSC in two counting passes; no
    /// per-column sort is needed because walking rows in order already
    /// yields ascending row indices within each column.
    pub fn from_csr_parts(
        values: &[f64],
        indices: &[u32],
        indptr: &[usize],
        cols: usize,
    ) -> Result<Self, SparseError> {
        if values.len() != indices.len() {
            return Err(SparseError::ValueIndexMismatch {
                values: values.len(),
                indices: indices.len(),
            });
        }
        if indptr.is_empty() {
            return Err(SparseError::RowPtrLength { found: 0 });
        }
        let rows = indptr.len() - 1;
        for position in 1..indptr.len() {
            if indptr[position] < indptr[position - 1] {
                return Err(SparseError::RowPtrNotMonotone { position });
            }
        }
        if indptr[rows] != values.len() {
            return Err(SparseError::RowPtrTerminator {
                last: indptr[rows],
                nnz: values.len(),
            });
        }
        for &user in indices {
            if user as usize >= cols {
                return Err(SparseError::ColIndexOutOfBounds { col: user, cols });
            }
        }

        // Pass 1: nonzero count per column.
        let mut counts = vec![0usize; cols];
        for (&user, &value) in indices.iter().zip(values) {
            if value != 0.0 {
                counts[user as usize] += 1;
            }
        }
        let mut col_ptr = Vec::with_capacity(cols + 1);
        let mut total = 0usize;
        col_ptr.push(0);
        for &count in &counts {
            total += count;
            col_ptr.push(total);
        }

        // Pass 2: scatter row indices; `cursor` tracks the write position
        // per column.
        let mut row_idx = vec![0u32; total];
        let mut cursor = col_ptr[..cols].to_vec();
        for row in 0..rows {
            for k in indptr[row]..indptr[row + 1] {
                if values[k] != 0.0 {
                    let user = indices[k] as usize;
                    row_idx[cursor[user]] = row as u32;
                    cursor[user] += 1;
                }
            }
        }

        Ok(Self {
            rows,
            cols,
            col_ptr,
            row_idx,
        })
    }

    /// Number of item rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of user columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of stored (nonzero) entries.
    pub fn nnz(&self) -> usize {
        self.row_idx.len()
    }

    /// Sorted row indices of the items owned by user `j`.
    ///
    /// Panics if `j` is out of bounds; callers iterate `0..self.cols()`.
    pub fn col(&self, j: usize) -> &[u32] {
        &self.row_idx[self.col_ptr[j]..self.col_ptr[j + 1]]
    }

    /// Number of items owned by user `j`.
    pub fn col_nnz(&self, j: usize) -> usize {
        self.col_ptr[j + 1] - self.col_ptr[j]
    }

    /// Count of items present in BOTH column `i` and column `j`.
    ///
    /// Merge walk over the two sorted index slices; O(nnz(i) + nnz(j)).
    pub fn intersection_count(&self, i: usize, j: usize) -> usize {
        let a = self.col(i);
        let b = self.col(j);
        let mut count = 0;
        let (mut x, mut y) = (0, 0);
        while x < a.len() && y < b.len() {
            match a[x].cmp(&b[y]) {
                std::cmp::Ordering::Less => x += 1,
                std::cmp::Ordering::Greater => y += 1,
                std::cmp::Ordering::Equal => {
                    count += 1;
                    x += 1;
                    y += 1;
                }
            }
        }
        count
    }
}

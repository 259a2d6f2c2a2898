//! Accumulating summaries of predictions versus targets.
//!
//! ## Purpose
//!
//! This module defines the [`Summary`] contract the engine relies on to sum
//! per-fold confusion data in place, and [`ConfusionMatrix`], the square
//! count matrix used by classification transfer errors.
//!
//! ## Design notes
//!
//! * **In-place accumulation**: `accumulate` adds another summary into `self`.
//! * **Growable**: Matrices of different sizes are summed by growing to the larger one.
//! * **Best-effort labels**: Attaching a label mapping may fail; the engine ignores it.
//!
//! ## Key concepts
//!
//! * **Rows**: Target (true) label index.
//! * **Columns**: Predicted label index.
//!
//! ## Invariants
//!
//! * The matrix is always square.
//! * The sum of all cells equals the number of recorded samples.
//!
//! ## Non-goals
//!
//! * This module does not compute per-class precision/recall tables.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::{Debug, Display, Formatter, Result};
use core::ops::AddAssign;

// Internal dependencies
use crate::primitives::dataset::LabelsMap;
use crate::primitives::errors::CvError;

// ============================================================================
// Summary Trait
// ============================================================================

/// Per-fold diagnostic object that can be summed across folds.
pub trait Summary: Clone + Debug + Default {
    /// Add `other` into `self`.
    fn accumulate(&mut self, other: &Self);

    /// Attach the dataset label mapping to a finalized summary.
    fn set_labels_map(&mut self, labels_map: &LabelsMap) -> core::result::Result<(), CvError>;
}

// ============================================================================
// ConfusionMatrix
// ============================================================================

/// Square matrix of `(target, predicted)` label counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<u64>>,
    labels_map: Option<LabelsMap>,
}

impl ConfusionMatrix {
    /// Empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matrix from rows of counts; short rows are padded with zeros.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> Self {
        let mut cm = Self::new();
        let size = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(rows.len());
        cm.grow(size);
        for (i, row) in rows.into_iter().enumerate() {
            for (j, c) in row.into_iter().enumerate() {
                cm.counts[i][j] = c;
            }
        }
        cm
    }

    /// Build a matrix from paired target and predicted labels.
    pub fn from_predictions(targets: &[usize], predictions: &[usize]) -> Self {
        let mut cm = Self::new();
        for (&t, &p) in targets.iter().zip(predictions) {
            cm.add(t, p);
        }
        cm
    }

    /// Record one sample.
    pub fn add(&mut self, target: usize, predicted: usize) {
        self.grow(target.max(predicted) + 1);
        self.counts[target][predicted] += 1;
    }

    /// Number of labels (matrix dimension).
    pub fn labels(&self) -> usize {
        self.counts.len()
    }

    /// Count at `(target, predicted)`; zero outside the matrix.
    pub fn get(&self, target: usize, predicted: usize) -> u64 {
        self.counts
            .get(target)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }

    /// Rows of counts.
    pub fn matrix(&self) -> &[Vec<u64>] {
        &self.counts
    }

    /// Total number of recorded samples.
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Number of correctly predicted samples.
    pub fn correct(&self) -> u64 {
        (0..self.labels()).map(|i| self.counts[i][i]).sum()
    }

    /// Fraction of correct predictions, `None` when empty.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.correct() as f64 / total as f64)
    }

    /// Fraction of incorrect predictions, `None` when empty.
    pub fn error(&self) -> Option<f64> {
        self.accuracy().map(|a| 1.0 - a)
    }

    /// Label mapping, if one was attached.
    pub fn labels_map(&self) -> Option<&LabelsMap> {
        self.labels_map.as_ref()
    }

    fn grow(&mut self, size: usize) {
        if size <= self.counts.len() {
            return;
        }
        for row in &mut self.counts {
            row.resize(size, 0);
        }
        self.counts.resize(size, vec![0; size]);
    }
}

impl AddAssign<&ConfusionMatrix> for ConfusionMatrix {
    fn add_assign(&mut self, other: &ConfusionMatrix) {
        self.grow(other.labels());
        for (i, row) in other.counts.iter().enumerate() {
            for (j, &c) in row.iter().enumerate() {
                self.counts[i][j] += c;
            }
        }
        if self.labels_map.is_none() {
            self.labels_map = other.labels_map.clone();
        }
    }
}

impl Summary for ConfusionMatrix {
    fn accumulate(&mut self, other: &Self) {
        *self += other;
    }

    fn set_labels_map(&mut self, labels_map: &LabelsMap) -> core::result::Result<(), CvError> {
        if labels_map.len() < self.labels() {
            return Err(CvError::LabelsMapMismatch {
                got: labels_map.len(),
                min: self.labels(),
            });
        }
        self.labels_map = Some(labels_map.clone());
        Ok(())
    }
}

impl Display for ConfusionMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Confusion matrix ({} labels):", self.labels())?;

        // Column header uses mapped names where available
        let mut names: Vec<Option<&str>> = vec![None; self.labels()];
        if let Some(map) = &self.labels_map {
            for (name, &idx) in map {
                if idx < names.len() {
                    names[idx] = Some(name.as_str());
                }
            }
        }

        write!(f, "  {:>8}", "")?;
        for (j, name) in names.iter().enumerate() {
            match name {
                Some(n) => write!(f, " {:>8}", n)?,
                None => write!(f, " {:>8}", j)?,
            }
        }
        writeln!(f)?;

        for (i, row) in self.counts.iter().enumerate() {
            match names[i] {
                Some(n) => write!(f, "  {:>8}", n)?,
                None => write!(f, "  {:>8}", i)?,
            }
            for c in row {
                write!(f, " {:>8}", c)?;
            }
            writeln!(f)?;
        }

        if let Some(acc) = self.accuracy() {
            writeln!(f, "  Accuracy: {:.4}", acc)?;
        }
        Ok(())
    }
}

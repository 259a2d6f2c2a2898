//! Dataset splitting contract and the default identity splitter.
//!
//! ## Purpose
//!
//! This module defines how the engine pulls folds from a splitter and
//! provides [`NoneSplitter`], the splitter used when none is configured.
//!
//! ## Design notes
//!
//! * **Lazy**: Splitters return an iterator; the engine consumes it exactly once per run.
//! * **Closures**: Any `Fn(&D) -> Vec<Fold<D>>` closure is a splitter.
//! * **Last-split marker**: Splitters that want the engine to keep the live
//!   transfer error for the final fold mark that fold's partitions.
//!
//! ## Key concepts
//!
//! * **Train partition**: Absent means "do not train on this fold".
//! * **Test partition**: Always the partition the transfer error is evaluated on.
//!
//! ## Invariants
//!
//! * At most one fold is marked as the last split and, if present, it is the
//!   final fold yielded. The engine rejects a fold after a marked one when it
//!   keeps transfer error snapshots.
//!
//! ## Non-goals
//!
//! * This module does not implement k-fold or other resampling schemes.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::boxed::Box;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::iter;

// Internal dependencies
use crate::primitives::dataset::Fold;

// ============================================================================
// Splitter Trait
// ============================================================================

/// Lazily produced sequence of folds.
pub type Folds<'a, D> = Box<dyn Iterator<Item = Fold<D>> + 'a>;

/// Produces the train/test folds of a source dataset.
pub trait Splitter<D> {
    /// Produce the folds of `dataset`.
    fn split<'a>(&'a self, dataset: &'a D) -> Folds<'a, D>;

    /// Human-readable name used in summaries.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<D, F> Splitter<D> for F
where
    F: Fn(&D) -> Vec<Fold<D>>,
{
    fn split<'a>(&'a self, dataset: &'a D) -> Folds<'a, D> {
        Box::new(self(dataset).into_iter())
    }
}

// ============================================================================
// NoneSplitter
// ============================================================================

/// Which side of the single fold receives the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoneSplitMode {
    /// `(dataset, None)`: train on everything, nothing held out.
    First,

    /// `(None, dataset)`: no training, evaluate on everything.
    #[default]
    Second,
}

/// Identity splitter yielding the whole dataset as a single fold.
///
/// The fold is marked as the last split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoneSplitter {
    mode: NoneSplitMode,
}

impl NoneSplitter {
    /// Create an identity splitter with the default mode ([`NoneSplitMode::Second`]).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set which side of the fold receives the dataset.
    pub fn mode(mut self, mode: NoneSplitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Configured mode.
    pub fn get_mode(&self) -> NoneSplitMode {
        self.mode
    }
}

impl<D: Clone> Splitter<D> for NoneSplitter {
    fn split<'a>(&'a self, dataset: &'a D) -> Folds<'a, D> {
        let whole = Some(dataset.clone());
        let fold = match self.mode {
            NoneSplitMode::First => Fold::new(whole, None),
            NoneSplitMode::Second => Fold::new(None, whole),
        };
        Box::new(iter::once(fold.last_split(true)))
    }

    fn name(&self) -> &str {
        match self.mode {
            NoneSplitMode::First => "none(first)",
            NoneSplitMode::Second => "none(second)",
        }
    }
}

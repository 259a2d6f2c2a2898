//! Dataset, partition and fold abstractions.
//!
//! ## Purpose
//!
//! This module defines the read-only view the engine needs of a dataset and
//! the containers a splitter uses to hand train/test partitions to the
//! engine.
//!
//! ## Design notes
//!
//! * **Opaque storage**: The engine only reads sample ids and the label mapping.
//! * **Shared partitions**: Partition data lives behind an `Arc` so splits can be
//!   recorded, harvested and exposed to predictors without copying samples.
//! * **Explicit marker**: The last-split marker is a plain field set by the splitter.
//!
//! ## Key concepts
//!
//! * **Dataset**: Samples with original ids and an optional label mapping.
//! * **Partition**: One side of a fold plus its last-split marker.
//! * **Fold**: A `(train, test)` pair, either side may be absent.
//!
//! ## Invariants
//!
//! * A partition never changes after the splitter created it.
//! * `Fold::is_last_split` only looks at the first present partition.
//!
//! ## Non-goals
//!
//! * This module does not index, store or subset samples.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BTreeMap;
#[cfg(feature = "std")]
use std::string::String;
#[cfg(feature = "std")]
use std::sync::Arc;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::Debug;
use core::ops::Deref;

// ============================================================================
// Dataset
// ============================================================================

/// Mapping from literal label names to the numeric labels used by predictors.
pub type LabelsMap = BTreeMap<String, usize>;

/// Read-only view of a dataset as seen by the engine.
pub trait Dataset {
    /// Identifier type of a single sample.
    type SampleId: Clone + Ord + Debug;

    /// Original sample identifiers, in sample order.
    fn sample_ids(&self) -> Vec<Self::SampleId>;

    /// Label mapping attached to the dataset, if any.
    fn labels_map(&self) -> Option<&LabelsMap> {
        None
    }
}

// ============================================================================
// Partition
// ============================================================================

/// One side of a fold: shared dataset data plus the last-split marker.
#[derive(Debug)]
pub struct Partition<D> {
    data: Arc<D>,
    last_split: bool,
}

impl<D> Partition<D> {
    /// Wrap a dataset into a partition not marked as the last split.
    pub fn new(data: D) -> Self {
        Self::from_shared(Arc::new(data))
    }

    /// Wrap already shared data into a partition.
    pub fn from_shared(data: Arc<D>) -> Self {
        Self {
            data,
            last_split: false,
        }
    }

    /// Set the last-split marker.
    pub fn last_split(mut self, last: bool) -> Self {
        self.last_split = last;
        self
    }

    /// Whether the splitter marked this partition as part of the last split.
    pub fn is_last_split(&self) -> bool {
        self.last_split
    }

    /// Shared handle to the partition data.
    pub fn shared(&self) -> Arc<D> {
        Arc::clone(&self.data)
    }

    /// Copy of the partition that owns a fresh clone of the data.
    pub fn deep_clone(&self) -> Self
    where
        D: Clone,
    {
        Self {
            data: Arc::new((*self.data).clone()),
            last_split: self.last_split,
        }
    }
}

// Cloning a partition shares the underlying data.
impl<D> Clone for Partition<D> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            last_split: self.last_split,
        }
    }
}

impl<D> Deref for Partition<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.data
    }
}

// ============================================================================
// Fold
// ============================================================================

/// A single `(train, test)` pair produced by a splitter.
///
/// An absent training partition means "do not (re)train" for this fold.
#[derive(Debug)]
pub struct Fold<D> {
    /// Partition used to train the predictor.
    pub train: Option<Partition<D>>,

    /// Partition the predictor is evaluated on.
    pub test: Option<Partition<D>>,
}

impl<D> Fold<D> {
    /// Build a fold from optional train and test datasets.
    pub fn new(train: Option<D>, test: Option<D>) -> Self {
        Self {
            train: train.map(Partition::new),
            test: test.map(Partition::new),
        }
    }

    /// Build a fold from ready-made partitions.
    pub fn from_partitions(train: Option<Partition<D>>, test: Option<Partition<D>>) -> Self {
        Self { train, test }
    }

    /// Mark every present partition with the given last-split flag.
    pub fn last_split(mut self, last: bool) -> Self {
        self.train = self.train.map(|p| p.last_split(last));
        self.test = self.test.map(|p| p.last_split(last));
        self
    }

    /// Last-split marker of the first present partition (train, then test).
    ///
    /// A fold with both partitions absent is never the last split.
    pub fn is_last_split(&self) -> bool {
        self.train
            .iter()
            .chain(self.test.iter())
            .next()
            .is_some_and(Partition::is_last_split)
    }

    /// Training data, if present.
    pub fn train_data(&self) -> Option<&D> {
        self.train.as_deref()
    }

    /// Test data, if present.
    pub fn test_data(&self) -> Option<&D> {
        self.test.as_deref()
    }

    /// Copy of the fold whose partitions own fresh clones of their data.
    pub fn deep_clone(&self) -> Self
    where
        D: Clone,
    {
        Self {
            train: self.train.as_ref().map(Partition::deep_clone),
            test: self.test.as_ref().map(Partition::deep_clone),
        }
    }
}

// Cloning a fold shares the partition data.
impl<D> Clone for Fold<D> {
    fn clone(&self) -> Self {
        Self {
            train: self.train.clone(),
            test: self.test.clone(),
        }
    }
}

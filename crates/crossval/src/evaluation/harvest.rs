//! Per-fold harvesting of caller-selected values.
//!
//! ## Purpose
//!
//! This module lets a caller declare which values of each processed fold
//! should be kept after the run (the fold's error value, its split, the
//! transfer error's diagnostic sub-state), independently of the engine's
//! own diagnostic accumulators.
//!
//! ## Design notes
//!
//! * **Typed context**: The engine hands a [`FoldContext`] to the harvester and to
//!   an optional caller hook instead of exposing its local scope.
//! * **Copy modes**: `Shared` keeps the very fold the engine saw, `Copy` keeps a new
//!   fold container over the same partition data, `DeepCopy` clones the data.
//! * **Owned values**: Summaries and per-sample maps are always cloned out of the
//!   transfer error, since it is reused or dropped after the fold.
//!
//! ## Invariants
//!
//! * When any attribute is declared, exactly one record is produced per fold.
//! * Records are reset at the start of every run.
//!
//! ## Non-goals
//!
//! * This module does not interpret the harvested values.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BTreeMap;
#[cfg(feature = "std")]
use std::sync::Arc;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::{Debug, Display, Formatter, Result};

// Internal dependencies
use crate::algorithms::transfer::TransferError;
use crate::primitives::dataset::{Dataset, Fold};

// ============================================================================
// Configuration
// ============================================================================

/// A value of the fold-processing scope that can be harvested.
///
/// The evaluating transfer error itself is not an attribute; an `on_fold` hook
/// can keep it through [`FoldContext::transerror`], e.g. with `duplicate()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HarvestAttribute {
    /// The fold's error value.
    Result,

    /// The fold itself.
    Split,

    /// Whether the live transfer error evaluated the fold.
    UsedLive,

    /// The transfer error's confusion summary for the fold.
    Confusion,

    /// The transfer error's training confusion summary for the fold.
    TrainingConfusion,

    /// The transfer error's per-sample errors for the fold.
    SamplesError,
}

impl HarvestAttribute {
    /// Stable snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Result => "result",
            Self::Split => "split",
            Self::UsedLive => "used_live",
            Self::Confusion => "confusion",
            Self::TrainingConfusion => "training_confusion",
            Self::SamplesError => "samples_error",
        }
    }
}

impl Display for HarvestAttribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())
    }
}

/// How harvested splits are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HarvestCopy {
    /// Keep a handle to the fold the engine processed.
    Shared,

    /// Keep a new fold container sharing the partition data.
    #[default]
    Copy,

    /// Keep a fold whose partitions own cloned data.
    DeepCopy,
}

// ============================================================================
// Fold Context
// ============================================================================

/// Everything the engine knows about a fold right after evaluating it.
pub struct FoldContext<'a, D: Dataset, TE: TransferError<D>> {
    /// Zero-based fold index.
    pub index: usize,

    /// The fold as produced by the splitter.
    pub split: &'a Arc<Fold<D>>,

    /// The transfer error instance that evaluated the fold.
    pub transerror: &'a TE,

    /// The fold's error value.
    pub result: TE::Value,

    /// Whether `transerror` is the engine's live instance (not a duplicate).
    pub used_live: bool,
}

// ============================================================================
// Harvest Record
// ============================================================================

/// Values captured from one fold.
#[derive(Debug, Clone)]
pub struct HarvestRecord<D: Dataset, S, T> {
    /// Zero-based fold index (always captured).
    pub fold: usize,

    /// Error value, if harvested.
    pub result: Option<T>,

    /// The fold, if harvested.
    pub split: Option<Arc<Fold<D>>>,

    /// Whether the live instance evaluated the fold, if harvested.
    pub used_live: Option<bool>,

    /// Confusion summary, if harvested and available.
    pub confusion: Option<S>,

    /// Training confusion summary, if harvested and available.
    pub training_confusion: Option<S>,

    /// Per-sample errors, if harvested and available.
    pub samples_error: Option<BTreeMap<D::SampleId, T>>,
}

// ============================================================================
// Harvester
// ============================================================================

/// Accumulates one [`HarvestRecord`] per fold for the declared attributes.
#[derive(Debug, Clone)]
pub struct Harvester<D: Dataset, S, T> {
    attributes: Vec<HarvestAttribute>,
    copy: HarvestCopy,
    records: Vec<HarvestRecord<D, S, T>>,
}

impl<D: Dataset, S, T> Default for Harvester<D, S, T> {
    fn default() -> Self {
        Self::new(Vec::new(), HarvestCopy::default())
    }
}

impl<D: Dataset, S, T> Harvester<D, S, T> {
    /// Create a harvester for the given attributes.
    pub fn new(attributes: Vec<HarvestAttribute>, copy: HarvestCopy) -> Self {
        Self {
            attributes,
            copy,
            records: Vec::new(),
        }
    }

    /// Whether any attribute is declared.
    pub fn is_active(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Declared attributes.
    pub fn attributes(&self) -> &[HarvestAttribute] {
        &self.attributes
    }

    /// Configured copy mode.
    pub fn copy_mode(&self) -> HarvestCopy {
        self.copy
    }

    /// Records of the last run, in fold order.
    pub fn records(&self) -> &[HarvestRecord<D, S, T>] {
        &self.records
    }

    /// Drop all records.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    fn wants(&self, attribute: HarvestAttribute) -> bool {
        self.attributes.contains(&attribute)
    }
}

impl<D, S, T> Harvester<D, S, T>
where
    D: Dataset + Clone,
    S: Clone,
    T: Copy,
{
    /// Capture the declared attributes of one fold.
    pub fn harvest<TE>(&mut self, ctx: &FoldContext<'_, D, TE>)
    where
        TE: TransferError<D, Summary = S, Value = T>,
    {
        if !self.is_active() {
            return;
        }

        let split = self.wants(HarvestAttribute::Split).then(|| match self.copy {
            HarvestCopy::Shared => Arc::clone(ctx.split),
            HarvestCopy::Copy => Arc::new(Fold::clone(ctx.split)),
            HarvestCopy::DeepCopy => Arc::new(ctx.split.deep_clone()),
        });

        let record = HarvestRecord {
            fold: ctx.index,
            result: self.wants(HarvestAttribute::Result).then_some(ctx.result),
            split,
            used_live: self
                .wants(HarvestAttribute::UsedLive)
                .then_some(ctx.used_live),
            confusion: self
                .wants(HarvestAttribute::Confusion)
                .then(|| ctx.transerror.confusion().cloned())
                .flatten(),
            training_confusion: self
                .wants(HarvestAttribute::TrainingConfusion)
                .then(|| ctx.transerror.training_confusion().cloned())
                .flatten(),
            samples_error: self
                .wants(HarvestAttribute::SamplesError)
                .then(|| ctx.transerror.samples_error().cloned())
                .flatten(),
        };

        self.records.push(record);
    }
}

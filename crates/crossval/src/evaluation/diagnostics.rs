//! Diagnostic accumulators of a cross-validation run.
//!
//! ## Purpose
//!
//! This module holds the side-channel results of a run: per-fold error
//! values, recorded splits, transfer error snapshots, summed confusion
//! summaries and per-sample error contributions. Each stream is collected
//! only when its [`Diagnostic`] is enabled.
//!
//! ## Design notes
//!
//! * **Typed accessors**: One accessor per diagnostic, `None` when disabled.
//! * **Reset per run**: Accumulators are rebuilt from the source dataset at the start of `run`.
//! * **Partial state**: After a failed run the accumulators hold whatever the
//!   completed folds produced and must not be trusted.
//!
//! ## Key concepts
//!
//! * **Fold order**: Every sequence is in the order the splitter yielded folds.
//! * **Sample keys**: `samples_error` is keyed by exactly the dataset's sample ids.
//!
//! ## Invariants
//!
//! * Each enabled accumulator has one entry (or contribution) per processed fold.
//! * Identifiers absent from a fold's test partition receive no contribution for that fold.
//!
//! ## Non-goals
//!
//! * This module does not decide which transfer error instance evaluates a fold.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(not(feature = "std"))]
use alloc::format;
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
use core::fmt::{Display, Formatter, Result};
use num_traits::ToPrimitive;
use tracing::debug;

// Internal dependencies
use crate::algorithms::transfer::TransferError;
use crate::math::confusion::Summary;
use crate::primitives::dataset::{Dataset, Fold, LabelsMap};
use crate::primitives::errors::CvError;
use crate::primitives::state::{Diagnostic, DiagnosticSet};

// ============================================================================
// Diagnostics Structure
// ============================================================================

/// Accumulated diagnostics of the most recent run.
pub struct CvDiagnostics<D: Dataset, TE: TransferError<D>> {
    enabled: DiagnosticSet,
    folds: usize,
    results: Option<Vec<TE::Value>>,
    splits: Vec<Arc<Fold<D>>>,
    transerrors: Vec<TE>,
    confusion: TE::Summary,
    training_confusion: TE::Summary,
    samples_error: BTreeMap<D::SampleId, Vec<TE::Value>>,
}

impl<D: Dataset, TE: TransferError<D>> CvDiagnostics<D, TE> {
    /// Create empty accumulators for the given diagnostics.
    pub fn new(enabled: DiagnosticSet) -> Self {
        Self {
            enabled,
            folds: 0,
            results: None,
            splits: Vec::new(),
            transerrors: Vec::new(),
            confusion: TE::Summary::default(),
            training_confusion: TE::Summary::default(),
            samples_error: BTreeMap::new(),
        }
    }

    // ========================================================================
    // Enablement
    // ========================================================================

    /// Enabled diagnostics.
    pub fn enabled(&self) -> DiagnosticSet {
        self.enabled
    }

    /// Check whether a diagnostic is enabled.
    pub fn is_enabled(&self, diagnostic: Diagnostic) -> bool {
        self.enabled.contains(diagnostic)
    }

    /// Enable a diagnostic for subsequent runs.
    pub fn enable(&mut self, diagnostic: Diagnostic) {
        self.enabled.insert(diagnostic);
    }

    /// Disable a diagnostic for subsequent runs.
    pub fn disable(&mut self, diagnostic: Diagnostic) {
        self.enabled.remove(diagnostic);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of folds processed by the last run.
    pub fn folds(&self) -> usize {
        self.folds
    }

    /// Per-fold error values.
    pub fn results(&self) -> Option<&[TE::Value]> {
        self.results.as_deref()
    }

    /// Recorded folds.
    pub fn splits(&self) -> Option<&[Arc<Fold<D>>]> {
        self.is_enabled(Diagnostic::Splits)
            .then_some(self.splits.as_slice())
    }

    /// Summed confusion summary over all test partitions.
    pub fn confusion(&self) -> Option<&TE::Summary> {
        self.is_enabled(Diagnostic::Confusion)
            .then_some(&self.confusion)
    }

    /// Summed confusion summary over all training partitions.
    pub fn training_confusion(&self) -> Option<&TE::Summary> {
        self.is_enabled(Diagnostic::TrainingConfusion)
            .then_some(&self.training_confusion)
    }

    /// Per-sample error contributions, keyed by the dataset's sample ids.
    pub fn samples_error(&self) -> Option<&BTreeMap<D::SampleId, Vec<TE::Value>>> {
        self.is_enabled(Diagnostic::SamplesError)
            .then_some(&self.samples_error)
    }

    // Snapshots of every fold except the one retained by the engine.
    pub(crate) fn stored_transerrors(&self) -> &[TE] {
        &self.transerrors
    }

    // ========================================================================
    // Accumulation
    // ========================================================================

    /// Reset every accumulator to its initial state.
    ///
    /// `sample_ids` are the source dataset's identifiers; they become the keys
    /// of `samples_error` when that diagnostic is enabled.
    pub(crate) fn reset(&mut self, sample_ids: Vec<D::SampleId>) {
        self.folds = 0;
        self.results = None;
        self.splits.clear();
        self.transerrors.clear();
        self.confusion = TE::Summary::default();
        self.training_confusion = TE::Summary::default();
        self.samples_error.clear();

        if self.is_enabled(Diagnostic::SamplesError) {
            self.samples_error = sample_ids.into_iter().map(|id| (id, Vec::new())).collect();
        }
    }

    /// Count a processed fold.
    pub(crate) fn record_fold(&mut self) {
        self.folds += 1;
    }

    /// Record a fold as produced by the splitter.
    pub(crate) fn record_split(&mut self, split: &Arc<Fold<D>>) {
        if self.is_enabled(Diagnostic::Splits) {
            self.splits.push(Arc::clone(split));
        }
    }

    /// Keep a transfer error snapshot.
    pub(crate) fn record_transerror(&mut self, transerror: TE) {
        self.transerrors.push(transerror);
    }

    /// Append the per-sample errors reported by `transerror` for fold `fold`.
    pub(crate) fn record_samples_error(
        &mut self,
        fold: usize,
        transerror: &TE,
    ) -> core::result::Result<(), CvError> {
        if !self.is_enabled(Diagnostic::SamplesError) {
            return Ok(());
        }
        let Some(errors) = transerror.samples_error() else {
            return Ok(());
        };

        for (id, &value) in errors {
            match self.samples_error.get_mut(id) {
                Some(contributions) => contributions.push(value),
                None => {
                    return Err(CvError::UnknownSample {
                        fold,
                        id: format!("{:?}", id),
                    });
                }
            }
        }
        Ok(())
    }

    /// Add the fold's confusion summaries of `transerror` into the running totals.
    pub(crate) fn accumulate_confusion(&mut self, transerror: &TE) {
        if self.is_enabled(Diagnostic::Confusion) {
            if let Some(cm) = transerror.confusion() {
                self.confusion.accumulate(cm);
            }
        }
        if self.is_enabled(Diagnostic::TrainingConfusion) {
            if let Some(cm) = transerror.training_confusion() {
                self.training_confusion.accumulate(cm);
            }
        }
    }

    /// Store the per-fold results if requested.
    pub(crate) fn store_results(&mut self, results: &[TE::Value]) {
        if self.is_enabled(Diagnostic::Results) {
            self.results = Some(results.to_vec());
        }
    }

    /// Attach the dataset label mapping to the summed summaries.
    ///
    /// Failures are logged and discarded: a summary without labels is still usable.
    pub(crate) fn attach_labels_map(&mut self, labels_map: Option<&LabelsMap>) {
        let wanted = [
            (Diagnostic::Confusion, &mut self.confusion),
            (Diagnostic::TrainingConfusion, &mut self.training_confusion),
        ];
        for (diagnostic, summary) in wanted {
            if !self.enabled.contains(diagnostic) {
                continue;
            }
            let outcome = match labels_map {
                Some(map) => summary.set_labels_map(map),
                None => Err(CvError::InvalidInput("dataset has no label mapping".into())),
            };
            if let Err(err) = outcome {
                debug!(diagnostic = diagnostic.name(), error = %err, "Label mapping not attached");
            }
        }
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl<D: Dataset, TE: TransferError<D>> Display for CvDiagnostics<D, TE> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Cross-Validation Diagnostics:")?;
        writeln!(f, "  Enabled:      {}", self.enabled)?;
        writeln!(f, "  Folds:        {}", self.folds)?;

        if let Some(results) = self.results() {
            write!(f, "  Results:     ")?;
            for r in results {
                write!(f, " {:.6}", r.to_f64().unwrap_or(f64::NAN))?;
            }
            writeln!(f)?;
        }
        if let Some(splits) = self.splits() {
            writeln!(f, "  Splits:       {}", splits.len())?;
        }
        if self.is_enabled(Diagnostic::TransErrors) {
            let retained = usize::from(self.folds > 0);
            writeln!(
                f,
                "  TransErrors:  {}",
                self.transerrors.len() + retained
            )?;
        }
        if let Some(samples) = self.samples_error() {
            let contributions: usize = samples.values().map(Vec::len).sum();
            writeln!(
                f,
                "  SamplesError: {} samples, {} contributions",
                samples.len(),
                contributions
            )?;
        }
        if let Some(cm) = self.confusion() {
            writeln!(f, "  Confusion:    {:?}", cm)?;
        }
        if let Some(cm) = self.training_confusion() {
            writeln!(f, "  Training:     {:?}", cm)?;
        }
        Ok(())
    }
}

//! Execution engine for cross-validated transfer errors.
//!
//! ## Purpose
//!
//! This module provides [`CrossValidatedTransferError`], the component that
//! pulls folds from a splitter, has a transfer error train and evaluate on
//! each of them, collects the enabled diagnostics, and combines the per-fold
//! error values into one summary value.
//!
//! ## Design notes
//!
//! * **Sequential**: Folds are processed one at a time in splitter order.
//! * **Copy-vs-reuse protocol**: With transfer error snapshots enabled, every fold
//!   except the one marked last is evaluated by an independent duplicate of an
//!   untrained instance; otherwise the live instance evaluates every fold.
//! * **Scoped override**: Transfer-level diagnostics are enabled through a guard
//!   that restores the previous enablement on every exit path.
//! * **Rebinding**: After the loop the engine keeps the instance used on the last fold.
//! * **Cooperative cancellation**: An optional token is checked between folds only.
//!
//! ## Key concepts
//!
//! * **Live instance**: The transfer error owned by the engine.
//! * **Last split**: Marker set by the splitter on the partitions of the final fold.
//! * **Test exposure**: Opt-in hand-off of the held-out partition to predictors that
//!   use it for early stopping.
//!
//! ## Invariants
//!
//! * The combiner is called exactly once, with the per-fold results in fold order.
//! * Diagnostic toggles never change the returned summary value.
//! * The transfer error's diagnostic enablement after `run` equals the one before it.
//!
//! ## Non-goals
//!
//! * This module does not train or evaluate anything itself (done by the transfer error).
//! * This module does not retry failed folds or run folds in parallel.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::boxed::Box;
#[cfg(feature = "std")]
use std::sync::Arc;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::{Display, Formatter};
use core::iter;
use num_traits::ToPrimitive;
use tracing::debug;

// Internal dependencies
use crate::algorithms::splitter::Splitter;
use crate::algorithms::transfer::{Predictor, TransferError};
use crate::engine::guard::TemporaryEnablement;
use crate::engine::validator::Validator;
use crate::evaluation::diagnostics::CvDiagnostics;
use crate::evaluation::harvest::{FoldContext, HarvestRecord, Harvester};
use crate::math::combiner::Combiner;
use crate::primitives::cancel::CancelToken;
use crate::primitives::dataset::{Dataset, Fold};
use crate::primitives::errors::CvError;
use crate::primitives::state::{Diagnostic, DiagnosticSet, TrainingState};

// ============================================================================
// Type Definitions
// ============================================================================

/// Caller hook invoked with the context of every processed fold.
pub type FoldHook<D, TE> = Box<dyn FnMut(&FoldContext<'_, D, TE>)>;

/// Harvester specialized to a transfer error's summary and value types.
pub type TransferHarvester<D, TE> =
    Harvester<D, <TE as TransferError<D>>::Summary, <TE as TransferError<D>>::Value>;

/// Harvest record specialized to a transfer error's summary and value types.
pub type TransferHarvestRecord<D, TE> =
    HarvestRecord<D, <TE as TransferError<D>>::Summary, <TE as TransferError<D>>::Value>;

// ============================================================================
// Cross-Validated Transfer Error
// ============================================================================

/// Cross-validation of a transfer error over the folds of a splitter.
pub struct CrossValidatedTransferError<D: Dataset, TE: TransferError<D>> {
    pub(crate) transerror: TE,
    pub(crate) splitter: Box<dyn Splitter<D>>,
    pub(crate) combiner: Box<dyn Combiner<TE::Value>>,
    pub(crate) expose_test_dataset: bool,
    pub(crate) diagnostics: CvDiagnostics<D, TE>,
    pub(crate) harvester: TransferHarvester<D, TE>,
    pub(crate) on_fold: Option<FoldHook<D, TE>>,
    pub(crate) cancel: Option<CancelToken>,
}

impl<D, TE> CrossValidatedTransferError<D, TE>
where
    D: Dataset + Clone,
    TE: TransferError<D>,
{
    // ========================================================================
    // Main Entry Point
    // ========================================================================

    /// Cross-validate the transfer error on `dataset`.
    ///
    /// Returns the combiner's reduction of the per-fold error values. Enabled
    /// diagnostics are available afterwards through [`Self::diagnostics`]; after
    /// an error they are partially populated and should not be relied upon.
    pub fn run(&mut self, dataset: &D) -> Result<TE::Value, TE::Error> {
        // Reset accumulators of the enabled diagnostics
        let enabled = self.diagnostics.enabled();
        let sample_ids = if enabled.contains(Diagnostic::SamplesError) {
            let ids = dataset.sample_ids();
            Validator::validate_unique_ids(&ids)?;
            ids
        } else {
            Vec::new()
        };
        self.diagnostics.reset(sample_ids);
        self.harvester.reset();

        let results = Self::run_folds(
            dataset,
            enabled,
            &mut self.transerror,
            self.splitter.as_ref(),
            self.expose_test_dataset,
            &mut self.diagnostics,
            &mut self.harvester,
            self.on_fold.as_mut(),
            self.cancel.as_ref(),
        )?;

        self.diagnostics.store_results(&results);
        self.diagnostics.attach_labels_map(dataset.labels_map());

        let summary = self.combiner.combine(&results)?;
        debug!(
            folds = results.len(),
            combiner = self.combiner.name(),
            summary = summary.to_f64().unwrap_or(f64::NAN),
            "Cross-validation finished"
        );
        Ok(summary)
    }

    // ========================================================================
    // Fold Loop
    // ========================================================================

    // Process every fold and return the per-fold results in fold order.
    //
    // The enablement guard lives for the whole loop; the instance used on the
    // last fold is rebound into the engine slot before the guard drops.
    #[allow(clippy::too_many_arguments)]
    fn run_folds(
        dataset: &D,
        enabled: DiagnosticSet,
        live: &mut TE,
        splitter: &dyn Splitter<D>,
        expose_test_dataset: bool,
        diagnostics: &mut CvDiagnostics<D, TE>,
        harvester: &mut TransferHarvester<D, TE>,
        mut on_fold: Option<&mut FoldHook<D, TE>>,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<TE::Value>, TE::Error> {
        let keep_transerrors = enabled.contains(Diagnostic::TransErrors);
        let mut live = TemporaryEnablement::new(live, enabled.transfer_subset());

        // Duplicating a trained predictor is undefined for some implementations
        if keep_transerrors {
            live.untrain();
        }

        let mut results: Vec<TE::Value> = Vec::new();
        let mut duplicate: Option<TE> = None;
        let mut seen_last = false;

        for (index, fold) in splitter.split(dataset).enumerate() {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                debug!(fold = index, "Cross-validation cancelled");
                return Err(CvError::Cancelled { fold: index }.into());
            }

            if keep_transerrors && seen_last {
                return Err(CvError::FoldAfterLastSplit { fold: index }.into());
            }

            let split = Arc::new(fold);
            diagnostics.record_split(&split);

            // Pick the instance evaluating this fold
            let mut used_live = true;
            if keep_transerrors {
                if let Some(previous) = duplicate.take() {
                    diagnostics.record_transerror(previous);
                }
                if split.is_last_split() {
                    seen_last = true;
                } else {
                    if live.training_state() == TrainingState::Trained {
                        return Err(CvError::DuplicateTrained.into());
                    }
                    duplicate = Some(live.duplicate());
                    used_live = false;
                }
            }
            let transerror: &mut TE = match duplicate.as_mut() {
                Some(copy) => copy,
                None => &mut *live,
            };

            let result = Self::evaluate_fold(transerror, &split, expose_test_dataset)?;

            let ctx = FoldContext {
                index,
                split: &split,
                transerror: &*transerror,
                result,
                used_live,
            };
            harvester.harvest(&ctx);
            if let Some(hook) = on_fold.as_deref_mut() {
                hook(&ctx);
            }

            diagnostics.record_samples_error(index, transerror)?;
            diagnostics.accumulate_confusion(transerror);
            diagnostics.record_fold();

            debug!(
                fold = index,
                result = result.to_f64().unwrap_or(f64::NAN),
                used_live,
                "Split evaluated"
            );
            results.push(result);
        }

        // Keep the instance used on the last fold
        if let Some(last) = duplicate {
            live.rebind(last);
        }

        drop(live);
        Ok(results)
    }

    // Evaluate one fold, exposing the test partition to the predictor if requested.
    fn evaluate_fold(
        transerror: &mut TE,
        split: &Fold<D>,
        expose_test_dataset: bool,
    ) -> Result<TE::Value, TE::Error> {
        let expose = expose_test_dataset && transerror.predictor().accepts_test_reference();
        if expose {
            let test = split.test.as_ref().map(|p| p.shared());
            transerror.predictor_mut().set_test_reference(test);
        }

        let result = transerror.evaluate(split.test_data(), split.train_data());

        if expose {
            transerror.predictor_mut().set_test_reference(None);
        }
        result
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The transfer error currently held by the engine.
    ///
    /// After a run this is the instance that evaluated the last fold.
    pub fn transerror(&self) -> &TE {
        &self.transerror
    }

    /// The transfer error currently held by the engine, mutably.
    pub fn transerror_mut(&mut self) -> &mut TE {
        &mut self.transerror
    }

    /// Give up the engine and return its transfer error.
    pub fn into_transerror(self) -> TE {
        self.transerror
    }

    /// The configured splitter.
    pub fn splitter(&self) -> &dyn Splitter<D> {
        self.splitter.as_ref()
    }

    /// The configured combiner.
    pub fn combiner(&self) -> &dyn Combiner<TE::Value> {
        self.combiner.as_ref()
    }

    /// Whether the held-out partition is handed to capable predictors.
    pub fn exposes_test_dataset(&self) -> bool {
        self.expose_test_dataset
    }

    /// Diagnostics of the last run.
    pub fn diagnostics(&self) -> &CvDiagnostics<D, TE> {
        &self.diagnostics
    }

    /// Enable a diagnostic for subsequent runs.
    pub fn enable(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.enable(diagnostic);
    }

    /// Disable a diagnostic for subsequent runs.
    pub fn disable(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.disable(diagnostic);
    }

    /// Harvested records of the last run, one per fold.
    pub fn harvested(&self) -> &[TransferHarvestRecord<D, TE>] {
        self.harvester.records()
    }

    /// Transfer error instances used on each fold of the last run, in fold order.
    ///
    /// The final element is the engine's current instance. `None` when the
    /// diagnostic is disabled.
    pub fn transerrors(&self) -> Option<impl Iterator<Item = &TE> + '_> {
        if !self.diagnostics.is_enabled(Diagnostic::TransErrors) {
            return None;
        }
        let retained = (self.diagnostics.folds() > 0).then_some(&self.transerror);
        Some(
            self.diagnostics
                .stored_transerrors()
                .iter()
                .chain(iter::once(retained).flatten()),
        )
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl<D: Dataset, TE: TransferError<D>> Display for CrossValidatedTransferError<D, TE> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "CrossValidatedTransferError:")?;
        writeln!(f, "  Splitter:     {}", self.splitter.name())?;
        writeln!(f, "  Combiner:     {}", self.combiner.name())?;
        writeln!(f, "  Diagnostics:  {}", self.diagnostics.enabled())?;
        writeln!(f, "  Expose test:  {}", self.expose_test_dataset)?;
        if self.harvester.is_active() {
            write!(f, "  Harvest:     ")?;
            for attr in self.harvester.attributes() {
                write!(f, " {}", attr)?;
            }
            writeln!(f, " ({:?})", self.harvester.copy_mode())?;
        }
        Ok(())
    }
}

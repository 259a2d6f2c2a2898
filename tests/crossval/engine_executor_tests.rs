#![cfg(feature = "dev")]
//! Tests for the cross-validation execution engine.
//!
//! These tests verify the fold loop of `CrossValidatedTransferError` for:
//! - Combining per-fold results
//! - Collecting diagnostics (results, splits, confusion, per-sample errors)
//! - The copy-vs-reuse protocol of transfer error snapshots
//! - Restoring transfer error state on success and failure
//! - Test exposure, cancellation and harvesting
//!
//! ## Test Organization
//!
//! 1. **Result Combining** - Grand mean, custom combiners, empty splitters
//! 2. **Diagnostics** - Results, splits, confusion, per-sample errors
//! 3. **Transfer Error Snapshots** - Live versus duplicated instances
//! 4. **State Restoration** - Enablement after success and errors
//! 5. **Test Exposure** - Reference hand-off to capable predictors
//! 6. **Cancellation** - Token checks between folds
//! 7. **Harvesting** - Attributes and copy modes
//! 8. **Edge Cases** - Identity splitter, ids, idempotence

mod common;

use approx::assert_relative_eq;
use std::sync::{Arc, Mutex};

use common::{ErrorRate, MockError, ScriptedSplitter, Table, three_fold_fixture, two_fold_fixture};
use crossval::internals::api::{
    CancelToken, ConfusionMatrix, CrossValidationBuilder as CrossValidation, CvError, Diagnostic,
    DiagnosticSet, Fold, FoldContext, HarvestAttribute, HarvestCopy, NoneSplitMode, NoneSplitter,
    Predictor, TransferError,
};

// ============================================================================
// Result Combining Tests
// ============================================================================

/// Test the grand mean of three folds.
///
/// Verifies that fold errors 0.2, 0.4 and 0.6 combine to 0.4.
#[test]
fn test_run_grand_mean() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .build(ErrorRate::new())
        .unwrap();

    let error = cv.run(&table).unwrap();
    assert_relative_eq!(error, 0.4, epsilon = 1e-12);
    assert_eq!(cv.diagnostics().folds(), 3);
}

/// Test a named combiner.
///
/// Verifies that the configured combiner reduces the fold errors.
#[test]
fn test_run_with_max_combiner() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .combiner_name("max")
        .build(ErrorRate::new())
        .unwrap();

    assert_relative_eq!(cv.run(&table).unwrap(), 0.6, epsilon = 1e-12);
}

/// Test that the combiner sees results in fold order.
///
/// Verifies the sequence handed to a custom combiner.
#[test]
fn test_combiner_receives_fold_order() {
    let (table, splitter) = three_fold_fixture();
    let seen: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let first = move |results: &[f64]| -> Result<f64, CvError> {
        sink.lock().unwrap().extend_from_slice(results);
        results.first().copied().ok_or(CvError::EmptyResults)
    };

    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .combiner(first)
        .build(ErrorRate::new())
        .unwrap();

    assert_relative_eq!(cv.run(&table).unwrap(), 0.2, epsilon = 1e-12);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_relative_eq!(seen[0], 0.2, epsilon = 1e-12);
    assert_relative_eq!(seen[1], 0.4, epsilon = 1e-12);
    assert_relative_eq!(seen[2], 0.6, epsilon = 1e-12);
}

/// Test a splitter yielding no folds.
///
/// Verifies that the grand mean of nothing is an error.
#[test]
fn test_empty_splitter() {
    let table = Table::new(&[0, 1]);
    let mut cv = CrossValidation::new()
        .splitter(ScriptedSplitter::new(vec![]))
        .enable(Diagnostic::Results)
        .build(ErrorRate::new())
        .unwrap();

    let res = cv.run(&table);
    assert_eq!(res, Err(MockError::Cv(CvError::EmptyResults)));
    assert_eq!(cv.diagnostics().folds(), 0);
}

/// Test that evaluation errors propagate unmodified.
///
/// Verifies that the transfer error's own error reaches the caller.
#[test]
fn test_evaluate_error_propagates() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .build(ErrorRate::new().poisoned(12))
        .unwrap();

    let res = cv.run(&table);
    assert_eq!(
        res,
        Err(MockError::Evaluate("poisoned sample 12".to_string()))
    );
    assert_eq!(cv.diagnostics().folds(), 1);
}

// ============================================================================
// Diagnostics Tests
// ============================================================================

/// Test the results diagnostic.
///
/// Verifies per-fold values in fold order.
#[test]
fn test_results_diagnostic() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Results)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let results = cv.diagnostics().results().unwrap();
    assert_eq!(results.len(), 3);
    for (r, expected) in results.iter().zip([0.2, 0.4, 0.6]) {
        assert_relative_eq!(*r, expected, epsilon = 1e-12);
    }
}

/// Test that disabled diagnostics are absent.
///
/// Verifies that every accessor returns None without enablement.
#[test]
fn test_disabled_diagnostics_absent() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let diag = cv.diagnostics();
    assert!(diag.results().is_none());
    assert!(diag.splits().is_none());
    assert!(diag.confusion().is_none());
    assert!(diag.training_confusion().is_none());
    assert!(diag.samples_error().is_none());
    assert!(cv.transerrors().is_none());
}

/// Test the splits diagnostic.
///
/// Verifies one recorded fold per split, last marker on the final one.
#[test]
fn test_splits_diagnostic() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Splits)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let splits = cv.diagnostics().splits().unwrap();
    assert_eq!(splits.len(), 3);
    assert_eq!(
        splits[1].test_data().map(|t| t.ids.clone()),
        Some(vec![10, 11, 12, 13, 14])
    );
    let marks: Vec<bool> = splits.iter().map(|s| s.is_last_split()).collect();
    assert_eq!(marks, vec![false, false, true]);
}

/// Test the summed confusion diagnostic.
///
/// Verifies that [[1,0],[1,0]] and [[0,1],[0,1]] sum to [[1,1],[1,1]].
#[test]
fn test_confusion_sum() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Confusion)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let cm = cv.diagnostics().confusion().unwrap();
    assert_eq!(
        cm.matrix(),
        ConfusionMatrix::from_rows(vec![vec![1, 1], vec![1, 1]]).matrix()
    );
}

/// Test the summed training confusion diagnostic.
///
/// Verifies the sum over both training partitions.
#[test]
fn test_training_confusion_sum() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::TrainingConfusion)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let cm = cv.diagnostics().training_confusion().unwrap();
    assert_eq!(cm.get(0, 0), 2);
    assert_eq!(cm.get(1, 1), 2);
    assert_eq!(cm.total(), 4);
    assert!(cv.diagnostics().confusion().is_none());
}

/// Test the per-sample error diagnostic.
///
/// Verifies keys equal to the dataset ids and one contribution per test appearance.
#[test]
fn test_samples_error_keys_and_contributions() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::SamplesError)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let samples = cv.diagnostics().samples_error().unwrap();

    let keys: Vec<u32> = samples.keys().copied().collect();
    assert_eq!(keys, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(samples[&0], vec![0.0, 1.0]);
    assert_eq!(samples[&1], vec![1.0, 0.0]);
    for id in 2..6 {
        assert!(samples[&id].is_empty(), "sample {id} was never tested");
    }
}

/// Test per-sample errors for an id outside the dataset.
///
/// Verifies that an unknown id is an error.
#[test]
fn test_samples_error_unknown_id() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::SamplesError)
        .build(ErrorRate::new().with_bogus_sample(99))
        .unwrap();

    let res = cv.run(&table);
    assert_eq!(
        res,
        Err(MockError::Cv(CvError::UnknownSample {
            fold: 0,
            id: "99".to_string()
        }))
    );
}

/// Test duplicate dataset ids with per-sample errors enabled.
///
/// Verifies that ambiguous keys are rejected before any fold runs.
#[test]
fn test_samples_error_duplicate_ids() {
    let (table, splitter) = two_fold_fixture();
    let table = table.with_ids(&[0, 1, 2, 2, 4, 5]);
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::SamplesError)
        .build(ErrorRate::new())
        .unwrap();

    assert!(matches!(
        cv.run(&table),
        Err(MockError::Cv(CvError::InvalidInput(_)))
    ));
    assert_eq!(cv.transerror().evaluations, 0);
}

/// Test the label mapping of the summed confusion.
///
/// Verifies that the dataset mapping is attached when it fits.
#[test]
fn test_confusion_labels_map_attached() {
    let (table, splitter) = two_fold_fixture();
    let table = table.with_labels_map(&["negative", "positive"]);
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Confusion)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let map = cv.diagnostics().confusion().unwrap().labels_map().unwrap();
    assert_eq!(map.get("positive"), Some(&1));
}

/// Test a label mapping that does not fit.
///
/// Verifies that the failure is swallowed and the summary stays usable.
#[test]
fn test_confusion_labels_map_mismatch_ignored() {
    let (table, splitter) = two_fold_fixture();
    let table = table.with_labels_map(&["only"]);
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Confusion)
        .build(ErrorRate::new())
        .unwrap();

    assert!(cv.run(&table).is_ok());
    let cm = cv.diagnostics().confusion().unwrap();
    assert!(cm.labels_map().is_none());
    assert_eq!(cm.total(), 4);
}

/// Test that diagnostics do not change the result.
///
/// Verifies equal summaries with nothing and everything enabled.
#[test]
fn test_diagnostics_do_not_alter_result() {
    let (table, splitter) = three_fold_fixture();

    let mut plain = CrossValidation::new()
        .splitter(splitter.clone())
        .build(ErrorRate::new())
        .unwrap();
    let mut full = CrossValidation::new()
        .splitter(splitter)
        .enable_all()
        .build(ErrorRate::new())
        .unwrap();

    let a = plain.run(&table).unwrap();
    let b = full.run(&table).unwrap();
    assert_relative_eq!(a, b);
}

// ============================================================================
// Transfer Error Snapshot Tests
// ============================================================================

/// Test snapshots when the splitter marks the final fold.
///
/// Verifies duplicates for earlier folds and the live instance for the last one.
#[test]
fn test_transerrors_with_last_split() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::TransErrors)
        .harvest(&[HarvestAttribute::UsedLive])
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();

    let serials: Vec<usize> = cv.transerrors().unwrap().map(|te| te.serial).collect();
    assert_eq!(serials, vec![1, 2, 0]);
    assert!(cv.transerrors().unwrap().all(|te| te.evaluations == 1));
    assert_eq!(cv.transerror().serial, 0);

    let used_live: Vec<Option<bool>> = cv.harvested().iter().map(|r| r.used_live).collect();
    assert_eq!(used_live, vec![Some(false), Some(false), Some(true)]);
}

/// Test snapshots when no fold is marked.
///
/// Verifies that the engine retains the duplicate used on the final fold.
#[test]
fn test_transerrors_without_last_split() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter.unmarked())
        .enable(Diagnostic::TransErrors)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();

    let serials: Vec<usize> = cv.transerrors().unwrap().map(|te| te.serial).collect();
    assert_eq!(serials, vec![1, 2, 3]);
    assert_eq!(cv.transerror().serial, 3);
    assert_eq!(cv.transerror().evaluations, 1);
}

/// Test snapshots keep their own fitted model.
///
/// Verifies that each duplicate was trained on its own fold only.
#[test]
fn test_transerrors_are_independent() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter.unmarked())
        .enable(Diagnostic::TransErrors)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();

    let majorities: Vec<Option<usize>> = cv
        .transerrors()
        .unwrap()
        .map(|te| te.predictor.majority)
        .collect();
    assert_eq!(majorities, vec![Some(0), Some(1)]);
}

/// Test that a trained live instance is untrained before duplication.
///
/// Verifies that snapshots start from an untrained predictor.
#[test]
fn test_transerrors_untrain_live_first() {
    let table = Table::new(&[1, 1, 0]);
    let splitter = ScriptedSplitter::new(vec![(None, Some(vec![0, 1, 2])), (None, Some(vec![2]))]);
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::TransErrors)
        .enable(Diagnostic::Results)
        .build(ErrorRate::new().pretrained(1))
        .unwrap();

    cv.run(&table).unwrap();

    // Untrained predictors answer label 0
    let results = cv.diagnostics().results().unwrap();
    assert_relative_eq!(results[0], 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(results[1], 0.0);
}

/// Test duplicating a predictor that stays trained.
///
/// Verifies that duplication of a trained instance is refused.
#[test]
fn test_transerrors_duplicate_trained() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::TransErrors)
        .build(ErrorRate::new().pretrained(0).ignoring_untrain())
        .unwrap();

    assert_eq!(
        cv.run(&table),
        Err(MockError::Cv(CvError::DuplicateTrained))
    );
}

/// Test a fold after the one marked last.
///
/// Verifies that the inconsistent sequence is an error with snapshots enabled.
#[test]
fn test_fold_after_last_split() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter.clone().last_at(1))
        .enable(Diagnostic::TransErrors)
        .build(ErrorRate::new())
        .unwrap();

    assert_eq!(
        cv.run(&table),
        Err(MockError::Cv(CvError::FoldAfterLastSplit { fold: 2 }))
    );

    // Without snapshots the marker is not consulted
    let mut plain = CrossValidation::new()
        .splitter(splitter.last_at(1))
        .build(ErrorRate::new())
        .unwrap();
    assert!(plain.run(&table).is_ok());
}

/// Test the splits recorded before a fold after the last split.
///
/// Verifies that the rejected fold is not recorded.
#[test]
fn test_fold_after_last_split_not_recorded() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter.last_at(1))
        .enable(Diagnostic::TransErrors)
        .enable(Diagnostic::Splits)
        .build(ErrorRate::new())
        .unwrap();

    assert!(cv.run(&table).is_err());
    assert_eq!(cv.diagnostics().folds(), 2);
    assert_eq!(cv.diagnostics().splits().unwrap().len(), 2);
}

/// Test a fold with both partitions absent.
///
/// Verifies that the fold reaches the transfer error unchanged and that
/// the enablement is restored when its error propagates.
#[test]
fn test_fold_without_partitions() {
    let table = Table::new(&[0, 1]);
    let empty = |_: &Table| vec![Fold::<Table>::new(None, None)];

    let mut cv = CrossValidation::new()
        .splitter(empty)
        .enable_all()
        .build(ErrorRate::new())
        .unwrap();

    assert_eq!(
        cv.run(&table),
        Err(MockError::Evaluate("no test partition".to_string()))
    );
    assert_eq!(cv.diagnostics().folds(), 0);
    assert!(cv.transerror().states.enabled().is_empty());
    assert_eq!(cv.transerror().states.depth(), 0);

    // The live instance evaluates it when snapshots are off
    let mut plain = CrossValidation::new()
        .splitter(empty)
        .build(ErrorRate::new())
        .unwrap();
    assert!(plain.run(&table).is_err());
    assert_eq!(plain.transerror().evaluations, 1);
    assert_eq!(plain.transerror().seen_references, vec![None]);
}

/// Test the live instance without snapshots.
///
/// Verifies that one instance evaluates every fold.
#[test]
fn test_live_instance_reused() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    assert_eq!(cv.transerror().serial, 0);
    assert_eq!(cv.transerror().evaluations, 3);
}

// ============================================================================
// State Restoration Tests
// ============================================================================

/// Test enablement after a successful run.
///
/// Verifies that temporary enablement is undone.
#[test]
fn test_states_restored_after_success() {
    let (table, splitter) = two_fold_fixture();
    let mut te = ErrorRate::new();
    te.states.enable(Diagnostic::TrainingConfusion);
    let before = te.states.clone();

    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Confusion)
        .enable(Diagnostic::SamplesError)
        .build(te)
        .unwrap();

    cv.run(&table).unwrap();
    assert_eq!(cv.transerror().states, before);
}

/// Test enablement after a run retaining a duplicate.
///
/// Verifies restoration on the instance left in the engine.
#[test]
fn test_states_restored_on_retained_duplicate() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter.unmarked())
        .enable(Diagnostic::TransErrors)
        .enable(Diagnostic::Confusion)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    assert_eq!(cv.transerror().serial, 2);
    assert!(cv.transerror().states.enabled().is_empty());
    assert_eq!(cv.transerror().states.depth(), 0);
}

/// Test enablement after a failing run.
///
/// Verifies restoration when evaluation fails midway.
#[test]
fn test_states_restored_after_error() {
    let (table, splitter) = three_fold_fixture();
    for snapshots in [false, true] {
        let mut builder = CrossValidation::new()
            .splitter(splitter.clone())
            .enable(Diagnostic::Confusion)
            .enable(Diagnostic::SamplesError);
        if snapshots {
            builder = builder.enable(Diagnostic::TransErrors);
        }
        let mut cv = builder.build(ErrorRate::new().poisoned(17)).unwrap();

        assert!(cv.run(&table).is_err());
        assert_eq!(cv.transerror().states.enabled(), DiagnosticSet::empty());
        assert_eq!(cv.transerror().states.depth(), 0);
    }
}

/// Test enablement after a cancelled run.
///
/// Verifies restoration on the cancellation path.
#[test]
fn test_states_restored_after_cancel() {
    let (table, splitter) = three_fold_fixture();
    let token = CancelToken::new();
    token.cancel();

    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Confusion)
        .cancel_token(token)
        .build(ErrorRate::new())
        .unwrap();

    assert!(cv.run(&table).is_err());
    assert_eq!(cv.transerror().states.depth(), 0);
    assert!(!cv.transerror().states.is_enabled(Diagnostic::Confusion));
}

// ============================================================================
// Test Exposure Tests
// ============================================================================

/// Test exposure to a capable predictor.
///
/// Verifies that the test partition is attached during evaluation only.
#[test]
fn test_expose_capable_predictor() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .expose_test_dataset(true)
        .build(ErrorRate::new().accepting_reference())
        .unwrap();

    cv.run(&table).unwrap();
    assert_eq!(cv.transerror().seen_references, vec![Some(2), Some(2)]);
    assert!(cv.transerror().predictor().reference.is_none());
}

/// Test exposure to a predictor without the capability.
///
/// Verifies that the flag is a no-op.
#[test]
fn test_expose_incapable_predictor() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .expose_test_dataset(true)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    assert_eq!(cv.transerror().seen_references, vec![None, None]);
}

/// Test that exposure is off by default.
///
/// Verifies that capable predictors see nothing without the flag.
#[test]
fn test_expose_disabled_by_default() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .build(ErrorRate::new().accepting_reference())
        .unwrap();

    cv.run(&table).unwrap();
    assert!(!cv.exposes_test_dataset());
    assert_eq!(cv.transerror().seen_references, vec![None, None]);
}

/// Test exposure with snapshots.
///
/// Verifies that the instance evaluating each fold receives the reference.
#[test]
fn test_expose_reaches_duplicates() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .expose_test_dataset(true)
        .enable(Diagnostic::TransErrors)
        .build(ErrorRate::new().accepting_reference())
        .unwrap();

    cv.run(&table).unwrap();
    for te in cv.transerrors().unwrap() {
        assert_eq!(te.seen_references.last(), Some(&Some(2)));
        assert!(te.predictor().reference.is_none());
    }
}

// ============================================================================
// Cancellation Tests
// ============================================================================

/// Test a token cancelled before the run.
///
/// Verifies that no fold is evaluated.
#[test]
fn test_cancel_before_run() {
    let (table, splitter) = three_fold_fixture();
    let token = CancelToken::new();
    token.cancel();

    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .cancel_token(token)
        .build(ErrorRate::new())
        .unwrap();

    assert_eq!(
        cv.run(&table),
        Err(MockError::Cv(CvError::Cancelled { fold: 0 }))
    );
    assert_eq!(cv.transerror().evaluations, 0);
}

/// Test cancellation between folds.
///
/// Verifies that the current fold completes and the next one does not start.
#[test]
fn test_cancel_between_folds() {
    let (table, splitter) = three_fold_fixture();
    let token = CancelToken::new();
    let trigger = token.clone();

    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .cancel_token(token.clone())
        .on_fold(move |ctx: &FoldContext<'_, Table, ErrorRate>| {
            if ctx.index == 0 {
                trigger.cancel();
            }
        })
        .build(ErrorRate::new())
        .unwrap();

    assert_eq!(
        cv.run(&table),
        Err(MockError::Cv(CvError::Cancelled { fold: 1 }))
    );
    assert_eq!(cv.transerror().evaluations, 1);

    // The hook cancels again on the next run
    token.reset();
    assert_eq!(
        cv.run(&table),
        Err(MockError::Cv(CvError::Cancelled { fold: 1 }))
    );
    assert_eq!(cv.diagnostics().folds(), 1);
    assert_eq!(cv.transerror().evaluations, 2);
}

// ============================================================================
// Harvesting Tests
// ============================================================================

/// Test harvesting results and confusion.
///
/// Verifies one record per fold with the declared attributes only.
#[test]
fn test_harvest_records() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Confusion)
        .harvest(&[HarvestAttribute::Result, HarvestAttribute::Confusion])
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let records = cv.harvested();
    assert_eq!(records.len(), 2);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.fold, i);
        assert_relative_eq!(record.result.unwrap(), 0.5);
        assert_eq!(record.confusion.as_ref().map(|c| c.total()), Some(2));
        assert!(record.split.is_none());
        assert!(record.used_live.is_none());
    }
}

/// Test harvesting shared splits.
///
/// Verifies that records point at the folds the engine processed.
#[test]
fn test_harvest_split_shared() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Splits)
        .harvest(&[HarvestAttribute::Split])
        .copy_harvested(HarvestCopy::Shared)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let splits = cv.diagnostics().splits().unwrap();
    for (record, split) in cv.harvested().iter().zip(splits) {
        assert!(Arc::ptr_eq(record.split.as_ref().unwrap(), split));
    }
}

/// Test harvesting copied splits.
///
/// Verifies new fold containers that share partition data.
#[test]
fn test_harvest_split_copy() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Splits)
        .harvest(&[HarvestAttribute::Split])
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let splits = cv.diagnostics().splits().unwrap();
    for (record, split) in cv.harvested().iter().zip(splits) {
        let harvested = record.split.as_ref().unwrap();
        assert!(!Arc::ptr_eq(harvested, split));
        assert!(Arc::ptr_eq(
            &harvested.test.as_ref().unwrap().shared(),
            &split.test.as_ref().unwrap().shared()
        ));
    }
}

/// Test harvesting deep-copied splits.
///
/// Verifies partition data that is equal but not shared.
#[test]
fn test_harvest_split_deep_copy() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable(Diagnostic::Splits)
        .harvest(&[HarvestAttribute::Split])
        .copy_harvested(HarvestCopy::DeepCopy)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let splits = cv.diagnostics().splits().unwrap();
    for (record, split) in cv.harvested().iter().zip(splits) {
        let harvested = record.split.as_ref().unwrap();
        let ours = harvested.test.as_ref().unwrap().shared();
        let theirs = split.test.as_ref().unwrap().shared();
        assert!(!Arc::ptr_eq(&ours, &theirs));
        assert_eq!(*ours, *theirs);
        assert_eq!(harvested.is_last_split(), split.is_last_split());
    }
}

/// Test the fold hook.
///
/// Verifies that the hook sees every fold in order with its result.
#[test]
fn test_on_fold_hook() {
    let (table, splitter) = three_fold_fixture();
    let seen: Arc<Mutex<Vec<(usize, f64)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .on_fold(move |ctx: &FoldContext<'_, Table, ErrorRate>| {
            sink.lock().unwrap().push((ctx.index, ctx.result));
        })
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let seen = seen.lock().unwrap();
    let indices: Vec<usize> = seen.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_relative_eq!(seen[2].1, 0.6, epsilon = 1e-12);
}

/// Test keeping the evaluating instances from the fold hook.
///
/// Verifies that duplicates taken in the hook are trained on their fold.
#[test]
fn test_on_fold_keeps_transerrors() {
    let (table, splitter) = two_fold_fixture();
    let kept: Arc<Mutex<Vec<ErrorRate>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&kept);

    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .on_fold(move |ctx: &FoldContext<'_, Table, ErrorRate>| {
            sink.lock().unwrap().push(ctx.transerror.duplicate());
        })
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    let kept = kept.lock().unwrap();
    let majorities: Vec<Option<usize>> = kept.iter().map(|te| te.predictor.majority).collect();
    assert_eq!(majorities, vec![Some(0), Some(1)]);
    let evaluations: Vec<usize> = kept.iter().map(|te| te.evaluations).collect();
    assert_eq!(evaluations, vec![1, 2]);
}

// ============================================================================
// Edge Case Tests
// ============================================================================

/// Test the default identity splitter.
///
/// Verifies a single untrained evaluation on the whole dataset.
#[test]
fn test_identity_splitter_default() {
    let table = Table::new(&[0, 0, 1, 1]);
    let mut cv = CrossValidation::new()
        .enable(Diagnostic::Splits)
        .build(ErrorRate::new())
        .unwrap();

    assert_relative_eq!(cv.run(&table).unwrap(), 0.5);
    let splits = cv.diagnostics().splits().unwrap();
    assert_eq!(splits.len(), 1);
    assert!(splits[0].train.is_none());
    assert!(splits[0].is_last_split());
    assert!(cv.transerror().predictor().majority.is_none());
}

/// Test the identity splitter training on everything.
///
/// Verifies that a fold without test data reaches the transfer error as such.
#[test]
fn test_identity_splitter_first_mode() {
    let table = Table::new(&[0, 1]);
    let mut cv = CrossValidation::new()
        .splitter(NoneSplitter::new().mode(NoneSplitMode::First))
        .build(ErrorRate::new())
        .unwrap();

    assert_eq!(
        cv.run(&table),
        Err(MockError::Evaluate("no test partition".to_string()))
    );
    assert_eq!(cv.transerror().predictor().majority, Some(0));
}

/// Test repeated runs.
///
/// Verifies identical results and diagnostics on the same dataset.
#[test]
fn test_run_idempotent() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .enable_all()
        .harvest(&[HarvestAttribute::Result])
        .build(ErrorRate::new())
        .unwrap();

    let first = cv.run(&table).unwrap();
    let samples_first = cv.diagnostics().samples_error().cloned();
    let confusion_first = cv.diagnostics().confusion().cloned();

    let second = cv.run(&table).unwrap();
    assert_relative_eq!(first, second);
    assert_eq!(cv.diagnostics().samples_error().cloned(), samples_first);
    assert_eq!(cv.diagnostics().confusion().cloned(), confusion_first);
    assert_eq!(cv.diagnostics().folds(), 2);
    assert_eq!(cv.harvested().len(), 2);
    assert_eq!(cv.transerrors().unwrap().count(), 2);
}

/// Test toggling diagnostics on the engine.
///
/// Verifies that enablement applies to the next run.
#[test]
fn test_enable_after_build() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = CrossValidation::new()
        .splitter(splitter)
        .build(ErrorRate::new())
        .unwrap();

    cv.run(&table).unwrap();
    assert!(cv.diagnostics().results().is_none());

    cv.enable(Diagnostic::Results);
    cv.run(&table).unwrap();
    assert_eq!(cv.diagnostics().results().map(<[f64]>::len), Some(3));

    cv.disable(Diagnostic::Results);
    cv.run(&table).unwrap();
    assert!(cv.diagnostics().results().is_none());
}

/// Test the transfer error trait defaults.
///
/// Verifies delegation of training state to the predictor.
#[test]
fn test_transfer_error_delegates_training_state() {
    let mut te = ErrorRate::new().pretrained(1);
    assert_eq!(
        TransferError::training_state(&te),
        Predictor::training_state(&te.predictor)
    );
    TransferError::untrain(&mut te);
    assert!(te.predictor.majority.is_none());
}

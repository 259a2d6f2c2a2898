#![cfg(feature = "dev")]
//! Tests for the high-level cross-validation API.
//!
//! These tests verify the builder pattern and complete workflows for:
//! - Builder defaults and finalization
//! - Configuration validation (duplicates, unknown names)
//! - Diagnostic toggles
//! - Summaries printed for users
//!
//! ## Test Organization
//!
//! 1. **Builder Construction** - Defaults, combiners, splitters
//! 2. **Validation** - Duplicate parameters, harvest attributes, combiner names
//! 3. **Diagnostic Toggles** - Enable, disable, enable all
//! 4. **Display** - Engine and diagnostics summaries

mod common;

use approx::assert_relative_eq;
use std::fmt::Write;

use common::{ErrorRate, ScriptedSplitter, Table, three_fold_fixture, two_fold_fixture};
use crossval::internals::api::{
    CombinerKind, CrossValidationBuilder as CrossValidation, CvError, Diagnostic, DiagnosticSet,
    Fold, GrandMean, HarvestAttribute, HarvestCopy, NoneSplitter,
};
use crossval::internals::engine::validator::Validator;

fn builder() -> CrossValidation<Table, ErrorRate> {
    CrossValidation::new()
}

// ============================================================================
// Builder Construction Tests
// ============================================================================

/// Test builder defaults.
///
/// Verifies the identity splitter, grand mean and no exposure.
#[test]
fn test_builder_defaults() {
    let cv = builder().build(ErrorRate::new()).unwrap();

    assert_eq!(cv.splitter().name(), "none(second)");
    assert_eq!(cv.combiner().name(), "mean");
    assert!(!cv.exposes_test_dataset());
    assert!(cv.diagnostics().enabled().is_empty());
    assert!(cv.harvested().is_empty());
}

/// Test the identity splitter in its default mode.
///
/// Verifies that an explicitly configured identity splitter behaves like the default.
#[test]
fn test_builder_identity_splitter() {
    let table = Table::new(&[0, 1, 1, 1]);
    let mut explicit = builder()
        .splitter(NoneSplitter::new())
        .combiner(GrandMean)
        .build(ErrorRate::new())
        .unwrap();
    let mut implicit = builder().build(ErrorRate::new()).unwrap();

    let a = explicit.run(&table).unwrap();
    let b = implicit.run(&table).unwrap();
    assert_relative_eq!(a, 0.75);
    assert_relative_eq!(a, b);
}

/// Test selecting a combiner by name.
///
/// Verifies that the median combiner is used.
#[test]
fn test_builder_combiner_by_name() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = builder()
        .splitter(splitter)
        .combiner_name("Median")
        .build(ErrorRate::new())
        .unwrap();

    assert_eq!(cv.combiner().name(), "median");
    assert_relative_eq!(cv.run(&table).unwrap(), 0.4, epsilon = 1e-12);
}

/// Test a combiner value.
///
/// Verifies that built-in combiner kinds can be passed directly.
#[test]
fn test_builder_combiner_kind() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = builder()
        .splitter(splitter)
        .combiner(CombinerKind::Min)
        .build(ErrorRate::new())
        .unwrap();

    assert_relative_eq!(cv.run(&table).unwrap(), 0.2, epsilon = 1e-12);
}

/// Test a closure splitter.
///
/// Verifies that a function returning folds is a splitter.
#[test]
fn test_builder_closure_splitter() {
    let table = Table::new(&[0, 0, 1, 1]);
    let halves = |t: &Table| {
        vec![
            Fold::new(Some(t.subset(&[0, 1])), Some(t.subset(&[2, 3]))),
            Fold::new(Some(t.subset(&[2, 3])), Some(t.subset(&[0, 1])))
                .last_split(true),
        ]
    };

    let mut cv = builder().splitter(halves).build(ErrorRate::new()).unwrap();
    assert_relative_eq!(cv.run(&table).unwrap(), 1.0);
    assert_eq!(cv.splitter().name(), "custom");
}

/// Test giving the transfer error back.
///
/// Verifies that the caller regains the instance left in the engine.
#[test]
fn test_into_transerror() {
    let (table, splitter) = two_fold_fixture();
    let mut cv = builder().splitter(splitter).build(ErrorRate::new()).unwrap();
    cv.run(&table).unwrap();

    cv.transerror_mut().poison = Some(0);
    let te = cv.into_transerror();
    assert_eq!(te.evaluations, 2);
    assert_eq!(te.poison, Some(0));
}

// ============================================================================
// Validation Tests
// ============================================================================

/// Test setting the splitter twice.
///
/// Verifies that the duplicate parameter is reported by build.
#[test]
fn test_duplicate_splitter() {
    let res = builder()
        .splitter(NoneSplitter::new())
        .splitter(ScriptedSplitter::new(vec![]))
        .build(ErrorRate::new());

    assert!(matches!(
        res,
        Err(CvError::DuplicateParameter {
            parameter: "splitter"
        })
    ));
}

/// Test setting other parameters twice.
///
/// Verifies the reported parameter name for each setter.
#[test]
fn test_duplicate_parameters() {
    let combiner = builder()
        .combiner(GrandMean)
        .combiner_name("max")
        .build(ErrorRate::new());
    assert!(matches!(
        combiner,
        Err(CvError::DuplicateParameter {
            parameter: "combiner"
        })
    ));

    let expose = builder()
        .expose_test_dataset(true)
        .expose_test_dataset(false)
        .build(ErrorRate::new());
    assert!(matches!(
        expose,
        Err(CvError::DuplicateParameter {
            parameter: "expose_test_dataset"
        })
    ));

    let copy = builder()
        .copy_harvested(HarvestCopy::Shared)
        .copy_harvested(HarvestCopy::DeepCopy)
        .build(ErrorRate::new());
    assert!(matches!(
        copy,
        Err(CvError::DuplicateParameter {
            parameter: "copy_harvested"
        })
    ));
}

/// Test an unknown combiner name.
///
/// Verifies that the error is deferred to build.
#[test]
fn test_unknown_combiner_name() {
    let res = builder()
        .combiner_name("harmonic")
        .build(ErrorRate::new());

    assert!(matches!(res, Err(CvError::UnknownCombiner(name)) if name == "harmonic"));
}

/// Test a repeated harvest attribute.
///
/// Verifies that each attribute may be declared once.
#[test]
fn test_duplicate_harvest_attribute() {
    let res = builder()
        .harvest(&[
            HarvestAttribute::Result,
            HarvestAttribute::Split,
            HarvestAttribute::Result,
        ])
        .build(ErrorRate::new());

    assert!(matches!(
        res,
        Err(CvError::DuplicateHarvestAttribute("result"))
    ));
}

/// Test the validator directly.
///
/// Verifies unique id checks and combiner name resolution.
#[test]
fn test_validator() {
    assert!(Validator::validate_unique_ids(&[3, 1, 2]).is_ok());
    assert!(Validator::validate_unique_ids::<u32>(&[]).is_ok());
    assert!(matches!(
        Validator::validate_unique_ids(&["a", "b", "a"]),
        Err(CvError::InvalidInput(_))
    ));
    assert_eq!(
        Validator::validate_combiner_name("min"),
        Ok(CombinerKind::Min)
    );
    assert!(Validator::validate_no_duplicates(None).is_ok());
}

// ============================================================================
// Diagnostic Toggle Tests
// ============================================================================

/// Test enabling every diagnostic.
///
/// Verifies the full set after enable_all and a selective disable.
#[test]
fn test_enable_all_and_disable() {
    let cv = builder()
        .enable_all()
        .disable(Diagnostic::Splits)
        .build(ErrorRate::new())
        .unwrap();

    let enabled = cv.diagnostics().enabled();
    assert!(!enabled.contains(Diagnostic::Splits));
    for d in Diagnostic::ALL.into_iter().filter(|d| *d != Diagnostic::Splits) {
        assert!(enabled.contains(d), "{d} should be enabled");
    }
}

/// Test enabling a list of diagnostics.
///
/// Verifies the union with previously enabled diagnostics.
#[test]
fn test_enable_all_of() {
    let cv = builder()
        .enable(Diagnostic::Results)
        .enable_all_of(&[Diagnostic::Confusion, Diagnostic::TrainingConfusion])
        .build(ErrorRate::new())
        .unwrap();

    assert_eq!(
        cv.diagnostics().enabled(),
        DiagnosticSet::from_slice(&[
            Diagnostic::Results,
            Diagnostic::Confusion,
            Diagnostic::TrainingConfusion
        ])
    );
}

// ============================================================================
// Display Tests
// ============================================================================

/// Test the engine summary.
///
/// Verifies splitter, combiner, diagnostics and harvest lines.
#[test]
fn test_engine_display() {
    let (_, splitter) = three_fold_fixture();
    let cv = builder()
        .splitter(splitter)
        .combiner_name("min")
        .enable(Diagnostic::Results)
        .harvest(&[HarvestAttribute::Result, HarvestAttribute::UsedLive])
        .build(ErrorRate::new())
        .unwrap();

    let mut out = String::new();
    write!(out, "{}", cv).unwrap();

    assert!(out.starts_with("CrossValidatedTransferError:"));
    assert!(out.contains("Splitter:     scripted"));
    assert!(out.contains("Combiner:     min"));
    assert!(out.contains("Diagnostics:  results"));
    assert!(out.contains("Harvest:      result used_live (Copy)"));
}

/// Test the diagnostics summary.
///
/// Verifies the fold count, results and snapshot count after a run.
#[test]
fn test_diagnostics_display() {
    let (table, splitter) = three_fold_fixture();
    let mut cv = builder()
        .splitter(splitter)
        .enable(Diagnostic::Results)
        .enable(Diagnostic::TransErrors)
        .enable(Diagnostic::SamplesError)
        .build(ErrorRate::new())
        .unwrap();
    cv.run(&table).unwrap();

    let out = cv.diagnostics().to_string();
    assert!(out.contains("Folds:        3"));
    assert!(out.contains("Results:      0.200000 0.400000 0.600000"));
    assert!(out.contains("TransErrors:  3"));
    assert!(out.contains("SamplesError: 20 samples, 15 contributions"));
}

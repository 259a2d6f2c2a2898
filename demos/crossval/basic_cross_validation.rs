//! Cross-Validated Transfer Error Examples
//!
//! This example demonstrates common cross-validation scenarios:
//! - Basic k-fold error estimation with the grand mean
//! - Alternative combiners and per-fold results
//! - Confusion summaries with label names and per-sample errors
//! - Transfer error snapshots and per-fold harvesting
//! - Cooperative cancellation from a fold hook
//!
//! Each scenario prints its summary to stdout.

#[cfg(feature = "std")]
use crossval::prelude::*;
#[cfg(feature = "std")]
use std::collections::BTreeMap;

#[cfg(feature = "std")]
fn main() -> Result<(), CvError> {
    println!("{}", "=".repeat(80));
    println!("Cross-Validated Transfer Error - Examples");
    println!("{}", "=".repeat(80));
    println!();

    example_1_basic_kfold()?;
    example_2_combiners()?;
    example_3_confusion()?;
    example_4_snapshots()?;
    example_5_cancellation()?;

    Ok(())
}

#[cfg(not(feature = "std"))]
fn main() {}

// ============================================================================
// Domain Types
// ============================================================================

/// Fruit measurements: weight in grams and a class label.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
struct Fruits {
    names: Vec<&'static str>,
    weight: Vec<f64>,
    label: Vec<usize>,
    labels_map: LabelsMap,
}

#[cfg(feature = "std")]
impl Fruits {
    fn sample() -> Self {
        let rows: [(&str, f64, usize); 12] = [
            ("a1", 110.0, 0),
            ("a2", 125.0, 0),
            ("a3", 140.0, 0),
            ("o1", 180.0, 1),
            ("o2", 200.0, 1),
            ("o3", 150.0, 1),
            ("a4", 130.0, 0),
            ("a5", 170.0, 0),
            ("o4", 210.0, 1),
            ("o5", 190.0, 1),
            ("a6", 115.0, 0),
            ("o6", 160.0, 1),
        ];
        Self {
            names: rows.iter().map(|r| r.0).collect(),
            weight: rows.iter().map(|r| r.1).collect(),
            label: rows.iter().map(|r| r.2).collect(),
            labels_map: [("apple".to_string(), 0), ("orange".to_string(), 1)]
                .into_iter()
                .collect(),
        }
    }

    fn subset(&self, indices: &[usize]) -> Self {
        Self {
            names: indices.iter().map(|&i| self.names[i]).collect(),
            weight: indices.iter().map(|&i| self.weight[i]).collect(),
            label: indices.iter().map(|&i| self.label[i]).collect(),
            labels_map: self.labels_map.clone(),
        }
    }

    fn len(&self) -> usize {
        self.weight.len()
    }
}

#[cfg(feature = "std")]
impl Dataset for Fruits {
    type SampleId = &'static str;

    fn sample_ids(&self) -> Vec<&'static str> {
        self.names.clone()
    }

    fn labels_map(&self) -> Option<&LabelsMap> {
        Some(&self.labels_map)
    }
}

/// Contiguous k-fold splitter.
#[cfg(feature = "std")]
struct KFold(usize);

#[cfg(feature = "std")]
impl Splitter<Fruits> for KFold {
    fn split<'a>(&'a self, dataset: &'a Fruits) -> Folds<'a, Fruits> {
        let n = dataset.len();
        let k = self.0;
        Box::new((0..k).map(move |fold| {
            let test: Vec<usize> = (0..n).filter(|i| i % k == fold).collect();
            let train: Vec<usize> = (0..n).filter(|i| i % k != fold).collect();
            Fold::new(Some(dataset.subset(&train)), Some(dataset.subset(&test)))
                .last_split(fold + 1 == k)
        }))
    }

    fn name(&self) -> &str {
        "kfold"
    }
}

/// Classifies by a weight threshold halfway between the class means.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
struct Threshold {
    cut: Option<f64>,
}

#[cfg(feature = "std")]
impl Predictor<Fruits> for Threshold {
    fn training_state(&self) -> TrainingState {
        match self.cut {
            Some(_) => TrainingState::Trained,
            None => TrainingState::Untrained,
        }
    }

    fn untrain(&mut self) {
        self.cut = None;
    }
}

/// Misclassification rate of a [`Threshold`] predictor.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
struct Misclassification {
    predictor: Threshold,
    states: DiagnosticStates,
    confusion: Option<ConfusionMatrix>,
    samples_error: Option<BTreeMap<&'static str, f64>>,
}

#[cfg(feature = "std")]
impl TransferError<Fruits> for Misclassification {
    type Value = f64;
    type Summary = ConfusionMatrix;
    type Predictor = Threshold;
    type Error = CvError;

    fn evaluate(&mut self, test: Option<&Fruits>, train: Option<&Fruits>) -> Result<f64, CvError> {
        if let Some(train) = train {
            let mean = |class: usize| {
                let w: Vec<f64> = train
                    .weight
                    .iter()
                    .zip(&train.label)
                    .filter(|(_, l)| **l == class)
                    .map(|(w, _)| *w)
                    .collect();
                w.iter().sum::<f64>() / w.len().max(1) as f64
            };
            self.predictor.cut = Some((mean(0) + mean(1)) / 2.0);
        }

        let test = test.ok_or(CvError::InvalidInput("missing test partition".into()))?;
        let cut = self.predictor.cut.unwrap_or(f64::INFINITY);
        let predicted: Vec<usize> = test.weight.iter().map(|&w| usize::from(w > cut)).collect();
        let wrong: Vec<f64> = predicted
            .iter()
            .zip(&test.label)
            .map(|(p, l)| if p == l { 0.0 } else { 1.0 })
            .collect();

        self.confusion = self
            .states
            .is_enabled(Diagnostic::Confusion)
            .then(|| ConfusionMatrix::from_predictions(&test.label, &predicted));
        self.samples_error = self
            .states
            .is_enabled(Diagnostic::SamplesError)
            .then(|| test.names.iter().copied().zip(wrong.iter().copied()).collect());

        Ok(wrong.iter().sum::<f64>() / test.len() as f64)
    }

    fn duplicate(&self) -> Self {
        self.clone()
    }

    fn predictor(&self) -> &Threshold {
        &self.predictor
    }

    fn predictor_mut(&mut self) -> &mut Threshold {
        &mut self.predictor
    }

    fn states(&self) -> &DiagnosticStates {
        &self.states
    }

    fn states_mut(&mut self) -> &mut DiagnosticStates {
        &mut self.states
    }

    fn confusion(&self) -> Option<&ConfusionMatrix> {
        self.confusion.as_ref()
    }

    fn samples_error(&self) -> Option<&BTreeMap<&'static str, f64>> {
        self.samples_error.as_ref()
    }
}

// ============================================================================
// Examples
// ============================================================================

#[cfg(feature = "std")]
/// Example 1: Basic K-Fold
/// Estimates the misclassification rate with 3 folds and the grand mean
fn example_1_basic_kfold() -> Result<(), CvError> {
    println!("Example 1: Basic K-Fold");
    println!("{}", "-".repeat(80));

    let data = Fruits::sample();
    let mut cv = CrossValidation::new()
        .splitter(KFold(3))
        .build(Misclassification::default())?;

    let error = cv.run(&data)?;
    println!("{}", cv);
    println!("Cross-validated error: {:.4}", error);
    println!();
    Ok(())
}

#[cfg(feature = "std")]
/// Example 2: Combiners
/// Compares the per-fold results with their median and worst case
fn example_2_combiners() -> Result<(), CvError> {
    println!("Example 2: Combiners");
    println!("{}", "-".repeat(80));

    let data = Fruits::sample();
    for name in ["mean", "median", "max"] {
        let mut cv = CrossValidation::new()
            .splitter(KFold(4))
            .combiner_name(name)
            .enable(Diagnostic::Results)
            .build(Misclassification::default())?;

        let error = cv.run(&data)?;
        println!(
            "{:>6}: {:.4} from {:?}",
            name,
            error,
            cv.diagnostics().results().unwrap_or_default()
        );
    }
    println!();
    Ok(())
}

#[cfg(feature = "std")]
/// Example 3: Confusion and Per-Sample Errors
/// Sums the confusion matrix over all folds and lists misclassified fruits
fn example_3_confusion() -> Result<(), CvError> {
    println!("Example 3: Confusion and Per-Sample Errors");
    println!("{}", "-".repeat(80));

    let data = Fruits::sample();
    let mut cv = CrossValidation::new()
        .splitter(KFold(3))
        .enable(Diagnostic::Confusion)
        .enable(Diagnostic::SamplesError)
        .build(Misclassification::default())?;

    cv.run(&data)?;
    if let Some(cm) = cv.diagnostics().confusion() {
        println!("{}", cm);
    }
    if let Some(samples) = cv.diagnostics().samples_error() {
        let missed: Vec<&str> = samples
            .iter()
            .filter(|(_, errors)| errors.iter().any(|e| *e > 0.0))
            .map(|(id, _)| *id)
            .collect();
        println!("Misclassified: {:?}", missed);
    }
    println!();
    Ok(())
}

#[cfg(feature = "std")]
/// Example 4: Snapshots and Harvesting
/// Keeps the transfer error of every fold and records which one was live
fn example_4_snapshots() -> Result<(), CvError> {
    println!("Example 4: Snapshots and Harvesting");
    println!("{}", "-".repeat(80));

    let data = Fruits::sample();
    let mut cv = CrossValidation::new()
        .splitter(KFold(3))
        .enable(Diagnostic::TransErrors)
        .harvest(&[HarvestAttribute::Result, HarvestAttribute::UsedLive])
        .build(Misclassification::default())?;

    cv.run(&data)?;
    if let Some(snapshots) = cv.transerrors() {
        for (fold, te) in snapshots.enumerate() {
            println!("Fold {}: threshold {:?}", fold, te.predictor().cut);
        }
    }
    for record in cv.harvested() {
        println!(
            "Fold {}: result {:?}, live instance {:?}",
            record.fold, record.result, record.used_live
        );
    }
    println!();
    Ok(())
}

#[cfg(feature = "std")]
/// Example 5: Cancellation
/// Stops the run after the first fold from inside the fold hook
fn example_5_cancellation() -> Result<(), CvError> {
    println!("Example 5: Cancellation");
    println!("{}", "-".repeat(80));

    let data = Fruits::sample();
    let token = CancelToken::new();
    let trigger = token.clone();

    let mut cv = CrossValidation::new()
        .splitter(KFold(4))
        .cancel_token(token)
        .on_fold(move |ctx: &FoldContext<'_, Fruits, Misclassification>| {
            println!("Fold {} finished with {:.4}", ctx.index, ctx.result);
            trigger.cancel();
        })
        .build(Misclassification::default())?;

    match cv.run(&data) {
        Ok(error) => println!("Finished: {:.4}", error),
        Err(e) => println!("Stopped: {}", e),
    }
    println!();
    Ok(())
}

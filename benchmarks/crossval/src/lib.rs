//! Fixtures shared by the cross-validation benchmarks.
//!
//! A labelled one-dimensional dataset, a shuffled k-fold splitter, a
//! nearest-centroid predictor and its zero-one loss transfer error.

use std::collections::BTreeMap;

use crossval::prelude::*;
use rand::prelude::*;

// ============================================================================
// Dataset
// ============================================================================

/// One feature and one class label per sample.
#[derive(Debug, Clone)]
pub struct Points {
    pub ids: Vec<u64>,
    pub x: Vec<f64>,
    pub labels: Vec<usize>,
}

impl Points {
    /// Rows at `indices`.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            ids: indices.iter().map(|&i| self.ids[i]).collect(),
            x: indices.iter().map(|&i| self.x[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

impl Dataset for Points {
    type SampleId = u64;

    fn sample_ids(&self) -> Vec<u64> {
        self.ids.clone()
    }
}

/// Generate `size` samples of `classes` overlapping uniform clusters.
pub fn generate_points(size: usize, classes: usize, seed: u64) -> Points {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Points {
        ids: Vec::with_capacity(size),
        x: Vec::with_capacity(size),
        labels: Vec::with_capacity(size),
    };

    for i in 0..size {
        let label = rng.random_range(0..classes);
        points.ids.push(i as u64);
        points.x.push(label as f64 + rng.random_range(-0.8..0.8));
        points.labels.push(label);
    }
    points
}

// ============================================================================
// Splitter
// ============================================================================

/// Shuffled k-fold splitter; marks the final fold as the last split.
#[derive(Debug, Clone, Copy)]
pub struct KFold {
    pub k: usize,
    pub seed: u64,
}

impl Splitter<Points> for KFold {
    fn split<'a>(&'a self, dataset: &'a Points) -> Folds<'a, Points> {
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(self.seed));

        let k = self.k.max(1);
        let fold_size = dataset.len().div_ceil(k);

        Box::new((0..k).map(move |fold| {
            let start = (fold * fold_size).min(order.len());
            let end = ((fold + 1) * fold_size).min(order.len());
            let train: Vec<usize> = order[..start]
                .iter()
                .chain(&order[end..])
                .copied()
                .collect();
            Fold::new(
                Some(dataset.subset(&train)),
                Some(dataset.subset(&order[start..end])),
            )
            .last_split(fold + 1 == k)
        }))
    }

    fn name(&self) -> &str {
        "kfold"
    }
}

// ============================================================================
// Predictor
// ============================================================================

/// Assigns each sample to the class with the nearest feature centroid.
#[derive(Debug, Clone, Default)]
pub struct NearestCentroid {
    centroids: Option<Vec<(usize, f64)>>,
}

impl NearestCentroid {
    fn fit(&mut self, train: &Points) {
        let mut sums: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
        for (&x, &label) in train.x.iter().zip(&train.labels) {
            let entry = sums.entry(label).or_insert((0.0, 0));
            entry.0 += x;
            entry.1 += 1;
        }
        self.centroids = Some(
            sums.into_iter()
                .map(|(label, (sum, n))| (label, sum / n as f64))
                .collect(),
        );
    }

    fn predict(&self, x: f64) -> usize {
        self.centroids
            .as_deref()
            .unwrap_or_default()
            .iter()
            .min_by(|a, b| (a.1 - x).abs().total_cmp(&(b.1 - x).abs()))
            .map_or(0, |(label, _)| *label)
    }
}

impl Predictor<Points> for NearestCentroid {
    fn training_state(&self) -> TrainingState {
        match self.centroids {
            Some(_) => TrainingState::Trained,
            None => TrainingState::Untrained,
        }
    }

    fn untrain(&mut self) {
        self.centroids = None;
    }
}

// ============================================================================
// Transfer Error
// ============================================================================

/// Zero-one loss of a [`NearestCentroid`] predictor.
#[derive(Debug, Clone, Default)]
pub struct ZeroOneLoss {
    predictor: NearestCentroid,
    states: DiagnosticStates,
    confusion: Option<ConfusionMatrix>,
    training_confusion: Option<ConfusionMatrix>,
    samples_error: Option<BTreeMap<u64, f64>>,
}

impl ZeroOneLoss {
    fn confusion_of(&self, data: &Points) -> ConfusionMatrix {
        let predicted: Vec<usize> = data.x.iter().map(|&x| self.predictor.predict(x)).collect();
        ConfusionMatrix::from_predictions(&data.labels, &predicted)
    }
}

impl TransferError<Points> for ZeroOneLoss {
    type Value = f64;
    type Summary = ConfusionMatrix;
    type Predictor = NearestCentroid;
    type Error = CvError;

    fn evaluate(&mut self, test: Option<&Points>, train: Option<&Points>) -> Result<f64, CvError> {
        if let Some(train) = train {
            self.predictor.fit(train);
            self.training_confusion = self
                .states
                .is_enabled(Diagnostic::TrainingConfusion)
                .then(|| self.confusion_of(train));
        }

        let test = test.ok_or(CvError::InvalidInput("missing test partition".into()))?;
        if test.is_empty() {
            return Err(CvError::InvalidInput("empty test partition".into()));
        }

        let wrong: Vec<f64> = test
            .x
            .iter()
            .zip(&test.labels)
            .map(|(&x, &label)| f64::from(u8::from(self.predictor.predict(x) != label)))
            .collect();

        self.confusion = self
            .states
            .is_enabled(Diagnostic::Confusion)
            .then(|| self.confusion_of(test));
        self.samples_error = self
            .states
            .is_enabled(Diagnostic::SamplesError)
            .then(|| test.ids.iter().copied().zip(wrong.iter().copied()).collect());

        Ok(wrong.iter().sum::<f64>() / test.len() as f64)
    }

    fn duplicate(&self) -> Self {
        self.clone()
    }

    fn predictor(&self) -> &NearestCentroid {
        &self.predictor
    }

    fn predictor_mut(&mut self) -> &mut NearestCentroid {
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

    fn training_confusion(&self) -> Option<&ConfusionMatrix> {
        self.training_confusion.as_ref()
    }

    fn samples_error(&self) -> Option<&BTreeMap<u64, f64>> {
        self.samples_error.as_ref()
    }
}

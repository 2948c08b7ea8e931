//! Spam-class evaluation metrics.
//!
//! Spam is the positive class. Every ratio with a zero denominator is 0.

use serde::Serialize;

use crate::document::Label;
use crate::error::DataError;

/// Confusion counts with spam as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// Spam predicted as spam.
    pub true_positives: usize,
    /// Ham predicted as spam.
    pub false_positives: usize,
    /// Spam predicted as ham.
    pub false_negatives: usize,
    /// Ham predicted as ham.
    pub true_negatives: usize,
}

impl ConfusionMatrix {
    pub fn record(&mut self, predicted: Label, actual: Label) {
        match (actual, predicted) {
            (Label::Spam, Label::Spam) => self.true_positives += 1,
            (Label::Spam, Label::Ham) => self.false_negatives += 1,
            (Label::Ham, Label::Spam) => self.false_positives += 1,
            (Label::Ham, Label::Ham) => self.true_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }
}

/// Accuracy plus spam-class precision, recall, and F1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
}

impl Metrics {
    /// Compare `predicted` labels against the `actual` ones, position by position.
    pub fn compute(predicted: &[Label], actual: &[Label]) -> Result<Self, DataError> {
        if predicted.len() != actual.len() {
            return Err(DataError::PredictionMismatch {
                predicted: predicted.len(),
                actual: actual.len(),
            });
        }
        let mut confusion = ConfusionMatrix::default();
        for (&p, &a) in predicted.iter().zip(actual) {
            confusion.record(p, a);
        }
        Ok(Self::from_confusion(confusion))
    }

    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        let ConfusionMatrix {
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
            true_negatives: tn,
        } = confusion;

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy: ratio(tp + tn, confusion.total()),
            precision,
            recall,
            f1,
            confusion,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

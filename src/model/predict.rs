//! Log-domain scoring against a fitted model.

use serde::Serialize;

use crate::document::{Label, PerClass};
use crate::preprocess::tokenize;

use super::Model;

/// Outcome of scoring one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    /// Unnormalized natural-log joint score per class. Not a probability.
    pub scores: PerClass<f64>,
}

/// Score `text` against `model`.
///
/// Each class score is its log-prior plus the log-likelihood of every token
/// found in the vocabulary. Tokens outside the vocabulary contribute
/// nothing: smoothing applies at training time only. The label is spam only
/// when the spam score is strictly greater, so ties (including a message of
/// nothing but unknown tokens under equal priors) fall to ham.
pub fn predict(model: &Model, text: &str) -> Prediction {
    let ids: Vec<usize> = tokenize(text)
        .iter()
        .filter_map(|token| model.vocabulary().id(token))
        .collect();

    let scores = PerClass::from_fn(|label| {
        let class = model.class(label);
        class.log_prior() + ids.iter().map(|&id| class.log_likelihoods[id]).sum::<f64>()
    });

    let label = if scores.spam > scores.ham {
        Label::Spam
    } else {
        Label::Ham
    };

    Prediction { label, scores }
}

//! Parameter estimation with additive (Lidstone) smoothing.
//!
//! For class `c` and vocabulary token `t`:
//!
//! ```text
//! log_prior[c]         = ln(docs[c] / total_docs)
//! log_likelihood[c][t] = ln((count[c][t] + alpha) / (words[c] + |V| * alpha))
//! ```
//!
//! The vocabulary is the union of tokens over both classes, so every
//! likelihood table covers it completely.

use crate::document::{Document, Label, PerClass};
use crate::error::DataError;
use crate::preprocess::tokenize;

use super::vocabulary::Vocabulary;
use super::{ClassModel, Model};

/// Fit a model from parallel sequences of documents and labels.
pub fn fit<D: AsRef<str>>(documents: &[D], labels: &[Label], alpha: f64) -> Result<Model, DataError> {
    if documents.len() != labels.len() {
        return Err(DataError::LengthMismatch {
            documents: documents.len(),
            labels: labels.len(),
        });
    }
    fit_pairs(
        documents
            .iter()
            .map(AsRef::as_ref)
            .zip(labels.iter().copied()),
        alpha,
    )
}

/// Fit a model from labeled documents.
pub fn fit_documents<'a, I>(documents: I, alpha: f64) -> Result<Model, DataError>
where
    I: IntoIterator<Item = &'a Document>,
{
    fit_pairs(
        documents
            .into_iter()
            .map(|doc| (doc.text.as_str(), doc.label)),
        alpha,
    )
}

pub(crate) fn validate_alpha(alpha: f64) -> Result<(), DataError> {
    if alpha.is_finite() && alpha > 0.0 {
        Ok(())
    } else {
        Err(DataError::InvalidAlpha { alpha })
    }
}

fn fit_pairs<'a>(
    pairs: impl Iterator<Item = (&'a str, Label)>,
    alpha: f64,
) -> Result<Model, DataError> {
    validate_alpha(alpha)?;

    let mut vocabulary = Vocabulary::new();
    let mut doc_counts: PerClass<u64> = PerClass::default();
    let mut word_totals: PerClass<u64> = PerClass::default();
    // Indexed by vocabulary id; shorter than the vocabulary when a class
    // never saw the later tokens.
    let mut token_counts: PerClass<Vec<u64>> = PerClass::default();

    for (text, label) in pairs {
        *doc_counts.get_mut(label) += 1;
        for token in tokenize(text) {
            let id = vocabulary.intern(&token);
            let counts = token_counts.get_mut(label);
            if counts.len() <= id {
                counts.resize(id + 1, 0);
            }
            counts[id] += 1;
            *word_totals.get_mut(label) += 1;
        }
    }

    let total_docs = doc_counts.spam + doc_counts.ham;
    if total_docs == 0 {
        return Err(DataError::Empty);
    }

    let vocab_size = vocabulary.len();
    let classes = PerClass::from_fn(|label| {
        let log_prior = (*doc_counts.get(label) as f64 / total_docs as f64).ln();
        let denominator = *word_totals.get(label) as f64 + vocab_size as f64 * alpha;
        let counts = token_counts.get(label);
        let log_likelihoods = (0..vocab_size)
            .map(|id| {
                let count = counts.get(id).copied().unwrap_or(0) as f64;
                ((count + alpha) / denominator).ln()
            })
            .collect();
        ClassModel::new(log_prior, log_likelihoods)
    });

    tracing::debug!(
        documents = total_docs,
        spam = doc_counts.spam,
        ham = doc_counts.ham,
        vocabulary = vocab_size,
        alpha,
        "fitted naive bayes model"
    );

    Ok(Model::from_parts(alpha, vocabulary, classes))
}

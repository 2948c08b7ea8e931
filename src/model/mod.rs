//! Multinomial Naive Bayes model: fitted parameters, training, scoring,
//! and persistence.
//!
//! A [`Model`] is produced by [`fit`], consumed by [`predict`], and converted
//! to and from its persisted form by [`persist`]. It is immutable once built;
//! retraining constructs a new model.

pub mod persist;
pub mod predict;
pub mod train;
pub mod vocabulary;

pub use persist::{ModelRecord, load, load_file, save, save_file};
pub use predict::{Prediction, predict};
pub use train::{fit, fit_documents};
pub use vocabulary::Vocabulary;

use std::cmp::Ordering;

use crate::document::{Label, PerClass};

/// Parameters fitted for one class.
///
/// `log_likelihoods` is indexed by vocabulary id and therefore total over
/// the vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassModel {
    log_prior: f64,
    log_likelihoods: Vec<f64>,
}

impl ClassModel {
    pub(crate) fn new(log_prior: f64, log_likelihoods: Vec<f64>) -> Self {
        Self {
            log_prior,
            log_likelihoods,
        }
    }

    pub fn log_prior(&self) -> f64 {
        self.log_prior
    }

    /// Log-likelihood of the token with vocabulary id `id`, or `None` when
    /// `id` is outside the vocabulary.
    pub fn log_likelihood(&self, id: usize) -> Option<f64> {
        self.log_likelihoods.get(id).copied()
    }
}

/// A fitted spam/ham classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    alpha: f64,
    vocabulary: Vocabulary,
    classes: PerClass<ClassModel>,
}

impl Model {
    pub(crate) fn from_parts(
        alpha: f64,
        vocabulary: Vocabulary,
        classes: PerClass<ClassModel>,
    ) -> Self {
        debug_assert!(
            classes
                .iter()
                .all(|(_, c)| c.log_likelihoods.len() == vocabulary.len())
        );
        Self {
            alpha,
            vocabulary,
            classes,
        }
    }

    /// Smoothing strength the model was fitted with.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn class(&self, label: Label) -> &ClassModel {
        self.classes.get(label)
    }

    pub fn log_prior(&self, label: Label) -> f64 {
        self.class(label).log_prior
    }

    /// Log-likelihood of `token` under `label`, or `None` outside the vocabulary.
    pub fn log_likelihood(&self, label: Label, token: &str) -> Option<f64> {
        self.vocabulary
            .id(token)
            .and_then(|id| self.class(label).log_likelihood(id))
    }

    /// Score `text`. Shorthand for [`predict`].
    pub fn predict(&self, text: &str) -> Prediction {
        predict(self, text)
    }

    /// The `n` tokens whose spam log-likelihood most exceeds their ham one.
    ///
    /// Ties are broken by token so the listing is stable across runs.
    pub fn top_spam_tokens(&self, n: usize) -> Vec<(&str, f64)> {
        let spam = &self.classes.spam;
        let ham = &self.classes.ham;
        let mut scored: Vec<(&str, f64)> = self
            .vocabulary
            .iter()
            .map(|(id, token)| (token, spam.log_likelihoods[id] - ham.log_likelihoods[id]))
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        scored.truncate(n);
        scored
    }
}

/// Anything that assigns a label to a message.
///
/// The Naive Bayes [`Model`] implements this; so can a comparison baseline,
/// which lets both be scored by the same evaluation code.
pub trait Classifier: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &str;

    fn classify(&self, text: &str) -> Label;
}

impl Classifier for Model {
    fn name(&self) -> &str {
        "naive-bayes"
    }

    fn classify(&self, text: &str) -> Label {
        predict(self, text).label
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Three spam and three ham messages with hand-computable parameters.
    pub(crate) fn toy_model() -> Model {
        let docs = [
            "win prize money",
            "claim free prize",
            "prize win free",
            "hello how are you",
            "are you free today",
            "hello friend",
        ];
        let labels = [
            Label::Spam,
            Label::Spam,
            Label::Spam,
            Label::Ham,
            Label::Ham,
            Label::Ham,
        ];
        fit(&docs, &labels, 1.0).unwrap()
    }

    #[test]
    fn log_likelihood_outside_vocabulary_is_none() {
        let model = toy_model();
        assert!(model.log_likelihood(Label::Spam, "unknown").is_none());
        assert!(model.log_likelihood(Label::Ham, "prize").is_some());
    }

    #[test]
    fn class_log_likelihood_out_of_range_is_none() {
        let model = toy_model();
        let len = model.vocabulary().len();
        let spam = model.class(Label::Spam);
        assert!(spam.log_likelihood(len - 1).is_some());
        assert!(spam.log_likelihood(len).is_none());
        assert!(spam.log_likelihood(usize::MAX).is_none());
    }

    #[test]
    fn top_spam_tokens_favor_spam_words() {
        let model = toy_model();
        let top: Vec<&str> = model.top_spam_tokens(3).into_iter().map(|(t, _)| t).collect();
        // prize appears 3x in spam and never in ham.
        assert_eq!(top[0], "prize");
        assert!(top.contains(&"win"));
        assert!(!top.contains(&"hello"));
    }

    #[test]
    fn top_spam_tokens_truncates() {
        let model = toy_model();
        assert_eq!(model.top_spam_tokens(100).len(), model.vocabulary().len());
        assert!(model.top_spam_tokens(0).is_empty());
    }

    #[test]
    fn classifier_trait_matches_predict() {
        let model = toy_model();
        let classifier: &dyn Classifier = &model;
        assert_eq!(classifier.classify("win free prize"), Label::Spam);
        assert_eq!(classifier.name(), "naive-bayes");
    }
}

//! End-to-end training and evaluation runs.
//!
//! Training splits the corpus, cross-validates the smoothing strength on the
//! training side, fits the final model on the whole training side, and
//! writes two artifacts into the models directory:
//!
//! - `nb_model.json`: the persisted model
//! - `test_data.json`: the held-out test set, never seen during training
//!
//! Evaluation reloads both and scores the model on the held-out set.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::SieveConfig;
use crate::corpus::{load_test_set, save_test_set};
use crate::document::{Document, Label};
use crate::error::{DataError, SieveResult};
use crate::metrics::{ConfusionMatrix, Metrics};
use crate::model::{self, Classifier, Model};
use crate::sampling::StratifiedSampler;
use crate::search::{HyperparameterSearch, SearchOutcome};

pub const MODEL_FILE: &str = "nb_model.json";
pub const TEST_SET_FILE: &str = "test_data.json";

/// Misclassified test items listed in an evaluation report.
pub const MISCLASSIFIED_LIMIT: usize = 10;
/// Spam-indicative tokens listed in an evaluation report.
pub const TOP_SPAM_TOKENS: usize = 10;

/// Artifact locations inside a models directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub model: PathBuf,
    pub test_set: PathBuf,
}

impl Artifacts {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(MODEL_FILE),
            test_set: dir.join(TEST_SET_FILE),
        }
    }
}

// ── Training ────────────────────────────────────────────────────────────

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainReport {
    pub train_size: usize,
    pub test_size: usize,
    pub search: SearchOutcome,
    pub vocabulary: usize,
}

impl TrainReport {
    pub fn alpha(&self) -> f64 {
        self.search.best_alpha
    }
}

/// Everything a training run produces, before anything touches disk.
#[derive(Debug, Clone)]
pub struct Trained {
    pub model: Model,
    pub test_set: Vec<Document>,
    pub report: TrainReport,
}

/// Split, search, and fit. Pure apart from the sampler's random draws.
pub fn train<R: rand::Rng>(
    corpus: &[Document],
    config: &SieveConfig,
    sampler: &mut StratifiedSampler<R>,
) -> Result<Trained, DataError> {
    if corpus.is_empty() {
        return Err(DataError::Empty);
    }
    let split = sampler.split(corpus, config.split.test_fraction)?;
    let search = HyperparameterSearch::new(config.search.clone()).run(&split.train, sampler)?;
    let model = model::fit_documents(&split.train, search.best_alpha)?;

    let report = TrainReport {
        train_size: split.train.len(),
        test_size: split.test.len(),
        vocabulary: model.vocabulary().len(),
        search,
    };
    tracing::info!(
        train = report.train_size,
        test = report.test_size,
        vocabulary = report.vocabulary,
        alpha = report.alpha(),
        "trained final model"
    );
    Ok(Trained {
        model,
        test_set: split.test,
        report,
    })
}

/// Train and write both artifacts into `config.models_dir`.
pub fn train_and_save<R: rand::Rng>(
    corpus: &[Document],
    config: &SieveConfig,
    sampler: &mut StratifiedSampler<R>,
) -> SieveResult<TrainReport> {
    let trained = train(corpus, config, sampler)?;
    let artifacts = Artifacts::in_dir(&config.models_dir);
    model::save_file(&trained.model, &artifacts.model)?;
    save_test_set(&trained.test_set, &artifacts.test_set)?;
    Ok(trained.report)
}

// ── Evaluation ──────────────────────────────────────────────────────────

/// One test item the classifier got wrong, identified by position only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Misclassified {
    /// Position in the test set.
    pub index: usize,
    pub predicted: Label,
    pub actual: Label,
}

/// Outcome of scoring a classifier on a labeled test set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub classifier: String,
    pub metrics: Metrics,
    /// The first few errors, in test-set order.
    pub misclassified: Vec<Misclassified>,
    /// Tokens ranked by spam minus ham log-likelihood. Empty for classifiers
    /// without per-token parameters.
    pub top_spam_tokens: Vec<(String, f64)>,
}

/// Score any classifier on `test_set`.
pub fn evaluate<C: Classifier + ?Sized>(
    classifier: &C,
    test_set: &[Document],
) -> EvaluationReport {
    let mut confusion = ConfusionMatrix::default();
    let mut misclassified = Vec::new();
    for (index, doc) in test_set.iter().enumerate() {
        let predicted = classifier.classify(&doc.text);
        confusion.record(predicted, doc.label);
        if predicted != doc.label && misclassified.len() < MISCLASSIFIED_LIMIT {
            misclassified.push(Misclassified {
                index,
                predicted,
                actual: doc.label,
            });
        }
    }
    let metrics = Metrics::from_confusion(confusion);
    tracing::info!(
        classifier = classifier.name(),
        documents = test_set.len(),
        accuracy = metrics.accuracy,
        f1 = metrics.f1,
        "evaluated classifier"
    );
    EvaluationReport {
        classifier: classifier.name().to_string(),
        metrics,
        misclassified,
        top_spam_tokens: Vec::new(),
    }
}

/// Score a Naive Bayes model and list its most spam-indicative tokens.
pub fn evaluate_model(model: &Model, test_set: &[Document]) -> EvaluationReport {
    let mut report = evaluate(model, test_set);
    report.top_spam_tokens = model
        .top_spam_tokens(TOP_SPAM_TOKENS)
        .into_iter()
        .map(|(token, margin)| (token.to_string(), margin))
        .collect();
    report
}

/// Load both artifacts from `models_dir` and evaluate.
pub fn evaluate_saved(models_dir: &Path) -> SieveResult<EvaluationReport> {
    let artifacts = Artifacts::in_dir(models_dir);
    let model = model::load_file(&artifacts.model)?;
    let test_set = load_test_set(&artifacts.test_set)?;
    if test_set.is_empty() {
        return Err(DataError::Empty.into());
    }
    Ok(evaluate_model(&model, &test_set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::toy_model;

    /// Always answers the same label.
    struct Constant(Label);

    impl Classifier for Constant {
        fn name(&self) -> &str {
            "constant"
        }
        fn classify(&self, _text: &str) -> Label {
            self.0
        }
    }

    fn test_set() -> Vec<Document> {
        let mut docs = Vec::new();
        for i in 0..15 {
            docs.push(Document::new(Label::Spam, format!("win prize {i}")));
        }
        for i in 0..5 {
            docs.push(Document::new(Label::Ham, format!("hello friend {i}")));
        }
        docs
    }

    #[test]
    fn artifact_names() {
        let a = Artifacts::in_dir(Path::new("models"));
        assert_eq!(a.model, Path::new("models/nb_model.json"));
        assert_eq!(a.test_set, Path::new("models/test_data.json"));
    }

    #[test]
    fn misclassified_list_is_capped() {
        let report = evaluate(&Constant(Label::Ham), &test_set());
        assert_eq!(report.metrics.confusion.false_negatives, 15);
        assert_eq!(report.misclassified.len(), MISCLASSIFIED_LIMIT);
        assert_eq!(report.misclassified[0].index, 0);
        assert!(report.top_spam_tokens.is_empty());
        assert_eq!(report.classifier, "constant");
    }

    #[test]
    fn model_report_lists_spam_tokens() {
        let report = evaluate_model(&toy_model(), &test_set());
        assert_eq!(report.metrics.accuracy, 1.0);
        assert!(report.misclassified.is_empty());
        assert_eq!(report.top_spam_tokens[0].0, "prize");
        assert_eq!(report.classifier, "naive-bayes");
    }

    #[test]
    fn train_rejects_empty_corpus() {
        let err = train(&[], &SieveConfig::default(), &mut StratifiedSampler::seeded(1)).unwrap_err();
        assert!(matches!(err, DataError::Empty));
    }
}

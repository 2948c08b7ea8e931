//! Smoothing-strength selection by stratified k-fold cross-validation.
//!
//! Every `(candidate, fold)` pair is an independent fit-and-score job. Jobs
//! may run on the rayon pool, but results are gathered in grid order and
//! the winner is the first candidate with the highest mean spam F1, exactly
//! as a sequential sweep would pick it.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::document::{Document, Label};
use crate::error::DataError;
use crate::metrics::Metrics;
use crate::model::train::validate_alpha;
use crate::model::{fit_documents, predict};
use crate::sampling::{Fold, StratifiedSampler};

/// Grid-search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Candidate smoothing strengths, in tie-break order.
    #[serde(default = "default_alphas")]
    pub alphas: Vec<f64>,
    /// Number of cross-validation folds.
    #[serde(default = "default_folds")]
    pub folds: usize,
    /// Evaluate `(candidate, fold)` jobs on the rayon pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Draw the folds once and reuse them for every candidate. When false,
    /// each candidate gets its own k-fold draw, taken in grid order.
    #[serde(default = "default_true")]
    pub shared_folds: bool,
}

fn default_alphas() -> Vec<f64> {
    vec![0.1, 0.5, 1.0, 1.5]
}
fn default_folds() -> usize {
    5
}
fn default_true() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            alphas: default_alphas(),
            folds: default_folds(),
            parallel: true,
            shared_folds: true,
        }
    }
}

/// Cross-validated score of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub alpha: f64,
    /// Spam F1 per fold, in fold order.
    pub fold_f1: Vec<f64>,
    pub mean_f1: f64,
}

/// Result of a grid search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub best_alpha: f64,
    pub best_f1: f64,
    /// One entry per candidate, in grid order.
    pub candidates: Vec<CandidateScore>,
}

/// Grid search over smoothing strengths.
#[derive(Debug, Clone, Default)]
pub struct HyperparameterSearch {
    config: SearchConfig,
}

impl HyperparameterSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Cross-validate every candidate on `documents` and pick the best.
    pub fn run<R: rand::Rng>(
        &self,
        documents: &[Document],
        sampler: &mut StratifiedSampler<R>,
    ) -> Result<SearchOutcome, DataError> {
        let SearchConfig {
            alphas,
            folds: k,
            parallel,
            shared_folds,
        } = &self.config;
        let k = *k;

        if alphas.is_empty() {
            return Err(DataError::NoCandidates);
        }
        for &alpha in alphas {
            validate_alpha(alpha)?;
        }

        let fold_sets: Vec<Vec<Fold>> = if *shared_folds {
            vec![sampler.k_fold(documents, k)?]
        } else {
            alphas
                .iter()
                .map(|_| sampler.k_fold(documents, k))
                .collect::<Result<_, _>>()?
        };

        let jobs: Vec<(usize, usize)> = (0..alphas.len())
            .flat_map(|c| (0..k).map(move |f| (c, f)))
            .collect();
        let evaluate = |&(c, f): &(usize, usize)| {
            let folds = if *shared_folds {
                &fold_sets[0]
            } else {
                &fold_sets[c]
            };
            fold_f1(documents, &folds[f], alphas[c])
        };
        let scores: Vec<f64> = if *parallel {
            jobs.par_iter().map(evaluate).collect::<Result<_, _>>()?
        } else {
            jobs.iter().map(evaluate).collect::<Result<_, _>>()?
        };

        let candidates: Vec<CandidateScore> = alphas
            .iter()
            .zip(scores.chunks(k))
            .map(|(&alpha, fold_f1)| {
                let mean_f1 = fold_f1.iter().sum::<f64>() / k as f64;
                tracing::info!(alpha, mean_f1, "cross-validated candidate");
                CandidateScore {
                    alpha,
                    fold_f1: fold_f1.to_vec(),
                    mean_f1,
                }
            })
            .collect();

        let mut best = 0;
        for (i, candidate) in candidates.iter().enumerate().skip(1) {
            if candidate.mean_f1 > candidates[best].mean_f1 {
                best = i;
            }
        }
        let outcome = SearchOutcome {
            best_alpha: candidates[best].alpha,
            best_f1: candidates[best].mean_f1,
            candidates,
        };
        tracing::info!(
            alpha = outcome.best_alpha,
            mean_f1 = outcome.best_f1,
            "selected smoothing strength"
        );
        Ok(outcome)
    }
}

/// Pick the smoothing strength with the highest mean spam F1 over `k` folds.
///
/// Ties go to the candidate listed first.
pub fn select_alpha<D, R>(
    documents: &[D],
    labels: &[Label],
    candidates: &[f64],
    k: usize,
    sampler: &mut StratifiedSampler<R>,
) -> Result<f64, DataError>
where
    D: AsRef<str>,
    R: rand::Rng,
{
    if documents.len() != labels.len() {
        return Err(DataError::LengthMismatch {
            documents: documents.len(),
            labels: labels.len(),
        });
    }
    let documents: Vec<Document> = documents
        .iter()
        .zip(labels)
        .map(|(text, &label)| Document::new(label, text.as_ref()))
        .collect();
    let search = HyperparameterSearch::new(SearchConfig {
        alphas: candidates.to_vec(),
        folds: k,
        ..SearchConfig::default()
    });
    Ok(search.run(&documents, sampler)?.best_alpha)
}

/// Fit on the fold's training side and score spam F1 on its validation side.
fn fold_f1(documents: &[Document], fold: &Fold, alpha: f64) -> Result<f64, DataError> {
    let model = fit_documents(fold.train_documents(documents), alpha)?;
    let (predicted, actual): (Vec<Label>, Vec<Label>) = fold
        .validation_documents(documents)
        .map(|doc| (predict(&model, &doc.text).label, doc.label))
        .unzip();
    let metrics = Metrics::compute(&predicted, &actual)?;
    tracing::debug!(fold = fold.index, alpha, f1 = metrics.f1, "evaluated fold");
    Ok(metrics.f1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPAM_WORDS: [&str; 8] = [
        "win", "cash", "prize", "free", "claim", "urgent", "offer", "bonus",
    ];
    const HAM_WORDS: [&str; 8] = [
        "lunch", "meeting", "tomorrow", "mom", "dinner", "office", "call", "later",
    ];

    fn message(words: &[&str; 8], i: usize) -> String {
        format!("{} {} {}", words[i % 8], words[(i + 3) % 8], words[(i + 5) % 8])
    }

    /// Spam and ham share no words, so every alpha classifies perfectly.
    fn separable_corpus() -> Vec<Document> {
        (0..20)
            .flat_map(|i| {
                [
                    Document::new(Label::Spam, message(&SPAM_WORDS, i)),
                    Document::new(Label::Ham, message(&HAM_WORDS, i)),
                ]
            })
            .collect()
    }

    /// Ham borrows spam words now and then, so candidates can differ.
    fn noisy_corpus() -> Vec<Document> {
        (0..30)
            .flat_map(|i| {
                let ham = if i % 3 == 0 {
                    format!("{} {}", message(&HAM_WORDS, i), SPAM_WORDS[i % 8])
                } else {
                    message(&HAM_WORDS, i)
                };
                let spam = if i % 4 == 0 {
                    format!("{} {}", SPAM_WORDS[i % 8], HAM_WORDS[(i + 1) % 8])
                } else {
                    message(&SPAM_WORDS, i)
                };
                [
                    Document::new(Label::Spam, spam),
                    Document::new(Label::Ham, ham),
                ]
            })
            .collect()
    }

    fn search(alphas: &[f64], parallel: bool, shared_folds: bool) -> HyperparameterSearch {
        HyperparameterSearch::new(SearchConfig {
            alphas: alphas.to_vec(),
            folds: 4,
            parallel,
            shared_folds,
        })
    }

    #[test]
    fn ties_go_to_first_candidate() {
        let docs = separable_corpus();
        let outcome = search(&[1.0, 0.5, 1.5], true, true)
            .run(&docs, &mut StratifiedSampler::seeded(3))
            .unwrap();
        assert!(outcome.candidates.iter().all(|c| c.mean_f1 == 1.0));
        assert_eq!(outcome.best_alpha, 1.0);

        let outcome = search(&[0.5, 1.0, 1.5], true, true)
            .run(&docs, &mut StratifiedSampler::seeded(3))
            .unwrap();
        assert_eq!(outcome.best_alpha, 0.5);
    }

    #[test]
    fn outcome_keeps_every_candidate_in_order() {
        let docs = noisy_corpus();
        let alphas = [0.1, 0.5, 1.0, 1.5];
        let outcome = search(&alphas, false, true)
            .run(&docs, &mut StratifiedSampler::seeded(8))
            .unwrap();
        let listed: Vec<f64> = outcome.candidates.iter().map(|c| c.alpha).collect();
        assert_eq!(listed, alphas);
        assert!(outcome.candidates.iter().all(|c| c.fold_f1.len() == 4));
        let max = outcome
            .candidates
            .iter()
            .map(|c| c.mean_f1)
            .fold(f64::MIN, f64::max);
        assert_eq!(outcome.best_f1, max);
    }

    #[test]
    fn parallel_matches_sequential() {
        let docs = noisy_corpus();
        let alphas = [0.1, 0.5, 1.0, 1.5];
        for shared in [true, false] {
            let par = search(&alphas, true, shared)
                .run(&docs, &mut StratifiedSampler::seeded(21))
                .unwrap();
            let seq = search(&alphas, false, shared)
                .run(&docs, &mut StratifiedSampler::seeded(21))
                .unwrap();
            assert_eq!(par, seq);
        }
    }

    #[test]
    fn select_alpha_is_reproducible() {
        let docs = noisy_corpus();
        let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        let labels: Vec<Label> = docs.iter().map(|d| d.label).collect();
        let grid = [0.1, 0.5, 1.0, 1.5];
        let a = select_alpha(&texts, &labels, &grid, 5, &mut StratifiedSampler::seeded(42)).unwrap();
        let b = select_alpha(&texts, &labels, &grid, 5, &mut StratifiedSampler::seeded(42)).unwrap();
        assert_eq!(a, b);
        assert!(grid.contains(&a));
    }

    #[test]
    fn rejects_empty_grid() {
        let docs = separable_corpus();
        assert!(matches!(
            search(&[], true, true).run(&docs, &mut StratifiedSampler::seeded(0)),
            Err(DataError::NoCandidates)
        ));
    }

    #[test]
    fn rejects_invalid_candidate() {
        let docs = separable_corpus();
        assert!(matches!(
            search(&[1.0, -0.5], true, true).run(&docs, &mut StratifiedSampler::seeded(0)),
            Err(DataError::InvalidAlpha { .. })
        ));
    }

    #[test]
    fn select_alpha_rejects_mismatched_inputs() {
        let err = select_alpha(
            &["win cash"],
            &[],
            &[1.0],
            2,
            &mut StratifiedSampler::seeded(0),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch { .. }));
    }
}

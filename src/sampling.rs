//! Class-balanced shuffling, train/test splitting, and k-fold partitioning.
//!
//! The random source is injected, so a seeded [`StdRng`] (or any other
//! [`Rng`]) makes every split and fold reproducible.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::document::{Document, Label, PerClass};
use crate::error::DataError;

/// Held-out split of a labeled collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitResult {
    pub train: Vec<Document>,
    pub test: Vec<Document>,
}

/// One leave-one-fold-out partition, as indices into the source collection.
///
/// Validation sides of the folds from one [`StratifiedSampler::k_fold`] run
/// are pairwise disjoint and together cover the source exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub index: usize,
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

impl Fold {
    pub fn train_documents<'a>(
        &'a self,
        source: &'a [Document],
    ) -> impl Iterator<Item = &'a Document> + 'a {
        self.train.iter().map(move |&i| &source[i])
    }

    pub fn validation_documents<'a>(
        &'a self,
        source: &'a [Document],
    ) -> impl Iterator<Item = &'a Document> + 'a {
        self.validation.iter().map(move |&i| &source[i])
    }
}

/// Stratified sampler over an injectable random source.
#[derive(Debug, Clone)]
pub struct StratifiedSampler<R = StdRng> {
    rng: R,
}

impl StratifiedSampler<StdRng> {
    /// Reproducible sampler.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Sampler seeded from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> StratifiedSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Split `documents` into train and test sides, class by class.
    ///
    /// Each class is shuffled independently and the first
    /// `floor(class_size * test_fraction)` items become its test slice.
    /// Both sides list ham items before spam items.
    pub fn split(
        &mut self,
        documents: &[Document],
        test_fraction: f64,
    ) -> Result<SplitResult, DataError> {
        if !(0.0..=1.0).contains(&test_fraction) {
            return Err(DataError::InvalidFraction {
                fraction: test_fraction,
            });
        }

        let classes = self.shuffled_classes(documents);
        let mut result = SplitResult::default();
        for (_, members) in classes.iter() {
            let test_count = (members.len() as f64 * test_fraction).floor() as usize;
            let (test, train) = members.split_at(test_count);
            result.test.extend(test.iter().map(|&i| documents[i].clone()));
            result.train.extend(train.iter().map(|&i| documents[i].clone()));
        }

        tracing::info!(
            train = result.train.len(),
            test = result.test.len(),
            test_fraction,
            "stratified split"
        );
        Ok(result)
    }

    /// Partition `documents` into `k` stratified folds.
    ///
    /// Each shuffled class is cut into `k` contiguous slices of
    /// `floor(class_size / k)` items; the last slice absorbs the remainder.
    /// Fold `i` validates on slice `i` of every class and trains on the rest.
    pub fn k_fold(&mut self, documents: &[Document], k: usize) -> Result<Vec<Fold>, DataError> {
        if k == 0 {
            return Err(DataError::InvalidFoldCount { k });
        }

        let classes = self.shuffled_classes(documents);
        let folds = (0..k)
            .map(|i| {
                let mut fold = Fold {
                    index: i,
                    train: Vec::with_capacity(documents.len()),
                    validation: Vec::new(),
                };
                for (_, members) in classes.iter() {
                    let (start, end) = slice_bounds(members.len(), k, i);
                    fold.validation.extend_from_slice(&members[start..end]);
                }
                for (_, members) in classes.iter() {
                    let (start, end) = slice_bounds(members.len(), k, i);
                    fold.train.extend_from_slice(&members[..start]);
                    fold.train.extend_from_slice(&members[end..]);
                }
                fold
            })
            .collect();
        Ok(folds)
    }

    /// Indices of each class, each list shuffled (ham first, then spam).
    fn shuffled_classes(&mut self, documents: &[Document]) -> PerClass<Vec<usize>> {
        let mut classes: PerClass<Vec<usize>> = PerClass::default();
        for (i, doc) in documents.iter().enumerate() {
            classes.get_mut(doc.label).push(i);
        }
        for label in Label::ALL {
            classes.get_mut(label).shuffle(&mut self.rng);
        }
        classes
    }
}

/// Half-open bounds of slice `i` when `n` items are cut into `k` slices.
fn slice_bounds(n: usize, k: usize, i: usize) -> (usize, usize) {
    let size = n / k;
    let start = i * size;
    let end = if i == k - 1 { n } else { start + size };
    (start, end)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn corpus(spam: usize, ham: usize) -> Vec<Document> {
        let mut docs = Vec::new();
        for i in 0..spam {
            docs.push(Document::new(Label::Spam, format!("spam message {i}")));
        }
        for i in 0..ham {
            docs.push(Document::new(Label::Ham, format!("ham message {i}")));
        }
        docs
    }

    fn count(docs: &[Document], label: Label) -> usize {
        docs.iter().filter(|d| d.label == label).count()
    }

    #[test]
    fn split_preserves_class_proportions() {
        let docs = corpus(13, 47);
        let split = StratifiedSampler::seeded(7).split(&docs, 0.2).unwrap();
        assert_eq!(count(&split.test, Label::Spam), 2);
        assert_eq!(count(&split.test, Label::Ham), 9);
        assert_eq!(count(&split.train, Label::Spam), 11);
        assert_eq!(count(&split.train, Label::Ham), 38);
    }

    #[test]
    fn split_is_a_partition() {
        let docs = corpus(10, 20);
        let split = StratifiedSampler::seeded(1).split(&docs, 0.3).unwrap();
        let mut texts: Vec<&str> = split
            .train
            .iter()
            .chain(&split.test)
            .map(|d| d.text.as_str())
            .collect();
        texts.sort_unstable();
        let mut expected: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(texts, expected);
    }

    #[test]
    fn split_lists_ham_before_spam() {
        let docs = corpus(5, 5);
        let split = StratifiedSampler::seeded(3).split(&docs, 0.4).unwrap();
        let labels: Vec<Label> = split.test.iter().map(|d| d.label).collect();
        assert_eq!(labels, vec![Label::Ham, Label::Ham, Label::Spam, Label::Spam]);
    }

    #[test]
    fn split_extremes() {
        let docs = corpus(3, 4);
        let mut sampler = StratifiedSampler::seeded(0);
        assert!(sampler.split(&docs, 0.0).unwrap().test.is_empty());
        assert!(sampler.split(&docs, 1.0).unwrap().train.is_empty());
        assert!(matches!(
            sampler.split(&docs, 1.5),
            Err(DataError::InvalidFraction { .. })
        ));
        assert!(sampler.split(&docs, f64::NAN).is_err());
    }

    #[test]
    fn same_seed_same_split() {
        let docs = corpus(20, 30);
        let a = StratifiedSampler::seeded(99).split(&docs, 0.2).unwrap();
        let b = StratifiedSampler::seeded(99).split(&docs, 0.2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn accepts_any_rng() {
        let docs = corpus(4, 4);
        let mut sampler = StratifiedSampler::new(rand::rngs::mock::StepRng::new(0, 1));
        let split = sampler.split(&docs, 0.5).unwrap();
        assert_eq!(split.test.len(), 4);
    }

    #[test]
    fn folds_are_disjoint_and_exhaustive() {
        let docs = corpus(17, 33);
        let k = 5;
        let folds = StratifiedSampler::seeded(11).k_fold(&docs, k).unwrap();
        assert_eq!(folds.len(), k);

        let mut seen = HashSet::new();
        for fold in &folds {
            for &i in &fold.validation {
                assert!(seen.insert(i), "index {i} validated twice");
            }
        }
        assert_eq!(seen.len(), docs.len());

        for i in 0..docs.len() {
            let in_train = folds.iter().filter(|f| f.train.contains(&i)).count();
            assert_eq!(in_train, k - 1);
        }
        for fold in &folds {
            assert_eq!(fold.train.len() + fold.validation.len(), docs.len());
        }
    }

    #[test]
    fn last_fold_absorbs_remainder() {
        let docs = corpus(7, 12);
        let folds = StratifiedSampler::seeded(5).k_fold(&docs, 3).unwrap();
        let spam_per_fold: Vec<usize> = folds
            .iter()
            .map(|f| f.validation_documents(&docs).filter(|d| d.label.is_spam()).count())
            .collect();
        assert_eq!(spam_per_fold, vec![2, 2, 3]);
        let ham_per_fold: Vec<usize> = folds
            .iter()
            .map(|f| f.validation_documents(&docs).filter(|d| !d.label.is_spam()).count())
            .collect();
        assert_eq!(ham_per_fold, vec![4, 4, 4]);
    }

    #[test]
    fn folds_are_restartable() {
        let docs = corpus(6, 9);
        let folds = StratifiedSampler::seeded(2).k_fold(&docs, 3).unwrap();
        let first: Vec<_> = folds.iter().map(|f| f.validation.clone()).collect();
        let second: Vec<_> = folds.iter().map(|f| f.validation.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(StratifiedSampler::seeded(2).k_fold(&docs, 3).unwrap(), folds);
    }

    #[test]
    fn zero_folds_rejected() {
        let docs = corpus(2, 2);
        assert!(matches!(
            StratifiedSampler::seeded(0).k_fold(&docs, 0),
            Err(DataError::InvalidFoldCount { k: 0 })
        ));
    }

    #[test]
    fn more_folds_than_items_leaves_early_folds_empty() {
        let docs = corpus(2, 1);
        let folds = StratifiedSampler::seeded(0).k_fold(&docs, 4).unwrap();
        assert!(folds[..3].iter().all(|f| f.validation.is_empty()));
        assert_eq!(folds[3].validation.len(), 3);
        assert!(folds[3].train.is_empty());
    }
}

// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # spam-sieve
//!
//! A multinomial Naive Bayes spam filter for short text messages, with
//! Lidstone smoothing chosen by stratified k-fold cross-validation.
//!
//! ## Architecture
//!
//! - **Preprocessing** (`preprocess`): lowercase, normalize URLs, currency, and digits, tokenize
//! - **Model** (`model`): vocabulary, log-domain training and scoring, JSON persistence
//! - **Sampling** (`sampling`): seeded stratified train/test split and k-fold partitions
//! - **Search** (`search`): rayon-parallel grid search over the smoothing strength
//! - **Pipeline** (`pipeline`): train/evaluate runs and their on-disk artifacts
//! - **API** (`api`): validated batch prediction contract for a serving layer
//!
//! ## Library usage
//!
//! ```no_run
//! use spam_sieve::document::Label;
//! use spam_sieve::model::{fit, predict};
//!
//! let docs = ["win a free prize now", "see you at lunch"];
//! let labels = [Label::Spam, Label::Ham];
//! let model = fit(&docs, &labels, 1.0).unwrap();
//! assert_eq!(predict(&model, "free prize").label, Label::Spam);
//! ```

pub mod api;
pub mod config;
pub mod corpus;
pub mod document;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod sampling;
pub mod search;

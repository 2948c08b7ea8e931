//! Rich diagnostic error types for spam-sieve.
//!
//! Each concern defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. None of the messages ever carry
//! document text: corpus problems are reported by line number only.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::document::Label;

/// Top-level error type for spam-sieve.
///
/// Each variant wraps a concern-specific error, preserving its diagnostic
/// code and help text through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum SieveError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on {}: {source}", .path.display())]
    #[diagnostic(
        code(sieve::io),
        help(
            "A filesystem operation failed. Check that the path exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SieveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for fallible spam-sieve operations.
pub type SieveResult<T> = std::result::Result<T, SieveError>;

// ---------------------------------------------------------------------------
// Data errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DataError {
    #[error("cannot train on zero documents")]
    #[diagnostic(
        code(sieve::data::empty),
        help("Provide at least one labeled document. Check that the corpus is not empty.")
    )]
    Empty,

    #[error("unknown label \"{label}\"")]
    #[diagnostic(
        code(sieve::data::unknown_label),
        help("Labels must be exactly \"spam\" or \"ham\".")
    )]
    UnknownLabel { label: String },

    #[error("got {documents} documents but {labels} labels")]
    #[diagnostic(
        code(sieve::data::length_mismatch),
        help("Documents and labels are parallel sequences and must have the same length.")
    )]
    LengthMismatch { documents: usize, labels: usize },

    #[error("invalid smoothing strength {alpha}")]
    #[diagnostic(
        code(sieve::data::invalid_alpha),
        help("Alpha must be a finite number greater than zero (1.0 is Laplace smoothing).")
    )]
    InvalidAlpha { alpha: f64 },

    #[error("invalid test fraction {fraction}")]
    #[diagnostic(
        code(sieve::data::invalid_fraction),
        help("The test fraction must lie in [0, 1], e.g. 0.2 for an 80/20 split.")
    )]
    InvalidFraction { fraction: f64 },

    #[error("invalid fold count {k}")]
    #[diagnostic(
        code(sieve::data::invalid_folds),
        help("Cross-validation needs at least one fold; five is the usual choice.")
    )]
    InvalidFoldCount { k: usize },

    #[error("no smoothing candidates to search")]
    #[diagnostic(
        code(sieve::data::no_candidates),
        help("Supply at least one alpha value, e.g. `alphas = [0.1, 0.5, 1.0]`.")
    )]
    NoCandidates,

    #[error("malformed corpus record on line {line}: {message}")]
    #[diagnostic(
        code(sieve::data::malformed_record),
        help("Each corpus row must be `label,text` with a header row first.")
    )]
    MalformedRecord { line: u64, message: String },

    #[error("got {predicted} predictions but {actual} reference labels")]
    #[diagnostic(
        code(sieve::data::prediction_mismatch),
        help("Predictions and reference labels must line up one to one.")
    )]
    PredictionMismatch { predicted: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ValidationError {
    #[error("invalid prediction input: {}", .fields.join(", "))]
    #[diagnostic(
        code(sieve::validation::invalid_input),
        help("Send a JSON object whose `messages` array holds at least one non-empty string.")
    )]
    InvalidInput { fields: Vec<String> },
}

impl ValidationError {
    /// Field paths that failed validation.
    pub fn fields(&self) -> &[String] {
        match self {
            Self::InvalidInput { fields } => fields,
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SerializationError {
    #[error("malformed model record: {message}")]
    #[diagnostic(
        code(sieve::serialization::malformed),
        help(
            "The model file is not valid JSON or is missing a required field \
             (alpha, logPriors, logLikelihoods, vocabulary). Retrain the model."
        )
    )]
    Malformed { message: String },

    #[error("{class} likelihoods are missing vocabulary token \"{token}\"")]
    #[diagnostic(
        code(sieve::serialization::missing_token),
        help("Every vocabulary token needs a likelihood in both classes. The file is truncated or edited.")
    )]
    MissingToken { class: Label, token: String },

    #[error("{class} likelihoods contain token \"{token}\" outside the vocabulary")]
    #[diagnostic(
        code(sieve::serialization::unexpected_token),
        help("Likelihood maps may only cover vocabulary tokens. The file is corrupt.")
    )]
    UnexpectedToken { class: Label, token: String },

    #[error("vocabulary lists \"{token}\" more than once")]
    #[diagnostic(
        code(sieve::serialization::duplicate_token),
        help("The persisted vocabulary must not repeat tokens. The file is corrupt.")
    )]
    DuplicateToken { token: String },

    #[error("non-finite value in {field}")]
    #[diagnostic(
        code(sieve::serialization::non_finite),
        help(
            "Log-probabilities must be finite. A class with no training documents \
             has a log-prior of -inf and cannot be persisted; train on both classes."
        )
    )]
    NonFinite { field: String },

    #[error("invalid persisted alpha {alpha}")]
    #[diagnostic(
        code(sieve::serialization::invalid_alpha),
        help("The persisted smoothing strength must be finite and greater than zero.")
    )]
    InvalidAlpha { alpha: f64 },
}

impl From<serde_json::Error> for SerializationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed {
            message: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(sieve::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(sieve::config::parse),
        help("Check the TOML syntax. `spam-sieve config` prints a valid default file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(sieve::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

//! Labeled corpus input, held-out set files, and corpus statistics.
//!
//! The corpus is a two-column CSV (`label,text`) with a header row. Extra
//! trailing columns are ignored. Problems are reported by line number; the
//! offending text is never echoed back.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Serialize;

use crate::document::{Document, Label, PerClass};
use crate::error::{DataError, SerializationError, SieveError, SieveResult};
use crate::preprocess::tokenize;

/// Read a labeled corpus from a CSV file.
pub fn read_corpus(path: &Path) -> SieveResult<Vec<Document>> {
    let file = std::fs::File::open(path).map_err(|e| SieveError::io(path, e))?;
    let documents = read_corpus_from(file)?;
    tracing::info!(
        path = %path.display(),
        documents = documents.len(),
        "read corpus"
    );
    Ok(documents)
}

/// Read a labeled corpus from any CSV source.
pub fn read_corpus_from<R: Read>(reader: R) -> Result<Vec<Document>, DataError> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut documents = Vec::new();
    for record in csv.records() {
        let record = record.map_err(|e| DataError::MalformedRecord {
            line: e.position().map_or(0, |p| p.line()),
            message: csv_reason(&e),
        })?;
        let line = record.position().map_or(0, |p| p.line());
        let (Some(label), Some(text)) = (record.get(0), record.get(1)) else {
            return Err(DataError::MalformedRecord {
                line,
                message: format!("expected 2 columns, found {}", record.len()),
            });
        };
        let label: Label = label.trim().parse().map_err(|_| DataError::MalformedRecord {
            line,
            message: "label must be \"spam\" or \"ham\"".into(),
        })?;
        documents.push(Document::new(label, text));
    }
    Ok(documents)
}

/// Describe a CSV failure without quoting field contents.
fn csv_reason(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Utf8 { .. } => "invalid UTF-8".into(),
        csv::ErrorKind::Io(e) => format!("read failed: {e}"),
        _ => "unparseable row".into(),
    }
}

/// Write the held-out set as a JSON array of `{label, text}` objects.
pub fn save_test_set(documents: &[Document], path: &Path) -> SieveResult<()> {
    let json = serde_json::to_string_pretty(documents).map_err(SerializationError::from)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SieveError::io(parent, e))?;
    }
    std::fs::write(path, json).map_err(|e| SieveError::io(path, e))?;
    tracing::info!(path = %path.display(), documents = documents.len(), "saved test set");
    Ok(())
}

/// Read a held-out set written by [`save_test_set`].
pub fn load_test_set(path: &Path) -> SieveResult<Vec<Document>> {
    let json = std::fs::read_to_string(path).map_err(|e| SieveError::io(path, e))?;
    let documents: Vec<Document> =
        serde_json::from_str(&json).map_err(|e| DataError::MalformedRecord {
            line: e.line() as u64,
            message: format!("test set entry is not a {{label, text}} object ({:?})", e.classify()),
        })?;
    Ok(documents)
}

// ── Statistics ──────────────────────────────────────────────────────────

/// Descriptive statistics of a labeled corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub total: usize,
    pub counts: PerClass<usize>,
    /// Share of each class in percent.
    pub percentages: PerClass<f64>,
    /// Mean message length in characters, over the whole corpus.
    pub average_length: f64,
    /// Mean message length in characters, per class.
    pub class_average_length: PerClass<f64>,
    /// Most frequent tokens per class with their counts, most frequent first.
    pub top_tokens: PerClass<Vec<(String, usize)>>,
}

impl CorpusStats {
    /// Default number of tokens listed per class.
    pub const TOP_TOKENS: usize = 10;

    pub fn compute(documents: &[Document], top_n: usize) -> Self {
        let mut counts: PerClass<usize> = PerClass::default();
        let mut lengths: PerClass<usize> = PerClass::default();
        let mut frequencies: PerClass<HashMap<String, usize>> = PerClass::default();

        for doc in documents {
            *counts.get_mut(doc.label) += 1;
            *lengths.get_mut(doc.label) += doc.text.chars().count();
            let freq = frequencies.get_mut(doc.label);
            for token in tokenize(&doc.text) {
                *freq.entry(token).or_default() += 1;
            }
        }

        let total = documents.len();
        let percentages = PerClass::from_fn(|label| 100.0 * mean(*counts.get(label), total));
        let class_average_length =
            PerClass::from_fn(|label| mean(*lengths.get(label), *counts.get(label)));
        let average_length = mean(lengths.spam + lengths.ham, total);
        let top_tokens = frequencies.map(|_, freq| most_frequent(freq, top_n));

        Self {
            total,
            counts,
            percentages,
            average_length,
            class_average_length,
            top_tokens,
        }
    }
}

fn mean(sum: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Top `n` entries by count, ties broken alphabetically.
fn most_frequent(freq: HashMap<String, usize>, n: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = freq.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

//! Batch prediction contract for a serving layer.
//!
//! Input is `{ "messages": ["...", ...] }` with at least one message, every
//! message a non-empty string. Output is one `{ "label", "score" }` per
//! message, in input order, where `score` is the spam log-score.

use serde::Serialize;
use serde_json::Value;

use crate::document::Label;
use crate::error::ValidationError;
use crate::model::{Model, predict};

/// A validated batch of messages to classify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictRequest {
    messages: Vec<String>,
}

impl PredictRequest {
    /// Validate an already-built list of messages.
    pub fn new(messages: Vec<String>) -> Result<Self, ValidationError> {
        let mut fields = Vec::new();
        if messages.is_empty() {
            fields.push("messages".to_string());
        }
        for (i, message) in messages.iter().enumerate() {
            if message.is_empty() {
                fields.push(format!("messages[{i}]"));
            }
        }
        if fields.is_empty() {
            Ok(Self { messages })
        } else {
            Err(ValidationError::InvalidInput { fields })
        }
    }

    /// Validate an untyped request body, collecting every offending field.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let Some(items) = value.get("messages").and_then(Value::as_array) else {
            return Err(ValidationError::InvalidInput {
                fields: vec!["messages".into()],
            });
        };

        let mut fields = Vec::new();
        if items.is_empty() {
            fields.push("messages".to_string());
        }
        let mut messages = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(text) if !text.is_empty() => messages.push(text.to_string()),
                _ => fields.push(format!("messages[{i}]")),
            }
        }

        if fields.is_empty() {
            Ok(Self { messages })
        } else {
            Err(ValidationError::InvalidInput { fields })
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Label and spam log-score for one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledScore {
    pub label: Label,
    pub score: f64,
}

/// Classify every message in `request`, preserving order.
pub fn predict_batch(model: &Model, request: &PredictRequest) -> Vec<LabeledScore> {
    let results: Vec<LabeledScore> = request
        .messages
        .iter()
        .map(|text| {
            let prediction = predict(model, text);
            LabeledScore {
                label: prediction.label,
                score: prediction.scores.spam,
            }
        })
        .collect();
    tracing::debug!(
        messages = results.len(),
        spam = results.iter().filter(|r| r.label.is_spam()).count(),
        "scored batch"
    );
    results
}

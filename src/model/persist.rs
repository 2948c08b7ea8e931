//! Model persistence.
//!
//! The persisted form is a JSON object:
//!
//! ```json
//! {
//!   "alpha": 1.0,
//!   "logPriors": { "spam": -0.69, "ham": -0.69 },
//!   "logLikelihoods": { "spam": { "win": -1.89, ... }, "ham": { ... } },
//!   "vocabulary": ["win", "prize", ...]
//! }
//! ```
//!
//! Both likelihood maps cover exactly the tokens listed in `vocabulary`.
//! Loading checks that invariant and rebuilds the hash-indexed vocabulary,
//! so a partially valid file never yields a model.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::{Label, PerClass};
use crate::error::{SerializationError, SieveError, SieveResult};

use super::vocabulary::Vocabulary;
use super::{ClassModel, Model};

/// Structured, serializable form of a [`Model`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub alpha: f64,
    pub log_priors: PerClass<f64>,
    pub log_likelihoods: PerClass<BTreeMap<String, f64>>,
    pub vocabulary: Vec<String>,
}

impl ModelRecord {
    pub fn to_json(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SerializationError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Convert `model` into its persisted form.
///
/// Fails when a parameter is not finite, which happens when one class had
/// no training documents (its log-prior is `-inf`): JSON cannot carry it.
pub fn save(model: &Model) -> Result<ModelRecord, SerializationError> {
    let log_priors = PerClass::from_fn(|label| model.log_prior(label));
    for (label, prior) in log_priors.iter() {
        if !prior.is_finite() {
            return Err(SerializationError::NonFinite {
                field: format!("logPriors.{label}"),
            });
        }
    }

    let vocabulary = model.vocabulary();
    let log_likelihoods = PerClass::from_fn(|label| {
        let class = model.class(label);
        vocabulary
            .iter()
            .map(|(id, token)| (token.to_string(), class.log_likelihoods[id]))
            .collect::<BTreeMap<_, _>>()
    });

    Ok(ModelRecord {
        alpha: model.alpha(),
        log_priors,
        log_likelihoods,
        vocabulary: vocabulary.tokens().to_vec(),
    })
}

/// Rebuild a model from its persisted form, validating every field.
pub fn load(record: ModelRecord) -> Result<Model, SerializationError> {
    let ModelRecord {
        alpha,
        log_priors,
        log_likelihoods,
        vocabulary,
    } = record;

    if !(alpha.is_finite() && alpha > 0.0) {
        return Err(SerializationError::InvalidAlpha { alpha });
    }
    for (label, prior) in log_priors.iter() {
        if !prior.is_finite() {
            return Err(SerializationError::NonFinite {
                field: format!("logPriors.{label}"),
            });
        }
    }

    let vocabulary = Vocabulary::from_ordered(vocabulary)?;

    let spam = ClassModel::new(
        log_priors.spam,
        likelihood_table(Label::Spam, &log_likelihoods.spam, &vocabulary)?,
    );
    let ham = ClassModel::new(
        log_priors.ham,
        likelihood_table(Label::Ham, &log_likelihoods.ham, &vocabulary)?,
    );

    Ok(Model::from_parts(alpha, vocabulary, PerClass::new(spam, ham)))
}

/// Order `map` by vocabulary id, rejecting missing, extra, or non-finite entries.
fn likelihood_table(
    label: Label,
    map: &BTreeMap<String, f64>,
    vocabulary: &Vocabulary,
) -> Result<Vec<f64>, SerializationError> {
    let mut table = Vec::with_capacity(vocabulary.len());
    for (_, token) in vocabulary.iter() {
        let value = map
            .get(token)
            .copied()
            .ok_or_else(|| SerializationError::MissingToken {
                class: label,
                token: token.to_string(),
            })?;
        if !value.is_finite() {
            return Err(SerializationError::NonFinite {
                field: format!("logLikelihoods.{label}.{token}"),
            });
        }
        table.push(value);
    }

    if map.len() != vocabulary.len() {
        if let Some(extra) = map.keys().find(|token| !vocabulary.contains(token)) {
            return Err(SerializationError::UnexpectedToken {
                class: label,
                token: extra.clone(),
            });
        }
    }

    Ok(table)
}

/// Write `model` as pretty-printed JSON, creating parent directories.
pub fn save_file(model: &Model, path: &Path) -> SieveResult<()> {
    let json = save(model)?.to_json()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SieveError::io(parent, e))?;
    }
    std::fs::write(path, json).map_err(|e| SieveError::io(path, e))?;
    tracing::info!(
        path = %path.display(),
        vocabulary = model.vocabulary().len(),
        alpha = model.alpha(),
        "saved model"
    );
    Ok(())
}

/// Read and validate a model written by [`save_file`].
pub fn load_file(path: &Path) -> SieveResult<Model> {
    let json = std::fs::read_to_string(path).map_err(|e| SieveError::io(path, e))?;
    let model = load(ModelRecord::from_json(&json)?)?;
    tracing::info!(
        path = %path.display(),
        vocabulary = model.vocabulary().len(),
        alpha = model.alpha(),
        "loaded model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::toy_model;
    use crate::model::{fit, predict};

    #[test]
    fn record_matches_persisted_layout() {
        let record = save(&toy_model()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(value["alpha"], 1.0);
        assert!(value["logPriors"]["spam"].is_f64());
        assert!(value["logLikelihoods"]["ham"]["hello"].is_f64());
        assert_eq!(value["vocabulary"].as_array().unwrap().len(), 11);
        assert_eq!(value["vocabulary"][0], "win");
    }

    #[test]
    fn load_of_save_is_identity() {
        let model = toy_model();
        let json = save(&model).unwrap().to_json().unwrap();
        let restored = load(ModelRecord::from_json(&json).unwrap()).unwrap();
        assert_eq!(restored, model);
        for text in ["win free prize", "hello you today", "a new unknown word", ""] {
            assert_eq!(predict(&restored, text), predict(&model, text));
        }
    }

    #[test]
    fn missing_field_is_malformed() {
        let json = r#"{"alpha": 1.0, "logPriors": {"spam": -0.7, "ham": -0.7}, "vocabulary": []}"#;
        let err = ModelRecord::from_json(json).unwrap_err();
        assert!(matches!(err, SerializationError::Malformed { .. }));
    }

    #[test]
    fn non_numeric_likelihood_is_malformed() {
        let json = r#"{
            "alpha": 1.0,
            "logPriors": {"spam": -0.7, "ham": -0.7},
            "logLikelihoods": {"spam": {"win": "high"}, "ham": {"win": -1.0}},
            "vocabulary": ["win"]
        }"#;
        assert!(matches!(
            ModelRecord::from_json(json),
            Err(SerializationError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_token_is_rejected() {
        let mut record = save(&toy_model()).unwrap();
        record.log_likelihoods.ham.remove("hello");
        assert!(matches!(
            load(record),
            Err(SerializationError::MissingToken { class: Label::Ham, token }) if token == "hello"
        ));
    }

    #[test]
    fn extra_token_is_rejected() {
        let mut record = save(&toy_model()).unwrap();
        record.log_likelihoods.spam.insert("stray".into(), -3.0);
        assert!(matches!(
            load(record),
            Err(SerializationError::UnexpectedToken { class: Label::Spam, token }) if token == "stray"
        ));
    }

    #[test]
    fn invalid_alpha_is_rejected() {
        let mut record = save(&toy_model()).unwrap();
        record.alpha = 0.0;
        assert!(matches!(load(record), Err(SerializationError::InvalidAlpha { .. })));
    }

    #[test]
    fn single_class_model_cannot_be_saved() {
        let model = fit(&["hello there"], &[Label::Ham], 1.0).unwrap();
        assert!(matches!(
            save(&model),
            Err(SerializationError::NonFinite { field }) if field == "logPriors.spam"
        ));
    }

    #[test]
    fn empty_vocabulary_round_trips() {
        let model = fit(&["!!!", "..."], &[Label::Spam, Label::Ham], 1.0).unwrap();
        let restored = load(save(&model).unwrap()).unwrap();
        assert!(restored.vocabulary().is_empty());
        assert_eq!(predict(&restored, "anything").label, Label::Ham);
    }
}

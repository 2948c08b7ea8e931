//! Frozen token vocabulary.
//!
//! Tokens keep their first-seen order so persisted models are reproducible,
//! while a hash index gives O(1) membership and id lookup when scoring.

use std::collections::HashMap;

use crate::error::SerializationError;

/// Ordered, hash-indexed set of distinct tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted ordered sequence. Duplicates are rejected.
    pub fn from_ordered(tokens: Vec<String>) -> Result<Self, SerializationError> {
        let mut index = HashMap::with_capacity(tokens.len());
        for (id, token) in tokens.iter().enumerate() {
            if index.insert(token.clone(), id).is_some() {
                return Err(SerializationError::DuplicateToken {
                    token: token.clone(),
                });
            }
        }
        Ok(Self { tokens, index })
    }

    /// Add `token` if unseen and return its id.
    pub(crate) fn intern(&mut self, token: &str) -> usize {
        if let Some(&id) = self.index.get(token) {
            return id;
        }
        let id = self.tokens.len();
        self.tokens.push(token.to_string());
        self.index.insert(token.to_string(), id);
        id
    }

    pub fn id(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in first-seen order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.tokens.iter().map(String::as_str).enumerate()
    }
}

//! Labeled documents and the fixed two-class label set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Class label. The set is closed: every document is either spam or ham.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Spam,
    Ham,
}

impl Label {
    /// Every label, in the order classes are partitioned and concatenated.
    pub const ALL: [Label; 2] = [Label::Ham, Label::Spam];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::Ham => "ham",
        }
    }

    pub fn is_spam(self) -> bool {
        self == Self::Spam
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spam" => Ok(Self::Spam),
            "ham" => Ok(Self::Ham),
            other => Err(DataError::UnknownLabel {
                label: other.to_string(),
            }),
        }
    }
}

/// A raw message and its label. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub label: Label,
    pub text: String,
}

impl Document {
    pub fn new(label: Label, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// One value per class, serialized as `{ "spam": .., "ham": .. }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerClass<T> {
    pub spam: T,
    pub ham: T,
}

impl<T> PerClass<T> {
    pub fn new(spam: T, ham: T) -> Self {
        Self { spam, ham }
    }

    /// Build both entries from a function of the label.
    pub fn from_fn(mut f: impl FnMut(Label) -> T) -> Self {
        Self {
            spam: f(Label::Spam),
            ham: f(Label::Ham),
        }
    }

    pub fn get(&self, label: Label) -> &T {
        match label {
            Label::Spam => &self.spam,
            Label::Ham => &self.ham,
        }
    }

    pub fn get_mut(&mut self, label: Label) -> &mut T {
        match label {
            Label::Spam => &mut self.spam,
            Label::Ham => &mut self.ham,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Label, T) -> U) -> PerClass<U> {
        PerClass {
            spam: f(Label::Spam, self.spam),
            ham: f(Label::Ham, self.ham),
        }
    }

    /// Iterate `(label, value)` pairs in [`Label::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, &T)> {
        Label::ALL.into_iter().map(move |label| (label, self.get(label)))
    }
}

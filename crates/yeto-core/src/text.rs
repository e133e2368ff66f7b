//! Bilingual display strings.
//!
//! The platform publishes in Arabic and English. Every generated
//! human-readable string (source names, grade explanations, error
//! messages) carries both languages side by side; they are never folded
//! into a single field.

use serde::{Deserialize, Serialize};

/// A human-readable string in both platform languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
  pub en: String,
  pub ar: String,
}

impl LocalizedText {
  pub fn new(en: impl Into<String>, ar: impl Into<String>) -> Self {
    Self { en: en.into(), ar: ar.into() }
  }
}

//! Error types for `yeto-core`.
//!
//! Every variant is caller-recoverable; none should take a serving
//! process down. Each maps to a stable machine-readable kind and carries
//! a human-readable message in both platform languages.

use thiserror::Error;
use uuid::Uuid;

use crate::{contradiction::ContradictionStatus, text::LocalizedText};

#[derive(Debug, Error)]
pub enum Error {
  #[error("source not found: {0}")]
  SourceNotFound(String),

  #[error("evidence pack not found: {0}")]
  PackNotFound(String),

  #[error("contradiction not found: {0}")]
  ContradictionNotFound(Uuid),

  #[error("no published vintage for subject: {0}")]
  VintageNotFound(String),

  /// A pack with zero citations must never publish.
  #[error("an evidence pack requires at least one citation")]
  InsufficientEvidence,

  /// A citation names a source the registry does not know.
  #[error("citation references unregistered source: {0}")]
  UnknownSource(String),

  #[error("illegal contradiction transition: {from} -> {to}")]
  InvalidTransition {
    from: ContradictionStatus,
    to:   ContradictionStatus,
  },

  #[error("the explained status requires at least one plausible reason")]
  ExplanationRequiresReasons,

  /// Vintages are an append-only log; out-of-order appends are rejected.
  #[error("vintage sequence violation: {0}")]
  VintageSequence(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Stable kind string, used by API error envelopes.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::SourceNotFound(_)
      | Self::PackNotFound(_)
      | Self::ContradictionNotFound(_)
      | Self::VintageNotFound(_) => "not_found",
      Self::InsufficientEvidence => "insufficient_evidence",
      Self::UnknownSource(_) => "unknown_source",
      Self::InvalidTransition { .. }
      | Self::ExplanationRequiresReasons
      | Self::VintageSequence(_) => "invalid_transition",
      Self::Serialization(_) => "internal",
    }
  }

  /// The message in both platform languages. English mirrors [`Display`].
  ///
  /// [`Display`]: std::fmt::Display
  pub fn message(&self) -> LocalizedText {
    let ar = match self {
      Self::SourceNotFound(id) => format!("المصدر غير موجود: {id}"),
      Self::PackNotFound(subject) => {
        format!("حزمة الأدلة غير موجودة: {subject}")
      }
      Self::ContradictionNotFound(id) => {
        format!("سجل التناقض غير موجود: {id}")
      }
      Self::VintageNotFound(subject) => {
        format!("لا توجد نسخة منشورة للموضوع: {subject}")
      }
      Self::InsufficientEvidence => {
        "لا يمكن نشر حزمة أدلة دون استشهاد واحد على الأقل".to_string()
      }
      Self::UnknownSource(id) => {
        format!("الاستشهاد يشير إلى مصدر غير مسجل: {id}")
      }
      Self::InvalidTransition { from, to } => {
        format!("انتقال حالة غير مسموح: {from} ← {to}")
      }
      Self::ExplanationRequiresReasons => {
        "حالة \"مفسَّر\" تتطلب سبباً واحداً محتملاً على الأقل".to_string()
      }
      Self::VintageSequence(detail) => {
        format!("مخالفة في تسلسل النسخ: {detail}")
      }
      Self::Serialization(e) => format!("خطأ في الترميز: {e}"),
    };
    LocalizedText { en: self.to_string(), ar }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Confidence grading — the A–D judgment over an evidence pack.
//!
//! The grade is a separate judgment derived from source tier, DQAF
//! results, and contradiction status. It is never an average of the five
//! DQAF dimensions; those stay independent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  evidence::{DqafAssessment, DqafStatus},
  source::SourceTier,
  text::LocalizedText,
};

// ─── Grade ───────────────────────────────────────────────────────────────────

/// Letter confidence grade. The derived ordering puts `A` first, so
/// "lower grade" means a later variant.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Grade {
  A,
  B,
  C,
  D,
}

impl Grade {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::A => "A",
      Self::B => "B",
      Self::C => "C",
      Self::D => "D",
    }
  }

  /// Arabic letter used in generated explanations.
  pub fn letter_ar(&self) -> &'static str {
    match self {
      Self::A => "أ",
      Self::B => "ب",
      Self::C => "ج",
      Self::D => "د",
    }
  }

  fn from_index(i: usize) -> Self {
    match i {
      0 => Self::A,
      1 => Self::B,
      2 => Self::C,
      _ => Self::D,
    }
  }

  fn index(&self) -> usize {
    match self {
      Self::A => 0,
      Self::B => 1,
      Self::C => 2,
      Self::D => 3,
    }
  }
}

impl fmt::Display for Grade {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A derived grade with its generated explanation and the conditions
/// under which it would change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedConfidence {
  pub grade:             Grade,
  pub explanation:       LocalizedText,
  pub change_conditions: Vec<LocalizedText>,
}

// ─── Grader ──────────────────────────────────────────────────────────────────

fn base_grade(tier: Option<SourceTier>) -> Grade {
  match tier {
    Some(SourceTier::T0) => Grade::A,
    Some(SourceTier::T1) => Grade::B,
    Some(SourceTier::T2) => Grade::C,
    Some(SourceTier::T3) | Some(SourceTier::T4) | None => Grade::D,
  }
}

/// Derive the confidence grade.
///
/// - `best_tier` — the minimum (best) tier among all citing sources.
/// - `dqaf` — the pack's five dimension statuses.
/// - `unresolved_contradictions` — referenced contradictions still in
///   `detected` or `investigating`; `resolved`/`explained` do not count.
///
/// Rules: start from the tier base; downgrade one letter for any
/// `needs_review` dimension, two for any `unknown` dimension, one more
/// for any unresolved contradiction; clamp to D. A wholly unassessed
/// pack with nothing disputed grades exactly C — the moderate baseline —
/// and no pack grades A without at least one passing dimension.
pub fn grade(
  best_tier:                 Option<SourceTier>,
  dqaf:                      &DqafAssessment,
  unresolved_contradictions: usize,
) -> GradedConfidence {
  if dqaf.is_unassessed() && unresolved_contradictions == 0 {
    return GradedConfidence {
      grade:             Grade::C,
      explanation:       LocalizedText::new(
        "Grade C: no DQAF assessment recorded; moderate/unverified baseline.",
        "التصنيف ج: لا يوجد تقييم لجودة البيانات؛ خط أساس متوسط غير مُتحقَّق.",
      ),
      change_conditions: vec![LocalizedText::new(
        "Recording a DQAF assessment with passing dimensions would allow a \
         higher grade.",
        "تسجيل تقييم جودة بيانات بأبعاد ناجحة قد يسمح بتصنيف أعلى.",
      )],
    };
  }

  let base = base_grade(best_tier);
  let tier_label =
    best_tier.map(|t| format!("{t:?}")).unwrap_or_else(|| "none".to_string());

  let mut reasons_en = vec![format!(
    "base grade {base} from best source tier {tier_label}"
  )];
  let mut reasons_ar = vec![format!(
    "التصنيف الأساسي {} بحسب أفضل فئة مصدر {tier_label}",
    base.letter_ar()
  )];
  let mut conditions = Vec::new();
  let mut steps = 0usize;

  let needing_review: Vec<&str> = dqaf
    .dimensions()
    .into_iter()
    .filter(|(_, s)| *s == DqafStatus::NeedsReview)
    .map(|(name, _)| name)
    .collect();
  if !needing_review.is_empty() {
    steps += 1;
    reasons_en.push(format!(
      "downgraded one letter: dimensions needing review ({})",
      needing_review.join(", ")
    ));
    reasons_ar.push(format!(
      "خُفِّض درجة واحدة لوجود أبعاد تتطلب مراجعة ({})",
      needing_review.join(", ")
    ));
    conditions.push(LocalizedText::new(
      "Clearing the needs-review DQAF dimensions would remove a one-letter \
       downgrade.",
      "معالجة الأبعاد التي تتطلب مراجعة ستزيل تخفيضاً بدرجة واحدة.",
    ));
  }

  let unknown: Vec<&str> = dqaf
    .dimensions()
    .into_iter()
    .filter(|(_, s)| *s == DqafStatus::Unknown)
    .map(|(name, _)| name)
    .collect();
  if !unknown.is_empty() {
    steps += 2;
    reasons_en.push(format!(
      "downgraded two letters: unknown dimensions ({})",
      unknown.join(", ")
    ));
    reasons_ar.push(format!(
      "خُفِّض درجتين لوجود أبعاد مجهولة ({})",
      unknown.join(", ")
    ));
    conditions.push(LocalizedText::new(
      "Assessing the unknown DQAF dimensions would remove a two-letter \
       downgrade.",
      "تقييم الأبعاد المجهولة سيزيل تخفيضاً بدرجتين.",
    ));
  }

  if unresolved_contradictions > 0 {
    steps += 1;
    reasons_en.push(format!(
      "downgraded one letter: {unresolved_contradictions} unresolved \
       contradiction(s)"
    ));
    reasons_ar.push(format!(
      "خُفِّض درجة واحدة بسبب {unresolved_contradictions} تناقض غير محسوم"
    ));
    conditions.push(LocalizedText::new(
      "Resolving or explaining the open contradictions would remove a \
       one-letter downgrade.",
      "حسم التناقضات المفتوحة أو تفسيرها سيزيل تخفيضاً بدرجة واحدة.",
    ));
  }

  if conditions.is_empty() {
    conditions.push(LocalizedText::new(
      "A failed DQAF review or a new unresolved contradiction would lower \
       this grade.",
      "فشل مراجعة جودة البيانات أو ظهور تناقض غير محسوم سيخفض هذا التصنيف.",
    ));
  }

  let final_grade = Grade::from_index((base.index() + steps).min(3));

  GradedConfidence {
    grade:             final_grade,
    explanation:       LocalizedText::new(
      format!("Grade {final_grade}: {}.", reasons_en.join("; ")),
      format!("التصنيف {}: {}.", final_grade.letter_ar(), reasons_ar.join("؛ ")),
    ),
    change_conditions: conditions,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

//! Presentation guard — never display an unsubstantiated number.
//!
//! The platform's credibility rests on one contract: a figure with no
//! valid evidence reference renders as a deterministic gap ticket, never
//! as a bare value. The ticket id is stable per (indicator, sector) so
//! gap-tracking dashboards deduplicate repeated sightings.

use serde::{Deserialize, Serialize};

/// Identifies what a guarded figure is, for gap-ticket derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardContext {
  pub indicator_code: String,
  pub sector_code:    String,
}

/// What the presentation layer is allowed to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardOutcome {
  pub display_value: String,
  pub has_evidence:  bool,
  pub gap_id:        Option<String>,
}

/// Upstream rows that never got a pack carry this literal instead of an id.
const UNKNOWN_PACK_SENTINEL: &str = "unknown";

/// Decide whether a value may be displayed.
///
/// The real value passes only when all four conditions hold: the value is
/// present (non-null, non-empty, not a bare dash), the evidence pack id
/// is present and not the `"unknown"` sentinel, the figure is database
/// driven, and its license permits display. Anything else yields the gap
/// placeholder `— | GAP-XXXXXXXX`.
pub fn guard(
  value:            Option<&str>,
  evidence_pack_id: Option<&str>,
  is_db_driven:     bool,
  license_allows:   bool,
  ctx:              &GuardContext,
) -> GuardOutcome {
  let value_present = value.is_some_and(|v| {
    let trimmed = v.trim();
    !trimmed.is_empty() && trimmed != "—" && trimmed != "-"
  });
  let pack_present = evidence_pack_id
    .is_some_and(|p| !p.is_empty() && p != UNKNOWN_PACK_SENTINEL);

  if value_present && pack_present && is_db_driven && license_allows {
    return GuardOutcome {
      display_value: value.unwrap_or_default().to_string(),
      has_evidence:  true,
      gap_id:        None,
    };
  }

  let gap = gap_id(ctx);
  GuardOutcome {
    display_value: format!("— | {gap}"),
    has_evidence:  false,
    gap_id:        Some(gap),
  }
}

/// Deterministic gap-ticket id for a missing figure.
///
/// Polynomial rolling hash (`acc = acc * 31 + char`, 64-bit wrapping)
/// over `indicator|sector`, absolute value, base-36, upper-cased,
/// truncated to eight characters, `GAP-` prefix. A human-facing
/// correlation id, not a cryptographic one; collisions over the small
/// indicator/sector vocabulary are acceptable.
pub fn gap_id(ctx: &GuardContext) -> String {
  let key = format!("{}|{}", ctx.indicator_code, ctx.sector_code);

  let mut acc: i64 = 0;
  for c in key.chars() {
    acc = acc.wrapping_mul(31).wrapping_add(c as i64);
  }

  let mut n = acc.unsigned_abs();
  let mut digits: Vec<char> = Vec::new();
  if n == 0 {
    digits.push('0');
  }
  while n > 0 {
    let d = (n % 36) as u32;
    if let Some(c) = char::from_digit(d, 36) {
      digits.push(c.to_ascii_uppercase());
    }
    n /= 36;
  }

  let id: String = digits.into_iter().rev().take(8).collect();
  format!("GAP-{id}")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

//! Assessments: periodic evaluations of a client, scored 1 to 100.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Id, Result, error::check_range, text_enum::text_enum};

pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentType {
  Initial,
  Periodic,
  Annual,
  Discharge,
}

text_enum!(AssessmentType, "assessment type", {
  Initial => "initial",
  Periodic => "periodic",
  Annual => "annual",
  Discharge => "discharge",
});

/// Review status. Finalisation (→ approved) is one-way.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
  #[default]
  Draft,
  Pending,
  Approved,
}

text_enum!(AssessmentStatus, "assessment status", {
  Draft => "draft",
  Pending => "pending",
  Approved => "approved",
});

// ─── Category scores ─────────────────────────────────────────────────────────

/// Per-category scores keyed by category name, e.g. `"mobility" → 70`.
/// Stored as a JSON object; `NULL` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryScores(pub BTreeMap<String, u8>);

impl CategoryScores {
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn insert(&mut self, category: impl Into<String>, score: u8) {
    self.0.insert(category.into(), score);
  }

  pub fn get(&self, category: &str) -> Option<u8> {
    self.0.get(category).copied()
  }

  /// Mean of all category scores, rounded to the nearest integer.
  pub fn mean(&self) -> Option<u8> {
    if self.0.is_empty() {
      return None;
    }
    let total: u32 = self.0.values().map(|&s| u32::from(s)).sum();
    let n = self.0.len() as u32;
    Some(((total + n / 2) / n) as u8)
  }

  pub fn validate(&self) -> Result<()> {
    for (category, &score) in &self.0 {
      check_range(
        &format!("category_scores.{category}"),
        score.into(),
        SCORE_MIN.into(),
        SCORE_MAX.into(),
      )?;
    }
    Ok(())
  }
}

// ─── Assessment ──────────────────────────────────────────────────────────────

/// A persisted assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
  pub id:              Id,
  pub client_id:       Id,
  pub staff_id:        Id,
  pub support_plan_id: Option<Id>,
  pub assessment_type: AssessmentType,
  pub assessment_date: NaiveDate,
  pub summary:         Option<String>,
  pub overall_score:   Option<u8>,
  pub category_scores: CategoryScores,
  pub strengths:       Option<String>,
  pub challenges:      Option<String>,
  pub recommendations: Option<String>,
  pub goals:           Option<String>,
  pub status:          AssessmentStatus,
  pub finalized_at:    Option<DateTime<Utc>>,
  pub finalized_by:    Option<Id>,
  pub attachments:     Vec<String>,
  pub notes:           Option<String>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// Input for creating or editing an assessment. New assessments start as
/// [`AssessmentStatus::Draft`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssessment {
  pub client_id:       Id,
  pub staff_id:        Id,
  #[serde(default)]
  pub support_plan_id: Option<Id>,
  pub assessment_type: AssessmentType,
  pub assessment_date: NaiveDate,
  #[serde(default)]
  pub summary:         Option<String>,
  #[serde(default)]
  pub overall_score:   Option<u8>,
  #[serde(default)]
  pub category_scores: CategoryScores,
  #[serde(default)]
  pub strengths:       Option<String>,
  #[serde(default)]
  pub challenges:      Option<String>,
  #[serde(default)]
  pub recommendations: Option<String>,
  #[serde(default)]
  pub goals:           Option<String>,
  #[serde(default)]
  pub attachments:     Vec<String>,
  #[serde(default)]
  pub notes:           Option<String>,
}

impl NewAssessment {
  pub fn new(
    client_id: Id,
    staff_id: Id,
    assessment_type: AssessmentType,
    assessment_date: NaiveDate,
  ) -> Self {
    Self {
      client_id,
      staff_id,
      support_plan_id: None,
      assessment_type,
      assessment_date,
      summary: None,
      overall_score: None,
      category_scores: CategoryScores::default(),
      strengths: None,
      challenges: None,
      recommendations: None,
      goals: None,
      attachments: Vec::new(),
      notes: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if let Some(score) = self.overall_score {
      check_range("overall_score", score.into(), SCORE_MIN.into(), SCORE_MAX.into())?;
    }
    self.category_scores.validate()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn category_score_out_of_range_names_the_category() {
    let mut scores = CategoryScores::default();
    scores.insert("mobility", 70);
    scores.insert("communication", 0);
    let err = scores.validate().unwrap_err();
    assert!(err.to_string().contains("category_scores.communication"), "{err}");
  }

  #[test]
  fn overall_score_bounds_are_inclusive() {
    let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let mut input = NewAssessment::new(1, 1, AssessmentType::Initial, date);
    input.overall_score = Some(1);
    assert!(input.validate().is_ok());
    input.overall_score = Some(100);
    assert!(input.validate().is_ok());
    input.overall_score = Some(101);
    assert!(input.validate().is_err());
  }

  #[test]
  fn mean_rounds_to_nearest() {
    let mut scores = CategoryScores::default();
    assert_eq!(scores.mean(), None);
    scores.insert("a", 50);
    scores.insert("b", 51);
    assert_eq!(scores.mean(), Some(51));
  }

  #[test]
  fn scores_serialise_as_plain_object() {
    let mut scores = CategoryScores::default();
    scores.insert("mobility", 70);
    assert_eq!(serde_json::to_string(&scores).unwrap(), r#"{"mobility":70}"#);
  }
}

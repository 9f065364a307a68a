//! Support plans: the care plan drafted for a client.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Id, Result, error::require, text_enum::text_enum};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
  #[default]
  Pending,
  Active,
  Completed,
  Cancelled,
}

text_enum!(PlanStatus, "support plan status", {
  Pending => "pending",
  Active => "active",
  Completed => "completed",
  Cancelled => "cancelled",
});

impl PlanStatus {
  /// Plans in these states are still expected to finish by `end_date`.
  pub fn is_open(self) -> bool { matches!(self, Self::Pending | Self::Active) }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  High,
  #[default]
  Medium,
  Low,
}

text_enum!(Priority, "priority", {
  High => "high",
  Medium => "medium",
  Low => "low",
});

/// A persisted support plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportPlan {
  pub id:                 Id,
  pub client_id:          Id,
  pub plan_name:          String,
  pub goals:              Option<String>,
  pub start_date:         NaiveDate,
  pub end_date:           NaiveDate,
  pub status:             PlanStatus,
  pub priority:           Priority,
  /// Staff ids responsible for the plan; stored as a JSON array.
  pub assigned_staff_ids: Vec<Id>,
  pub notes:              Option<String>,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl SupportPlan {
  /// Derived state: an open plan whose end date has passed. Never stored.
  pub fn is_overdue(&self, today: NaiveDate) -> bool {
    self.status.is_open() && self.end_date < today
  }
}

/// Input for creating or fully updating a support plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupportPlan {
  pub client_id:          Id,
  pub plan_name:          String,
  #[serde(default)]
  pub goals:              Option<String>,
  pub start_date:         NaiveDate,
  pub end_date:           NaiveDate,
  #[serde(default)]
  pub status:             PlanStatus,
  #[serde(default)]
  pub priority:           Priority,
  #[serde(default)]
  pub assigned_staff_ids: Vec<Id>,
  #[serde(default)]
  pub notes:              Option<String>,
}

impl NewSupportPlan {
  pub fn new(
    client_id: Id,
    plan_name: impl Into<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
  ) -> Self {
    Self {
      client_id,
      plan_name: plan_name.into(),
      goals: None,
      start_date,
      end_date,
      status: PlanStatus::default(),
      priority: Priority::default(),
      assigned_staff_ids: Vec::new(),
      notes: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require("plan_name", &self.plan_name)?;
    if self.end_date < self.start_date {
      return Err(Error::Invalid(format!(
        "end_date {} is before start_date {}",
        self.end_date, self.start_date
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn plan(status: PlanStatus, end: NaiveDate) -> SupportPlan {
    SupportPlan {
      id: 1,
      client_id: 1,
      plan_name: "Daily living".into(),
      goals: None,
      start_date: date(2024, 1, 1),
      end_date: end,
      status,
      priority: Priority::Medium,
      assigned_staff_ids: vec![],
      notes: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn overdue_only_when_open_and_past_end() {
    let today = date(2024, 7, 1);
    assert!(plan(PlanStatus::Active, date(2024, 6, 30)).is_overdue(today));
    assert!(plan(PlanStatus::Pending, date(2024, 6, 30)).is_overdue(today));
    assert!(!plan(PlanStatus::Active, date(2024, 7, 1)).is_overdue(today));
    assert!(!plan(PlanStatus::Completed, date(2024, 6, 30)).is_overdue(today));
    assert!(!plan(PlanStatus::Cancelled, date(2024, 1, 30)).is_overdue(today));
  }

  #[test]
  fn end_before_start_is_invalid() {
    let input = NewSupportPlan::new(1, "Plan", date(2024, 5, 1), date(2024, 4, 1));
    assert!(input.validate().is_err());
    let ok = NewSupportPlan::new(1, "Plan", date(2024, 5, 1), date(2024, 5, 1));
    assert!(ok.validate().is_ok());
  }
}

//! Service logs, one record per visit or support session.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Id, Result,
  error::{check_range, require},
  text_enum::text_enum,
};

/// Review status of a service log. Escalates draft → confirmed → approved.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ServiceLogStatus {
  #[default]
  Draft,
  Confirmed,
  Approved,
}

text_enum!(ServiceLogStatus, "service log status", {
  Draft => "draft",
  Confirmed => "confirmed",
  Approved => "approved",
});

/// The client's observed health during the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
  Excellent,
  Good,
  Fair,
  Poor,
}

text_enum!(HealthStatus, "health status", {
  Excellent => "excellent",
  Good => "good",
  Fair => "fair",
  Poor => "poor",
});

pub const MOOD_MIN: u8 = 1;
pub const MOOD_MAX: u8 = 5;

/// A persisted service log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLog {
  pub id:              Id,
  pub client_id:       Id,
  pub support_plan_id: Option<Id>,
  pub staff_id:        Id,
  pub service_date:    NaiveDate,
  pub start_time:      NaiveTime,
  pub end_time:        NaiveTime,
  pub service_type:    String,
  pub details:         Option<String>,
  pub achievements:    Option<String>,
  pub issues:          Option<String>,
  pub next_actions:    Option<String>,
  /// 1 (low) to 5 (high).
  pub mood_level:      Option<u8>,
  pub health_status:   Option<HealthStatus>,
  /// File references; stored as a JSON array.
  pub attachments:     Vec<String>,
  pub notes:           Option<String>,
  pub status:          ServiceLogStatus,
  pub approved_by:     Option<Id>,
  pub approved_at:     Option<DateTime<Utc>>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl ServiceLog {
  pub fn duration(&self) -> chrono::Duration { self.end_time - self.start_time }
}

/// Input for creating or editing a service log. New logs always start as
/// [`ServiceLogStatus::Draft`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServiceLog {
  pub client_id:       Id,
  #[serde(default)]
  pub support_plan_id: Option<Id>,
  pub staff_id:        Id,
  pub service_date:    NaiveDate,
  pub start_time:      NaiveTime,
  pub end_time:        NaiveTime,
  pub service_type:    String,
  #[serde(default)]
  pub details:         Option<String>,
  #[serde(default)]
  pub achievements:    Option<String>,
  #[serde(default)]
  pub issues:          Option<String>,
  #[serde(default)]
  pub next_actions:    Option<String>,
  #[serde(default)]
  pub mood_level:      Option<u8>,
  #[serde(default)]
  pub health_status:   Option<HealthStatus>,
  #[serde(default)]
  pub attachments:     Vec<String>,
  #[serde(default)]
  pub notes:           Option<String>,
}

impl NewServiceLog {
  pub fn new(
    client_id: Id,
    staff_id: Id,
    service_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    service_type: impl Into<String>,
  ) -> Self {
    Self {
      client_id,
      support_plan_id: None,
      staff_id,
      service_date,
      start_time,
      end_time,
      service_type: service_type.into(),
      details: None,
      achievements: None,
      issues: None,
      next_actions: None,
      mood_level: None,
      health_status: None,
      attachments: Vec::new(),
      notes: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require("service_type", &self.service_type)?;
    if self.end_time <= self.start_time {
      return Err(Error::Invalid(format!(
        "end_time {} must be after start_time {}",
        self.end_time.format("%H:%M"),
        self.start_time.format("%H:%M"),
      )));
    }
    if let Some(mood) = self.mood_level {
      check_range("mood_level", mood.into(), MOOD_MIN.into(), MOOD_MAX.into())?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input() -> NewServiceLog {
    NewServiceLog::new(
      1,
      2,
      NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
      NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
      "home visit",
    )
  }

  #[test]
  fn mood_level_outside_one_to_five_is_rejected() {
    let mut log = input();
    log.mood_level = Some(6);
    assert!(matches!(
      log.validate(),
      Err(Error::OutOfRange { min: 1, max: 5, value: 6, .. })
    ));
    log.mood_level = Some(0);
    assert!(log.validate().is_err());
    log.mood_level = Some(5);
    assert!(log.validate().is_ok());
  }

  #[test]
  fn end_time_must_follow_start_time() {
    let mut log = input();
    log.end_time = log.start_time;
    assert!(matches!(log.validate(), Err(Error::Invalid(_))));
  }
}

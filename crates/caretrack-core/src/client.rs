//! Clients: the people receiving support.
//!
//! Clients are never hard-deleted in normal operation; leaving the programme
//! is expressed through [`ClientStatus`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Id, Result, error::require, text_enum::text_enum};

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  Other,
}

text_enum!(Gender, "gender", {
  Male => "male",
  Female => "female",
  Other => "other",
});

/// Programme enrolment status.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
  #[default]
  Active,
  Inactive,
  Suspended,
}

text_enum!(ClientStatus, "client status", {
  Active => "active",
  Inactive => "inactive",
  Suspended => "suspended",
});

// ─── Client ──────────────────────────────────────────────────────────────────

/// A persisted client record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
  pub id:               Id,
  /// Provider-assigned number; unique across all clients.
  pub client_number:    String,
  pub name:             String,
  /// Phonetic reading of the name.
  pub name_kana:        Option<String>,
  pub date_of_birth:    Option<NaiveDate>,
  pub gender:           Option<Gender>,
  pub phone:            Option<String>,
  pub email:            Option<String>,
  pub address:          Option<String>,
  pub disability_type:  Option<String>,
  pub disability_grade: Option<String>,
  pub insurance_number: Option<String>,
  pub status:           ClientStatus,
  pub notes:            Option<String>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

impl Client {
  /// Age in whole years on `today`, if the date of birth is known.
  pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
    self.date_of_birth.and_then(|dob| today.years_since(dob))
  }
}

// ─── NewClient ───────────────────────────────────────────────────────────────

/// Input for creating or fully updating a client. Timestamps and the row id
/// are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
  pub client_number:    String,
  pub name:             String,
  #[serde(default)]
  pub name_kana:        Option<String>,
  #[serde(default)]
  pub date_of_birth:    Option<NaiveDate>,
  #[serde(default)]
  pub gender:           Option<Gender>,
  #[serde(default)]
  pub phone:            Option<String>,
  #[serde(default)]
  pub email:            Option<String>,
  #[serde(default)]
  pub address:          Option<String>,
  #[serde(default)]
  pub disability_type:  Option<String>,
  #[serde(default)]
  pub disability_grade: Option<String>,
  #[serde(default)]
  pub insurance_number: Option<String>,
  #[serde(default)]
  pub status:           ClientStatus,
  #[serde(default)]
  pub notes:            Option<String>,
}

impl NewClient {
  /// Convenience constructor with all optional fields empty.
  pub fn new(client_number: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      client_number: client_number.into(),
      name: name.into(),
      name_kana: None,
      date_of_birth: None,
      gender: None,
      phone: None,
      email: None,
      address: None,
      disability_type: None,
      disability_grade: None,
      insurance_number: None,
      status: ClientStatus::default(),
      notes: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require("client_number", &self.client_number)?;
    require("name", &self.name)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_text_matches_schema() {
    let texts: Vec<_> = ClientStatus::ALL.iter().map(|s| s.as_str()).collect();
    assert_eq!(texts, ["active", "inactive", "suspended"]);
    assert_eq!("suspended".parse::<ClientStatus>().unwrap(), ClientStatus::Suspended);
    assert!("deleted".parse::<ClientStatus>().is_err());
  }

  #[test]
  fn blank_client_number_is_rejected() {
    let input = NewClient::new("  ", "Taro");
    assert!(matches!(input.validate(), Err(crate::Error::Invalid(_))));
  }

  #[test]
  fn age_counts_whole_years() {
    let mut input = NewClient::new("CL001", "Taro");
    input.date_of_birth = NaiveDate::from_ymd_opt(1990, 6, 15);
    let client = Client {
      id: 1,
      client_number: input.client_number,
      name: input.name,
      name_kana: None,
      date_of_birth: input.date_of_birth,
      gender: None,
      phone: None,
      email: None,
      address: None,
      disability_type: None,
      disability_grade: None,
      insurance_number: None,
      status: ClientStatus::Active,
      notes: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };
    let day_before = NaiveDate::from_ymd_opt(2020, 6, 14).unwrap();
    let birthday = NaiveDate::from_ymd_opt(2020, 6, 15).unwrap();
    assert_eq!(client.age_on(day_before), Some(29));
    assert_eq!(client.age_on(birthday), Some(30));
  }
}

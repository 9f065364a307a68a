//! Emergency contacts, maintained as a set per client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Id, Result, error::require};

/// A persisted emergency contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
  pub id:           Id,
  pub client_id:    Id,
  pub name:         String,
  /// e.g. "mother", "guardian".
  pub relationship: String,
  pub phone:        String,
  pub email:        Option<String>,
  pub address:      Option<String>,
  pub is_primary:   bool,
  pub notes:        Option<String>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// One entry of the contact set written by
/// [`crate::store::CaseStore::replace_emergency_contacts`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmergencyContact {
  pub name:         String,
  pub relationship: String,
  pub phone:        String,
  #[serde(default)]
  pub email:        Option<String>,
  #[serde(default)]
  pub address:      Option<String>,
  #[serde(default)]
  pub is_primary:   bool,
  #[serde(default)]
  pub notes:        Option<String>,
}

impl NewEmergencyContact {
  pub fn new(
    name: impl Into<String>,
    relationship: impl Into<String>,
    phone: impl Into<String>,
  ) -> Self {
    Self {
      name: name.into(),
      relationship: relationship.into(),
      phone: phone.into(),
      email: None,
      address: None,
      is_primary: false,
      notes: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    require("name", &self.name)?;
    require("relationship", &self.relationship)?;
    require("phone", &self.phone)
  }
}

/// Validate a full contact set: every entry is well-formed and at most one is
/// marked primary.
pub fn validate_contact_set(contacts: &[NewEmergencyContact]) -> Result<()> {
  for contact in contacts {
    contact.validate()?;
  }
  let primaries = contacts.iter().filter(|c| c.is_primary).count();
  if primaries > 1 {
    return Err(Error::Invalid(format!(
      "at most one primary emergency contact is allowed, got {primaries}"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn two_primaries_are_rejected() {
    let mut a = NewEmergencyContact::new("Hanako", "mother", "090-0000-0000");
    let mut b = NewEmergencyContact::new("Jiro", "brother", "090-1111-1111");
    a.is_primary = true;
    b.is_primary = true;
    assert!(validate_contact_set(&[a.clone(), b.clone()]).is_err());
    b.is_primary = false;
    assert!(validate_contact_set(&[a, b]).is_ok());
    assert!(validate_contact_set(&[]).is_ok());
  }
}

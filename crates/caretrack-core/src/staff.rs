//! Staff accounts. Staff are deactivated rather than deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Id, Result, error::require, text_enum::text_enum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
  Admin,
  Staff,
  Viewer,
}

text_enum!(StaffRole, "staff role", {
  Admin => "admin",
  Staff => "staff",
  Viewer => "viewer",
});

impl StaffRole {
  /// Whether the role may create or edit case records.
  pub fn can_write_records(self) -> bool { !matches!(self, Self::Viewer) }

  /// Whether the role may manage staff accounts and run maintenance.
  pub fn is_admin(self) -> bool { matches!(self, Self::Admin) }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StaffStatus {
  #[default]
  Active,
  Inactive,
}

text_enum!(StaffStatus, "staff status", {
  Active => "active",
  Inactive => "inactive",
});

/// A persisted staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
  pub id:            Id,
  /// Unique across all staff.
  pub staff_number:  String,
  pub name:          String,
  pub name_kana:     Option<String>,
  /// Unique across all staff; used as the login name.
  pub email:         String,
  pub phone:         Option<String>,
  pub role:          StaffRole,
  /// Stored as a JSON array.
  pub specialties:   Vec<String>,
  pub status:        StaffStatus,
  /// argon2 PHC string. Never serialised outwards.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub last_login_at: Option<DateTime<Utc>>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Staff {
  pub fn is_active(&self) -> bool { self.status == StaffStatus::Active }
}

/// Input for creating a staff member. The caller hashes the password.
#[derive(Debug, Clone)]
pub struct NewStaff {
  pub staff_number:  String,
  pub name:          String,
  pub name_kana:     Option<String>,
  pub email:         String,
  pub phone:         Option<String>,
  pub role:          StaffRole,
  pub specialties:   Vec<String>,
  pub password_hash: String,
}

impl NewStaff {
  pub fn new(
    staff_number: impl Into<String>,
    name: impl Into<String>,
    email: impl Into<String>,
    role: StaffRole,
    password_hash: impl Into<String>,
  ) -> Self {
    Self {
      staff_number: staff_number.into(),
      name: name.into(),
      name_kana: None,
      email: email.into(),
      phone: None,
      role,
      specialties: Vec::new(),
      password_hash: password_hash.into(),
    }
  }

  pub fn validate(&self) -> Result<()> {
    require("staff_number", &self.staff_number)?;
    require("name", &self.name)?;
    validate_email(&self.email)?;
    require("password_hash", &self.password_hash)?;
    Ok(())
  }
}

/// Editable profile fields. Password and status have dedicated operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUpdate {
  pub name:        String,
  #[serde(default)]
  pub name_kana:   Option<String>,
  pub email:       String,
  #[serde(default)]
  pub phone:       Option<String>,
  pub role:        StaffRole,
  #[serde(default)]
  pub specialties: Vec<String>,
}

impl StaffUpdate {
  pub fn validate(&self) -> Result<()> {
    require("name", &self.name)?;
    validate_email(&self.email)
  }
}

fn validate_email(email: &str) -> Result<()> {
  require("email", email)?;
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
    _ => Err(Error::Invalid(format!("email {email:?} is not an address"))),
  }
}

//! `emergency_contacts` table access.
//!
//! Contacts are managed as a whole set per client: a replace deletes the old
//! rows and inserts the new ones, and the caller runs it in a transaction.

use caretrack_core::{
  Id,
  contact::{EmergencyContact, NewEmergencyContact, validate_contact_set},
};
use chrono::Utc;
use rusqlite::{Connection, params};

use super::clients;
use crate::{
  Error, Result,
  encode::{decode_stamp, encode_dt},
};

const COLUMNS: &str = "id, client_id, name, relationship, phone, email,
  address, is_primary, notes, created_at, updated_at";

struct RawContact {
  id:           Id,
  client_id:    Id,
  name:         String,
  relationship: String,
  phone:        String,
  email:        Option<String>,
  address:      Option<String>,
  is_primary:   Option<bool>,
  notes:        Option<String>,
  created_at:   Option<String>,
  updated_at:   Option<String>,
}

impl RawContact {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get("id")?,
      client_id:    row.get("client_id")?,
      name:         row.get("name")?,
      relationship: row.get("relationship")?,
      phone:        row.get("phone")?,
      email:        row.get("email")?,
      address:      row.get("address")?,
      is_primary:   row.get("is_primary")?,
      notes:        row.get("notes")?,
      created_at:   row.get("created_at")?,
      updated_at:   row.get("updated_at")?,
    })
  }

  fn into_contact(self) -> Result<EmergencyContact> {
    Ok(EmergencyContact {
      id:           self.id,
      client_id:    self.client_id,
      name:         self.name,
      relationship: self.relationship,
      phone:        self.phone,
      email:        self.email,
      address:      self.address,
      is_primary:   self.is_primary.unwrap_or(false),
      notes:        self.notes,
      created_at:   decode_stamp("emergency_contacts", self.id, "created_at", self.created_at)?,
      updated_at:   decode_stamp("emergency_contacts", self.id, "updated_at", self.updated_at)?,
    })
  }
}

/// Primary contact first, then in insertion order.
pub(crate) fn list(conn: &Connection, client_id: Id) -> Result<Vec<EmergencyContact>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {COLUMNS} FROM emergency_contacts
     WHERE client_id = ?1
     ORDER BY is_primary DESC, id"
  ))?;
  let raws = stmt
    .query_map(params![client_id], RawContact::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawContact::into_contact).collect()
}

pub(crate) fn replace(
  conn: &Connection,
  client_id: Id,
  contacts: &[NewEmergencyContact],
) -> Result<Vec<EmergencyContact>> {
  validate_contact_set(contacts)?;
  if !clients::exists(conn, client_id)? {
    return Err(Error::NotFound { entity: "client", id: client_id });
  }

  let removed = conn.execute(
    "DELETE FROM emergency_contacts WHERE client_id = ?1",
    params![client_id],
  )?;

  let now = encode_dt(Utc::now());
  let mut stmt = conn.prepare(
    "INSERT INTO emergency_contacts (
       client_id, name, relationship, phone, email, address, is_primary,
       notes, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
  )?;
  for contact in contacts {
    stmt.execute(params![
      client_id,
      contact.name,
      contact.relationship,
      contact.phone,
      contact.email,
      contact.address,
      contact.is_primary,
      contact.notes,
      now,
    ])?;
  }

  tracing::debug!(client = client_id, removed, added = contacts.len(), "emergency contacts replaced");
  list(conn, client_id)
}

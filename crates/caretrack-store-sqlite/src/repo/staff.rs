//! `staff` table access.

use caretrack_core::{
  Id,
  staff::{NewStaff, Staff, StaffStatus, StaffUpdate},
  store::StaffQuery,
};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params, params_from_iter};

use super::Filter;
use crate::{
  Error, Result,
  encode::{
    decode_enum, decode_enum_or_default, decode_json_or_default, decode_opt_dt,
    decode_stamp, encode_dt, encode_json_list, text,
  },
};

const COLUMNS: &str = "id, staff_number, name, name_kana, email, phone, role,
  specialties, status, password_hash, last_login_at, created_at, updated_at";

struct RawStaff {
  id:            Id,
  staff_number:  String,
  name:          String,
  name_kana:     Option<String>,
  email:         String,
  phone:         Option<String>,
  role:          String,
  specialties:   Option<String>,
  status:        Option<String>,
  password_hash: String,
  last_login_at: Option<String>,
  created_at:    Option<String>,
  updated_at:    Option<String>,
}

impl RawStaff {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get("id")?,
      staff_number:  row.get("staff_number")?,
      name:          row.get("name")?,
      name_kana:     row.get("name_kana")?,
      email:         row.get("email")?,
      phone:         row.get("phone")?,
      role:          row.get("role")?,
      specialties:   row.get("specialties")?,
      status:        row.get("status")?,
      password_hash: row.get("password_hash")?,
      last_login_at: row.get("last_login_at")?,
      created_at:    row.get("created_at")?,
      updated_at:    row.get("updated_at")?,
    })
  }

  fn into_staff(self) -> Result<Staff> {
    Ok(Staff {
      id:            self.id,
      staff_number:  self.staff_number,
      name:          self.name,
      name_kana:     self.name_kana,
      email:         self.email,
      phone:         self.phone,
      role:          decode_enum(&self.role)?,
      specialties:   decode_json_or_default(self.specialties)?,
      status:        decode_enum_or_default(self.status)?,
      password_hash: self.password_hash,
      last_login_at: decode_opt_dt(self.last_login_at)?,
      created_at:    decode_stamp("staff", self.id, "created_at", self.created_at)?,
      updated_at:    decode_stamp("staff", self.id, "updated_at", self.updated_at)?,
    })
  }
}

fn not_found(id: Id) -> Error { Error::NotFound { entity: "staff member", id } }

fn fetch_one(conn: &Connection, condition: &str, value: &dyn rusqlite::ToSql) -> Result<Option<Staff>> {
  let raw = conn
    .query_row(
      &format!("SELECT {COLUMNS} FROM staff WHERE {condition}"),
      [value],
      RawStaff::from_row,
    )
    .optional()?;
  raw.map(RawStaff::into_staff).transpose()
}

/// Run an UPDATE addressed at one staff id and return the refreshed row.
fn update_one(
  conn: &Connection,
  id: Id,
  sql: &str,
  params: &[&dyn rusqlite::ToSql],
) -> Result<Staff> {
  if conn.execute(sql, params)? == 0 {
    return Err(not_found(id));
  }
  get(conn, id)?.ok_or_else(|| not_found(id))
}

pub(crate) fn insert(conn: &Connection, input: &NewStaff) -> Result<Staff> {
  input.validate()?;
  let now = encode_dt(Utc::now());

  conn.execute(
    "INSERT INTO staff (
       staff_number, name, name_kana, email, phone, role, specialties,
       status, password_hash, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    params![
      input.staff_number,
      input.name,
      input.name_kana,
      input.email,
      input.phone,
      input.role.as_str(),
      encode_json_list(&input.specialties)?,
      StaffStatus::Active.as_str(),
      input.password_hash,
      now,
    ],
  )?;

  let id = conn.last_insert_rowid();
  tracing::info!(staff = id, role = %input.role, "staff member added");
  get(conn, id)?.ok_or_else(|| not_found(id))
}

pub(crate) fn get(conn: &Connection, id: Id) -> Result<Option<Staff>> {
  fetch_one(conn, "id = ?1", &id)
}

/// Email lookup is exact; addresses are stored as entered.
pub(crate) fn find_by_email(conn: &Connection, email: &str) -> Result<Option<Staff>> {
  fetch_one(conn, "email = ?1", &email)
}

pub(crate) fn list(conn: &Connection, query: &StaffQuery) -> Result<Vec<Staff>> {
  let mut filter = Filter::default();
  if let Some(role) = query.role {
    filter.and("role = ?", [text(role.as_str())]);
  }
  if let Some(status) = query.status {
    filter.and("status = ?", [text(status.as_str())]);
  }

  let sql = format!(
    "SELECT {COLUMNS} FROM staff {} ORDER BY staff_number",
    filter.where_clause()
  );
  let params = filter.into_params();

  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(params.iter()), RawStaff::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawStaff::into_staff).collect()
}

pub(crate) fn update(conn: &Connection, id: Id, input: &StaffUpdate) -> Result<Staff> {
  input.validate()?;
  update_one(
    conn,
    id,
    "UPDATE staff SET
       name = ?2, name_kana = ?3, email = ?4, phone = ?5, role = ?6,
       specialties = ?7, updated_at = ?8
     WHERE id = ?1",
    params![
      id,
      input.name,
      input.name_kana,
      input.email,
      input.phone,
      input.role.as_str(),
      encode_json_list(&input.specialties)?,
      encode_dt(Utc::now()),
    ],
  )
}

pub(crate) fn set_status(conn: &Connection, id: Id, status: StaffStatus) -> Result<Staff> {
  update_one(
    conn,
    id,
    "UPDATE staff SET status = ?2, updated_at = ?3 WHERE id = ?1",
    params![id, status.as_str(), encode_dt(Utc::now())],
  )
}

pub(crate) fn set_password(conn: &Connection, id: Id, password_hash: &str) -> Result<()> {
  if password_hash.trim().is_empty() {
    return Err(caretrack_core::Error::Invalid("password_hash is required".into()).into());
  }
  update_one(
    conn,
    id,
    "UPDATE staff SET password_hash = ?2, updated_at = ?3 WHERE id = ?1",
    params![id, password_hash, encode_dt(Utc::now())],
  )?;
  tracing::info!(staff = id, "password changed");
  Ok(())
}

pub(crate) fn record_login(conn: &Connection, id: Id) -> Result<Staff> {
  update_one(
    conn,
    id,
    "UPDATE staff SET last_login_at = ?2 WHERE id = ?1",
    params![id, encode_dt(Utc::now())],
  )
}

//! `clients` table access.

use caretrack_core::{
  Id,
  client::{Client, ClientStatus, NewClient},
  store::ClientQuery,
};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params, params_from_iter};

use super::{Filter, clamp_i64, contains_pattern};
use crate::{
  Error, Result,
  encode::{
    decode_enum_or_default, decode_opt_date, decode_opt_enum, decode_stamp,
    encode_date, encode_dt, integer, text,
  },
};

const COLUMNS: &str = "id, client_number, name, name_kana, date_of_birth, gender,
  phone, email, address, disability_type, disability_grade, insurance_number,
  status, notes, created_at, updated_at";

/// Raw strings read directly from a `clients` row.
struct RawClient {
  id:               Id,
  client_number:    String,
  name:             String,
  name_kana:        Option<String>,
  date_of_birth:    Option<String>,
  gender:           Option<String>,
  phone:            Option<String>,
  email:            Option<String>,
  address:          Option<String>,
  disability_type:  Option<String>,
  disability_grade: Option<String>,
  insurance_number: Option<String>,
  status:           Option<String>,
  notes:            Option<String>,
  created_at:       Option<String>,
  updated_at:       Option<String>,
}

impl RawClient {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get("id")?,
      client_number:    row.get("client_number")?,
      name:             row.get("name")?,
      name_kana:        row.get("name_kana")?,
      date_of_birth:    row.get("date_of_birth")?,
      gender:           row.get("gender")?,
      phone:            row.get("phone")?,
      email:            row.get("email")?,
      address:          row.get("address")?,
      disability_type:  row.get("disability_type")?,
      disability_grade: row.get("disability_grade")?,
      insurance_number: row.get("insurance_number")?,
      status:           row.get("status")?,
      notes:            row.get("notes")?,
      created_at:       row.get("created_at")?,
      updated_at:       row.get("updated_at")?,
    })
  }

  fn into_client(self) -> Result<Client> {
    Ok(Client {
      id:               self.id,
      client_number:    self.client_number,
      name:             self.name,
      name_kana:        self.name_kana,
      date_of_birth:    decode_opt_date(self.date_of_birth)?,
      gender:           decode_opt_enum(self.gender)?,
      phone:            self.phone,
      email:            self.email,
      address:          self.address,
      disability_type:  self.disability_type,
      disability_grade: self.disability_grade,
      insurance_number: self.insurance_number,
      status:           decode_enum_or_default(self.status)?,
      notes:            self.notes,
      created_at:       decode_stamp("clients", self.id, "created_at", self.created_at)?,
      updated_at:       decode_stamp("clients", self.id, "updated_at", self.updated_at)?,
    })
  }
}

fn not_found(id: Id) -> Error { Error::NotFound { entity: "client", id } }

pub(crate) fn insert(conn: &Connection, input: &NewClient) -> Result<Client> {
  input.validate()?;
  let now = encode_dt(Utc::now());

  conn.execute(
    "INSERT INTO clients (
       client_number, name, name_kana, date_of_birth, gender, phone, email,
       address, disability_type, disability_grade, insurance_number, status,
       notes, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
    params![
      input.client_number,
      input.name,
      input.name_kana,
      input.date_of_birth.map(encode_date),
      input.gender.map(|g| g.as_str()),
      input.phone,
      input.email,
      input.address,
      input.disability_type,
      input.disability_grade,
      input.insurance_number,
      input.status.as_str(),
      input.notes,
      now,
    ],
  )?;

  let id = conn.last_insert_rowid();
  get(conn, id)?.ok_or_else(|| not_found(id))
}

pub(crate) fn get(conn: &Connection, id: Id) -> Result<Option<Client>> {
  let raw = conn
    .query_row(
      &format!("SELECT {COLUMNS} FROM clients WHERE id = ?1"),
      params![id],
      RawClient::from_row,
    )
    .optional()?;
  raw.map(RawClient::into_client).transpose()
}

pub(crate) fn find_by_number(
  conn: &Connection,
  client_number: &str,
) -> Result<Option<Client>> {
  let raw = conn
    .query_row(
      &format!("SELECT {COLUMNS} FROM clients WHERE client_number = ?1"),
      params![client_number],
      RawClient::from_row,
    )
    .optional()?;
  raw.map(RawClient::into_client).transpose()
}

pub(crate) fn list(conn: &Connection, query: &ClientQuery) -> Result<Vec<Client>> {
  let mut filter = Filter::default();
  if let Some(status) = query.status {
    filter.and("status = ?", [text(status.as_str())]);
  }
  if let Some(t) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
    let pattern = contains_pattern(t);
    filter.and(
      "(name LIKE ? ESCAPE '\\' OR name_kana LIKE ? ESCAPE '\\'
        OR client_number LIKE ? ESCAPE '\\')",
      [text(&pattern), text(&pattern), text(pattern)],
    );
  }

  let limit = query.limit.map_or(-1, clamp_i64);
  let offset = query.offset.map_or(0, clamp_i64);
  let sql = format!(
    "SELECT {COLUMNS} FROM clients {} ORDER BY client_number LIMIT ? OFFSET ?",
    filter.where_clause()
  );
  let mut params = filter.into_params();
  params.extend([integer(limit), integer(offset)]);

  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(params.iter()), RawClient::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawClient::into_client).collect()
}

pub(crate) fn update(conn: &Connection, id: Id, input: &NewClient) -> Result<Client> {
  input.validate()?;
  let changed = conn.execute(
    "UPDATE clients SET
       client_number = ?2, name = ?3, name_kana = ?4, date_of_birth = ?5,
       gender = ?6, phone = ?7, email = ?8, address = ?9,
       disability_type = ?10, disability_grade = ?11, insurance_number = ?12,
       status = ?13, notes = ?14, updated_at = ?15
     WHERE id = ?1",
    params![
      id,
      input.client_number,
      input.name,
      input.name_kana,
      input.date_of_birth.map(encode_date),
      input.gender.map(|g| g.as_str()),
      input.phone,
      input.email,
      input.address,
      input.disability_type,
      input.disability_grade,
      input.insurance_number,
      input.status.as_str(),
      input.notes,
      encode_dt(Utc::now()),
    ],
  )?;
  if changed == 0 {
    return Err(not_found(id));
  }
  get(conn, id)?.ok_or_else(|| not_found(id))
}

pub(crate) fn set_status(conn: &Connection, id: Id, status: ClientStatus) -> Result<Client> {
  let changed = conn.execute(
    "UPDATE clients SET status = ?2, updated_at = ?3 WHERE id = ?1",
    params![id, status.as_str(), encode_dt(Utc::now())],
  )?;
  if changed == 0 {
    return Err(not_found(id));
  }
  get(conn, id)?.ok_or_else(|| not_found(id))
}

/// Whether a client row exists.
pub(crate) fn exists(conn: &Connection, id: Id) -> Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM clients WHERE id = ?1", params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

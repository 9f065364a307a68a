//! `service_logs` table access.

use caretrack_core::{
  Id,
  lifecycle::{
    check_service_log_editable, check_service_log_transition, check_signatory,
  },
  service_log::{NewServiceLog, ServiceLog, ServiceLogStatus},
  store::ServiceLogQuery,
};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params, params_from_iter};

use super::{Filter, staff};
use crate::{
  Error, Result,
  encode::{
    decode_date, decode_enum_or_default, decode_json_or_default, decode_opt_dt,
    decode_opt_enum, decode_opt_u8, decode_stamp, decode_time, encode_date,
    encode_dt, encode_json_list, encode_time, integer, text,
  },
};

const COLUMNS: &str = "id, client_id, support_plan_id, staff_id, service_date,
  start_time, end_time, service_type, details, achievements, issues,
  next_actions, mood_level, health_status, attachments, notes, status,
  approved_by, approved_at, created_at, updated_at";

struct RawServiceLog {
  id:              Id,
  client_id:       Id,
  support_plan_id: Option<Id>,
  staff_id:        Id,
  service_date:    String,
  start_time:      String,
  end_time:        String,
  service_type:    String,
  details:         Option<String>,
  achievements:    Option<String>,
  issues:          Option<String>,
  next_actions:    Option<String>,
  mood_level:      Option<i64>,
  health_status:   Option<String>,
  attachments:     Option<String>,
  notes:           Option<String>,
  status:          Option<String>,
  approved_by:     Option<Id>,
  approved_at:     Option<String>,
  created_at:      Option<String>,
  updated_at:      Option<String>,
}

impl RawServiceLog {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get("id")?,
      client_id:       row.get("client_id")?,
      support_plan_id: row.get("support_plan_id")?,
      staff_id:        row.get("staff_id")?,
      service_date:    row.get("service_date")?,
      start_time:      row.get("start_time")?,
      end_time:        row.get("end_time")?,
      service_type:    row.get("service_type")?,
      details:         row.get("details")?,
      achievements:    row.get("achievements")?,
      issues:          row.get("issues")?,
      next_actions:    row.get("next_actions")?,
      mood_level:      row.get("mood_level")?,
      health_status:   row.get("health_status")?,
      attachments:     row.get("attachments")?,
      notes:           row.get("notes")?,
      status:          row.get("status")?,
      approved_by:     row.get("approved_by")?,
      approved_at:     row.get("approved_at")?,
      created_at:      row.get("created_at")?,
      updated_at:      row.get("updated_at")?,
    })
  }

  fn into_service_log(self) -> Result<ServiceLog> {
    Ok(ServiceLog {
      id:              self.id,
      client_id:       self.client_id,
      support_plan_id: self.support_plan_id,
      staff_id:        self.staff_id,
      service_date:    decode_date(&self.service_date)?,
      start_time:      decode_time(&self.start_time)?,
      end_time:        decode_time(&self.end_time)?,
      service_type:    self.service_type,
      details:         self.details,
      achievements:    self.achievements,
      issues:          self.issues,
      next_actions:    self.next_actions,
      mood_level:      decode_opt_u8("mood_level", self.mood_level)?,
      health_status:   decode_opt_enum(self.health_status)?,
      attachments:     decode_json_or_default(self.attachments)?,
      notes:           self.notes,
      status:          decode_enum_or_default(self.status)?,
      approved_by:     self.approved_by,
      approved_at:     decode_opt_dt(self.approved_at)?,
      created_at:      decode_stamp("service_logs", self.id, "created_at", self.created_at)?,
      updated_at:      decode_stamp("service_logs", self.id, "updated_at", self.updated_at)?,
    })
  }
}

fn not_found(id: Id) -> Error { Error::NotFound { entity: "service log", id } }

fn require(conn: &Connection, id: Id) -> Result<ServiceLog> {
  get(conn, id)?.ok_or_else(|| not_found(id))
}

pub(crate) fn insert(conn: &Connection, input: &NewServiceLog) -> Result<ServiceLog> {
  input.validate()?;
  let now = encode_dt(Utc::now());

  conn.execute(
    "INSERT INTO service_logs (
       client_id, support_plan_id, staff_id, service_date, start_time,
       end_time, service_type, details, achievements, issues, next_actions,
       mood_level, health_status, attachments, notes, status,
       created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
               ?15, ?16, ?17, ?17)",
    params![
      input.client_id,
      input.support_plan_id,
      input.staff_id,
      encode_date(input.service_date),
      encode_time(input.start_time),
      encode_time(input.end_time),
      input.service_type,
      input.details,
      input.achievements,
      input.issues,
      input.next_actions,
      input.mood_level,
      input.health_status.map(|h| h.as_str()),
      encode_json_list(&input.attachments)?,
      input.notes,
      ServiceLogStatus::Draft.as_str(),
      now,
    ],
  )?;

  let id = conn.last_insert_rowid();
  require(conn, id)
}

pub(crate) fn get(conn: &Connection, id: Id) -> Result<Option<ServiceLog>> {
  let raw = conn
    .query_row(
      &format!("SELECT {COLUMNS} FROM service_logs WHERE id = ?1"),
      params![id],
      RawServiceLog::from_row,
    )
    .optional()?;
  raw.map(RawServiceLog::into_service_log).transpose()
}

/// Date bounds are inclusive.
pub(crate) fn list(conn: &Connection, query: &ServiceLogQuery) -> Result<Vec<ServiceLog>> {
  let mut filter = Filter::default();
  if let Some(client_id) = query.client_id {
    filter.and("client_id = ?", [integer(client_id)]);
  }
  if let Some(staff_id) = query.staff_id {
    filter.and("staff_id = ?", [integer(staff_id)]);
  }
  if let Some(plan_id) = query.support_plan_id {
    filter.and("support_plan_id = ?", [integer(plan_id)]);
  }
  if let Some(status) = query.status {
    filter.and("status = ?", [text(status.as_str())]);
  }
  if let Some(from) = query.from {
    filter.and("service_date >= ?", [text(encode_date(from))]);
  }
  if let Some(to) = query.to {
    filter.and("service_date <= ?", [text(encode_date(to))]);
  }

  let sql = format!(
    "SELECT {COLUMNS} FROM service_logs {} ORDER BY service_date, start_time, id",
    filter.where_clause()
  );
  let params = filter.into_params();

  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(params.iter()), RawServiceLog::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawServiceLog::into_service_log).collect()
}

/// Replace the editable fields; status and approval stamps are untouched.
pub(crate) fn update(
  conn: &Connection,
  id: Id,
  input: &NewServiceLog,
) -> Result<ServiceLog> {
  input.validate()?;
  let current = require(conn, id)?;
  check_service_log_editable(id, current.status)?;

  conn.execute(
    "UPDATE service_logs SET
       client_id = ?2, support_plan_id = ?3, staff_id = ?4, service_date = ?5,
       start_time = ?6, end_time = ?7, service_type = ?8, details = ?9,
       achievements = ?10, issues = ?11, next_actions = ?12, mood_level = ?13,
       health_status = ?14, attachments = ?15, notes = ?16, updated_at = ?17
     WHERE id = ?1",
    params![
      id,
      input.client_id,
      input.support_plan_id,
      input.staff_id,
      encode_date(input.service_date),
      encode_time(input.start_time),
      encode_time(input.end_time),
      input.service_type,
      input.details,
      input.achievements,
      input.issues,
      input.next_actions,
      input.mood_level,
      input.health_status.map(|h| h.as_str()),
      encode_json_list(&input.attachments)?,
      input.notes,
      encode_dt(Utc::now()),
    ],
  )?;
  require(conn, id)
}

pub(crate) fn confirm(conn: &Connection, id: Id) -> Result<ServiceLog> {
  let current = require(conn, id)?;
  check_service_log_transition(id, current.status, ServiceLogStatus::Confirmed)?;

  conn.execute(
    "UPDATE service_logs SET status = ?2, updated_at = ?3 WHERE id = ?1",
    params![id, ServiceLogStatus::Confirmed.as_str(), encode_dt(Utc::now())],
  )?;
  require(conn, id)
}

pub(crate) fn approve(conn: &Connection, id: Id, approved_by: Id) -> Result<ServiceLog> {
  let current = require(conn, id)?;
  check_service_log_transition(id, current.status, ServiceLogStatus::Approved)?;
  let signatory = staff::get(conn, approved_by)?
    .ok_or(Error::NotFound { entity: "staff member", id: approved_by })?;
  check_signatory(&signatory, "approve service logs")?;

  let now = encode_dt(Utc::now());
  conn.execute(
    "UPDATE service_logs
       SET status = ?2, approved_by = ?3, approved_at = ?4, updated_at = ?4
     WHERE id = ?1",
    params![id, ServiceLogStatus::Approved.as_str(), approved_by, now],
  )?;
  tracing::info!(service_log = id, approved_by, "service log approved");
  require(conn, id)
}

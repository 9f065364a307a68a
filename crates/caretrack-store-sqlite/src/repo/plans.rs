//! `support_plans` table access.

use caretrack_core::{
  Id,
  lifecycle::check_plan_transition,
  plan::{NewSupportPlan, PlanStatus, SupportPlan},
  store::PlanQuery,
};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params, params_from_iter};

use super::Filter;
use crate::{
  Error, Result,
  encode::{
    decode_date, decode_enum_or_default, decode_json_or_default, decode_stamp,
    encode_date, encode_dt, encode_json_list, integer, text,
  },
};

const COLUMNS: &str = "id, client_id, plan_name, goals, start_date, end_date,
  status, priority, assigned_staff_ids, notes, created_at, updated_at";

struct RawPlan {
  id:                 Id,
  client_id:          Id,
  plan_name:          String,
  goals:              Option<String>,
  start_date:         String,
  end_date:           String,
  status:             Option<String>,
  priority:           Option<String>,
  assigned_staff_ids: Option<String>,
  notes:              Option<String>,
  created_at:         Option<String>,
  updated_at:         Option<String>,
}

impl RawPlan {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get("id")?,
      client_id:          row.get("client_id")?,
      plan_name:          row.get("plan_name")?,
      goals:              row.get("goals")?,
      start_date:         row.get("start_date")?,
      end_date:           row.get("end_date")?,
      status:             row.get("status")?,
      priority:           row.get("priority")?,
      assigned_staff_ids: row.get("assigned_staff_ids")?,
      notes:              row.get("notes")?,
      created_at:         row.get("created_at")?,
      updated_at:         row.get("updated_at")?,
    })
  }

  fn into_plan(self) -> Result<SupportPlan> {
    Ok(SupportPlan {
      id:                 self.id,
      client_id:          self.client_id,
      plan_name:          self.plan_name,
      goals:              self.goals,
      start_date:         decode_date(&self.start_date)?,
      end_date:           decode_date(&self.end_date)?,
      status:             decode_enum_or_default(self.status)?,
      priority:           decode_enum_or_default(self.priority)?,
      assigned_staff_ids: decode_json_or_default(self.assigned_staff_ids)?,
      notes:              self.notes,
      created_at:         decode_stamp("support_plans", self.id, "created_at", self.created_at)?,
      updated_at:         decode_stamp("support_plans", self.id, "updated_at", self.updated_at)?,
    })
  }
}

fn not_found(id: Id) -> Error { Error::NotFound { entity: "support plan", id } }

pub(crate) fn insert(conn: &Connection, input: &NewSupportPlan) -> Result<SupportPlan> {
  input.validate()?;
  let now = encode_dt(Utc::now());

  conn.execute(
    "INSERT INTO support_plans (
       client_id, plan_name, goals, start_date, end_date, status, priority,
       assigned_staff_ids, notes, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    params![
      input.client_id,
      input.plan_name,
      input.goals,
      encode_date(input.start_date),
      encode_date(input.end_date),
      input.status.as_str(),
      input.priority.as_str(),
      encode_json_list(&input.assigned_staff_ids)?,
      input.notes,
      now,
    ],
  )?;

  let id = conn.last_insert_rowid();
  get(conn, id)?.ok_or_else(|| not_found(id))
}

pub(crate) fn get(conn: &Connection, id: Id) -> Result<Option<SupportPlan>> {
  let raw = conn
    .query_row(
      &format!("SELECT {COLUMNS} FROM support_plans WHERE id = ?1"),
      params![id],
      RawPlan::from_row,
    )
    .optional()?;
  raw.map(RawPlan::into_plan).transpose()
}

pub(crate) fn list(conn: &Connection, query: &PlanQuery) -> Result<Vec<SupportPlan>> {
  let mut filter = Filter::default();
  if let Some(client_id) = query.client_id {
    filter.and("client_id = ?", [integer(client_id)]);
  }
  if let Some(status) = query.status {
    filter.and("status = ?", [text(status.as_str())]);
  }

  let sql = format!(
    "SELECT {COLUMNS} FROM support_plans {} ORDER BY start_date DESC, id DESC",
    filter.where_clause()
  );
  let params = filter.into_params();

  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(params.iter()), RawPlan::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawPlan::into_plan).collect()
}

pub(crate) fn update(
  conn: &Connection,
  id: Id,
  input: &NewSupportPlan,
) -> Result<SupportPlan> {
  input.validate()?;
  let current = get(conn, id)?.ok_or_else(|| not_found(id))?;
  check_plan_transition(id, current.status, input.status)?;

  conn.execute(
    "UPDATE support_plans SET
       client_id = ?2, plan_name = ?3, goals = ?4, start_date = ?5,
       end_date = ?6, status = ?7, priority = ?8, assigned_staff_ids = ?9,
       notes = ?10, updated_at = ?11
     WHERE id = ?1",
    params![
      id,
      input.client_id,
      input.plan_name,
      input.goals,
      encode_date(input.start_date),
      encode_date(input.end_date),
      input.status.as_str(),
      input.priority.as_str(),
      encode_json_list(&input.assigned_staff_ids)?,
      input.notes,
      encode_dt(Utc::now()),
    ],
  )?;
  get(conn, id)?.ok_or_else(|| not_found(id))
}

pub(crate) fn set_status(
  conn: &Connection,
  id: Id,
  status: PlanStatus,
) -> Result<SupportPlan> {
  let current = get(conn, id)?.ok_or_else(|| not_found(id))?;
  check_plan_transition(id, current.status, status)?;

  conn.execute(
    "UPDATE support_plans SET status = ?2, updated_at = ?3 WHERE id = ?1",
    params![id, status.as_str(), encode_dt(Utc::now())],
  )?;
  get(conn, id)?.ok_or_else(|| not_found(id))
}

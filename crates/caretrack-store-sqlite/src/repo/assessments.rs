//! `assessments` table access.

use caretrack_core::{
  Id,
  assessment::{Assessment, AssessmentStatus, CategoryScores, NewAssessment},
  lifecycle::{
    check_assessment_editable, check_assessment_transition, check_signatory,
  },
  store::AssessmentQuery,
};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params, params_from_iter};

use super::{Filter, staff};
use crate::{
  Error, Result,
  encode::{
    decode_date, decode_enum, decode_enum_or_default, decode_json_or_default,
    decode_opt_dt, decode_opt_u8, decode_stamp, encode_date, encode_dt,
    encode_json_list, integer, text,
  },
};

const COLUMNS: &str = "id, client_id, staff_id, support_plan_id,
  assessment_type, assessment_date, summary, overall_score, category_scores,
  strengths, challenges, recommendations, goals, status, finalized_at,
  finalized_by, attachments, notes, created_at, updated_at";

struct RawAssessment {
  id:              Id,
  client_id:       Id,
  staff_id:        Id,
  support_plan_id: Option<Id>,
  assessment_type: String,
  assessment_date: String,
  summary:         Option<String>,
  overall_score:   Option<i64>,
  category_scores: Option<String>,
  strengths:       Option<String>,
  challenges:      Option<String>,
  recommendations: Option<String>,
  goals:           Option<String>,
  status:          Option<String>,
  finalized_at:    Option<String>,
  finalized_by:    Option<Id>,
  attachments:     Option<String>,
  notes:           Option<String>,
  created_at:      Option<String>,
  updated_at:      Option<String>,
}

impl RawAssessment {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get("id")?,
      client_id:       row.get("client_id")?,
      staff_id:        row.get("staff_id")?,
      support_plan_id: row.get("support_plan_id")?,
      assessment_type: row.get("assessment_type")?,
      assessment_date: row.get("assessment_date")?,
      summary:         row.get("summary")?,
      overall_score:   row.get("overall_score")?,
      category_scores: row.get("category_scores")?,
      strengths:       row.get("strengths")?,
      challenges:      row.get("challenges")?,
      recommendations: row.get("recommendations")?,
      goals:           row.get("goals")?,
      status:          row.get("status")?,
      finalized_at:    row.get("finalized_at")?,
      finalized_by:    row.get("finalized_by")?,
      attachments:     row.get("attachments")?,
      notes:           row.get("notes")?,
      created_at:      row.get("created_at")?,
      updated_at:      row.get("updated_at")?,
    })
  }

  fn into_assessment(self) -> Result<Assessment> {
    Ok(Assessment {
      id:              self.id,
      client_id:       self.client_id,
      staff_id:        self.staff_id,
      support_plan_id: self.support_plan_id,
      assessment_type: decode_enum(&self.assessment_type)?,
      assessment_date: decode_date(&self.assessment_date)?,
      summary:         self.summary,
      overall_score:   decode_opt_u8("overall_score", self.overall_score)?,
      category_scores: decode_json_or_default(self.category_scores)?,
      strengths:       self.strengths,
      challenges:      self.challenges,
      recommendations: self.recommendations,
      goals:           self.goals,
      status:          decode_enum_or_default(self.status)?,
      finalized_at:    decode_opt_dt(self.finalized_at)?,
      finalized_by:    self.finalized_by,
      attachments:     decode_json_or_default(self.attachments)?,
      notes:           self.notes,
      created_at:      decode_stamp("assessments", self.id, "created_at", self.created_at)?,
      updated_at:      decode_stamp("assessments", self.id, "updated_at", self.updated_at)?,
    })
  }
}

fn not_found(id: Id) -> Error { Error::NotFound { entity: "assessment", id } }

fn require(conn: &Connection, id: Id) -> Result<Assessment> {
  get(conn, id)?.ok_or_else(|| not_found(id))
}

fn encode_scores(scores: &CategoryScores) -> Result<Option<String>> {
  if scores.is_empty() {
    return Ok(None);
  }
  Ok(Some(serde_json::to_string(scores)?))
}

pub(crate) fn insert(conn: &Connection, input: &NewAssessment) -> Result<Assessment> {
  input.validate()?;
  let now = encode_dt(Utc::now());

  conn.execute(
    "INSERT INTO assessments (
       client_id, staff_id, support_plan_id, assessment_type, assessment_date,
       summary, overall_score, category_scores, strengths, challenges,
       recommendations, goals, status, attachments, notes,
       created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
               ?15, ?16, ?16)",
    params![
      input.client_id,
      input.staff_id,
      input.support_plan_id,
      input.assessment_type.as_str(),
      encode_date(input.assessment_date),
      input.summary,
      input.overall_score,
      encode_scores(&input.category_scores)?,
      input.strengths,
      input.challenges,
      input.recommendations,
      input.goals,
      AssessmentStatus::Draft.as_str(),
      encode_json_list(&input.attachments)?,
      input.notes,
      now,
    ],
  )?;

  let id = conn.last_insert_rowid();
  require(conn, id)
}

pub(crate) fn get(conn: &Connection, id: Id) -> Result<Option<Assessment>> {
  let raw = conn
    .query_row(
      &format!("SELECT {COLUMNS} FROM assessments WHERE id = ?1"),
      params![id],
      RawAssessment::from_row,
    )
    .optional()?;
  raw.map(RawAssessment::into_assessment).transpose()
}

/// Newest first. Date bounds are inclusive.
pub(crate) fn list(conn: &Connection, query: &AssessmentQuery) -> Result<Vec<Assessment>> {
  let mut filter = Filter::default();
  if let Some(client_id) = query.client_id {
    filter.and("client_id = ?", [integer(client_id)]);
  }
  if let Some(status) = query.status {
    filter.and("status = ?", [text(status.as_str())]);
  }
  if let Some(kind) = query.assessment_type {
    filter.and("assessment_type = ?", [text(kind.as_str())]);
  }
  if let Some(from) = query.from {
    filter.and("assessment_date >= ?", [text(encode_date(from))]);
  }
  if let Some(to) = query.to {
    filter.and("assessment_date <= ?", [text(encode_date(to))]);
  }

  let sql = format!(
    "SELECT {COLUMNS} FROM assessments {} ORDER BY assessment_date DESC, id DESC",
    filter.where_clause()
  );
  let params = filter.into_params();

  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(params.iter()), RawAssessment::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawAssessment::into_assessment).collect()
}

pub(crate) fn update(
  conn: &Connection,
  id: Id,
  input: &NewAssessment,
) -> Result<Assessment> {
  input.validate()?;
  let current = require(conn, id)?;
  check_assessment_editable(id, current.status)?;

  conn.execute(
    "UPDATE assessments SET
       client_id = ?2, staff_id = ?3, support_plan_id = ?4,
       assessment_type = ?5, assessment_date = ?6, summary = ?7,
       overall_score = ?8, category_scores = ?9, strengths = ?10,
       challenges = ?11, recommendations = ?12, goals = ?13,
       attachments = ?14, notes = ?15, updated_at = ?16
     WHERE id = ?1",
    params![
      id,
      input.client_id,
      input.staff_id,
      input.support_plan_id,
      input.assessment_type.as_str(),
      encode_date(input.assessment_date),
      input.summary,
      input.overall_score,
      encode_scores(&input.category_scores)?,
      input.strengths,
      input.challenges,
      input.recommendations,
      input.goals,
      encode_json_list(&input.attachments)?,
      input.notes,
      encode_dt(Utc::now()),
    ],
  )?;
  require(conn, id)
}

pub(crate) fn submit(conn: &Connection, id: Id) -> Result<Assessment> {
  let current = require(conn, id)?;
  check_assessment_transition(id, current.status, AssessmentStatus::Pending)?;

  conn.execute(
    "UPDATE assessments SET status = ?2, updated_at = ?3 WHERE id = ?1",
    params![id, AssessmentStatus::Pending.as_str(), encode_dt(Utc::now())],
  )?;
  require(conn, id)
}

pub(crate) fn finalize(conn: &Connection, id: Id, finalized_by: Id) -> Result<Assessment> {
  let current = require(conn, id)?;
  check_assessment_transition(id, current.status, AssessmentStatus::Approved)?;
  let signatory = staff::get(conn, finalized_by)?
    .ok_or(Error::NotFound { entity: "staff member", id: finalized_by })?;
  check_signatory(&signatory, "finalise assessments")?;

  let now = encode_dt(Utc::now());
  conn.execute(
    "UPDATE assessments
       SET status = ?2, finalized_by = ?3, finalized_at = ?4, updated_at = ?4
     WHERE id = ?1",
    params![id, AssessmentStatus::Approved.as_str(), finalized_by, now],
  )?;
  tracing::info!(assessment = id, finalized_by, "assessment finalised");
  require(conn, id)
}

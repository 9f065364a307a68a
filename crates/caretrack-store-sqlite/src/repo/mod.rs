//! Typed [`CaseStore`] implementation for [`SqliteStore`].
//!
//! Each submodule holds the synchronous row mapping and SQL for one table;
//! the trait impl below moves the work onto the connection thread. Writes
//! that read a status before changing it run inside a transaction.

mod assessments;
mod clients;
mod contacts;
mod plans;
mod service_logs;
mod staff;

use std::path::PathBuf;

use caretrack_core::{
  Id,
  assessment::{Assessment, NewAssessment},
  client::{Client, ClientStatus, NewClient},
  contact::{EmergencyContact, NewEmergencyContact},
  plan::{NewSupportPlan, PlanStatus, SupportPlan},
  service_log::{NewServiceLog, ServiceLog},
  staff::{NewStaff, Staff, StaffStatus, StaffUpdate},
  store::{
    AssessmentQuery, CaseStore, ClientQuery, PlanQuery, ServiceLogQuery,
    StaffQuery,
  },
};
use rusqlite::types::Value;

use crate::{Error, Result, SqliteStore};

// ─── Dynamic WHERE clauses ───────────────────────────────────────────────────

/// Accumulates `AND`-joined conditions with anonymous `?` placeholders and
/// their bound values, in order.
#[derive(Default)]
pub(crate) struct Filter {
  conds:  Vec<&'static str>,
  params: Vec<Value>,
}

impl Filter {
  pub(crate) fn and(
    &mut self,
    cond: &'static str,
    values: impl IntoIterator<Item = Value>,
  ) -> &mut Self {
    self.conds.push(cond);
    self.params.extend(values);
    self
  }

  /// `WHERE a AND b`, or the empty string when no condition was added.
  pub(crate) fn where_clause(&self) -> String {
    if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join(" AND "))
    }
  }

  pub(crate) fn into_params(self) -> Vec<Value> { self.params }
}

/// `%needle%` for a `LIKE … ESCAPE '\'` match, with the wildcards and the
/// escape character in `needle` taken literally.
pub(crate) fn contains_pattern(needle: &str) -> String {
  let mut pattern = String::with_capacity(needle.len() + 2);
  pattern.push('%');
  for c in needle.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

/// Paging values beyond `i64::MAX` saturate instead of wrapping negative,
/// which SQLite would read as "no limit" or "no offset".
pub(crate) fn clamp_i64(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── CaseStore ───────────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = Error;

  // ── Clients ───────────────────────────────────────────────────────────

  async fn insert_client(&self, input: NewClient) -> Result<Client> {
    let client = self.call(move |conn| clients::insert(conn, &input)).await?;
    tracing::info!(client = client.id, number = %client.client_number, "client registered");
    Ok(client)
  }

  async fn get_client(&self, id: Id) -> Result<Option<Client>> {
    self.call(move |conn| clients::get(conn, id)).await
  }

  async fn find_client_by_number<'a>(
    &'a self,
    client_number: &'a str,
  ) -> Result<Option<Client>> {
    let number = client_number.to_owned();
    self.call(move |conn| clients::find_by_number(conn, &number)).await
  }

  async fn list_clients<'a>(&'a self, query: &'a ClientQuery) -> Result<Vec<Client>> {
    let query = query.clone();
    self.call(move |conn| clients::list(conn, &query)).await
  }

  async fn update_client(&self, id: Id, input: NewClient) -> Result<Client> {
    self.call(move |conn| clients::update(conn, id, &input)).await
  }

  async fn set_client_status(&self, id: Id, status: ClientStatus) -> Result<Client> {
    self.call(move |conn| clients::set_status(conn, id, status)).await
  }

  // ── Support plans ─────────────────────────────────────────────────────

  async fn insert_support_plan(&self, input: NewSupportPlan) -> Result<SupportPlan> {
    self.call(move |conn| plans::insert(conn, &input)).await
  }

  async fn get_support_plan(&self, id: Id) -> Result<Option<SupportPlan>> {
    self.call(move |conn| plans::get(conn, id)).await
  }

  async fn list_support_plans<'a>(
    &'a self,
    query: &'a PlanQuery,
  ) -> Result<Vec<SupportPlan>> {
    let query = query.clone();
    self.call(move |conn| plans::list(conn, &query)).await
  }

  async fn update_support_plan(
    &self,
    id: Id,
    input: NewSupportPlan,
  ) -> Result<SupportPlan> {
    self
      .transaction(move |tx| plans::update(tx.connection(), id, &input))
      .await
  }

  async fn set_support_plan_status(
    &self,
    id: Id,
    status: PlanStatus,
  ) -> Result<SupportPlan> {
    self
      .transaction(move |tx| plans::set_status(tx.connection(), id, status))
      .await
  }

  // ── Service logs ──────────────────────────────────────────────────────

  async fn insert_service_log(&self, input: NewServiceLog) -> Result<ServiceLog> {
    self.call(move |conn| service_logs::insert(conn, &input)).await
  }

  async fn get_service_log(&self, id: Id) -> Result<Option<ServiceLog>> {
    self.call(move |conn| service_logs::get(conn, id)).await
  }

  async fn list_service_logs<'a>(
    &'a self,
    query: &'a ServiceLogQuery,
  ) -> Result<Vec<ServiceLog>> {
    let query = query.clone();
    self.call(move |conn| service_logs::list(conn, &query)).await
  }

  async fn update_service_log(&self, id: Id, input: NewServiceLog) -> Result<ServiceLog> {
    self
      .transaction(move |tx| service_logs::update(tx.connection(), id, &input))
      .await
  }

  async fn confirm_service_log(&self, id: Id) -> Result<ServiceLog> {
    self
      .transaction(move |tx| service_logs::confirm(tx.connection(), id))
      .await
  }

  async fn approve_service_log(&self, id: Id, approved_by: Id) -> Result<ServiceLog> {
    self
      .transaction(move |tx| service_logs::approve(tx.connection(), id, approved_by))
      .await
  }

  // ── Staff ─────────────────────────────────────────────────────────────

  async fn insert_staff(&self, input: NewStaff) -> Result<Staff> {
    self.call(move |conn| staff::insert(conn, &input)).await
  }

  async fn get_staff(&self, id: Id) -> Result<Option<Staff>> {
    self.call(move |conn| staff::get(conn, id)).await
  }

  async fn find_staff_by_email<'a>(&'a self, email: &'a str) -> Result<Option<Staff>> {
    let email = email.to_owned();
    self.call(move |conn| staff::find_by_email(conn, &email)).await
  }

  async fn list_staff<'a>(&'a self, query: &'a StaffQuery) -> Result<Vec<Staff>> {
    let query = query.clone();
    self.call(move |conn| staff::list(conn, &query)).await
  }

  async fn update_staff(&self, id: Id, input: StaffUpdate) -> Result<Staff> {
    self.call(move |conn| staff::update(conn, id, &input)).await
  }

  async fn set_staff_status(&self, id: Id, status: StaffStatus) -> Result<Staff> {
    self.call(move |conn| staff::set_status(conn, id, status)).await
  }

  async fn set_staff_password(&self, id: Id, password_hash: String) -> Result<()> {
    self
      .call(move |conn| staff::set_password(conn, id, &password_hash))
      .await
  }

  async fn record_staff_login(&self, id: Id) -> Result<Staff> {
    self.call(move |conn| staff::record_login(conn, id)).await
  }

  // ── Emergency contacts ────────────────────────────────────────────────

  async fn list_emergency_contacts(&self, client_id: Id) -> Result<Vec<EmergencyContact>> {
    self.call(move |conn| contacts::list(conn, client_id)).await
  }

  async fn replace_emergency_contacts(
    &self,
    client_id: Id,
    replacement: Vec<NewEmergencyContact>,
  ) -> Result<Vec<EmergencyContact>> {
    self
      .transaction(move |tx| contacts::replace(tx.connection(), client_id, &replacement))
      .await
  }

  // ── Assessments ───────────────────────────────────────────────────────

  async fn insert_assessment(&self, input: NewAssessment) -> Result<Assessment> {
    self.call(move |conn| assessments::insert(conn, &input)).await
  }

  async fn get_assessment(&self, id: Id) -> Result<Option<Assessment>> {
    self.call(move |conn| assessments::get(conn, id)).await
  }

  async fn list_assessments<'a>(
    &'a self,
    query: &'a AssessmentQuery,
  ) -> Result<Vec<Assessment>> {
    let query = query.clone();
    self.call(move |conn| assessments::list(conn, &query)).await
  }

  async fn update_assessment(&self, id: Id, input: NewAssessment) -> Result<Assessment> {
    self
      .transaction(move |tx| assessments::update(tx.connection(), id, &input))
      .await
  }

  async fn submit_assessment(&self, id: Id) -> Result<Assessment> {
    self
      .transaction(move |tx| assessments::submit(tx.connection(), id))
      .await
  }

  async fn finalize_assessment(&self, id: Id, finalized_by: Id) -> Result<Assessment> {
    self
      .transaction(move |tx| assessments::finalize(tx.connection(), id, finalized_by))
      .await
  }

  // ── Maintenance ───────────────────────────────────────────────────────

  async fn backup(&self) -> Result<PathBuf> { SqliteStore::backup(self).await }
}

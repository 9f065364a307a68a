//! The `CaseStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `caretrack-store-sqlite`). Higher layers (`caretrack-api`,
//! `caretrack-server`) depend on this abstraction, not on any concrete
//! backend or on raw SQL.

use std::{future::Future, path::PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
  Id,
  assessment::{Assessment, AssessmentStatus, AssessmentType, NewAssessment},
  client::{Client, ClientStatus, NewClient},
  contact::{EmergencyContact, NewEmergencyContact},
  plan::{NewSupportPlan, PlanStatus, SupportPlan},
  service_log::{NewServiceLog, ServiceLog, ServiceLogStatus},
  staff::{NewStaff, Staff, StaffRole, StaffStatus, StaffUpdate},
};

// ─── Error classification ────────────────────────────────────────────────────

/// Backend-neutral classification of a store failure, so that callers can
/// pick a response without knowing the backend's error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  /// The addressed row does not exist.
  NotFound,
  /// A uniqueness, foreign-key or status-transition rule rejected the write.
  Conflict,
  /// The input failed validation before reaching the database.
  Invalid,
  /// The store is not open.
  Unavailable,
  Internal,
}

pub trait Classify {
  fn failure_kind(&self) -> FailureKind;
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`CaseStore::list_clients`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientQuery {
  pub status: Option<ClientStatus>,
  /// Substring match over name, name_kana and client_number.
  pub text:   Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// Parameters for [`CaseStore::list_support_plans`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlanQuery {
  pub client_id: Option<Id>,
  pub status:    Option<PlanStatus>,
}

/// Parameters for [`CaseStore::list_service_logs`]. Date bounds are
/// inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceLogQuery {
  pub client_id:       Option<Id>,
  pub staff_id:        Option<Id>,
  pub support_plan_id: Option<Id>,
  pub status:          Option<ServiceLogStatus>,
  pub from:            Option<NaiveDate>,
  pub to:              Option<NaiveDate>,
}

/// Parameters for [`CaseStore::list_staff`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaffQuery {
  pub role:   Option<StaffRole>,
  pub status: Option<StaffStatus>,
}

/// Parameters for [`CaseStore::list_assessments`]. Date bounds are
/// inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssessmentQuery {
  pub client_id:       Option<Id>,
  pub status:          Option<AssessmentStatus>,
  pub assessment_type: Option<AssessmentType>,
  pub from:            Option<NaiveDate>,
  pub to:              Option<NaiveDate>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Typed repository over the CareTrack records.
///
/// Updates addressed at a missing id fail with a [`FailureKind::NotFound`]
/// error. Approval and finalisation are one-way; approved service logs and
/// assessments are read-only through this interface.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Clients ───────────────────────────────────────────────────────────

  fn insert_client(
    &self,
    input: NewClient,
  ) -> impl Future<Output = Result<Client, Self::Error>> + Send + '_;

  /// Retrieve a client by id. Returns `None` if not found.
  fn get_client(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  fn find_client_by_number<'a>(
    &'a self,
    client_number: &'a str,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + 'a;

  fn list_clients<'a>(
    &'a self,
    query: &'a ClientQuery,
  ) -> impl Future<Output = Result<Vec<Client>, Self::Error>> + Send + 'a;

  fn update_client(
    &self,
    id: Id,
    input: NewClient,
  ) -> impl Future<Output = Result<Client, Self::Error>> + Send + '_;

  /// Soft status change; clients are never hard-deleted.
  fn set_client_status(
    &self,
    id: Id,
    status: ClientStatus,
  ) -> impl Future<Output = Result<Client, Self::Error>> + Send + '_;

  // ── Support plans ─────────────────────────────────────────────────────

  fn insert_support_plan(
    &self,
    input: NewSupportPlan,
  ) -> impl Future<Output = Result<SupportPlan, Self::Error>> + Send + '_;

  fn get_support_plan(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Option<SupportPlan>, Self::Error>> + Send + '_;

  fn list_support_plans<'a>(
    &'a self,
    query: &'a PlanQuery,
  ) -> impl Future<Output = Result<Vec<SupportPlan>, Self::Error>> + Send + 'a;

  fn update_support_plan(
    &self,
    id: Id,
    input: NewSupportPlan,
  ) -> impl Future<Output = Result<SupportPlan, Self::Error>> + Send + '_;

  /// Advance a plan's status; completed and cancelled plans are terminal.
  fn set_support_plan_status(
    &self,
    id: Id,
    status: PlanStatus,
  ) -> impl Future<Output = Result<SupportPlan, Self::Error>> + Send + '_;

  // ── Service logs ──────────────────────────────────────────────────────

  /// Record a new service log in [`ServiceLogStatus::Draft`].
  fn insert_service_log(
    &self,
    input: NewServiceLog,
  ) -> impl Future<Output = Result<ServiceLog, Self::Error>> + Send + '_;

  fn get_service_log(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Option<ServiceLog>, Self::Error>> + Send + '_;

  /// List service logs ordered by service date and start time.
  fn list_service_logs<'a>(
    &'a self,
    query: &'a ServiceLogQuery,
  ) -> impl Future<Output = Result<Vec<ServiceLog>, Self::Error>> + Send + 'a;

  /// Edit a service log that has not been approved yet.
  fn update_service_log(
    &self,
    id: Id,
    input: NewServiceLog,
  ) -> impl Future<Output = Result<ServiceLog, Self::Error>> + Send + '_;

  fn confirm_service_log(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<ServiceLog, Self::Error>> + Send + '_;

  /// Approve a draft or confirmed log, stamping the approver and time.
  fn approve_service_log(
    &self,
    id: Id,
    approved_by: Id,
  ) -> impl Future<Output = Result<ServiceLog, Self::Error>> + Send + '_;

  // ── Staff ─────────────────────────────────────────────────────────────

  fn insert_staff(
    &self,
    input: NewStaff,
  ) -> impl Future<Output = Result<Staff, Self::Error>> + Send + '_;

  fn get_staff(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Option<Staff>, Self::Error>> + Send + '_;

  fn find_staff_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Staff>, Self::Error>> + Send + 'a;

  fn list_staff<'a>(
    &'a self,
    query: &'a StaffQuery,
  ) -> impl Future<Output = Result<Vec<Staff>, Self::Error>> + Send + 'a;

  fn update_staff(
    &self,
    id: Id,
    input: StaffUpdate,
  ) -> impl Future<Output = Result<Staff, Self::Error>> + Send + '_;

  /// Staff are deactivated rather than deleted.
  fn set_staff_status(
    &self,
    id: Id,
    status: StaffStatus,
  ) -> impl Future<Output = Result<Staff, Self::Error>> + Send + '_;

  fn set_staff_password(
    &self,
    id: Id,
    password_hash: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Stamp `last_login_at` with the current time.
  fn record_staff_login(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Staff, Self::Error>> + Send + '_;

  // ── Emergency contacts ────────────────────────────────────────────────

  fn list_emergency_contacts(
    &self,
    client_id: Id,
  ) -> impl Future<Output = Result<Vec<EmergencyContact>, Self::Error>> + Send + '_;

  /// Atomically replace the whole contact set of a client.
  fn replace_emergency_contacts(
    &self,
    client_id: Id,
    contacts: Vec<NewEmergencyContact>,
  ) -> impl Future<Output = Result<Vec<EmergencyContact>, Self::Error>> + Send + '_;

  // ── Assessments ───────────────────────────────────────────────────────

  /// Record a new assessment in [`AssessmentStatus::Draft`].
  fn insert_assessment(
    &self,
    input: NewAssessment,
  ) -> impl Future<Output = Result<Assessment, Self::Error>> + Send + '_;

  fn get_assessment(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Option<Assessment>, Self::Error>> + Send + '_;

  fn list_assessments<'a>(
    &'a self,
    query: &'a AssessmentQuery,
  ) -> impl Future<Output = Result<Vec<Assessment>, Self::Error>> + Send + 'a;

  /// Edit an assessment that has not been finalised yet.
  fn update_assessment(
    &self,
    id: Id,
    input: NewAssessment,
  ) -> impl Future<Output = Result<Assessment, Self::Error>> + Send + '_;

  /// Move a draft assessment to pending review.
  fn submit_assessment(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Assessment, Self::Error>> + Send + '_;

  /// Finalise a draft or pending assessment, stamping the finaliser and time.
  fn finalize_assessment(
    &self,
    id: Id,
    finalized_by: Id,
  ) -> impl Future<Output = Result<Assessment, Self::Error>> + Send + '_;

  // ── Maintenance ───────────────────────────────────────────────────────

  /// Copy the database file to a timestamped sibling and return its path.
  fn backup(&self) -> impl Future<Output = Result<PathBuf, Self::Error>> + Send + '_;
}

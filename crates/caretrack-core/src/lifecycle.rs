//! Status transition rules.
//!
//! The raw SQL layer accepts any status a column's CHECK constraint allows.
//! The typed store operations consult these rules before writing, so that
//! approvals and finalisations are one-way.

use crate::{
  Error, Id, Result,
  assessment::AssessmentStatus,
  plan::PlanStatus,
  service_log::ServiceLogStatus,
  staff::Staff,
};

impl ServiceLogStatus {
  /// draft → confirmed → approved, with draft → approved allowed directly.
  pub fn can_advance_to(self, next: Self) -> bool {
    use ServiceLogStatus::*;
    matches!((self, next), (Draft, Confirmed) | (Draft, Approved) | (Confirmed, Approved))
  }

  pub fn is_editable(self) -> bool { self != Self::Approved }
}

impl AssessmentStatus {
  /// draft → pending → approved, with draft → approved allowed directly.
  pub fn can_advance_to(self, next: Self) -> bool {
    use AssessmentStatus::*;
    matches!((self, next), (Draft, Pending) | (Draft, Approved) | (Pending, Approved))
  }

  pub fn is_editable(self) -> bool { self != Self::Approved }
}

impl PlanStatus {
  /// pending → active → completed; open plans may be cancelled. Completed and
  /// cancelled plans are terminal. Re-asserting the current status is allowed.
  pub fn can_advance_to(self, next: Self) -> bool {
    use PlanStatus::*;
    self == next
      || matches!(
        (self, next),
        (Pending, Active) | (Active, Completed) | (Pending, Cancelled) | (Active, Cancelled)
      )
  }
}

pub fn check_service_log_transition(
  id: Id,
  from: ServiceLogStatus,
  to: ServiceLogStatus,
) -> Result<()> {
  if from.can_advance_to(to) {
    Ok(())
  } else {
    Err(Error::InvalidTransition {
      entity: "service log",
      id,
      from: from.to_string(),
      to: to.to_string(),
    })
  }
}

pub fn check_assessment_transition(
  id: Id,
  from: AssessmentStatus,
  to: AssessmentStatus,
) -> Result<()> {
  if from.can_advance_to(to) {
    Ok(())
  } else {
    Err(Error::InvalidTransition {
      entity: "assessment",
      id,
      from: from.to_string(),
      to: to.to_string(),
    })
  }
}

pub fn check_plan_transition(id: Id, from: PlanStatus, to: PlanStatus) -> Result<()> {
  if from.can_advance_to(to) {
    Ok(())
  } else {
    Err(Error::InvalidTransition {
      entity: "support plan",
      id,
      from: from.to_string(),
      to: to.to_string(),
    })
  }
}

pub fn check_service_log_editable(id: Id, status: ServiceLogStatus) -> Result<()> {
  if status.is_editable() {
    Ok(())
  } else {
    Err(Error::Locked { entity: "service log", id, status: status.to_string() })
  }
}

pub fn check_assessment_editable(id: Id, status: AssessmentStatus) -> Result<()> {
  if status.is_editable() {
    Ok(())
  } else {
    Err(Error::Locked { entity: "assessment", id, status: status.to_string() })
  }
}

/// Only active administrators may approve service logs or finalise
/// assessments; `action` names the attempted sign-off in the error.
pub fn check_signatory(staff: &Staff, action: &'static str) -> Result<()> {
  let reason = if !staff.is_active() {
    "account is inactive"
  } else if !staff.role.is_admin() {
    "not an administrator"
  } else {
    return Ok(());
  };
  Err(Error::NotSignatory { id: staff.id, action, reason })
}

//! Role policy for authenticated requests.
//!
//! - Reads are open to every active staff member.
//! - Viewers cannot write anything except their own password.
//! - Staff may write clients, plans, logs, contacts and assessments, but
//!   approving logs and finalising assessments is reserved for admins.
//! - Staff accounts and backups are admin-only.

use axum::http::Method;
use caretrack_core::staff::Staff;

/// Whether `staff` may issue `method` against `path` (the full request path,
/// including the `/api` prefix).
pub fn permits(staff: &Staff, method: &Method, path: &str) -> bool {
  if matches!(*method, Method::GET | Method::HEAD) || path == "/login" {
    return true;
  }

  let role = staff.role;
  let segments: Vec<&str> = path
    .trim_start_matches("/api")
    .split('/')
    .filter(|s| !s.is_empty())
    .collect();

  match segments.as_slice() {
    ["staff", id, "password"] => role.is_admin() || *id == staff.id.to_string(),
    ["staff", ..] | ["backup"] => role.is_admin(),
    ["service-logs", _, "approve"] | ["assessments", _, "finalize"] => role.is_admin(),
    _ => role.can_write_records(),
  }
}

#[cfg(test)]
mod tests {
  use caretrack_core::staff::{StaffRole, StaffStatus};
  use chrono::Utc;

  use super::*;

  fn staff(id: i64, role: StaffRole) -> Staff {
    Staff {
      id,
      staff_number: format!("S{id:03}"),
      name: "Sato".into(),
      name_kana: None,
      email: format!("s{id}@example.com"),
      phone: None,
      role,
      specialties: Vec::new(),
      status: StaffStatus::Active,
      password_hash: String::new(),
      last_login_at: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn everyone_reads_and_logs_in() {
    let viewer = staff(1, StaffRole::Viewer);
    assert!(permits(&viewer, &Method::GET, "/api/clients"));
    assert!(permits(&viewer, &Method::GET, "/api/staff"));
    assert!(permits(&viewer, &Method::POST, "/login"));
  }

  #[test]
  fn viewers_cannot_write_records() {
    let viewer = staff(1, StaffRole::Viewer);
    assert!(!permits(&viewer, &Method::POST, "/api/clients"));
    assert!(!permits(&viewer, &Method::PUT, "/api/service-logs/3"));
    assert!(permits(&viewer, &Method::PUT, "/api/staff/1/password"));
    assert!(!permits(&viewer, &Method::PUT, "/api/staff/2/password"));
  }

  #[test]
  fn staff_write_records_but_not_accounts_or_approvals() {
    let member = staff(2, StaffRole::Staff);
    assert!(permits(&member, &Method::POST, "/api/clients"));
    assert!(permits(&member, &Method::PUT, "/api/clients/4/emergency-contacts"));
    assert!(permits(&member, &Method::POST, "/api/service-logs/4/confirm"));
    assert!(permits(&member, &Method::POST, "/api/assessments/4/submit"));
    assert!(!permits(&member, &Method::POST, "/api/service-logs/4/approve"));
    assert!(!permits(&member, &Method::POST, "/api/assessments/4/finalize"));
    assert!(!permits(&member, &Method::POST, "/api/staff"));
    assert!(!permits(&member, &Method::PUT, "/api/staff/2/status"));
    assert!(!permits(&member, &Method::POST, "/api/backup"));
  }

  #[test]
  fn admins_may_do_everything() {
    let admin = staff(3, StaffRole::Admin);
    assert!(permits(&admin, &Method::POST, "/api/staff"));
    assert!(permits(&admin, &Method::PUT, "/api/staff/9/password"));
    assert!(permits(&admin, &Method::POST, "/api/backup"));
    assert!(permits(&admin, &Method::POST, "/api/service-logs/4/approve"));
  }
}

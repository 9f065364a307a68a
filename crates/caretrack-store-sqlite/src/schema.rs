//! SQL schema for the CareTrack SQLite store.
//!
//! Executed by `SqliteStore::initialize` on every open. Every statement is
//! idempotent, so re-running it against an initialised file neither fails
//! nor duplicates objects. `PRAGMA user_version` records the layout version
//! for future migrations.
//!
//! Dates are `YYYY-MM-DD`, times `HH:MM`, timestamps RFC 3339 (or SQLite's
//! `CURRENT_TIMESTAMP` format when defaulted). List-valued columns hold JSON.

/// Layout version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS clients (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    client_number     TEXT NOT NULL UNIQUE,
    name              TEXT NOT NULL,
    name_kana         TEXT,
    date_of_birth     TEXT,
    gender            TEXT CHECK (gender IN ('male', 'female', 'other')),
    phone             TEXT,
    email             TEXT,
    address           TEXT,
    disability_type   TEXT,
    disability_grade  TEXT,
    insurance_number  TEXT,
    status            TEXT DEFAULT 'active'
                      CHECK (status IN ('active', 'inactive', 'suspended')),
    notes             TEXT,
    created_at        TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at        TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS support_plans (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id           INTEGER NOT NULL REFERENCES clients(id),
    plan_name           TEXT NOT NULL,
    goals               TEXT,
    start_date          TEXT NOT NULL,
    end_date            TEXT NOT NULL,
    status              TEXT DEFAULT 'pending'
                        CHECK (status IN ('pending', 'active', 'completed', 'cancelled')),
    priority            TEXT DEFAULT 'medium'
                        CHECK (priority IN ('high', 'medium', 'low')),
    assigned_staff_ids  TEXT,            -- JSON array of staff ids
    notes               TEXT,
    created_at          TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at          TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS service_logs (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id        INTEGER NOT NULL REFERENCES clients(id),
    support_plan_id  INTEGER REFERENCES support_plans(id),
    staff_id         INTEGER NOT NULL REFERENCES staff(id),
    service_date     TEXT NOT NULL,
    start_time       TEXT NOT NULL,
    end_time         TEXT NOT NULL,
    service_type     TEXT NOT NULL,
    details          TEXT,
    achievements     TEXT,
    issues           TEXT,
    next_actions     TEXT,
    mood_level       INTEGER CHECK (mood_level BETWEEN 1 AND 5),
    health_status    TEXT CHECK (health_status IN ('excellent', 'good', 'fair', 'poor')),
    attachments      TEXT,               -- JSON array of file references
    notes            TEXT,
    status           TEXT DEFAULT 'draft'
                     CHECK (status IN ('draft', 'confirmed', 'approved')),
    approved_by      INTEGER,
    approved_at      TEXT,
    created_at       TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at       TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS staff (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    staff_number   TEXT NOT NULL UNIQUE,
    name           TEXT NOT NULL,
    name_kana      TEXT,
    email          TEXT NOT NULL UNIQUE,
    phone          TEXT,
    role           TEXT NOT NULL CHECK (role IN ('admin', 'staff', 'viewer')),
    specialties    TEXT,                 -- JSON array
    status         TEXT DEFAULT 'active' CHECK (status IN ('active', 'inactive')),
    password_hash  TEXT NOT NULL,
    last_login_at  TEXT,
    created_at     TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at     TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS emergency_contacts (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id     INTEGER NOT NULL REFERENCES clients(id),
    name          TEXT NOT NULL,
    relationship  TEXT NOT NULL,
    phone         TEXT NOT NULL,
    email         TEXT,
    address       TEXT,
    is_primary    BOOLEAN DEFAULT 0,
    notes         TEXT,
    created_at    TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at    TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS assessments (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id         INTEGER NOT NULL REFERENCES clients(id),
    staff_id          INTEGER NOT NULL REFERENCES staff(id),
    support_plan_id   INTEGER REFERENCES support_plans(id),
    assessment_type   TEXT NOT NULL
                      CHECK (assessment_type IN ('initial', 'periodic', 'annual', 'discharge')),
    assessment_date   TEXT NOT NULL,
    summary           TEXT,
    overall_score     INTEGER CHECK (overall_score BETWEEN 1 AND 100),
    category_scores   TEXT,              -- JSON object: category -> score
    strengths         TEXT,
    challenges        TEXT,
    recommendations   TEXT,
    goals             TEXT,
    status            TEXT DEFAULT 'draft'
                      CHECK (status IN ('draft', 'pending', 'approved')),
    finalized_at      TEXT,
    finalized_by      INTEGER,
    attachments       TEXT,              -- JSON array
    notes             TEXT,
    created_at        TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at        TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_clients_status              ON clients(status);
CREATE INDEX IF NOT EXISTS idx_support_plans_client_id     ON support_plans(client_id);
CREATE INDEX IF NOT EXISTS idx_support_plans_status        ON support_plans(status);
CREATE INDEX IF NOT EXISTS idx_service_logs_client_id      ON service_logs(client_id);
CREATE INDEX IF NOT EXISTS idx_service_logs_service_date   ON service_logs(service_date);
CREATE INDEX IF NOT EXISTS idx_service_logs_status         ON service_logs(status);
CREATE INDEX IF NOT EXISTS idx_emergency_contacts_client_id ON emergency_contacts(client_id);
CREATE INDEX IF NOT EXISTS idx_assessments_client_id       ON assessments(client_id);
CREATE INDEX IF NOT EXISTS idx_assessments_assessment_date ON assessments(assessment_date);
CREATE INDEX IF NOT EXISTS idx_assessments_status          ON assessments(status);

PRAGMA user_version = 1;
";

/// Tables created by [`SCHEMA`], in declaration order.
pub const TABLES: [&str; 6] = [
  "clients",
  "support_plans",
  "service_logs",
  "staff",
  "emergency_contacts",
  "assessments",
];

use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use std::path::Path;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Open (or create) the roster database and make sure the schema exists
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    setup_database(&conn)?;
    Ok(conn)
}

/// In-memory database with the full schema (tests and dry runs)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Join rows rely on ON DELETE CASCADE
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Churches
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS churches (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            country TEXT NOT NULL DEFAULT 'CL',
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Members
    // gender: NULL = no record, 0 = male, 1 = female
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            church_id TEXT NOT NULL REFERENCES churches(id),
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            address TEXT,
            phone TEXT,
            email TEXT,
            birth_date TEXT,
            gender INTEGER,
            status TEXT NOT NULL DEFAULT 'active',
            country TEXT NOT NULL DEFAULT 'CL',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Ministries, their responsibilities and charges
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS ministries (
            id TEXT PRIMARY KEY,
            church_id TEXT NOT NULL REFERENCES churches(id),
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(church_id, name)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS responsibilities (
            id TEXT PRIMARY KEY,
            ministry_id TEXT NOT NULL REFERENCES ministries(id) ON DELETE CASCADE,
            description TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS charges (
            id TEXT PRIMARY KEY,
            ministry_id TEXT NOT NULL REFERENCES ministries(id) ON DELETE CASCADE,
            name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS charge_members (
            charge_id TEXT NOT NULL REFERENCES charges(id) ON DELETE CASCADE,
            member_id TEXT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            PRIMARY KEY (charge_id, member_id)
        )",
        [],
    )?;

    // ==========================================================================
    // Attendance
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendances (
            id TEXT PRIMARY KEY,
            ministry_id TEXT NOT NULL REFERENCES ministries(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS member_attendances (
            attendance_id TEXT NOT NULL REFERENCES attendances(id) ON DELETE CASCADE,
            member_id TEXT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            PRIMARY KEY (attendance_id, member_id)
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_members_church ON members(church_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_members_name ON members(last_name, first_name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_members_status ON members(status)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_charge_members_member ON charge_members(member_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendances_ministry ON attendances(ministry_id, date)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// Column helpers
// ============================================================================

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Column-conversion error for a stored value this crate cannot interpret
pub fn conversion_failure(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

/// Read an RFC 3339 text column; a malformed value fails the row
pub fn timestamp_column(row: &Row<'_>, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    parse_timestamp(&raw)
        .ok_or_else(|| conversion_failure(column, format!("invalid timestamp: {:?}", raw)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// True when the error is a SQLite constraint violation (UNIQUE, FK, ...)
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;

    Ok(count)
}

// ⛪ Church Entity - Top-level scope owning members and ministries
//
// Nothing owns a church; members and ministries point at it by id.

use crate::db::{new_id, now_rfc3339, timestamp_column};
use crate::error::{Result, RosterError};
use crate::validation::ValidationError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNTRY: &str = "CL";

/// Display name for an ISO 3166-1 alpha-2 code; unknown codes come back as-is
pub fn country_name(code: &str) -> String {
    let name = match code.to_uppercase().as_str() {
        "CL" => "Chile",
        "AR" => "Argentina",
        "BO" => "Bolivia",
        "BR" => "Brasil",
        "CO" => "Colombia",
        "EC" => "Ecuador",
        "ES" => "España",
        "MX" => "México",
        "PE" => "Perú",
        "PY" => "Paraguay",
        "US" => "Estados Unidos",
        "UY" => "Uruguay",
        "VE" => "Venezuela",
        _ => return code.to_string(),
    };
    name.to_string()
}

// ============================================================================
// CHURCH ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Church {
    pub id: String,
    pub name: String,
    /// ISO 3166-1 alpha-2
    pub country: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChurchForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl Church {
    pub fn country_name(&self) -> String {
        country_name(&self.country)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Church> {
        Ok(Church {
            id: row.get(0)?,
            name: row.get(1)?,
            country: row.get(2)?,
            created_at: timestamp_column(row, 3)?,
        })
    }
}

// ============================================================================
// STORAGE
// ============================================================================

pub fn create_church(conn: &Connection, form: &ChurchForm) -> Result<Church> {
    if form.name.trim().is_empty() {
        return Err(RosterError::Validation(vec![ValidationError::new(
            "Church",
            "name",
            "can't be blank",
        )]));
    }

    let church = Church {
        id: new_id(),
        name: form.name.trim().to_string(),
        country: form
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COUNTRY)
            .to_uppercase(),
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO churches (id, name, country, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![church.id, church.name, church.country, now_rfc3339()],
    )?;

    tracing::info!(church_id = %church.id, name = %church.name, "church created");
    Ok(church)
}

pub fn get_church(conn: &Connection, id: &str) -> Result<Option<Church>> {
    let church = conn
        .query_row(
            "SELECT id, name, country, created_at FROM churches WHERE id = ?1",
            [id],
            Church::from_row,
        )
        .optional()?;

    Ok(church)
}

pub fn church_exists(conn: &Connection, id: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM churches WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;

    Ok(exists)
}

pub fn list_churches(conn: &Connection) -> Result<Vec<Church>> {
    let mut stmt =
        conn.prepare("SELECT id, name, country, created_at FROM churches ORDER BY name, id")?;

    let churches = stmt
        .query_map([], Church::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(churches)
}

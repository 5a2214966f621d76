// 🙌 Ministry Entity - Named activity group within a church
//
// A ministry owns its responsibilities and its charges (roles). Members are
// reachable only through the charges they hold.

use crate::db::{is_constraint_violation, new_id, now_rfc3339, timestamp_column};
use crate::entities::church::church_exists;
use crate::entities::member::{query_members, Member};
use crate::error::{Result, RosterError};
use crate::validation::{validate_ministry, ValidationError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

// ============================================================================
// CHARGE
// ============================================================================

/// A role within a ministry that members can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    pub ministry_id: String,
    pub name: String,
}

impl Charge {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Charge> {
        Ok(Charge {
            id: row.get(0)?,
            ministry_id: row.get(1)?,
            name: row.get(2)?,
        })
    }
}

// ============================================================================
// MINISTRY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ministry {
    pub id: String,
    pub church_id: String,
    pub name: String,
    pub responsibilities: Vec<String>,
    pub charges: Vec<Charge>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MinistryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub church_id: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    /// Names of charges created together with the ministry
    #[serde(default)]
    pub charges: Vec<String>,
}

fn name_taken() -> RosterError {
    RosterError::Validation(vec![ValidationError::new(
        "Ministry",
        "name",
        "has already been taken",
    )])
}

fn name_exists_in_church(conn: &Connection, church_id: &str, name: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM ministries WHERE church_id = ?1 AND name = ?2)",
        params![church_id, name],
        |row| row.get(0),
    )?;

    Ok(exists)
}

fn load_details(conn: &Connection, ministry: &mut Ministry) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT description FROM responsibilities WHERE ministry_id = ?1 ORDER BY rowid",
    )?;
    ministry.responsibilities = stmt
        .query_map([&ministry.id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    ministry.charges = charges_for_ministry(conn, &ministry.id)?;
    Ok(())
}

fn ministry_from_row(row: &Row<'_>) -> rusqlite::Result<Ministry> {
    Ok(Ministry {
        id: row.get(0)?,
        church_id: row.get(1)?,
        name: row.get(2)?,
        responsibilities: Vec::new(),
        charges: Vec::new(),
        created_at: timestamp_column(row, 3)?,
    })
}

// ============================================================================
// WRITES
// ============================================================================

pub fn create_ministry(conn: &Connection, form: &MinistryForm) -> Result<Ministry> {
    validate_ministry(form).map_err(RosterError::Validation)?;

    let church_id = form.church_id.trim();
    let name = form.name.trim();

    if !church_exists(conn, church_id)? {
        return Err(RosterError::Validation(vec![ValidationError::new(
            "Ministry",
            "church",
            "must exist",
        )]));
    }
    if name_exists_in_church(conn, church_id, name)? {
        return Err(name_taken());
    }

    let id = new_id();
    let tx = conn.unchecked_transaction()?;

    match tx.execute(
        "INSERT INTO ministries (id, church_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, church_id, name, now_rfc3339()],
    ) {
        Ok(_) => {}
        // Lost a race against a concurrent insert of the same name
        Err(e) if is_constraint_violation(&e) => return Err(name_taken()),
        Err(e) => return Err(e.into()),
    }

    for responsibility in form.responsibilities.iter().map(|r| r.trim()) {
        if responsibility.is_empty() {
            continue;
        }
        tx.execute(
            "INSERT INTO responsibilities (id, ministry_id, description) VALUES (?1, ?2, ?3)",
            params![new_id(), id, responsibility],
        )?;
    }

    for charge in form.charges.iter().map(|c| c.trim()) {
        if charge.is_empty() {
            continue;
        }
        tx.execute(
            "INSERT INTO charges (id, ministry_id, name) VALUES (?1, ?2, ?3)",
            params![new_id(), id, charge],
        )?;
    }

    tx.commit()?;

    tracing::info!(ministry_id = %id, church_id = %church_id, name = %name, "ministry created");

    get_ministry(conn, &id)?.ok_or_else(|| RosterError::not_found("ministry", &id))
}

pub fn add_charge(conn: &Connection, ministry_id: &str, name: &str) -> Result<Charge> {
    if get_ministry(conn, ministry_id)?.is_none() {
        return Err(RosterError::not_found("ministry", ministry_id));
    }
    if name.trim().is_empty() {
        return Err(RosterError::Validation(vec![ValidationError::new(
            "Charge",
            "name",
            "can't be blank",
        )]));
    }

    let charge = Charge {
        id: new_id(),
        ministry_id: ministry_id.to_string(),
        name: name.trim().to_string(),
    };

    conn.execute(
        "INSERT INTO charges (id, ministry_id, name) VALUES (?1, ?2, ?3)",
        params![charge.id, charge.ministry_id, charge.name],
    )?;

    Ok(charge)
}

pub fn delete_ministry(conn: &Connection, id: &str) -> Result<()> {
    let deleted = conn.execute("DELETE FROM ministries WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(RosterError::not_found("ministry", id));
    }

    tracing::info!(ministry_id = %id, "ministry destroyed");
    Ok(())
}

// ============================================================================
// READS
// ============================================================================

pub fn get_ministry(conn: &Connection, id: &str) -> Result<Option<Ministry>> {
    let ministry = conn
        .query_row(
            "SELECT id, church_id, name, created_at FROM ministries WHERE id = ?1",
            [id],
            ministry_from_row,
        )
        .optional()?;

    match ministry {
        Some(mut ministry) => {
            load_details(conn, &mut ministry)?;
            Ok(Some(ministry))
        }
        None => Ok(None),
    }
}

/// Ministries of a church; an empty list when it has none
pub fn ministries_by_church(conn: &Connection, church_id: &str) -> Result<Vec<Ministry>> {
    let mut stmt = conn.prepare(
        "SELECT id, church_id, name, created_at FROM ministries
         WHERE church_id = ?1 ORDER BY name, id",
    )?;

    let mut ministries = stmt
        .query_map([church_id], ministry_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for ministry in &mut ministries {
        load_details(conn, ministry)?;
    }

    Ok(ministries)
}

pub fn all_ministries(conn: &Connection) -> Result<Vec<Ministry>> {
    let mut stmt = conn.prepare(
        "SELECT id, church_id, name, created_at FROM ministries ORDER BY name, id",
    )?;

    let mut ministries = stmt
        .query_map([], ministry_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for ministry in &mut ministries {
        load_details(conn, ministry)?;
    }

    Ok(ministries)
}

pub fn charges_for_ministry(conn: &Connection, ministry_id: &str) -> Result<Vec<Charge>> {
    let mut stmt = conn.prepare(
        "SELECT id, ministry_id, name FROM charges WHERE ministry_id = ?1 ORDER BY name, id",
    )?;

    let charges = stmt
        .query_map([ministry_id], Charge::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(charges)
}

pub fn charge_exists(conn: &Connection, id: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM charges WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;

    Ok(exists)
}

/// Distinct members holding any charge in the ministry
pub fn ministry_members(conn: &Connection, ministry_id: &str) -> Result<Vec<Member>> {
    query_members(
        conn,
        "SELECT DISTINCT m.id, m.church_id, m.first_name, m.last_name, m.address, m.phone,
                m.email, m.birth_date, m.gender, m.status, m.country, m.created_at, m.updated_at
         FROM members m
         JOIN charge_members cm ON cm.member_id = m.id
         JOIN charges c ON c.id = cm.charge_id
         WHERE c.ministry_id = ?1
         ORDER BY m.last_name, m.first_name, m.id",
        [ministry_id],
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::entities::member::create_member;
    use crate::entities::member::tests::{church, form};
    use crate::entities::member::MemberForm;

    pub(crate) fn ministry_form(church_id: &str, name: &str) -> MinistryForm {
        MinistryForm {
            name: name.to_string(),
            church_id: church_id.to_string(),
            responsibilities: vec!["Preparar la reunión".to_string()],
            charges: vec!["Líder".to_string(), "Tesorero".to_string()],
        }
    }

    #[test]
    fn test_create_ministry_with_details() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");

        let ministry = create_ministry(&conn, &ministry_form(&church_id, "Jóvenes")).unwrap();

        assert_eq!(ministry.responsibilities, vec!["Preparar la reunión".to_string()]);
        assert_eq!(ministry.charges.len(), 2);
        assert!(ministry.charges.iter().all(|c| c.ministry_id == ministry.id));
    }

    #[test]
    fn test_ministry_requires_responsibilities_and_church() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");

        let err = create_ministry(
            &conn,
            &MinistryForm {
                responsibilities: vec![],
                ..ministry_form(&church_id, "Jóvenes")
            },
        )
        .unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "responsibilities");

        let err = create_ministry(&conn, &ministry_form("missing", "Jóvenes")).unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "church");
    }

    #[test]
    fn test_name_unique_per_church() {
        let conn = open_in_memory().unwrap();
        let central = church(&conn, "Central");
        let norte = church(&conn, "Norte");

        create_ministry(&conn, &ministry_form(&central, "Alabanza")).unwrap();

        let err = create_ministry(&conn, &ministry_form(&central, "Alabanza")).unwrap_err();
        let errors = err.validation_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].message, "has already been taken");

        assert!(create_ministry(&conn, &ministry_form(&norte, "Alabanza")).is_ok());
    }

    #[test]
    fn test_by_church() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");

        assert!(ministries_by_church(&conn, &church_id).unwrap().is_empty());

        create_ministry(&conn, &ministry_form(&church_id, "Jóvenes")).unwrap();
        assert_eq!(ministries_by_church(&conn, &church_id).unwrap().len(), 1);
        assert_eq!(all_ministries(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_members_are_distinct_through_charges() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let ministry = create_ministry(&conn, &ministry_form(&church_id, "Jóvenes")).unwrap();

        let member = create_member(
            &conn,
            &MemberForm {
                charge_ids: ministry.charges.iter().map(|c| c.id.clone()).collect(),
                ..form(&church_id, "Homero", "Simpsons")
            },
        )
        .unwrap();
        create_member(&conn, &form(&church_id, "Ned", "Flanders")).unwrap();

        let members = ministry_members(&conn, &ministry.id).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, member.id);
        assert_eq!(members[0].charge_ids.len(), 2);
    }

    #[test]
    fn test_add_charge() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let ministry = create_ministry(&conn, &ministry_form(&church_id, "Jóvenes")).unwrap();

        let charge = add_charge(&conn, &ministry.id, "Secretario").unwrap();
        assert!(charge_exists(&conn, &charge.id).unwrap());
        assert_eq!(charges_for_ministry(&conn, &ministry.id).unwrap().len(), 3);

        let err = add_charge(&conn, "missing", "Secretario").unwrap_err();
        assert!(matches!(err, RosterError::NotFound { .. }));
    }

    #[test]
    fn test_delete_ministry_drops_charge_memberships() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let ministry = create_ministry(&conn, &ministry_form(&church_id, "Jóvenes")).unwrap();
        let member = create_member(
            &conn,
            &MemberForm {
                charge_ids: vec![ministry.charges[0].id.clone()],
                ..form(&church_id, "Homero", "Simpsons")
            },
        )
        .unwrap();

        delete_ministry(&conn, &ministry.id).unwrap();

        assert!(get_ministry(&conn, &ministry.id).unwrap().is_none());
        let reloaded = crate::entities::member::get_member(&conn, &member.id).unwrap().unwrap();
        assert!(reloaded.charge_ids.is_empty());
    }
}

// 👤 Member Entity - One person tracked by a church
//
// Invariants kept by this module:
// - first and last name are always present
// - church_id always points at an existing church
// - phone, when stored, is digits only

use crate::db::{conversion_failure, format_date, new_id, now_rfc3339, parse_date, timestamp_column};
use crate::entities::church::{church_exists, country_name, DEFAULT_COUNTRY};
use crate::entities::ministry::charge_exists;
use crate::error::{Result, RosterError};
use crate::pagination::{Page, PageRequest};
use crate::status::MemberStatus;
use crate::validation::{normalize_optional_phone, validate_member, ValidationError};
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

// ============================================================================
// GENDER
// ============================================================================

/// Stored as a nullable flag: NULL = no record, 0 = male, 1 = female
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl Gender {
    pub fn from_flag(flag: Option<bool>) -> Gender {
        match flag {
            None => Gender::Unknown,
            Some(false) => Gender::Male,
            Some(true) => Gender::Female,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Gender::Unknown => None,
            Gender::Male => Some(false),
            Gender::Female => Some(true),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Unknown => "unknown",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_code(code: &str) -> Option<Gender> {
        [Gender::Unknown, Gender::Male, Gender::Female]
            .into_iter()
            .find(|g| g.code() == code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Unknown => "Sin registro",
            Gender::Male => "Masculino",
            Gender::Female => "Femenino",
        }
    }
}

/// Whole calendar years from `birth` to `today`; None for future dates
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth > today {
        return None;
    }

    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }

    u32::try_from(years).ok()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ============================================================================
// MEMBER ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub church_id: String,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    /// Digits only
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Gender,
    pub status: MemberStatus,
    /// ISO 3166-1 alpha-2
    pub country: String,
    pub charge_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whitelisted fields accepted on create and update
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MemberForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(default)]
    pub church_id: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub charge_ids: Vec<String>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// "Homero S."
    pub fn semi_full_name(&self) -> String {
        match self.last_name.chars().next() {
            Some(initial) => format!("{} {}.", self.first_name, initial),
            None => self.first_name.clone(),
        }
    }

    pub fn age(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.and_then(|birth| age_on(birth, today))
    }

    pub fn status_name(&self) -> &'static str {
        self.status.label()
    }

    pub fn country_name(&self) -> String {
        country_name(&self.country)
    }

    /// Case-insensitive substring match against first, last or full name
    pub fn matches(&self, fragment: &str) -> bool {
        let needle = fragment.to_lowercase();

        self.first_name.to_lowercase().contains(&needle)
            || self.last_name.to_lowercase().contains(&needle)
            || self.full_name().to_lowercase().contains(&needle)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
        let birth_date = match row.get::<_, Option<String>>(7)? {
            Some(raw) => Some(
                parse_date(&raw)
                    .ok_or_else(|| conversion_failure(7, format!("invalid birth date: {:?}", raw)))?,
            ),
            None => None,
        };
        let gender: Option<bool> = row.get(8)?;
        let status: String = row.get(9)?;
        let status = MemberStatus::from_code(&status)
            .ok_or_else(|| conversion_failure(9, format!("unknown status code: {:?}", status)))?;

        Ok(Member {
            id: row.get(0)?,
            church_id: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            address: row.get(4)?,
            phone: row.get(5)?,
            email: row.get(6)?,
            birth_date,
            gender: Gender::from_flag(gender),
            status,
            country: row.get(10)?,
            charge_ids: Vec::new(),
            created_at: timestamp_column(row, 11)?,
            updated_at: timestamp_column(row, 12)?,
        })
    }
}

const MEMBER_COLUMNS: &str = "id, church_id, first_name, last_name, address, phone, email,
     birth_date, gender, status, country, created_at, updated_at";

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn dedup_charges(ids: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    unique
}

/// Checks that need the database: referenced church and charges exist
fn validate_references(conn: &Connection, form: &MemberForm) -> Result<()> {
    let mut errors = Vec::new();

    if let Some(church_id) = form.church_id.as_deref() {
        if !church_exists(conn, church_id)? {
            errors.push(ValidationError::new("Member", "church", "must exist"));
        }
    }

    for charge_id in &form.charge_ids {
        if !charge_exists(conn, charge_id)? {
            errors.push(ValidationError::new(
                "Member",
                "charge_ids",
                &format!("unknown charge: {}", charge_id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RosterError::Validation(errors))
    }
}

fn validate(conn: &Connection, form: &MemberForm) -> Result<()> {
    validate_member(form).map_err(RosterError::Validation)?;
    validate_references(conn, form)
}

fn replace_charges(conn: &Connection, member_id: &str, charge_ids: &[String]) -> Result<()> {
    conn.execute("DELETE FROM charge_members WHERE member_id = ?1", [member_id])?;

    for charge_id in charge_ids {
        conn.execute(
            "INSERT INTO charge_members (charge_id, member_id) VALUES (?1, ?2)",
            params![charge_id, member_id],
        )?;
    }

    Ok(())
}

// ============================================================================
// WRITES
// ============================================================================

pub fn create_member(conn: &Connection, form: &MemberForm) -> Result<Member> {
    validate(conn, form)?;

    let id = new_id();
    let now = now_rfc3339();
    let charge_ids = dedup_charges(&form.charge_ids);

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO members (
            id, church_id, first_name, last_name, address, phone, email,
            birth_date, gender, status, country, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        params![
            id,
            form.church_id.as_deref().map(str::trim),
            form.first_name.trim(),
            form.last_name.trim(),
            clean(&form.address),
            normalize_optional_phone(form.phone.as_deref()),
            clean(&form.email),
            form.birth_date.map(format_date),
            form.gender.as_flag(),
            form.status.code(),
            clean(&form.country)
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            now,
        ],
    )?;
    replace_charges(&tx, &id, &charge_ids)?;
    tx.commit()?;

    // Welcome notification hook: delivery is handled outside this crate
    tracing::info!(member_id = %id, church_id = ?form.church_id, "member created");

    get_member(conn, &id)?.ok_or_else(|| RosterError::not_found("member", &id))
}

/// Replace every whitelisted field of an existing member
pub fn update_member(conn: &Connection, id: &str, form: &MemberForm) -> Result<Member> {
    if get_member(conn, id)?.is_none() {
        return Err(RosterError::not_found("member", id));
    }
    validate(conn, form)?;

    let charge_ids = dedup_charges(&form.charge_ids);

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE members SET
            church_id = ?2, first_name = ?3, last_name = ?4, address = ?5,
            phone = ?6, email = ?7, birth_date = ?8, gender = ?9, status = ?10,
            country = ?11, updated_at = ?12
         WHERE id = ?1",
        params![
            id,
            form.church_id.as_deref().map(str::trim),
            form.first_name.trim(),
            form.last_name.trim(),
            clean(&form.address),
            normalize_optional_phone(form.phone.as_deref()),
            clean(&form.email),
            form.birth_date.map(format_date),
            form.gender.as_flag(),
            form.status.code(),
            clean(&form.country)
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            now_rfc3339(),
        ],
    )?;
    replace_charges(&tx, id, &charge_ids)?;
    tx.commit()?;

    tracing::info!(member_id = %id, "member updated");

    get_member(conn, id)?.ok_or_else(|| RosterError::not_found("member", id))
}

pub fn delete_member(conn: &Connection, id: &str) -> Result<()> {
    let deleted = conn.execute("DELETE FROM members WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(RosterError::not_found("member", id));
    }

    tracing::info!(member_id = %id, "member destroyed");
    Ok(())
}

// ============================================================================
// READS
// ============================================================================

pub fn charge_ids_for(conn: &Connection, member_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT charge_id FROM charge_members WHERE member_id = ?1 ORDER BY charge_id",
    )?;

    let ids = stmt
        .query_map([member_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    Ok(ids)
}

fn with_charges(conn: &Connection, mut members: Vec<Member>) -> Result<Vec<Member>> {
    for member in &mut members {
        member.charge_ids = charge_ids_for(conn, &member.id)?;
    }
    Ok(members)
}

pub(crate) fn query_members(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Member>> {
    let mut stmt = conn.prepare(sql)?;
    let members = stmt
        .query_map(params, Member::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    with_charges(conn, members)
}

/// Absent member is `Ok(None)`, distinct from an error
pub fn get_member(conn: &Connection, id: &str) -> Result<Option<Member>> {
    let member = conn
        .query_row(
            &format!("SELECT {} FROM members WHERE id = ?1", MEMBER_COLUMNS),
            [id],
            Member::from_row,
        )
        .optional()?;

    match member {
        Some(mut member) => {
            member.charge_ids = charge_ids_for(conn, &member.id)?;
            Ok(Some(member))
        }
        None => Ok(None),
    }
}

/// Every member, optionally scoped to one church, in name order
pub fn all_members(conn: &Connection, church_id: Option<&str>) -> Result<Vec<Member>> {
    match church_id {
        Some(church_id) => query_members(
            conn,
            &format!(
                "SELECT {} FROM members WHERE church_id = ?1 ORDER BY last_name, first_name, id",
                MEMBER_COLUMNS
            ),
            [church_id],
        ),
        None => query_members(
            conn,
            &format!(
                "SELECT {} FROM members ORDER BY last_name, first_name, id",
                MEMBER_COLUMNS
            ),
            [],
        ),
    }
}

pub fn members_by_church(conn: &Connection, church_id: &str) -> Result<Vec<Member>> {
    all_members(conn, Some(church_id))
}

pub fn members_by_status(conn: &Connection, status: MemberStatus) -> Result<Vec<Member>> {
    query_members(
        conn,
        &format!(
            "SELECT {} FROM members WHERE status = ?1 ORDER BY last_name, first_name, id",
            MEMBER_COLUMNS
        ),
        [status.code()],
    )
}

pub fn list_members(conn: &Connection, request: PageRequest) -> Result<Page<Member>> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))?;

    let members = query_members(
        conn,
        &format!(
            "SELECT {} FROM members ORDER BY last_name, first_name, id LIMIT ?1 OFFSET ?2",
            MEMBER_COLUMNS
        ),
        params![request.limit() as i64, request.offset() as i64],
    )?;

    Ok(Page::new(members, request, u64::try_from(total).unwrap_or(0)))
}

/// All members whose first, last or full name contains `fragment`, ignoring case.
/// No match is an empty result, never an error.
pub fn search_members(conn: &Connection, fragment: &str) -> Result<Vec<Member>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM members ORDER BY last_name, first_name, id",
        MEMBER_COLUMNS
    ))?;

    let mut matching = Vec::new();
    for member in stmt.query_map([], Member::from_row)? {
        let member = member?;
        if member.matches(fragment) {
            matching.push(member);
        }
    }

    with_charges(conn, matching)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::entities::church::{create_church, ChurchForm};
    use chrono::Months;

    pub(crate) fn church(conn: &Connection, name: &str) -> String {
        create_church(
            conn,
            &ChurchForm {
                name: name.to_string(),
                country: None,
            },
        )
        .unwrap()
        .id
    }

    pub(crate) fn form(church_id: &str, first: &str, last: &str) -> MemberForm {
        MemberForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            church_id: Some(church_id.to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn years_ago(years: u32) -> NaiveDate {
        today()
            .checked_sub_months(Months::new(years * 12))
            .unwrap()
    }

    #[test]
    fn test_create_member_defaults() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");

        let member = create_member(&conn, &form(&church_id, "Homero", "Simpsons")).unwrap();

        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.status_name(), "Activo");
        assert_eq!(member.gender, Gender::Unknown);
        assert_eq!(member.country_name(), "Chile");
        assert_eq!(member.full_name(), "Homero Simpsons");
        assert_eq!(member.semi_full_name(), "Homero S.");
    }

    #[test]
    fn test_phone_is_normalized_on_save() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");

        let member = create_member(
            &conn,
            &MemberForm {
                phone: Some("34333ffd2323".to_string()),
                ..form(&church_id, "Homero", "Simpsons")
            },
        )
        .unwrap();
        assert_eq!(member.phone.as_deref(), Some("343332323"));

        let no_phone = create_member(&conn, &form(&church_id, "Marge", "Simpsons")).unwrap();
        assert_eq!(no_phone.phone, None);
    }

    #[test]
    fn test_email_is_stored_trimmed() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");

        let member = create_member(
            &conn,
            &MemberForm {
                email: Some(" homero@plantanuclear.cl ".to_string()),
                ..form(&church_id, "Homero", "Simpsons")
            },
        )
        .unwrap();
        assert_eq!(member.email.as_deref(), Some("homero@plantanuclear.cl"));
    }

    #[test]
    fn test_create_requires_existing_church() {
        let conn = open_in_memory().unwrap();

        let err = create_member(&conn, &form("missing-church", "Homero", "Simpsons")).unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "church");

        let err = create_member(
            &conn,
            &MemberForm {
                church_id: None,
                ..form("", "Homero", "Simpsons")
            },
        )
        .unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "church");
        assert_eq!(crate::db::count_rows(&conn, "members").unwrap(), 0);
    }

    #[test]
    fn test_create_rejects_missing_names() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");

        let err = create_member(&conn, &form(&church_id, "", "Simpsons")).unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "first_name");

        let err = create_member(&conn, &form(&church_id, "Homero", "")).unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "last_name");
    }

    #[test]
    fn test_create_rejects_unknown_charge() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");

        let err = create_member(
            &conn,
            &MemberForm {
                charge_ids: vec!["ghost".to_string()],
                ..form(&church_id, "Homero", "Simpsons")
            },
        )
        .unwrap_err();

        assert_eq!(err.validation_errors()[0].field, "charge_ids");
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let homer = create_member(&conn, &form(&church_id, "Homero", "Simpsons")).unwrap();
        create_member(&conn, &form(&church_id, "Ned", "Flanders")).unwrap();

        let found = search_members(&conn, "Homero").unwrap();
        assert!(found.contains(&homer));
        assert_eq!(found.len(), 1);

        assert!(!search_members(&conn, "Marge").unwrap().contains(&homer));
        assert_eq!(search_members(&conn, "omer").unwrap().len(), 1);
        assert_eq!(search_members(&conn, "HOMERO SIMP").unwrap().len(), 1);
        assert_eq!(search_members(&conn, "s").unwrap().len(), 2);
        assert!(search_members(&conn, "zzz").unwrap().is_empty());
    }

    #[test]
    fn test_search_loads_charges_of_matches() {
        use crate::entities::ministry::{create_ministry, tests::ministry_form};

        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let ministry = create_ministry(&conn, &ministry_form(&church_id, "Jóvenes")).unwrap();
        let leader = ministry.charges[0].id.clone();

        create_member(
            &conn,
            &MemberForm {
                charge_ids: vec![leader.clone()],
                ..form(&church_id, "Homero", "Simpsons")
            },
        )
        .unwrap();
        create_member(&conn, &form(&church_id, "Ned", "Flanders")).unwrap();

        let found = search_members(&conn, "homero").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].charge_ids, vec![leader]);
    }

    #[test]
    fn test_search_orders_by_last_then_first_name() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        create_member(&conn, &form(&church_id, "Marge", "Simpsons")).unwrap();
        create_member(&conn, &form(&church_id, "Homero", "Simpsons")).unwrap();
        create_member(&conn, &form(&church_id, "Maude", "Flanders")).unwrap();

        let names: Vec<String> = search_members(&conn, "s")
            .unwrap()
            .iter()
            .map(Member::full_name)
            .collect();
        assert_eq!(names, vec!["Maude Flanders", "Homero Simpsons", "Marge Simpsons"]);
    }

    #[test]
    fn test_corrupt_stored_values_are_reported() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let member = create_member(&conn, &form(&church_id, "Homero", "Simpsons")).unwrap();

        conn.execute("UPDATE members SET status = 'bogus' WHERE id = ?1", [&member.id])
            .unwrap();
        let err = get_member(&conn, &member.id).unwrap_err();
        assert!(matches!(
            err,
            RosterError::Database(rusqlite::Error::FromSqlConversionFailure(9, _, _))
        ));

        conn.execute(
            "UPDATE members SET status = 'active', created_at = 'yesterday' WHERE id = ?1",
            [&member.id],
        )
        .unwrap();
        let err = get_member(&conn, &member.id).unwrap_err();
        assert!(matches!(
            err,
            RosterError::Database(rusqlite::Error::FromSqlConversionFailure(11, _, _))
        ));
    }

    #[test]
    fn test_get_missing_member_is_none() {
        let conn = open_in_memory().unwrap();
        assert!(get_member(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_update_member() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let member = create_member(&conn, &form(&church_id, "Homero", "Simpsons")).unwrap();

        let updated = update_member(
            &conn,
            &member.id,
            &MemberForm {
                status: MemberStatus::Visitor,
                email: Some("homero@plantanuclear.cl".to_string()),
                gender: Gender::Male,
                ..form(&church_id, "Homero J.", "Simpsons")
            },
        )
        .unwrap();

        assert_eq!(updated.id, member.id);
        assert_eq!(updated.first_name, "Homero J.");
        assert_eq!(updated.status_name(), "Invitado");
        assert_eq!(updated.gender, Gender::Male);
    }

    #[test]
    fn test_failed_update_leaves_member_unchanged() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let member = create_member(&conn, &form(&church_id, "Homero", "Simpsons")).unwrap();

        let err = update_member(
            &conn,
            &member.id,
            &MemberForm {
                email: Some("invalid".to_string()),
                ..form(&church_id, "Homero", "Simpsons")
            },
        )
        .unwrap_err();

        assert_eq!(err.validation_errors()[0].field, "email");
        assert_eq!(get_member(&conn, &member.id).unwrap().unwrap(), member);
    }

    #[test]
    fn test_update_and_delete_missing_member() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");

        let err = update_member(&conn, "nope", &form(&church_id, "A", "B")).unwrap_err();
        assert!(matches!(err, RosterError::NotFound { .. }));

        let err = delete_member(&conn, "nope").unwrap_err();
        assert!(matches!(err, RosterError::NotFound { .. }));
    }

    #[test]
    fn test_delete_member() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let member = create_member(&conn, &form(&church_id, "Homero", "Simpsons")).unwrap();

        delete_member(&conn, &member.id).unwrap();
        assert!(get_member(&conn, &member.id).unwrap().is_none());
    }

    #[test]
    fn test_list_members_paginates_in_name_order() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        for i in 0..20 {
            create_member(&conn, &form(&church_id, "Socio", &format!("Apellido{:02}", i))).unwrap();
        }

        let first = list_members(&conn, PageRequest::new(Some(1), 18)).unwrap();
        assert_eq!(first.items.len(), 18);
        assert_eq!(first.total, 20);
        assert_eq!(first.items[0].last_name, "Apellido00");

        let second = list_members(&conn, PageRequest::new(Some(2), 18)).unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[1].last_name, "Apellido19");
    }

    #[test]
    fn test_members_by_status_and_church() {
        let conn = open_in_memory().unwrap();
        let central = church(&conn, "Central");
        let norte = church(&conn, "Norte");

        create_member(&conn, &form(&central, "Homero", "Simpsons")).unwrap();
        create_member(
            &conn,
            &MemberForm {
                status: MemberStatus::Deceased,
                ..form(&norte, "Abraham", "Simpsons")
            },
        )
        .unwrap();

        assert_eq!(members_by_status(&conn, MemberStatus::Deceased).unwrap().len(), 1);
        assert_eq!(members_by_church(&conn, &central).unwrap().len(), 1);
        assert_eq!(all_members(&conn, None).unwrap().len(), 2);
    }

    #[test]
    fn test_age() {
        let member_birth = years_ago(15);
        assert_eq!(age_on(member_birth, today()), Some(15));

        let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2020, 6, 14).unwrap()), Some(19));
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()), Some(20));
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()), None);
    }

    #[test]
    fn test_gender_flags() {
        for gender in [Gender::Unknown, Gender::Male, Gender::Female] {
            assert_eq!(Gender::from_flag(gender.as_flag()), gender);
        }
        assert_eq!(Gender::from_flag(Some(true)).label(), "Femenino");
        assert_eq!(Gender::from_code("male"), Some(Gender::Male));
        assert_eq!(Gender::from_code("otro"), None);
    }

    #[test]
    fn test_semi_full_name_without_last_name() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let mut member = create_member(&conn, &form(&church_id, "Homero", "Simpsons")).unwrap();
        member.last_name.clear();

        assert_eq!(member.semi_full_name(), "Homero");
    }
}

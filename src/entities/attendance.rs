// 📋 Attendance - Who showed up to a ministry meeting on a given date

use crate::db::{format_date, new_id, parse_date, timestamp_column};
use crate::entities::ministry::get_ministry;
use crate::entities::member::{get_member, query_members, Member};
use crate::error::{Result, RosterError};
use crate::validation::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: String,
    pub ministry_id: String,
    pub date: NaiveDate,
    pub member_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceForm {
    pub date: NaiveDate,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

fn present_members(conn: &Connection, attendance_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT member_id FROM member_attendances WHERE attendance_id = ?1 ORDER BY member_id",
    )?;

    let ids = stmt
        .query_map([attendance_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    Ok(ids)
}

pub fn record_attendance(
    conn: &Connection,
    ministry_id: &str,
    form: &AttendanceForm,
) -> Result<Attendance> {
    if get_ministry(conn, ministry_id)?.is_none() {
        return Err(RosterError::not_found("ministry", ministry_id));
    }

    let mut member_ids: Vec<String> = Vec::with_capacity(form.member_ids.len());
    let mut errors = Vec::new();
    for member_id in &form.member_ids {
        if member_ids.contains(member_id) {
            continue;
        }
        if get_member(conn, member_id)?.is_none() {
            errors.push(ValidationError::new(
                "Attendance",
                "member_ids",
                &format!("unknown member: {}", member_id),
            ));
        }
        member_ids.push(member_id.clone());
    }
    if !errors.is_empty() {
        return Err(RosterError::Validation(errors));
    }

    let id = new_id();
    let created_at = Utc::now();

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO attendances (id, ministry_id, date, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, ministry_id, format_date(form.date), created_at.to_rfc3339()],
    )?;
    for member_id in &member_ids {
        tx.execute(
            "INSERT INTO member_attendances (attendance_id, member_id) VALUES (?1, ?2)",
            params![id, member_id],
        )?;
    }
    tx.commit()?;

    tracing::info!(
        attendance_id = %id,
        ministry_id = %ministry_id,
        present = member_ids.len(),
        "attendance recorded"
    );

    member_ids.sort();
    Ok(Attendance {
        id,
        ministry_id: ministry_id.to_string(),
        date: form.date,
        member_ids,
        created_at,
    })
}

/// Most recent meeting first
pub fn attendances_for_ministry(conn: &Connection, ministry_id: &str) -> Result<Vec<Attendance>> {
    let mut stmt = conn.prepare(
        "SELECT id, ministry_id, date, created_at FROM attendances
         WHERE ministry_id = ?1 ORDER BY date DESC, created_at DESC",
    )?;

    let rows = stmt
        .query_map([ministry_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                timestamp_column(row, 3)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut attendances = Vec::with_capacity(rows.len());
    for (id, ministry_id, date, created_at) in rows {
        let Some(date) = parse_date(&date) else {
            tracing::warn!(attendance_id = %id, date = %date, "skipping attendance with malformed date");
            continue;
        };
        let member_ids = present_members(conn, &id)?;
        attendances.push(Attendance {
            id,
            ministry_id,
            date,
            member_ids,
            created_at,
        });
    }

    Ok(attendances)
}

/// Number of meetings (any ministry) the member attended
pub fn member_attendance_count(conn: &Connection, member_id: &str) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM member_attendances WHERE member_id = ?1",
        [member_id],
        |row| row.get(0),
    )?;

    Ok(count)
}

/// Distinct members who attended at least one meeting of the ministry
pub fn attending_members(conn: &Connection, ministry_id: &str) -> Result<Vec<Member>> {
    query_members(
        conn,
        "SELECT DISTINCT m.id, m.church_id, m.first_name, m.last_name, m.address, m.phone,
                m.email, m.birth_date, m.gender, m.status, m.country, m.created_at, m.updated_at
         FROM members m
         JOIN member_attendances ma ON ma.member_id = m.id
         JOIN attendances a ON a.id = ma.attendance_id
         WHERE a.ministry_id = ?1
         ORDER BY m.last_name, m.first_name, m.id",
        [ministry_id],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::entities::member::create_member;
    use crate::entities::member::tests::{church, form};
    use crate::entities::ministry::create_ministry;
    use crate::entities::ministry::tests::ministry_form;

    #[test]
    fn test_record_and_list_attendance() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let ministry = create_ministry(&conn, &ministry_form(&church_id, "Jóvenes")).unwrap();
        let homer = create_member(&conn, &form(&church_id, "Homero", "Simpsons")).unwrap();
        let marge = create_member(&conn, &form(&church_id, "Marge", "Simpsons")).unwrap();

        let first = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let second = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        record_attendance(
            &conn,
            &ministry.id,
            &AttendanceForm {
                date: first,
                member_ids: vec![homer.id.clone(), marge.id.clone(), homer.id.clone()],
            },
        )
        .unwrap();
        record_attendance(
            &conn,
            &ministry.id,
            &AttendanceForm {
                date: second,
                member_ids: vec![homer.id.clone()],
            },
        )
        .unwrap();

        let attendances = attendances_for_ministry(&conn, &ministry.id).unwrap();
        assert_eq!(attendances.len(), 2);
        assert_eq!(attendances[0].date, second);
        assert_eq!(attendances[1].member_ids.len(), 2);

        assert_eq!(member_attendance_count(&conn, &homer.id).unwrap(), 2);
        assert_eq!(member_attendance_count(&conn, &marge.id).unwrap(), 1);
        assert_eq!(attending_members(&conn, &ministry.id).unwrap().len(), 2);
    }

    #[test]
    fn test_attendance_rejects_unknown_member_and_ministry() {
        let conn = open_in_memory().unwrap();
        let church_id = church(&conn, "Central");
        let ministry = create_ministry(&conn, &ministry_form(&church_id, "Jóvenes")).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();

        let err = record_attendance(
            &conn,
            &ministry.id,
            &AttendanceForm {
                date,
                member_ids: vec!["ghost".to_string()],
            },
        )
        .unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "member_ids");
        assert!(attendances_for_ministry(&conn, &ministry.id).unwrap().is_empty());

        let err = record_attendance(
            &conn,
            "missing",
            &AttendanceForm {
                date,
                member_ids: vec![],
            },
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::NotFound { .. }));
    }
}

// 📊 Demographic Reports
// Buckets the member population by age range and by gender.
//
// An empty population yields a single "Sin información" bucket instead of
// zero-count buckets; the charts that consume these reports rely on it.

use crate::db::parse_date;
use crate::entities::member::{age_on, Gender};
use crate::error::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

pub const NO_INFO_LABEL: &str = "Sin información";

/// One aggregation slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub value: u64,
    pub count: u64,
    pub label: String,
}

impl Bucket {
    fn new(value: u64, count: u64, label: &str) -> Self {
        Bucket {
            value,
            count,
            label: label.to_string(),
        }
    }

    /// Stand-in result for an empty population
    pub fn no_info() -> Self {
        Bucket::new(1, 1, NO_INFO_LABEL)
    }
}

// ============================================================================
// AGE RANGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeRange {
    Child,
    Teen,
    YoungAdult,
    Adult,
    MiddleAge,
    Senior,
}

impl AgeRange {
    pub const ALL: [AgeRange; 6] = [
        AgeRange::Child,
        AgeRange::Teen,
        AgeRange::YoungAdult,
        AgeRange::Adult,
        AgeRange::MiddleAge,
        AgeRange::Senior,
    ];

    pub fn for_age(age: u32) -> AgeRange {
        match age {
            0..=12 => AgeRange::Child,
            13..=17 => AgeRange::Teen,
            18..=29 => AgeRange::YoungAdult,
            30..=44 => AgeRange::Adult,
            45..=64 => AgeRange::MiddleAge,
            _ => AgeRange::Senior,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            AgeRange::Child => 0,
            AgeRange::Teen => 1,
            AgeRange::YoungAdult => 2,
            AgeRange::Adult => 3,
            AgeRange::MiddleAge => 4,
            AgeRange::Senior => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeRange::Child => "0 a 12 años",
            AgeRange::Teen => "13 a 17 años",
            AgeRange::YoungAdult => "18 a 29 años",
            AgeRange::Adult => "30 a 44 años",
            AgeRange::MiddleAge => "45 a 64 años",
            AgeRange::Senior => "65 años o más",
        }
    }
}

/// Six age-range buckets (value = 1-based range number), followed by a
/// "Sin información" bucket only when some members lack a usable birth date.
pub fn age_buckets<I>(birth_dates: I, today: NaiveDate) -> Vec<Bucket>
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    let mut counts = [0u64; 6];
    let mut unknown = 0u64;
    let mut total = 0u64;

    for birth_date in birth_dates {
        total += 1;
        match birth_date.and_then(|birth| age_on(birth, today)) {
            Some(age) => counts[AgeRange::for_age(age).index()] += 1,
            None => unknown += 1,
        }
    }

    if total == 0 {
        return vec![Bucket::no_info()];
    }

    let mut buckets: Vec<Bucket> = AgeRange::ALL
        .iter()
        .zip(counts)
        .map(|(range, count)| Bucket::new(range.index() as u64 + 1, count, range.label()))
        .collect();

    if unknown > 0 {
        buckets.push(Bucket::new(AgeRange::ALL.len() as u64 + 1, unknown, NO_INFO_LABEL));
    }

    buckets
}

// ============================================================================
// GENDER
// ============================================================================

/// Unknown, male, female in that order; value and count both hold the tally
pub fn gender_buckets<I>(genders: I) -> Vec<Bucket>
where
    I: IntoIterator<Item = Gender>,
{
    let mut unknown = 0u64;
    let mut male = 0u64;
    let mut female = 0u64;

    for gender in genders {
        match gender {
            Gender::Unknown => unknown += 1,
            Gender::Male => male += 1,
            Gender::Female => female += 1,
        }
    }

    if unknown + male + female == 0 {
        return vec![Bucket::no_info()];
    }

    [(Gender::Unknown, unknown), (Gender::Male, male), (Gender::Female, female)]
        .into_iter()
        .map(|(gender, n)| Bucket::new(n, n, gender.label()))
        .collect()
}

// ============================================================================
// STORAGE-BACKED REPORTS
// ============================================================================

/// Age-range report over all members, or one church's members
pub fn by_range(conn: &Connection, church_id: Option<&str>, today: NaiveDate) -> Result<Vec<Bucket>> {
    let mut stmt = conn.prepare(
        "SELECT birth_date FROM members WHERE ?1 IS NULL OR church_id = ?1",
    )?;

    let birth_dates = stmt
        .query_map([church_id], |row| row.get::<_, Option<String>>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(age_buckets(
        birth_dates.iter().map(|d| d.as_deref().and_then(parse_date)),
        today,
    ))
}

/// Gender report over all members, or one church's members
pub fn by_gender(conn: &Connection, church_id: Option<&str>) -> Result<Vec<Bucket>> {
    let mut stmt = conn.prepare(
        "SELECT gender FROM members WHERE ?1 IS NULL OR church_id = ?1",
    )?;

    let genders = stmt
        .query_map([church_id], |row| row.get::<_, Option<bool>>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(gender_buckets(genders.into_iter().map(Gender::from_flag)))
}

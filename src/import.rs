// 📥 CSV Import - Bulk-load members into a church
//
// Expected header: first_name,last_name,address,phone,email,birth_date,gender,status
// Rows that fail validation are reported and skipped; the rest are inserted.

use crate::db::parse_date;
use crate::entities::member::{create_member, Gender, MemberForm};
use crate::error::{Result, RosterError};
use crate::status::MemberStatus;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberRecord {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    /// (1-based data row, reasons)
    pub rejected: Vec<(usize, Vec<ValidationError>)>,
}

fn parse_gender(raw: &str) -> Option<Gender> {
    match raw.trim().to_lowercase().as_str() {
        "" => Some(Gender::Unknown),
        "m" | "male" | "masculino" | "h" | "hombre" => Some(Gender::Male),
        "f" | "female" | "femenino" | "mujer" => Some(Gender::Female),
        _ => None,
    }
}

impl MemberRecord {
    /// Build a member form, or the reasons the row cannot become one
    pub fn to_form(&self, church_id: &str) -> std::result::Result<MemberForm, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let birth_date = match self.birth_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    errors.push(ValidationError::new("Import", "birth_date", "is not a YYYY-MM-DD date"));
                }
                parsed
            }
        };

        let gender = match parse_gender(self.gender.as_deref().unwrap_or("")) {
            Some(gender) => gender,
            None => {
                errors.push(ValidationError::new("Import", "gender", "is not recognized"));
                Gender::Unknown
            }
        };

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => MemberStatus::default(),
            Some(code) => MemberStatus::from_code(code).unwrap_or_else(|| {
                errors.push(ValidationError::new("Import", "status", "is not a known status"));
                MemberStatus::default()
            }),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(MemberForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address: self.address.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            birth_date,
            gender,
            status,
            church_id: Some(church_id.to_string()),
            country: None,
            charge_ids: Vec::new(),
        })
    }
}

pub fn read_members<R: Read>(reader: R) -> Result<Vec<MemberRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: MemberRecord = result?;
        records.push(record);
    }

    Ok(records)
}

pub fn load_members_csv(csv_path: &Path) -> Result<Vec<MemberRecord>> {
    let file = std::fs::File::open(csv_path).map_err(csv::Error::from)?;
    read_members(file)
}

pub fn import_members(
    conn: &rusqlite::Connection,
    church_id: &str,
    records: &[MemberRecord],
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        let form = match record.to_form(church_id) {
            Ok(form) => form,
            Err(errors) => {
                report.rejected.push((row, errors));
                continue;
            }
        };

        match create_member(conn, &form) {
            Ok(_) => report.inserted += 1,
            Err(RosterError::Validation(errors)) => report.rejected.push((row, errors)),
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        church_id = %church_id,
        inserted = report.inserted,
        rejected = report.rejected.len(),
        "member import finished"
    );

    Ok(report)
}

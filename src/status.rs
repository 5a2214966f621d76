// 🏷️ Status Classifier
// Maps a member's status code to the label shown to church staff

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Regular,
    Inactive,
    Visitor,
    Transferred,
    Deceased,
}

impl MemberStatus {
    /// All statuses in declaration order (the order select controls show)
    pub const ALL: [MemberStatus; 6] = [
        MemberStatus::Active,
        MemberStatus::Regular,
        MemberStatus::Inactive,
        MemberStatus::Visitor,
        MemberStatus::Transferred,
        MemberStatus::Deceased,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Regular => "regular",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Visitor => "visitor",
            MemberStatus::Transferred => "transferred",
            MemberStatus::Deceased => "deceased",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MemberStatus::Active => "Activo",
            MemberStatus::Regular => "Asistente regular",
            MemberStatus::Inactive => "Inactivo",
            MemberStatus::Visitor => "Invitado",
            MemberStatus::Transferred => "Trasladado",
            MemberStatus::Deceased => "Fallecido",
        }
    }

    pub fn from_code(code: &str) -> Option<MemberStatus> {
        MemberStatus::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemberStatus::from_code(s).ok_or_else(|| format!("Unknown status: {}", s))
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Label for a status code; unrecognized codes get an empty label
pub fn status_name_for(code: &str) -> &'static str {
    MemberStatus::from_code(code)
        .map(|status| status.label())
        .unwrap_or("")
}

/// (label, code) pairs for populating a select control
pub fn statuses_for_select() -> Vec<(&'static str, &'static str)> {
    MemberStatus::ALL
        .iter()
        .map(|status| (status.label(), status.code()))
        .collect()
}

// Church Roster - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod db;
pub mod error;
pub mod config;
pub mod status;         // Status codes and their display labels
pub mod validation;     // Pure field validation + phone normalization
pub mod pagination;
pub mod entities;       // Church, Member, Ministry, Attendance
pub mod reports;        // Age-range and gender breakdowns
pub mod import;         // CSV bulk import

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use db::{open_database, open_in_memory, setup_database};
pub use error::{Result, RosterError};
pub use config::{Config, ConfigError};
pub use status::{status_name_for, statuses_for_select, MemberStatus};
pub use validation::{
    normalize_phone, validate_member, validate_ministry, ValidationError, ValidationResult,
};
pub use pagination::{Page, PageRequest, DEFAULT_PER_PAGE};
pub use entities::{
    Attendance, AttendanceForm,
    Charge, Church, ChurchForm,
    Gender, Member, MemberForm,
    Ministry, MinistryForm,
};
pub use entities::member::{
    create_member, delete_member, get_member, list_members, search_members, update_member,
};
pub use entities::ministry::{create_ministry, ministries_by_church, ministry_members};
pub use reports::{by_gender, by_range, Bucket};
pub use import::{import_members, load_members_csv, ImportReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

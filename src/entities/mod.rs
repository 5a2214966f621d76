// Entity Models
//
// Each entity has:
// - Stable identity (UUID) that never changes
// - Plain values validated before they reach storage
// - Storage functions taking a borrowed rusqlite Connection

pub mod church;
pub mod member;
pub mod ministry;
pub mod attendance;

pub use church::{Church, ChurchForm};
pub use member::{Gender, Member, MemberForm};
pub use ministry::{Charge, Ministry, MinistryForm};
pub use attendance::{Attendance, AttendanceForm};

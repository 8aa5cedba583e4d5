use chrono::{DateTime, Utc};

use crate::models::{AttendanceRecord, IncomePayment, User};

/// Everything the desk knows. Owned by the controller; mirrored to the
/// local store after every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub users: Vec<User>,
    pub attendance: Vec<AttendanceRecord>,
    pub income: Vec<IncomePayment>,
    /// Instant of the last local save.
    pub last_backup: Option<DateTime<Utc>>,
}

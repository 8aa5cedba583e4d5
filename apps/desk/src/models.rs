use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque identifier for every locally created record.
pub fn generate_id() -> String {
    format!("_{}", Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

/// A studio member. `document` is the national ID and is unique across users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub document: String,
    pub phone: String,
    pub birthdate: String,
    pub eps: String,
    pub rh: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub class_time: String,
    pub affiliation_type: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Form input for a new member; id and creation time are assigned on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub document: String,
    pub phone: String,
    pub birthdate: String,
    pub eps: String,
    pub rh: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub class_time: String,
    pub affiliation_type: String,
    pub status: UserStatus,
}

impl NewUser {
    pub fn into_user(self, id: String, created_at: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            document: self.document,
            phone: self.phone,
            birthdate: self.birthdate,
            eps: self.eps,
            rh: self.rh,
            emergency_contact: self.emergency_contact,
            emergency_phone: self.emergency_phone,
            class_time: self.class_time,
            affiliation_type: self.affiliation_type,
            status: self.status,
            created_at,
        }
    }
}

/// Reads a calendar date that may have been saved from a cleared date input.
/// `""`, whitespace and `null` become `None`; anything else must be `YYYY-MM-DD`.
fn blank_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// One check-in. Several per user per day are allowed.
/// `date` is `None` only for records saved without a date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default, deserialize_with = "blank_date")]
    pub date: Option<NaiveDate>,
    pub timestamp: DateTime<Utc>,
}

/// A payment. Dates and amount are optional because older records may have
/// been saved with empty dates or an unparseable (`null`) amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncomePayment {
    pub id: String,
    pub user_id: String,
    #[serde(default, deserialize_with = "blank_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub amount: Option<f64>,
    pub method: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub amount: f64,
    pub method: String,
    pub description: String,
}

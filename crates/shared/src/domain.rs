use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(EmployeeId);
id_newtype!(ManagerId);

fn default_true() -> bool {
    true
}

/// One row of the directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub id: EmployeeId,
    pub name: String,
    pub department: String,
    pub position: String,
    #[serde(default)]
    pub hire_date: String,
    pub email: String,
    pub phone: String,
    #[serde(default = "default_true")]
    pub is_valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<ManagerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_valid: Option<bool>,
}

/// A single employee as returned by `GET /api/employees/{id}`: the summary
/// columns plus the lazily fetched detail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWithDetails {
    #[serde(flatten)]
    pub summary: EmployeeSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<EmployeeDetail>,
}

impl EmployeeWithDetails {
    pub fn id(&self) -> EmployeeId {
        self.summary.id
    }

    pub fn photo_url(&self) -> Option<&str> {
        self.details
            .as_ref()
            .and_then(|details| details.photo_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Returns the calendar-date part of an ISO 8601 timestamp.
pub fn date_portion(raw: &str) -> &str {
    raw.trim().split(['T', ' ']).next().unwrap_or_default()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_portion(raw), "%Y-%m-%d").ok()
}

/// `YYYY-MM-DD`, or an empty string when the value is missing or malformed.
pub fn display_date(raw: &str) -> String {
    parse_date(raw)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

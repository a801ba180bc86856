//! In-progress edits of a single employee record.

use std::{fmt, str::FromStr};

use shared::{
    domain::{date_portion, EmployeeDetail, EmployeeId, EmployeeSummary, EmployeeWithDetails},
    protocol::UpdateEmployeeRequest,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmployeeField {
    Name,
    Department,
    Position,
    HireDate,
    Email,
    Phone,
    EmploymentType,
    Notes,
}

impl EmployeeField {
    pub const ALL: [EmployeeField; 8] = [
        Self::Name,
        Self::Department,
        Self::Position,
        Self::HireDate,
        Self::Email,
        Self::Phone,
        Self::EmploymentType,
        Self::Notes,
    ];

    pub const REQUIRED: [EmployeeField; 6] = [
        Self::Name,
        Self::Department,
        Self::Position,
        Self::HireDate,
        Self::Email,
        Self::Phone,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Department => "department",
            Self::Position => "position",
            Self::HireDate => "hireDate",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::EmploymentType => "employmentType",
            Self::Notes => "notes",
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for EmployeeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown employee field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for EmployeeField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownField(wanted.to_string()))
    }
}

/// Owned working copy of a record. Nothing written here reaches the record it
/// was seeded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    draft: EmployeeWithDetails,
}

impl EditBuffer {
    pub fn from_record(record: &EmployeeWithDetails) -> Self {
        let mut draft = record.clone();
        draft.summary.hire_date = date_portion(&draft.summary.hire_date).to_string();
        draft.details.get_or_insert_with(EmployeeDetail::default);
        Self { draft }
    }

    /// Template used when adding a new employee.
    pub fn blank() -> Self {
        Self {
            draft: EmployeeWithDetails {
                summary: EmployeeSummary {
                    id: EmployeeId(0),
                    name: String::new(),
                    department: String::new(),
                    position: String::new(),
                    hire_date: String::new(),
                    email: String::new(),
                    phone: String::new(),
                    is_valid: true,
                },
                details: Some(EmployeeDetail {
                    employment_type: Some(String::new()),
                    notes: Some(String::new()),
                    ..EmployeeDetail::default()
                }),
            },
        }
    }

    pub fn draft(&self) -> &EmployeeWithDetails {
        &self.draft
    }

    pub fn get(&self, field: EmployeeField) -> &str {
        let summary = &self.draft.summary;
        let details = self.draft.details.as_ref();
        match field {
            EmployeeField::Name => &summary.name,
            EmployeeField::Department => &summary.department,
            EmployeeField::Position => &summary.position,
            EmployeeField::HireDate => &summary.hire_date,
            EmployeeField::Email => &summary.email,
            EmployeeField::Phone => &summary.phone,
            EmployeeField::EmploymentType => details
                .and_then(|d| d.employment_type.as_deref())
                .unwrap_or_default(),
            EmployeeField::Notes => details.and_then(|d| d.notes.as_deref()).unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: EmployeeField, value: impl Into<String>) {
        let value = value.into();
        let summary = &mut self.draft.summary;
        match field {
            EmployeeField::Name => summary.name = value,
            EmployeeField::Department => summary.department = value,
            EmployeeField::Position => summary.position = value,
            EmployeeField::HireDate => summary.hire_date = value,
            EmployeeField::Email => summary.email = value,
            EmployeeField::Phone => summary.phone = value,
            EmployeeField::EmploymentType => {
                self.draft
                    .details
                    .get_or_insert_with(EmployeeDetail::default)
                    .employment_type = Some(value)
            }
            EmployeeField::Notes => {
                self.draft
                    .details
                    .get_or_insert_with(EmployeeDetail::default)
                    .notes = Some(value)
            }
        }
    }

    /// Required fields that are empty or whitespace only, in form order.
    pub fn missing_required(&self) -> Vec<EmployeeField> {
        EmployeeField::REQUIRED
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }

    pub fn to_request(&self) -> UpdateEmployeeRequest {
        UpdateEmployeeRequest {
            name: self.get(EmployeeField::Name).to_string(),
            department: self.get(EmployeeField::Department).to_string(),
            position: self.get(EmployeeField::Position).to_string(),
            hire_date: date_portion(self.get(EmployeeField::HireDate)).to_string(),
            email: self.get(EmployeeField::Email).to_string(),
            phone: self.get(EmployeeField::Phone).to_string(),
            employment_type: self.get(EmployeeField::EmploymentType).to_string(),
            notes: self.get(EmployeeField::Notes).to_string(),
        }
    }
}

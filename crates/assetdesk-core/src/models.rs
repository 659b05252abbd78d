//! Records exchanged with the inventory API.
//!
//! Read types mirror the server's JSON, including the joined display fields
//! (`status`, `location`, `asset_name`, ...), which are optional because not
//! every endpoint fills them. Write payloads are separate `*Draft` types.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub type Id = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Id,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub acquisition_date: String,
    #[serde(default)]
    pub cost: f64,
    pub status_id: Id,
    #[serde(default)]
    pub status: Option<String>,
    pub current_location_id: Id,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub department_id: Option<Id>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDraft {
    pub name: String,
    pub category: String,
    pub acquisition_date: String,
    pub cost: f64,
    pub status_id: Id,
    pub current_location_id: Id,
    pub department_id: Option<Id>,
}

impl From<&Asset> for AssetDraft {
    fn from(asset: &Asset) -> Self {
        Self {
            name: asset.name.clone(),
            category: asset.category.clone(),
            acquisition_date: asset.acquisition_date.clone(),
            cost: asset.cost,
            status_id: asset.status_id,
            current_location_id: asset.current_location_id,
            department_id: asset.department_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Id,
    pub full_name: String,
    #[serde(default)]
    pub position: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department_id: Option<Id>,
    #[serde(default)]
    pub department: Option<String>,
}

/// Employee payload for create/update/register.
///
/// The password is only ever sent, never read back or stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    pub full_name: String,
    pub position: String,
    pub email: String,
    pub role: String,
    pub department_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl From<&Employee> for EmployeeDraft {
    fn from(employee: &Employee) -> Self {
        Self {
            full_name: employee.full_name.clone(),
            position: employee.position.clone(),
            email: employee.email.clone(),
            role: employee.role.clone(),
            department_id: employee.department_id,
            password: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub head_id: Option<Id>,
    #[serde(default)]
    pub head_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentDraft {
    pub name: String,
    pub location: String,
    pub head_id: Option<Id>,
}

impl From<&Department> for DepartmentDraft {
    fn from(department: &Department) -> Self {
        Self {
            name: department.name.clone(),
            location: department.location.clone(),
            head_id: department.head_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Id,
    pub asset_id: Id,
    #[serde(default)]
    pub asset_name: Option<String>,
    pub employee_id: Id,
    #[serde(default)]
    pub employee_name: Option<String>,
    pub from_location_id: Id,
    #[serde(default)]
    pub from_location: Option<String>,
    pub to_location_id: Id,
    #[serde(default)]
    pub to_location: Option<String>,
    pub transfer_date: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Transfer {
    /// Parsed `transfer_date`, if the server sent a recognizable format.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.transfer_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDraft {
    pub asset_id: Id,
    pub employee_id: Id,
    pub from_location_id: Id,
    pub to_location_id: Id,
    pub transfer_date: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: Id,
    pub address: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStatus {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsByStatusRow {
    pub status: String,
    pub count: u64,
    #[serde(default)]
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentCostRow {
    pub department: String,
    pub count: u64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub average_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub employee: Option<Employee>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Body returned by create endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Created {
    pub id: Id,
}

/// Parses the timestamp shapes the API and forms use: RFC 3339,
/// `YYYY-MM-DDTHH:MM[:SS]` and plain `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

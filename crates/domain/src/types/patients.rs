//! Patient registry (ADT) payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Administrative gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
    #[serde(rename = "U")]
    Unknown,
}

impl_domain_status_conversions!(Gender {
    Male => "M",
    Female => "F",
    Other => "O",
    Unknown => "U",
});

/// ABO/Rh blood group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl_domain_status_conversions!(BloodType {
    APositive => "A+",
    ANegative => "A-",
    BPositive => "B+",
    BNegative => "B-",
    AbPositive => "AB+",
    AbNegative => "AB-",
    OPositive => "O+",
    ONegative => "O-",
    Unknown => "UNKNOWN",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Phone,
    Email,
    Address,
    Emergency,
}

impl_domain_status_conversions!(ContactType {
    Phone => "phone",
    Email => "email",
    Address => "address",
    Emergency => "emergency",
});

/// Stored contact entry of a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientContact {
    pub id: i64,
    pub contact_type: ContactType,
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
    pub is_primary: bool,
}

/// Full patient record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    /// Medical record number assigned by the server
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub dni: Option<String>,
    #[serde(default)]
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub allergies: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub contacts: Vec<PatientContact>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn primary_contact(&self, contact_type: ContactType) -> Option<&PatientContact> {
        self.contacts.iter().find(|c| c.contact_type == contact_type && c.is_primary)
    }
}

/// Row of the paginated patient list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientListItem {
    pub id: i64,
    pub mrn: String,
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub dni: Option<String>,
    pub is_active: bool,
}

/// Contact supplied when registering a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatientContact {
    pub contact_type: ContactType,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
}

/// Body of `POST /patients`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePatient {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<BloodType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub contacts: Vec<NewPatientContact>,
}

/// Body of `PUT /patients/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePatient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<BloodType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
}

/// Query string of `GET /patients`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatientQuery {
    /// Free-text search over name, MRN and DNI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

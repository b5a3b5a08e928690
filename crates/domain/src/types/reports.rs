//! Radiology report and imaging study payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Report lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Draft,
    Preliminary,
    Final,
    Amended,
    Cancelled,
}

impl_domain_status_conversions!(ReportStatus {
    Draft => "draft",
    Preliminary => "preliminary",
    Final => "final",
    Amended => "amended",
    Cancelled => "cancelled",
});

impl ReportStatus {
    /// Signed reports are final or amended
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Final | Self::Amended)
    }
}

/// Ingestion status of a DICOM study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StudyStatus {
    Pending,
    Received,
    Processing,
    Available,
    Error,
}

impl_domain_status_conversions!(StudyStatus {
    Pending => "PENDING",
    Received => "RECEIVED",
    Processing => "PROCESSING",
    Available => "AVAILABLE",
    Error => "ERROR",
});

/// Row of `GET /reports`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportListItem {
    pub id: i64,
    pub study_id: i64,
    pub status: ReportStatus,
    #[serde(default)]
    pub signed_by: Option<String>,
    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub accession_number: Option<String>,
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_mrn: Option<String>,
}

/// Historical snapshot kept on every amendment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    pub id: i64,
    pub version_number: u32,
    #[serde(default)]
    pub findings: Option<String>,
    #[serde(default)]
    pub impression: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Full radiology report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadiologyReport {
    pub id: i64,
    pub study_id: i64,
    pub radiologist_id: i64,
    pub status: ReportStatus,
    #[serde(default)]
    pub findings: Option<String>,
    #[serde(default)]
    pub impression: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(default)]
    pub clinical_info: Option<String>,
    #[serde(default)]
    pub signature_hash: Option<String>,
    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub signed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub versions: Vec<ReportVersion>,
}

impl RadiologyReport {
    pub fn latest_version(&self) -> Option<&ReportVersion> {
        self.versions.iter().max_by_key(|v| v.version_number)
    }
}

/// Body of `POST /reports`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReport {
    pub study_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_info: Option<String>,
}

/// Body of `PUT /reports/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_info: Option<String>,
}

/// Body of `POST /reports/{id}/sign`; the server re-checks the password
#[derive(Clone, Serialize, Deserialize)]
pub struct SignReport {
    pub password: String,
}

impl std::fmt::Debug for SignReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignReport").field("password", &"<redacted>").finish()
    }
}

/// Study joined with its order, patient and report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagingStudyWithReport {
    pub id: i64,
    #[serde(default)]
    pub order_id: Option<i64>,
    pub study_instance_uid: String,
    #[serde(default)]
    pub orthanc_study_id: Option<String>,
    pub series_count: u32,
    pub instances_count: u32,
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub study_description: Option<String>,
    pub status: StudyStatus,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub accession_number: Option<String>,
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_mrn: Option<String>,
    #[serde(default)]
    pub report_id: Option<i64>,
    #[serde(default)]
    pub report_status: Option<String>,
}

impl ImagingStudyWithReport {
    /// Available study that nobody has started reporting on yet
    pub fn awaits_report(&self) -> bool {
        self.status == StudyStatus::Available && self.report_id.is_none()
    }
}

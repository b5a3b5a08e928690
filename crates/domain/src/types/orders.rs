//! Imaging order (RIS) and DICOM modality worklist payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// DICOM modality code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Cr,
    Ct,
    Mr,
    Us,
    Nm,
    Pt,
    Dx,
    Mg,
    Xa,
    Rf,
    Ot,
}

impl_domain_status_conversions!(Modality {
    Cr => "CR",
    Ct => "CT",
    Mr => "MR",
    Us => "US",
    Nm => "NM",
    Pt => "PT",
    Dx => "DX",
    Mg => "MG",
    Xa => "XA",
    Rf => "RF",
    Ot => "OT",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderPriority {
    Routine,
    Urgent,
    Stat,
    Asap,
}

impl_domain_status_conversions!(OrderPriority {
    Routine => "ROUTINE",
    Urgent => "URGENT",
    Stat => "STAT",
    Asap => "ASAP",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Requested,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    OnHold,
}

impl_domain_status_conversions!(OrderStatus {
    Requested => "REQUESTED",
    Scheduled => "SCHEDULED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
    OnHold => "ON_HOLD",
});

impl OrderStatus {
    /// Completed and cancelled orders accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Imaging order as stored by the RIS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagingOrder {
    pub id: i64,
    pub patient_id: i64,
    #[serde(default)]
    pub encounter_id: Option<i64>,
    pub accession_number: String,
    pub modality: Modality,
    #[serde(default)]
    pub procedure_code: Option<String>,
    pub procedure_description: String,
    #[serde(default)]
    pub body_part: Option<String>,
    #[serde(default)]
    pub laterality: Option<String>,
    pub priority: OrderPriority,
    pub status: OrderStatus,
    #[serde(default)]
    pub clinical_indication: Option<String>,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Entry of the DICOM modality worklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorklistEntry {
    pub id: i64,
    pub order_id: i64,
    pub accession_number: String,
    pub patient_id_dicom: String,
    pub patient_name_dicom: String,
    pub modality: String,
    pub scheduled_datetime: DateTime<Utc>,
    #[serde(default)]
    pub scheduled_station_ae_title: Option<String>,
    pub procedure_description: String,
    pub status: String,
}

/// Body of `POST /orders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub patient_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter_id: Option<i64>,
    pub modality: Modality,
    pub procedure_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<OrderPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_indication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl CreateOrder {
    pub fn new(patient_id: i64, modality: Modality, procedure_description: impl Into<String>) -> Self {
        Self {
            patient_id,
            encounter_id: None,
            modality,
            procedure_description: procedure_description.into(),
            procedure_code: None,
            body_part: None,
            priority: None,
            clinical_indication: None,
            scheduled_at: None,
        }
    }
}

/// Body of `PUT /orders/{id}/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<OrderPriority>,
}

/// Query string of `GET /orders`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<Modality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

//! Scheduling payloads: resources, free slots and appointments

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Room,
    Equipment,
    Staff,
}

impl_domain_status_conversions!(ResourceType {
    Room => "room",
    Equipment => "equipment",
    Staff => "staff",
});

/// Appointment status (FHIR appointment status codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Proposed,
    Pending,
    Booked,
    Arrived,
    Fulfilled,
    Cancelled,
    Noshow,
}

impl_domain_status_conversions!(AppointmentStatus {
    Proposed => "proposed",
    Pending => "pending",
    Booked => "booked",
    Arrived => "arrived",
    Fulfilled => "fulfilled",
    Cancelled => "cancelled",
    Noshow => "noshow",
});

/// Schedulable room, device or staff member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub resource_type: ResourceType,
    #[serde(default)]
    pub modality: Option<String>,
    /// DICOM application entity title of the modality
    #[serde(default)]
    pub ae_title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub resource_id: Option<i64>,
    pub status: AppointmentStatus,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Candidate slot computed by the server for a resource and day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub resource_id: i64,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub duration_minutes: u32,
    pub available: bool,
}

/// Body of `POST /appointments`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAppointment {
    pub patient_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<i64>,
    pub start_datetime: DateTime<Utc>,
    /// Server default is 30, accepted range 5..=480
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `PUT /appointments/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// Query string of `GET /appointments`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

/// Query string of `GET /slots`
///
/// The server reads `date` as a datetime and builds the day's slots from
/// it, so it is sent as an RFC 3339 UTC instant at midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotQuery {
    pub resource_id: i64,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

impl SlotQuery {
    /// Slots of `resource_id` on `day`, starting at UTC midnight
    pub fn for_day(resource_id: i64, day: NaiveDate, duration_minutes: Option<u32>) -> Self {
        Self { resource_id, date: day.and_time(NaiveTime::MIN).and_utc(), duration_minutes }
    }
}

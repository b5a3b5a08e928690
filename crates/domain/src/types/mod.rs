//! Domain types and models
//!
//! Wire payloads for every API area, grouped the way the REST API groups its
//! routers: auth, ADT (patients), RIS (orders, worklist), reports and
//! scheduling.

pub mod auth;
pub mod orders;
pub mod patients;
pub mod reports;
pub mod schedule;

use serde::{Deserialize, Serialize};

pub use auth::{
    CreateUser, LoginRequest, RefreshRequest, TokenResponse, UpdateUser, UserProfile, UserRole,
};
pub use orders::{
    CreateOrder, ImagingOrder, Modality, OrderPriority, OrderQuery, OrderStatus, OrderStatusUpdate,
    WorklistEntry,
};
pub use patients::{
    BloodType, ContactType, CreatePatient, Gender, NewPatientContact, Patient, PatientContact,
    PatientListItem, PatientQuery, UpdatePatient,
};
pub use reports::{
    CreateReport, ImagingStudyWithReport, RadiologyReport, ReportListItem, ReportStatus,
    ReportVersion, SignReport, StudyStatus, UpdateReport,
};
pub use schedule::{
    Appointment, AppointmentQuery, AppointmentStatus, AppointmentUpdate, CreateAppointment,
    Resource, ResourceType, SlotQuery, TimeSlot,
};

/// Page of results returned by list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub pages: u32,
}

impl<T> Paginated<T> {
    /// Whether another page follows this one
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

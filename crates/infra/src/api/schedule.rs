//! Scheduling endpoints: resources, free slots and appointments

use chrono::NaiveDate;
use hisris_domain::constants::{APPOINTMENTS_PATH, RESOURCES_PATH, SLOTS_PATH};
use hisris_domain::{
    Appointment, AppointmentQuery, AppointmentUpdate, CreateAppointment, Modality, Resource,
    SlotQuery, TimeSlot,
};
use tracing::instrument;

use super::client::ApiClient;
use super::errors::ApiError;
use super::orders::ModalityFilter;

#[derive(Debug, Clone, Copy)]
pub struct ScheduleApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn schedule(&self) -> ScheduleApi<'_> {
        ScheduleApi { client: self }
    }
}

impl ScheduleApi<'_> {
    /// Rooms and equipment, optionally restricted to one modality
    pub async fn resources(&self, modality: Option<Modality>) -> Result<Vec<Resource>, ApiError> {
        self.client.get_with_query(RESOURCES_PATH, &ModalityFilter { modality }).await
    }

    /// Free and taken slots for a resource on one day
    pub async fn slots(
        &self,
        resource_id: i64,
        date: NaiveDate,
        duration_minutes: Option<u32>,
    ) -> Result<Vec<TimeSlot>, ApiError> {
        let query = SlotQuery::for_day(resource_id, date, duration_minutes);
        self.client.get_with_query(SLOTS_PATH, &query).await
    }

    pub async fn appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<Vec<Appointment>, ApiError> {
        self.client.get_with_query(APPOINTMENTS_PATH, query).await
    }

    #[instrument(skip(self, appointment), fields(patient_id = appointment.patient_id))]
    pub async fn create_appointment(
        &self,
        appointment: &CreateAppointment,
    ) -> Result<Appointment, ApiError> {
        self.client.post(APPOINTMENTS_PATH, appointment).await
    }

    /// Reschedule, resize or change the status of an appointment
    #[instrument(skip(self, update))]
    pub async fn update_appointment(
        &self,
        id: i64,
        update: &AppointmentUpdate,
    ) -> Result<Appointment, ApiError> {
        self.client.put(&format!("{APPOINTMENTS_PATH}/{id}"), update).await
    }
}

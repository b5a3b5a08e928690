//! Patient registry endpoints

use hisris_domain::constants::PATIENTS_PATH;
use hisris_domain::{
    CreatePatient, Paginated, Patient, PatientListItem, PatientQuery, UpdatePatient,
};
use tracing::instrument;

use super::client::ApiClient;
use super::errors::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct PatientsApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn patients(&self) -> PatientsApi<'_> {
        PatientsApi { client: self }
    }
}

impl PatientsApi<'_> {
    /// Search patients by name, MRN or DNI
    pub async fn list(
        &self,
        query: &PatientQuery,
    ) -> Result<Paginated<PatientListItem>, ApiError> {
        self.client.get_with_query(PATIENTS_PATH, query).await
    }

    pub async fn get(&self, id: i64) -> Result<Patient, ApiError> {
        self.client.get(&format!("{PATIENTS_PATH}/{id}")).await
    }

    #[instrument(skip_all)]
    pub async fn create(&self, patient: &CreatePatient) -> Result<Patient, ApiError> {
        self.client.post(PATIENTS_PATH, patient).await
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: i64, changes: &UpdatePatient) -> Result<Patient, ApiError> {
        self.client.put(&format!("{PATIENTS_PATH}/{id}"), changes).await
    }

    /// Soft-delete: the server marks the patient inactive
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("{PATIENTS_PATH}/{id}")).await
    }
}

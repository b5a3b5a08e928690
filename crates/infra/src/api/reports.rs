//! Radiology report and study endpoints

use hisris_domain::constants::{REPORTS_PATH, STUDIES_PATH};
use hisris_domain::{
    CreateReport, ImagingStudyWithReport, RadiologyReport, ReportListItem, ReportStatus,
    SignReport, StudyStatus, UpdateReport,
};
use serde::Serialize;
use tracing::instrument;

use super::client::ApiClient;
use super::errors::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct ReportsApi<'a> {
    client: &'a ApiClient,
}

#[derive(Serialize)]
struct StatusFilter<S> {
    status: Option<S>,
}

impl ApiClient {
    pub fn reports(&self) -> ReportsApi<'_> {
        ReportsApi { client: self }
    }
}

impl ReportsApi<'_> {
    pub async fn list(
        &self,
        status: Option<ReportStatus>,
    ) -> Result<Vec<ReportListItem>, ApiError> {
        self.client.get_with_query(REPORTS_PATH, &StatusFilter { status }).await
    }

    pub async fn get(&self, id: i64) -> Result<RadiologyReport, ApiError> {
        self.client.get(&format!("{REPORTS_PATH}/{id}")).await
    }

    #[instrument(skip(self, report), fields(study_id = report.study_id))]
    pub async fn create(&self, report: &CreateReport) -> Result<RadiologyReport, ApiError> {
        self.client.post(REPORTS_PATH, report).await
    }

    /// Save a new draft version
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: i64,
        changes: &UpdateReport,
    ) -> Result<RadiologyReport, ApiError> {
        self.client.put(&format!("{REPORTS_PATH}/{id}"), changes).await
    }

    /// Sign a report; the server re-checks the radiologist's password.
    #[instrument(skip(self, password))]
    pub async fn sign(&self, id: i64, password: &str) -> Result<RadiologyReport, ApiError> {
        let body = SignReport { password: password.to_string() };
        self.client.post(&format!("{REPORTS_PATH}/{id}/sign"), &body).await
    }

    /// Rendered PDF of a report
    #[instrument(skip(self))]
    pub async fn download_pdf(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        self.client.get_bytes(&format!("{REPORTS_PATH}/{id}/pdf")).await
    }

    /// Received studies with the state of their report
    pub async fn list_studies(
        &self,
        status: Option<StudyStatus>,
    ) -> Result<Vec<ImagingStudyWithReport>, ApiError> {
        self.client.get_with_query(STUDIES_PATH, &StatusFilter { status }).await
    }
}

//! Imaging order and modality worklist endpoints

use hisris_domain::constants::{ORDERS_PATH, WORKLIST_PATH};
use hisris_domain::{
    CreateOrder, ImagingOrder, Modality, OrderQuery, OrderStatusUpdate, Paginated, WorklistEntry,
};
use serde::Serialize;
use tracing::instrument;

use super::client::ApiClient;
use super::errors::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct OrdersApi<'a> {
    client: &'a ApiClient,
}

/// `?modality=` filter shared by the worklist and resource listings
#[derive(Serialize)]
pub(crate) struct ModalityFilter {
    pub(crate) modality: Option<Modality>,
}

impl ApiClient {
    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi { client: self }
    }
}

impl OrdersApi<'_> {
    pub async fn list(&self, query: &OrderQuery) -> Result<Paginated<ImagingOrder>, ApiError> {
        self.client.get_with_query(ORDERS_PATH, query).await
    }

    pub async fn get(&self, id: i64) -> Result<ImagingOrder, ApiError> {
        self.client.get(&format!("{ORDERS_PATH}/{id}")).await
    }

    #[instrument(
        skip(self, order),
        fields(patient_id = order.patient_id, modality = %order.modality)
    )]
    pub async fn create(&self, order: &CreateOrder) -> Result<ImagingOrder, ApiError> {
        self.client.post(ORDERS_PATH, order).await
    }

    /// Move an order through its workflow (status, schedule, priority)
    #[instrument(skip(self, update))]
    pub async fn update_status(
        &self,
        id: i64,
        update: &OrderStatusUpdate,
    ) -> Result<ImagingOrder, ApiError> {
        self.client.put(&format!("{ORDERS_PATH}/{id}/status"), update).await
    }

    /// DICOM modality worklist, optionally for one modality
    pub async fn worklist(
        &self,
        modality: Option<Modality>,
    ) -> Result<Vec<WorklistEntry>, ApiError> {
        self.client.get_with_query(WORKLIST_PATH, &ModalityFilter { modality }).await
    }
}

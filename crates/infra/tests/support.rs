#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use hisris_core::SessionStore;
use hisris_infra::api::{ApiClient, ApiClientConfig};
use serde_json::{json, Value};
use wiremock::MockServer;

/// Path prefix the client is configured with
pub const API_PREFIX: &str = "/api/v1";

/// Delay applied to mocked refresh responses so concurrent 401s land while
/// the refresh is still in flight.
pub const REFRESH_DELAY: Duration = Duration::from_millis(300);

/// Build a client against `server` sharing `session`.
pub fn client_for(server: &MockServer, session: Arc<SessionStore>) -> ApiClient {
    let config = ApiClientConfig {
        base_url: format!("{}{}", server.uri(), API_PREFIX),
        timeout: Duration::from_secs(5),
        user_agent: "hisris-integration-test".into(),
    };
    ApiClient::new(config, session).expect("api client should build")
}

/// Store holding the given token pair.
pub fn logged_in(access: &str, refresh: &str) -> Arc<SessionStore> {
    let store = SessionStore::new();
    store.set_tokens(access, refresh);
    Arc::new(store)
}

/// `path` under the API prefix, for wiremock matchers.
pub fn api(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn tokens_json(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer",
        "expires_in": 900
    })
}

pub fn profile_json() -> Value {
    json!({
        "id": 3,
        "username": "mgarcia",
        "email": "mgarcia@ris.example.org",
        "full_name": "Marta Garcia",
        "role": "radiologist",
        "is_active": true,
        "created_at": "2024-03-01T09:30:00Z",
        "last_login": "2024-06-12T07:45:00Z"
    })
}

pub fn patient_json(id: i64) -> Value {
    json!({
        "id": id,
        "mrn": format!("MRN{id:06}"),
        "first_name": "Lucia",
        "last_name": "Fernandez",
        "full_name": "Lucia Fernandez",
        "date_of_birth": "1984-05-17",
        "gender": "F",
        "dni": "12345678Z",
        "blood_type": "A+",
        "allergies": null,
        "is_active": true,
        "contacts": [
            {
                "id": 1,
                "contact_type": "phone",
                "value": "+34 600 000 000",
                "label": null,
                "is_primary": true
            }
        ],
        "created_at": "2024-05-01T10:00:00Z"
    })
}

pub fn order_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "patient_id": 11,
        "encounter_id": null,
        "accession_number": format!("ACC{id:08}"),
        "modality": "CT",
        "procedure_code": null,
        "procedure_description": "CT head without contrast",
        "body_part": "HEAD",
        "laterality": null,
        "priority": "URGENT",
        "status": status,
        "clinical_indication": "Headache",
        "requested_at": "2024-06-01T08:00:00Z",
        "scheduled_at": null,
        "completed_at": null
    })
}

pub fn report_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "study_id": 40,
        "radiologist_id": 3,
        "status": status,
        "findings": "No acute intracranial abnormality.",
        "impression": "Normal study.",
        "recommendation": null,
        "technique": null,
        "clinical_info": null,
        "signature_hash": null,
        "signed_at": null,
        "signed_by": null,
        "created_at": "2024-06-01T09:00:00Z",
        "updated_at": "2024-06-01T09:10:00Z",
        "versions": []
    })
}

pub fn appointment_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "patient_id": 11,
        "order_id": 5,
        "resource_id": 2,
        "status": status,
        "start_datetime": "2024-06-20T10:00:00Z",
        "end_datetime": "2024-06-20T10:30:00Z",
        "duration_minutes": 30,
        "notes": null,
        "created_at": "2024-06-10T12:00:00Z"
    })
}

//! Conversions from external infrastructure errors into domain errors.

use hisris_domain::HisRisError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub HisRisError);

impl From<InfraError> for HisRisError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<HisRisError> for InfraError {
    fn from(value: HisRisError) -> Self {
        InfraError(value)
    }
}

trait IntoHisRisError {
    fn into_hisris(self) -> HisRisError;
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → HisRisError */
/* -------------------------------------------------------------------------- */

impl IntoHisRisError for std::io::Error {
    fn into_hisris(self) -> HisRisError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => HisRisError::NotFound(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                HisRisError::Storage(format!("permission denied: {self}"))
            }
            _ => HisRisError::Storage(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_hisris())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → HisRisError */
/* -------------------------------------------------------------------------- */

impl IntoHisRisError for serde_json::Error {
    fn into_hisris(self) -> HisRisError {
        if self.is_io() {
            return HisRisError::Storage(self.to_string());
        }
        HisRisError::Storage(format!(
            "malformed JSON at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_hisris())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

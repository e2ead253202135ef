use crate::core::types::{ClientId, Scope, Subject};

use super::error::ErrorResponse;

pub type VerificationError = ErrorResponse<VerificationErrorKind>;

#[derive(Debug, serde::Serialize)]
pub struct VerificationResponse {
    pub client_id: ClientId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub expires_at: u64,
    pub expires_in: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationErrorKind {
    InvalidToken,
    ServerError,
}

impl From<VerificationErrorKind> for VerificationError {
    fn from(kind: VerificationErrorKind) -> Self {
        Self::new(kind)
    }
}

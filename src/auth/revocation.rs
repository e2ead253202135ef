use super::TokenTypeHint;
use super::error::ErrorResponse;

pub type RevocationError = ErrorResponse<RevocationErrorKind>;

#[derive(Debug, serde::Deserialize)]
pub struct RevocationRequest {
    pub token: String,
    pub token_type_hint: Option<TokenTypeHint>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationErrorKind {
    InvalidRequest,
    InvalidClient,
    UnsupportedTokenType,
    ServerError,
}

impl From<RevocationErrorKind> for RevocationError {
    fn from(kind: RevocationErrorKind) -> Self {
        Self::new(kind)
    }
}

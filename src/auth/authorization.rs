use crate::auth::AccessTokenResponse;
use crate::auth::error::ErrorResponse;
use crate::core::types::{AuthCode, ClientId, RedirectUri, Scope};

use super::WithState;

pub type AuthorizationError = WithState<ErrorResponse<AuthorizationErrorKind>>;

#[derive(Debug, Clone)]
#[derive(serde::Deserialize)]
#[serde(tag = "response_type")]
pub enum AuthorizationRequest {
    #[serde(rename = "code")]
    AuthorizationCode(AuthorizationRequestData),
    #[serde(rename = "token")]
    Implicit(AuthorizationRequestData),
}

impl AuthorizationRequest {
    pub fn as_parts(&self) -> &AuthorizationRequestData {
        use AuthorizationRequest::*;

        match self {
            AuthorizationCode(data) | Implicit(data) => data,
        }
    }
}

#[derive(Debug, Clone)]
#[derive(serde::Deserialize)]
pub struct AuthorizationRequestData {
    pub client_id: ClientId,
    pub redirect_uri: RedirectUri,
    pub scope: Option<Scope>,
    pub state: Option<String>,
}

#[derive(Debug)]
#[derive(serde::Serialize)]
#[serde(untagged)]
pub enum AuthorizationResponse {
    AuthenticationCode(AuthenticationCodeResponse),
    Implicit(WithState<AccessTokenResponse>),
}

#[derive(Debug)]
#[derive(serde::Serialize)]
pub struct AuthenticationCodeResponse {
    pub code: AuthCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AuthenticationCodeResponse {
    pub fn new(code: AuthCode, state: Option<String>) -> Self {
        Self { code, state }
    }
}

#[derive(Debug, Clone)]
#[derive(serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationErrorKind {
    InvalidRequest,
    InvalidClient,
    UnauthorizedClient,
    AccessDenied,
    UnsupportedResponseType,
    InvalidScope,
    ServerError,
    TemporarilyUnavailable,
}

impl From<AuthorizationErrorKind> for ErrorResponse<AuthorizationErrorKind> {
    fn from(kind: AuthorizationErrorKind) -> Self {
        Self::new(kind)
    }
}

use crate::core::types::{AccessToken, AuthCode, RedirectUri, RefreshToken, Scope};

use super::error::ErrorResponse;

pub type AccessTokenError = ErrorResponse<AccessTokenErrorKind>;

#[derive(Debug, Clone, serde::Serialize)]
pub enum TokenType {
    Bearer,
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeHint {
    #[serde(alias = "accesstoken")]
    AccessToken,
    #[serde(alias = "refreshtoken")]
    RefreshToken,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "grant_type")]
pub enum TokenRequest {
    #[serde(rename = "authorization_code")]
    AuthenticationCode(AuthenticationCodeTokenRequest),
    #[serde(rename = "password")]
    Password(PasswordTokenRequest),
    #[serde(rename = "client_credentials")]
    ClientCredentials(ClientCredentialsTokenRequest),
    #[serde(rename = "refresh_token")]
    RefreshToken(RefreshTokenRequest),
}

#[derive(Debug, serde::Deserialize)]
pub struct AuthenticationCodeTokenRequest {
    pub redirect_uri: RedirectUri,
    pub code: AuthCode,
}

#[derive(Debug, serde::Deserialize)]
pub struct PasswordTokenRequest {
    pub username: String,
    pub password: String,
    pub scope: Option<Scope>,
}

#[derive(Debug, serde::Deserialize)]
pub struct ClientCredentialsTokenRequest {
    pub scope: Option<Scope>,
}

#[derive(Debug, serde::Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: RefreshToken,
    pub scope: Option<Scope>,
}

#[derive(serde::Serialize, Debug)]
pub struct AccessTokenResponse {
    pub access_token: AccessToken,
    pub token_type: TokenType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<RefreshToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTokenErrorKind {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    InvalidScope,
    ServerError,
}

impl From<AccessTokenErrorKind> for AccessTokenError {
    fn from(kind: AccessTokenErrorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_authorization_code_request() {
        let body = "grant_type=authorization_code&code=abc&redirect_uri=http%3A%2F%2Fexample.org%2Fcb";
        let req: TokenRequest = serde_urlencoded::from_str(body).unwrap();

        match req {
            TokenRequest::AuthenticationCode(req) => {
                assert_eq!(req.code.0, "abc");
                assert_eq!(req.redirect_uri.0, "http://example.org/cb");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn parses_password_request() {
        let body = "grant_type=password&username=foo&password=bar&scope=read%20write";
        let req: TokenRequest = serde_urlencoded::from_str(body).unwrap();

        match req {
            TokenRequest::Password(req) => {
                assert_eq!(req.username, "foo");
                assert_eq!(req.password, "bar");
                assert!(req.scope.unwrap().contains("write"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn parses_client_credentials_request() {
        let body = "grant_type=client_credentials";
        let req: TokenRequest = serde_urlencoded::from_str(body).unwrap();

        assert!(matches!(req, TokenRequest::ClientCredentials(_)));
    }

    #[test]
    fn parses_refresh_token_request() {
        let body = "grant_type=refresh_token&refresh_token=xyz";
        let req: TokenRequest = serde_urlencoded::from_str(body).unwrap();

        match req {
            TokenRequest::RefreshToken(req) => {
                assert_eq!(req.refresh_token.0, "xyz");
                assert!(req.scope.is_none());
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn rejects_missing_fields() {
        let body = "grant_type=password&username=foo";
        let req: Result<TokenRequest, _> = serde_urlencoded::from_str(body);
        assert!(req.is_err());
    }

    #[test]
    fn accepts_legacy_hint_spelling() {
        let hint: TokenTypeHint = serde_urlencoded::from_str::<Hinted>("token_type_hint=accesstoken")
            .unwrap()
            .token_type_hint;
        assert!(matches!(hint, TokenTypeHint::AccessToken));

        let hint: TokenTypeHint = serde_urlencoded::from_str::<Hinted>("token_type_hint=refresh_token")
            .unwrap()
            .token_type_hint;
        assert!(matches!(hint, TokenTypeHint::RefreshToken));
    }

    #[derive(serde::Deserialize)]
    struct Hinted {
        token_type_hint: TokenTypeHint,
    }
}

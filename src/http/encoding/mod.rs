pub mod error;
pub mod reply;

use crate::auth::{
    revocation::{RevocationError, RevocationErrorKind, RevocationRequest},
    verification::{VerificationError, VerificationErrorKind},
    AccessTokenError, AccessTokenErrorKind, AuthorizationError, AuthorizationErrorKind,
    AuthorizationRequest, ClientCredentials, TokenRequest,
};
use crate::core::types::{BearerToken, ClientId, ClientSecret};
use http_basic_auth::Credential as BasicCredentials;
use warp::hyper::body::Bytes;
use warp::{Filter, Rejection};

use self::error::AuthRejection;

/// Client credentials arrive either in an `Authorization: Basic`
/// header or as `client_id`/`client_secret` form fields. The header
/// wins when both are present.
pub fn credentials_with_body(
) -> impl Filter<Extract = ((ClientCredentials, Bytes),), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::body::bytes())
        .and_then(|header: Option<String>, body: Bytes| async move {
            let credentials = reply::accept(split_credentials(header.as_deref(), &body))?;
            Ok::<_, Rejection>((credentials, body))
        })
}

fn split_credentials(
    header: Option<&str>,
    body: &[u8],
) -> Result<ClientCredentials, AuthRejection> {
    if let Some(header) = header {
        let basic: BasicCredentials = header
            .parse()
            .map_err(|_| AuthRejection::MissingCredentials)?;

        return Ok(ClientCredentials {
            client_id: ClientId(basic.user_id),
            client_secret: ClientSecret(basic.password),
        });
    }

    let mut client_id = None;
    let mut client_secret = None;

    for (key, value) in form_urlencoded::parse(body) {
        match key.as_ref() {
            "client_id" => client_id = Some(value.into_owned()),
            "client_secret" => client_secret = Some(value.into_owned()),
            _ => {}
        }
    }

    match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => Ok(ClientCredentials {
            client_id: ClientId(client_id),
            client_secret: ClientSecret(client_secret),
        }),
        _ => Err(AuthRejection::MissingCredentials),
    }
}

pub fn bearer() -> impl Filter<Extract = (BearerToken,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(
        |header: Option<String>| async move {
            let token = header
                .as_deref()
                .and_then(BearerToken::from_header)
                .ok_or_else(|| VerificationError::from(VerificationErrorKind::InvalidToken));
            reply::accept(token)
        },
    )
}

pub fn parse_authorization_request(
    query: &str,
) -> Result<AuthorizationRequest, AuthorizationError> {
    serde_urlencoded::from_str(query).map_err(|_| {
        let raw: RawAuthorizationRequest = serde_urlencoded::from_str(query).unwrap_or_default();
        let kind = match raw.response_type.as_deref() {
            Some("code") | Some("token") | None => AuthorizationErrorKind::InvalidRequest,
            Some(_) => AuthorizationErrorKind::UnsupportedResponseType,
        };
        (kind.into(), raw.state).into()
    })
}

pub fn parse_token_request(body: &[u8]) -> Result<TokenRequest, AccessTokenError> {
    serde_urlencoded::from_bytes(body).map_err(|_| {
        let raw: RawGrantRequest = serde_urlencoded::from_bytes(body).unwrap_or_default();
        let kind = match raw.grant_type.as_deref() {
            Some("authorization_code") | Some("password") | Some("client_credentials")
            | Some("refresh_token") | None => AccessTokenErrorKind::InvalidRequest,
            Some(_) => AccessTokenErrorKind::UnsupportedGrantType,
        };
        kind.into()
    })
}

pub fn parse_revocation_request(body: &[u8]) -> Result<RevocationRequest, RevocationError> {
    serde_urlencoded::from_bytes(body).map_err(|_| {
        let raw: RawRevocationRequest = serde_urlencoded::from_bytes(body).unwrap_or_default();

        if raw.token.is_none() {
            return RevocationErrorKind::InvalidRequest.into();
        }

        match raw.token_type_hint.as_deref() {
            Some("access_token") | Some("accesstoken") | Some("refresh_token")
            | Some("refreshtoken") | None => RevocationErrorKind::InvalidRequest.into(),
            Some(_) => RevocationErrorKind::UnsupportedTokenType.into(),
        }
    })
}

#[derive(Default, serde::Deserialize)]
struct RawAuthorizationRequest {
    response_type: Option<String>,
    state: Option<String>,
}

#[derive(Default, serde::Deserialize)]
struct RawGrantRequest {
    grant_type: Option<String>,
}

#[derive(Default, serde::Deserialize)]
struct RawRevocationRequest {
    token: Option<String>,
    token_type_hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_basic_credentials() {
        // foo:bar
        let credentials = split_credentials(Some("Basic Zm9vOmJhcg=="), b"").unwrap();
        assert_eq!(credentials.client_id.0, "foo");
        assert_eq!(credentials.client_secret.0, "bar");
    }

    #[test]
    fn splits_form_credentials() {
        let body = b"grant_type=client_credentials&client_id=foo&client_secret=bar";
        let credentials = split_credentials(None, body).unwrap();
        assert_eq!(credentials.client_id.0, "foo");
        assert_eq!(credentials.client_secret.0, "bar");
    }

    #[test]
    fn rejects_missing_credentials() {
        let result = split_credentials(None, b"grant_type=client_credentials");
        assert!(matches!(result, Err(AuthRejection::MissingCredentials)));
    }

    #[test]
    fn unknown_response_type_is_flagged() {
        let query = "response_type=device&client_id=a&redirect_uri=http%3A%2F%2Fexample.org&state=xyz";
        let err = parse_authorization_request(query).unwrap_err();

        assert!(matches!(
            err.inner.kind,
            AuthorizationErrorKind::UnsupportedResponseType
        ));
        assert_eq!(err.state.as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_fields_are_a_bad_request() {
        let query = "response_type=code&client_id=a";
        let err = parse_authorization_request(query).unwrap_err();

        assert!(matches!(err.inner.kind, AuthorizationErrorKind::InvalidRequest));
    }

    #[test]
    fn unknown_grant_type_is_flagged() {
        let err = parse_token_request(b"grant_type=jwt_bearer").unwrap_err();
        assert!(matches!(err.kind, AccessTokenErrorKind::UnsupportedGrantType));

        let err = parse_token_request(b"grant_type=password").unwrap_err();
        assert!(matches!(err.kind, AccessTokenErrorKind::InvalidRequest));
    }

    #[test]
    fn unknown_hint_is_flagged() {
        let err = parse_revocation_request(b"token=abc&token_type_hint=saml").unwrap_err();
        assert!(matches!(err.kind, RevocationErrorKind::UnsupportedTokenType));

        let err = parse_revocation_request(b"token_type_hint=access_token").unwrap_err();
        assert!(matches!(err.kind, RevocationErrorKind::InvalidRequest));

        let ok = parse_revocation_request(b"token=abc&token_type_hint=refreshtoken").unwrap();
        assert!(ok.token_type_hint.is_some());
    }
}

use crate::auth::{
    revocation::{RevocationError, RevocationErrorKind},
    verification::{VerificationError, VerificationErrorKind},
    AccessTokenError, AccessTokenErrorKind, AuthorizationError, AuthorizationErrorKind,
};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use super::reply::FormEncoded;

#[derive(Debug, Clone)]
pub enum AuthRejection {
    Authorization(AuthorizationError),
    AccessToken(AccessTokenError),
    Verification(VerificationError),
    Revocation(RevocationError),
    MissingCredentials,
}

impl warp::reject::Reject for AuthRejection {}

impl From<AuthorizationError> for AuthRejection {
    fn from(error: AuthorizationError) -> Self {
        Self::Authorization(error)
    }
}

impl From<AccessTokenError> for AuthRejection {
    fn from(error: AccessTokenError) -> Self {
        Self::AccessToken(error)
    }
}

impl From<VerificationError> for AuthRejection {
    fn from(error: VerificationError) -> Self {
        Self::Verification(error)
    }
}

impl From<RevocationError> for AuthRejection {
    fn from(error: RevocationError) -> Self {
        Self::Revocation(error)
    }
}

fn authorization_status(kind: &AuthorizationErrorKind) -> StatusCode {
    match kind {
        AuthorizationErrorKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        AuthorizationErrorKind::TemporarilyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_REQUEST,
    }
}

pub async fn handle_reject(err: Rejection) -> Result<impl Reply, Rejection> {
    match err.find::<AuthRejection>() {
        Some(e) => {
            let e = e.clone();
            match e {
                AuthRejection::Authorization(e) => {
                    let status = authorization_status(&e.inner.kind);
                    Ok(warp::reply::with_status(FormEncoded::encode(e), status).into_response())
                }
                AuthRejection::AccessToken(e) => {
                    let resp = warp::reply::json(&e);
                    match e.kind {
                        AccessTokenErrorKind::InvalidClient => {
                            let resp = warp::reply::with_status(resp, StatusCode::UNAUTHORIZED);
                            Ok(warp::reply::with_header(resp, "www-authenticate", "Basic")
                                .into_response())
                        }
                        AccessTokenErrorKind::ServerError => Ok(warp::reply::with_status(
                            resp,
                            StatusCode::INTERNAL_SERVER_ERROR,
                        )
                        .into_response()),
                        _ => Ok(warp::reply::with_status(resp, StatusCode::BAD_REQUEST)
                            .into_response()),
                    }
                }
                AuthRejection::Verification(e) => {
                    let resp = warp::reply::json(&e);
                    let status = match e.kind {
                        VerificationErrorKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
                        _ => StatusCode::UNAUTHORIZED,
                    };
                    Ok(warp::reply::with_status(resp, status).into_response())
                }
                AuthRejection::Revocation(e) => {
                    let resp = warp::reply::json(&e);
                    match e.kind {
                        RevocationErrorKind::InvalidClient => {
                            let resp = warp::reply::with_status(resp, StatusCode::UNAUTHORIZED);
                            Ok(warp::reply::with_header(resp, "www-authenticate", "Basic")
                                .into_response())
                        }
                        RevocationErrorKind::ServerError => Ok(warp::reply::with_status(
                            resp,
                            StatusCode::INTERNAL_SERVER_ERROR,
                        )
                        .into_response()),
                        _ => Ok(warp::reply::with_status(resp, StatusCode::BAD_REQUEST)
                            .into_response()),
                    }
                }
                AuthRejection::MissingCredentials => {
                    let e = AccessTokenError::described(
                        AccessTokenErrorKind::InvalidClient,
                        "Client authentication required",
                    );
                    let resp = warp::reply::json(&e);
                    let resp = warp::reply::with_status(resp, StatusCode::UNAUTHORIZED);
                    Ok(warp::reply::with_header(resp, "www-authenticate", "Basic").into_response())
                }
            }
        }
        _ => Err(err),
    }
}

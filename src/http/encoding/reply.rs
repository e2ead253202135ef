use super::error::AuthRejection;
use warp::reply::{Reply, Response};
use warp::Rejection;

/// Reply whose body is a URL-encoded pair list, for the authorize surface.
pub struct FormEncoded {
    body: Result<String, ()>,
}

impl FormEncoded {
    pub fn encode(value: impl serde::Serialize) -> Self {
        Self {
            body: serde_urlencoded::to_string(value).map_err(|_| ()),
        }
    }
}

impl Reply for FormEncoded {
    fn into_response(self) -> Response {
        match self.body {
            Ok(body) => {
                let reply = warp::reply::with_header(
                    body,
                    "content-type",
                    "application/x-www-form-urlencoded",
                );
                reply.into_response()
            }
            Err(()) => warp::http::StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

fn reject(error: impl Into<AuthRejection>) -> Rejection {
    warp::reject::custom(error.into())
}

/// Lifts a parse result into the filter chain, rejecting on failure.
pub fn accept<T>(result: Result<T, impl Into<AuthRejection>>) -> Result<T, Rejection> {
    result.map_err(reject)
}

pub fn form_encode(
    value: Result<impl serde::Serialize, impl Into<AuthRejection>>,
) -> Result<impl Reply, Rejection> {
    value.map(FormEncoded::encode).map_err(reject)
}

pub fn json_encode(
    value: Result<impl serde::Serialize, impl Into<AuthRejection>>,
) -> Result<impl Reply, Rejection> {
    value.map(|value| warp::reply::json(&value)).map_err(reject)
}

pub fn empty(value: Result<(), impl Into<AuthRejection>>) -> Result<impl Reply, Rejection> {
    value.map(|_| warp::reply()).map_err(reject)
}

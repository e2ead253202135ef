use std::sync::Arc;

use warp::hyper::body::Bytes;
use warp::Filter;

use crate::auth::{ClientCredentials, Store};
use crate::http::encoding::{self, reply};
use crate::provider::OAuth2Provider;

pub fn oauth_endpoint<S: Store + Send + Sync + 'static>(
    provider: Arc<OAuth2Provider<S>>,
) -> impl warp::Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_provider = warp::any().map(move || provider.clone());

    let authorize = warp::path("authorize")
        .and(warp::get())
        .and(with_provider.clone())
        .and(
            warp::filters::query::raw()
                .or_else(|_| async move { Ok::<_, warp::Rejection>((String::new(),)) }),
        )
        .and_then(|provider: Arc<OAuth2Provider<S>>, query: String| async move {
            let req = reply::accept(encoding::parse_authorization_request(&query))?;
            // Subjects come from the embedding application; the engine
            // itself has no sessions to tie the request to.
            let result = provider.authorization_request(req, None).await;
            reply::form_encode(result)
        });

    let token = warp::path("token")
        .and(warp::post())
        .and(with_provider.clone())
        .and(encoding::credentials_with_body())
        .and_then(
            |provider: Arc<OAuth2Provider<S>>,
             (credentials, body): (ClientCredentials, Bytes)| async move {
                let req = reply::accept(encoding::parse_token_request(&body))?;
                let result = provider.access_token_request(credentials, req).await;
                reply::json_encode(result)
            },
        );

    let verify = warp::path("verify")
        .and(warp::get())
        .and(with_provider.clone())
        .and(encoding::bearer())
        .and_then(|provider: Arc<OAuth2Provider<S>>, token| async move {
            let result = provider.verification_request(token).await;
            reply::json_encode(result)
        });

    let revoke = warp::path("revoke")
        .and(warp::post())
        .and(with_provider.clone())
        .and(encoding::credentials_with_body())
        .and_then(
            |provider: Arc<OAuth2Provider<S>>,
             (credentials, body): (ClientCredentials, Bytes)| async move {
                let req = reply::accept(encoding::parse_revocation_request(&body))?;
                let result = provider.revocation_request(credentials, req).await;
                reply::empty(result)
            },
        );

    warp::path("v1").and(authorize.or(token).or(verify).or(revoke))
}

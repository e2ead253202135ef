use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use crate::auth::Store;
use crate::provider::OAuth2Provider;

mod endpoints;

use endpoints::oauth::oauth_endpoint;

use super::encoding::error::handle_reject;

#[derive(Debug)]
pub struct Server<S> {
    provider: Arc<OAuth2Provider<S>>,
    addr: SocketAddr,
}

impl<S: Store + Send + Sync + 'static> Server<S> {
    pub fn new(provider: Arc<OAuth2Provider<S>>, addr: SocketAddr) -> Self {
        Self { provider, addr }
    }

    pub async fn serve(self) {
        let oauth = warp::path("oauth").and(oauth_endpoint(self.provider));

        let routes = oauth.recover(handle_reject).with(warp::log("http-api"));

        warp::serve(routes).run(self.addr).await;
    }
}

use std::time::SystemTime;

use crate::core::models::{AccessTokenData, AuthCodeData, Client, RefreshTokenData};
use crate::core::types::{
    AccessToken, ClientId, ClientSecret, HashedAuthCode, RedirectUri, RefreshToken,
};
use crate::provider::error::Error;

pub mod access_token;
pub mod authorization;
pub mod error;
pub mod revocation;
pub mod verification;

pub use access_token::*;
pub use authorization::*;

#[derive(Debug, Clone)]
#[derive(serde::Serialize)]
pub struct WithState<T> {
    #[serde(flatten)]
    pub inner: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl<T> From<(T, Option<String>)> for WithState<T> {
    fn from((t, state): (T, Option<String>)) -> Self {
        Self { inner: t, state }
    }
}

#[derive(Debug)]
#[derive(serde::Deserialize)]
pub struct ClientCredentials {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
}

#[async_trait::async_trait]
pub trait Store {
    async fn get_client(&self, client_id: &ClientId) -> Result<Option<Client>, Error>;
    async fn put_client(&self, client: Client) -> Result<Client, Error>;

    async fn store_code(&self, data: AuthCodeData) -> Result<AuthCodeData, Error>;
    /// Atomically checks and marks the code consumed. Concurrent calls for the
    /// same code must yield exactly one `Some`.
    async fn consume_code(
        &self,
        code: &HashedAuthCode,
        client_id: &ClientId,
        redirect_uri: &RedirectUri,
        now: SystemTime,
    ) -> Result<Option<AuthCodeData>, Error>;
    async fn restore_code(&self, code: &HashedAuthCode) -> Result<(), Error>;

    async fn store_access_token(&self, data: AccessTokenData) -> Result<AccessTokenData, Error>;
    async fn get_access_token(&self, token: &AccessToken) -> Result<Option<AccessTokenData>, Error>;
    async fn revoke_access_token(
        &self,
        token: &AccessToken,
        client_id: &ClientId,
    ) -> Result<bool, Error>;

    async fn store_refresh_token(&self, data: RefreshTokenData)
        -> Result<RefreshTokenData, Error>;
    async fn get_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<Option<RefreshTokenData>, Error>;
    /// Atomically revokes the token and the access tokens linked to it,
    /// returning its data. Concurrent calls must yield exactly one `Some`.
    async fn consume_refresh_token(
        &self,
        token: &RefreshToken,
        client_id: &ClientId,
    ) -> Result<Option<RefreshTokenData>, Error>;
    async fn bind_access_token(
        &self,
        token: &RefreshToken,
        client_id: &ClientId,
        access_token: &AccessToken,
    ) -> Result<Option<RefreshTokenData>, Error>;
    async fn revoke_refresh_token(
        &self,
        token: &RefreshToken,
        client_id: &ClientId,
    ) -> Result<bool, Error>;

    async fn clean_up(&self, now: SystemTime) -> Result<(), Error>;
}

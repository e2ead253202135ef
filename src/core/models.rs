use std::collections::HashSet;
use std::time::SystemTime;

use crate::core::types::{
    AccessToken, ClientId, GrantType, HashedAuthCode, HashedClientSecret, RedirectUri,
    RefreshToken, Scope, Subject,
};

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub secret: HashedClientSecret,
    #[serde(default)]
    pub redirect_uris: HashSet<RedirectUri>,
    #[serde(default)]
    pub grant_types: HashSet<GrantType>,
}

impl Client {
    pub fn allows_redirect(&self, uri: &RedirectUri) -> bool {
        self.redirect_uris.contains(uri)
    }

    pub fn allows_grant(&self, grant: GrantType) -> bool {
        self.grant_types.contains(&grant)
    }
}

#[derive(Debug, Clone)]
pub struct AuthCodeData {
    pub code: HashedAuthCode,
    pub client_id: ClientId,
    pub redirect_uri: RedirectUri,
    pub subject: Option<Subject>,
    pub scope: Option<Scope>,
    pub issued_at: SystemTime,
    pub invalid_after: SystemTime,
    pub consumed: bool,
}

#[derive(Debug, Clone)]
pub struct AccessTokenData {
    pub token: AccessToken,
    pub client_id: ClientId,
    pub subject: Option<Subject>,
    pub scope: Option<Scope>,
    pub issued_at: SystemTime,
    pub expires_at: SystemTime,
    pub revoked: bool,
}

#[derive(Debug, Clone)]
pub struct RefreshTokenData {
    pub token: RefreshToken,
    pub client_id: ClientId,
    pub subject: Option<Subject>,
    pub scope: Option<Scope>,
    pub access_tokens: HashSet<AccessToken>,
    pub issued_at: SystemTime,
    pub revoked: bool,
}

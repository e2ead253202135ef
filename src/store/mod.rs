use std::collections::HashMap;
use std::time::SystemTime;

use tokio::sync::RwLock;
use tracing::{event, Level};

use crate::auth::Store;
use crate::core::models::{AccessTokenData, AuthCodeData, Client, RefreshTokenData};
use crate::core::types::{AccessToken, ClientId, HashedAuthCode, RedirectUri, RefreshToken};
use crate::provider::error::Error;

/// Single-process [`Store`] backed by in-memory maps. Mutations take a
/// write lock on the affected map, so checks and updates happen as one
/// step.
#[derive(Debug, Default)]
pub struct MemoryStore {
    clients: RwLock<HashMap<ClientId, Client>>,
    codes: RwLock<HashMap<HashedAuthCode, AuthCodeData>>,
    access_tokens: RwLock<HashMap<AccessToken, AccessTokenData>>,
    refresh_tokens: RwLock<HashMap<RefreshToken, RefreshTokenData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn get_client(&self, client_id: &ClientId) -> Result<Option<Client>, Error> {
        let clients = self.clients.read().await;
        Ok(clients.get(client_id).cloned())
    }

    async fn put_client(&self, client: Client) -> Result<Client, Error> {
        let mut clients = self.clients.write().await;
        clients.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    async fn store_code(&self, data: AuthCodeData) -> Result<AuthCodeData, Error> {
        let mut codes = self.codes.write().await;
        codes.insert(data.code.clone(), data.clone());
        Ok(data)
    }

    async fn consume_code(
        &self,
        code: &HashedAuthCode,
        client_id: &ClientId,
        redirect_uri: &RedirectUri,
        now: SystemTime,
    ) -> Result<Option<AuthCodeData>, Error> {
        let mut codes = self.codes.write().await;

        match codes.get_mut(code) {
            Some(data)
                if !data.consumed
                    && data.invalid_after > now
                    && &data.client_id == client_id
                    && &data.redirect_uri == redirect_uri =>
            {
                data.consumed = true;
                Ok(Some(data.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn restore_code(&self, code: &HashedAuthCode) -> Result<(), Error> {
        let mut codes = self.codes.write().await;
        if let Some(data) = codes.get_mut(code) {
            data.consumed = false;
        }
        Ok(())
    }

    async fn store_access_token(&self, data: AccessTokenData) -> Result<AccessTokenData, Error> {
        let mut tokens = self.access_tokens.write().await;
        tokens.insert(data.token.clone(), data.clone());
        Ok(data)
    }

    async fn get_access_token(
        &self,
        token: &AccessToken,
    ) -> Result<Option<AccessTokenData>, Error> {
        let tokens = self.access_tokens.read().await;
        Ok(tokens.get(token).cloned())
    }

    async fn revoke_access_token(
        &self,
        token: &AccessToken,
        client_id: &ClientId,
    ) -> Result<bool, Error> {
        let mut tokens = self.access_tokens.write().await;

        match tokens.get_mut(token) {
            Some(data) if &data.client_id == client_id => {
                data.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn store_refresh_token(
        &self,
        data: RefreshTokenData,
    ) -> Result<RefreshTokenData, Error> {
        let mut tokens = self.refresh_tokens.write().await;
        tokens.insert(data.token.clone(), data.clone());
        Ok(data)
    }

    async fn get_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<Option<RefreshTokenData>, Error> {
        let tokens = self.refresh_tokens.read().await;
        Ok(tokens.get(token).cloned())
    }

    async fn consume_refresh_token(
        &self,
        token: &RefreshToken,
        client_id: &ClientId,
    ) -> Result<Option<RefreshTokenData>, Error> {
        // Lock order: refresh tokens before access tokens.
        let mut tokens = self.refresh_tokens.write().await;

        let data = match tokens.get_mut(token) {
            Some(data) if !data.revoked && &data.client_id == client_id => {
                data.revoked = true;
                data.clone()
            }
            _ => return Ok(None),
        };

        let mut access_tokens = self.access_tokens.write().await;
        for linked in &data.access_tokens {
            if let Some(access) = access_tokens.get_mut(linked) {
                access.revoked = true;
            }
        }

        Ok(Some(data))
    }

    async fn bind_access_token(
        &self,
        token: &RefreshToken,
        client_id: &ClientId,
        access_token: &AccessToken,
    ) -> Result<Option<RefreshTokenData>, Error> {
        let mut tokens = self.refresh_tokens.write().await;

        match tokens.get_mut(token) {
            Some(data) if !data.revoked && &data.client_id == client_id => {
                data.access_tokens.insert(access_token.clone());
                Ok(Some(data.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn revoke_refresh_token(
        &self,
        token: &RefreshToken,
        client_id: &ClientId,
    ) -> Result<bool, Error> {
        // Lock order: refresh tokens before access tokens.
        let mut tokens = self.refresh_tokens.write().await;

        let data = match tokens.get_mut(token) {
            Some(data) if &data.client_id == client_id => {
                data.revoked = true;
                data.clone()
            }
            _ => return Ok(false),
        };

        let mut access_tokens = self.access_tokens.write().await;
        for linked in &data.access_tokens {
            if let Some(access) = access_tokens.get_mut(linked) {
                access.revoked = true;
            }
        }

        Ok(true)
    }

    async fn clean_up(&self, now: SystemTime) -> Result<(), Error> {
        // Tokens are flagged, never deleted. Only expired codes are
        // dropped.
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, data| data.invalid_after > now);
        let removed = before - codes.len();

        if removed > 0 {
            event!(Level::DEBUG, removed, "Dropped expired authorization codes");
        }

        Ok(())
    }
}

pub async fn seed_clients<S: Store>(store: &S, path: &str) -> Result<usize, Error> {
    let contents = std::fs::read_to_string(path)?;
    let clients: Vec<Client> = serde_json::from_str(&contents)?;

    let mut count = 0;
    for client in clients {
        store.put_client(client).await?;
        count += 1;
    }

    event!(Level::INFO, count, path, "Loaded client registrations");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    fn code_data(code: &str, client: &str, uri: &str, expires_in: Duration) -> AuthCodeData {
        let now = SystemTime::now();
        AuthCodeData {
            code: HashedAuthCode(code.to_string()),
            client_id: ClientId(client.to_string()),
            redirect_uri: RedirectUri(uri.to_string()),
            subject: None,
            scope: None,
            issued_at: now,
            invalid_after: now + expires_in,
            consumed: false,
        }
    }

    fn access_data(token: &str, client: &str) -> AccessTokenData {
        let now = SystemTime::now();
        AccessTokenData {
            token: AccessToken(token.to_string()),
            client_id: ClientId(client.to_string()),
            subject: None,
            scope: None,
            issued_at: now,
            expires_at: now + Duration::from_secs(3600),
            revoked: false,
        }
    }

    fn refresh_data(token: &str, client: &str, linked: &[&str]) -> RefreshTokenData {
        RefreshTokenData {
            token: RefreshToken(token.to_string()),
            client_id: ClientId(client.to_string()),
            subject: None,
            scope: None,
            access_tokens: linked
                .iter()
                .map(|t| AccessToken(t.to_string()))
                .collect(),
            issued_at: SystemTime::now(),
            revoked: false,
        }
    }

    #[tokio::test]
    async fn a_code_is_consumed_exactly_once() {
        let store = MemoryStore::new();
        let data = code_data("c1", "confidential", "http://example.org", Duration::from_secs(600));
        store.store_code(data.clone()).await.unwrap();

        let now = SystemTime::now();
        let first = store
            .consume_code(&data.code, &data.client_id, &data.redirect_uri, now)
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .consume_code(&data.code, &data.client_id, &data.redirect_uri, now)
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn a_mismatched_consume_leaves_the_code_intact() {
        let store = MemoryStore::new();
        let data = code_data("c1", "confidential", "http://example.org", Duration::from_secs(600));
        store.store_code(data.clone()).await.unwrap();

        let now = SystemTime::now();
        let wrong_uri = RedirectUri("http://evil.example".to_string());
        let miss = store
            .consume_code(&data.code, &data.client_id, &wrong_uri, now)
            .await
            .unwrap();
        assert!(miss.is_none());

        let wrong_client = ClientId("someone-else".to_string());
        let miss = store
            .consume_code(&data.code, &wrong_client, &data.redirect_uri, now)
            .await
            .unwrap();
        assert!(miss.is_none());

        let hit = store
            .consume_code(&data.code, &data.client_id, &data.redirect_uri, now)
            .await
            .unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn an_expired_code_cannot_be_consumed() {
        let store = MemoryStore::new();
        let data = code_data("c1", "confidential", "http://example.org", Duration::from_secs(600));
        store.store_code(data.clone()).await.unwrap();

        let later = SystemTime::now() + Duration::from_secs(601);
        let miss = store
            .consume_code(&data.code, &data.client_id, &data.redirect_uri, later)
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn clean_up_drops_only_expired_codes() {
        let store = MemoryStore::new();
        let live = code_data("live", "confidential", "http://example.org", Duration::from_secs(600));
        let dead = code_data("dead", "confidential", "http://example.org", Duration::from_secs(0));
        store.store_code(live.clone()).await.unwrap();
        store.store_code(dead.clone()).await.unwrap();
        store
            .store_access_token(access_data("t1", "confidential"))
            .await
            .unwrap();

        store
            .clean_up(SystemTime::now() + Duration::from_secs(1))
            .await
            .unwrap();

        let codes = store.codes.read().await;
        assert!(codes.contains_key(&live.code));
        assert!(!codes.contains_key(&dead.code));
        drop(codes);

        // Tokens survive clean-up even after expiry.
        let token = store
            .get_access_token(&AccessToken("t1".to_string()))
            .await
            .unwrap();
        assert!(token.is_some());
    }

    #[tokio::test]
    async fn consuming_a_refresh_token_revokes_its_access_tokens() {
        let store = MemoryStore::new();
        store
            .store_access_token(access_data("t1", "confidential"))
            .await
            .unwrap();
        store
            .store_refresh_token(refresh_data("r1", "confidential", &["t1"]))
            .await
            .unwrap();

        let client = ClientId("confidential".to_string());
        let token = RefreshToken("r1".to_string());

        let consumed = store.consume_refresh_token(&token, &client).await.unwrap();
        assert!(consumed.is_some());

        let access = store
            .get_access_token(&AccessToken("t1".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert!(access.revoked);

        // Spent tokens stay spent.
        let again = store.consume_refresh_token(&token, &client).await.unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn revocation_is_scoped_to_the_owning_client() {
        let store = MemoryStore::new();
        store
            .store_access_token(access_data("t1", "confidential"))
            .await
            .unwrap();

        let stranger = ClientId("someone-else".to_string());
        let token = AccessToken("t1".to_string());

        let revoked = store.revoke_access_token(&token, &stranger).await.unwrap();
        assert!(!revoked);

        let data = store.get_access_token(&token).await.unwrap().unwrap();
        assert!(!data.revoked);

        let owner = ClientId("confidential".to_string());
        let revoked = store.revoke_access_token(&token, &owner).await.unwrap();
        assert!(revoked);
    }
}

use std::collections::HashSet;
use std::time::SystemTime;

use crate::auth::{
    AccessTokenError, AccessTokenErrorKind, AccessTokenResponse,
    AuthenticationCodeTokenRequest, ClientCredentials, ClientCredentialsTokenRequest,
    PasswordTokenRequest, RefreshTokenRequest, Store, TokenRequest,
};
use crate::core::models::{AccessTokenData, Client, RefreshTokenData};
use crate::core::types::{ClientId, GrantType, Scope, Subject};
use crate::provider::error::Error;

use super::{OAuth2Provider, RefreshRotation, TokenService};

use tracing::{event, Level};

impl<S: Store> OAuth2Provider<S> {
    #[tracing::instrument(skip_all, fields(client_id = ?credentials.client_id))]
    pub async fn access_token_request(
        &self,
        credentials: ClientCredentials,
        req: TokenRequest,
    ) -> Result<AccessTokenResponse, AccessTokenError> {
        event!(Level::TRACE, "Handling access token request");
        let client = self.check_client_authentication(&credentials).await?;

        use TokenRequest::*;

        match req {
            AuthenticationCode(req) => self.authorization_code_grant(&client, req).await,
            Password(req) => self.password_grant(&client, req).await,
            ClientCredentials(req) => self.client_credentials_grant(&client, req).await,
            RefreshToken(req) => self.refresh_token_grant(&client, req).await,
        }
    }

    async fn authorization_code_grant(
        &self,
        client: &Client,
        req: AuthenticationCodeTokenRequest,
    ) -> Result<AccessTokenResponse, AccessTokenError> {
        event!(Level::TRACE, "Handling authorization_code grant");
        self.require_grant(client, GrantType::AuthorizationCode)?;

        let hashed_code = self.hasher.hash_without_salt(&req.code);
        let now = SystemTime::now();

        let data = self
            .store
            .consume_code(&hashed_code, &client.id, &req.redirect_uri, now)
            .await
            .map_err(|_| AccessTokenErrorKind::ServerError)?
            .ok_or(AccessTokenErrorKind::InvalidGrant)?;

        let response = self
            .issue_token_pair(&client.id, data.subject, data.scope, now, true)
            .await;

        match response {
            Ok(response) => Ok(response),
            Err(e) => {
                event!(Level::ERROR, error = %e, "Failed to issue tokens, restoring code");
                self.store.restore_code(&hashed_code).await.ok();
                Err(AccessTokenErrorKind::ServerError.into())
            }
        }
    }

    async fn password_grant(
        &self,
        client: &Client,
        req: PasswordTokenRequest,
    ) -> Result<AccessTokenResponse, AccessTokenError> {
        event!(Level::TRACE, "Handling password grant");
        self.require_grant(client, GrantType::Password)?;

        let check = match &self.password_check {
            Some(check) => check,
            None => {
                event!(Level::WARN, "Password grant enabled without a password check");
                return Err(AccessTokenErrorKind::UnsupportedGrantType.into());
            }
        };

        if !check(&req.username, &req.password) {
            event!(Level::WARN, "Password check failed");
            return Err(AccessTokenErrorKind::InvalidGrant.into());
        }

        let subject = Some(Subject(req.username));
        let now = SystemTime::now();

        self.issue_token_pair(&client.id, subject, req.scope, now, true)
            .await
            .map_err(|_| AccessTokenErrorKind::ServerError.into())
    }

    async fn client_credentials_grant(
        &self,
        client: &Client,
        req: ClientCredentialsTokenRequest,
    ) -> Result<AccessTokenResponse, AccessTokenError> {
        event!(Level::TRACE, "Handling client_credentials grant");
        self.require_grant(client, GrantType::ClientCredentials)?;

        let now = SystemTime::now();

        self.issue_token_pair(&client.id, None, req.scope, now, false)
            .await
            .map_err(|_| AccessTokenErrorKind::ServerError.into())
    }

    async fn refresh_token_grant(
        &self,
        client: &Client,
        req: RefreshTokenRequest,
    ) -> Result<AccessTokenResponse, AccessTokenError> {
        event!(Level::TRACE, "Handling refresh_token grant");

        let data = self
            .store
            .get_refresh_token(&req.refresh_token)
            .await
            .map_err(|_| AccessTokenErrorKind::ServerError)?
            .ok_or(AccessTokenErrorKind::InvalidGrant)?;

        if data.revoked {
            return Err(AccessTokenErrorKind::InvalidGrant.into());
        }

        if data.client_id != client.id {
            event!(
                Level::WARN,
                original_client_id = ?data.client_id,
                refresh_client_id = ?client.id,
                "client_ids do not match"
            );
            return Err(AccessTokenErrorKind::InvalidGrant.into());
        }

        let scope = match req.scope {
            Some(requested) => {
                let allowed = data
                    .scope
                    .as_ref()
                    .map(|granted| granted.contains_all(&requested))
                    .unwrap_or(false);

                if !allowed {
                    // This scope was not in the original grant
                    return Err(AccessTokenErrorKind::InvalidScope.into());
                }
                Some(requested)
            }
            None => data.scope.clone(),
        };

        let now = SystemTime::now();
        let access_token = self.tokens.new_access_token();

        let access_data = AccessTokenData {
            token: access_token.clone(),
            client_id: client.id.clone(),
            subject: data.subject.clone(),
            scope: scope.clone(),
            issued_at: now,
            expires_at: self.tokens.expiry_for(now),
            revoked: false,
        };

        self.store
            .store_access_token(access_data)
            .await
            .map_err(|_| AccessTokenErrorKind::ServerError)?;

        let refresh_token = match self.rotation {
            RefreshRotation::Rotate => {
                let replacement = self.tokens.new_refresh_token();
                let mut access_tokens = HashSet::new();
                access_tokens.insert(access_token.clone());

                let replacement_data = RefreshTokenData {
                    token: replacement.clone(),
                    client_id: client.id.clone(),
                    subject: data.subject.clone(),
                    scope: data.scope.clone(),
                    access_tokens,
                    issued_at: now,
                    revoked: false,
                };

                self.store
                    .store_refresh_token(replacement_data)
                    .await
                    .map_err(|_| AccessTokenErrorKind::ServerError)?;

                // The exchange commits when the presented token is
                // consumed. A concurrent exchange may have won instead.
                let consumed = self
                    .store
                    .consume_refresh_token(&req.refresh_token, &client.id)
                    .await
                    .map_err(|_| AccessTokenErrorKind::ServerError)?;

                if consumed.is_none() {
                    if let Err(e) = self
                        .store
                        .revoke_refresh_token(&replacement, &client.id)
                        .await
                    {
                        event!(Level::WARN, error = ?e, "Failed to revoke replacement token");
                    }
                    return Err(AccessTokenErrorKind::InvalidGrant.into());
                }

                replacement
            }
            RefreshRotation::Reuse => {
                let bound = self
                    .store
                    .bind_access_token(&req.refresh_token, &client.id, &access_token)
                    .await
                    .map_err(|_| AccessTokenErrorKind::ServerError)?;

                if bound.is_none() {
                    if let Err(e) = self
                        .store
                        .revoke_access_token(&access_token, &client.id)
                        .await
                    {
                        event!(Level::WARN, error = ?e, "Failed to revoke unbound access token");
                    }
                    return Err(AccessTokenErrorKind::InvalidGrant.into());
                }

                req.refresh_token
            }
        };

        event!(Level::DEBUG, client_id = ?client.id, "Refresh token exchanged");

        Ok(AccessTokenResponse {
            access_token,
            token_type: TokenService::token_type(),
            refresh_token: Some(refresh_token),
            expires_in: Some(self.tokens.lifetime_secs()),
            scope,
        })
    }

    async fn issue_token_pair(
        &self,
        client_id: &ClientId,
        subject: Option<Subject>,
        scope: Option<Scope>,
        now: SystemTime,
        with_refresh: bool,
    ) -> Result<AccessTokenResponse, Error> {
        let access_token = self.tokens.new_access_token();

        let access_data = AccessTokenData {
            token: access_token.clone(),
            client_id: client_id.clone(),
            subject: subject.clone(),
            scope: scope.clone(),
            issued_at: now,
            expires_at: self.tokens.expiry_for(now),
            revoked: false,
        };

        self.store.store_access_token(access_data).await?;

        let refresh_token = if with_refresh {
            let refresh_token = self.tokens.new_refresh_token();
            let mut access_tokens = HashSet::new();
            access_tokens.insert(access_token.clone());

            let refresh_data = RefreshTokenData {
                token: refresh_token.clone(),
                client_id: client_id.clone(),
                subject,
                scope: scope.clone(),
                access_tokens,
                issued_at: now,
                revoked: false,
            };

            if let Err(e) = self.store.store_refresh_token(refresh_data).await {
                if let Err(revoke_err) = self
                    .store
                    .revoke_access_token(&access_token, client_id)
                    .await
                {
                    event!(Level::WARN, error = ?revoke_err, "Failed to revoke orphaned token");
                }
                return Err(e);
            }

            Some(refresh_token)
        } else {
            None
        };

        Ok(AccessTokenResponse {
            access_token,
            token_type: TokenService::token_type(),
            refresh_token,
            expires_in: Some(self.tokens.lifetime_secs()),
            scope,
        })
    }
}

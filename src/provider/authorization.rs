use std::time::SystemTime;

use crate::{
    auth::{
        AccessTokenResponse, AuthenticationCodeResponse, AuthorizationError,
        AuthorizationErrorKind, AuthorizationRequest, AuthorizationResponse, Store,
    },
    core::models::{AccessTokenData, AuthCodeData},
    core::types::{GrantType, Subject},
    provider::error::ResultExt,
};

use tracing::{event, Level};

use super::{OAuth2Provider, TokenService};

impl<S: Store> OAuth2Provider<S> {
    #[tracing::instrument(skip_all)]
    pub async fn authorization_request(
        &self,
        req: AuthorizationRequest,
        subject: Option<Subject>,
    ) -> Result<AuthorizationResponse, AuthorizationError> {
        let parts = req.as_parts().clone();
        let state = parts.state.clone();

        if !parts.redirect_uri.is_valid() {
            event!(Level::WARN, redirect_uri = ?parts.redirect_uri, "Malformed redirect URI");
            return Err(AuthorizationErrorKind::InvalidRequest.into()).add_state_context(&state);
        }

        let client = self
            .store
            .get_client(&parts.client_id)
            .await
            .map_err(|_| AuthorizationErrorKind::ServerError.into())
            .add_state_context(&state)?;

        let client = match client {
            Some(client) => client,
            None => {
                event!(Level::WARN, client_id = ?parts.client_id, "Unknown client");
                return Err(AuthorizationErrorKind::InvalidClient.into())
                    .add_state_context(&state);
            }
        };

        if !client.allows_redirect(&parts.redirect_uri) {
            event!(
                Level::WARN,
                client_id = ?client.id,
                redirect_uri = ?parts.redirect_uri,
                "Redirect URI not registered for client"
            );
            return Err(AuthorizationErrorKind::InvalidRequest.into()).add_state_context(&state);
        }

        let grant = match &req {
            AuthorizationRequest::AuthorizationCode(_) => GrantType::AuthorizationCode,
            AuthorizationRequest::Implicit(_) => GrantType::Implicit,
        };

        if !self.grant_types.contains(&grant) {
            event!(Level::WARN, grant = ?grant, "Grant type disabled by configuration");
            return Err(AuthorizationErrorKind::UnsupportedResponseType.into())
                .add_state_context(&state);
        }

        if !client.allows_grant(grant) {
            event!(
                Level::WARN,
                client_id = ?client.id,
                grant = ?grant,
                "Grant type not registered for client"
            );
            return Err(AuthorizationErrorKind::UnauthorizedClient.into())
                .add_state_context(&state);
        }

        match req {
            AuthorizationRequest::AuthorizationCode(_) => {
                let code = self.codes.new_code();
                let hashed_code = self.hasher.hash_without_salt(&code);

                let now = SystemTime::now();
                let data = AuthCodeData {
                    code: hashed_code,
                    client_id: client.id.clone(),
                    redirect_uri: parts.redirect_uri.clone(),
                    subject,
                    scope: parts.scope.clone(),
                    issued_at: now,
                    invalid_after: self.codes.expiry_for(now),
                    consumed: false,
                };

                self.store
                    .store_code(data)
                    .await
                    .map_err(|_| AuthorizationErrorKind::ServerError.into())
                    .add_state_context(&state)?;

                event!(Level::DEBUG, client_id = ?client.id, "Issuing authorization code");

                Ok(AuthorizationResponse::AuthenticationCode(
                    AuthenticationCodeResponse::new(code, state),
                ))
            }
            AuthorizationRequest::Implicit(_) => {
                let now = SystemTime::now();
                let access_token = self.tokens.new_access_token();

                let data = AccessTokenData {
                    token: access_token.clone(),
                    client_id: client.id.clone(),
                    subject,
                    scope: parts.scope.clone(),
                    issued_at: now,
                    expires_at: self.tokens.expiry_for(now),
                    revoked: false,
                };

                self.store
                    .store_access_token(data)
                    .await
                    .map_err(|_| AuthorizationErrorKind::ServerError.into())
                    .add_state_context(&state)?;

                event!(Level::DEBUG, client_id = ?client.id, "Issuing implicit access token");

                let response = AccessTokenResponse {
                    access_token,
                    token_type: TokenService::token_type(),
                    refresh_token: None,
                    expires_in: Some(self.tokens.lifetime_secs()),
                    scope: parts.scope,
                };

                Ok(AuthorizationResponse::Implicit((response, state).into()))
            }
        }
    }
}

use crate::auth::{
    revocation::{RevocationError, RevocationErrorKind, RevocationRequest},
    AccessTokenErrorKind, ClientCredentials, Store, TokenTypeHint,
};
use crate::core::types::{AccessToken, ClientId, RefreshToken};

use super::OAuth2Provider;

use tracing::{event, Level};

impl<S: Store> OAuth2Provider<S> {
    #[tracing::instrument(skip_all, fields(client_id = ?credentials.client_id))]
    pub async fn revocation_request(
        &self,
        credentials: ClientCredentials,
        request: RevocationRequest,
    ) -> Result<(), RevocationError> {
        self.check_client_authentication(&credentials)
            .await
            .map_err(|e| match e.kind {
                AccessTokenErrorKind::ServerError => RevocationErrorKind::ServerError,
                _ => RevocationErrorKind::InvalidClient,
            })?;

        // The access token map is consulted first regardless of hint.
        let found = self
            .revoke_access(&request.token, &credentials.client_id)
            .await?;

        let try_refresh =
            matches!(request.token_type_hint, Some(TokenTypeHint::RefreshToken)) || !found;

        if try_refresh {
            self.revoke_refresh(&request.token, &credentials.client_id)
                .await?;
        }

        Ok(())
    }

    async fn revoke_access(
        &self,
        token: &str,
        client_id: &ClientId,
    ) -> Result<bool, RevocationError> {
        let token = AccessToken(token.to_string());

        let revoked = self
            .store
            .revoke_access_token(&token, client_id)
            .await
            .map_err(|e| {
                event!(Level::ERROR, error = %e, "Access token revocation failed");
                RevocationErrorKind::ServerError
            })?;

        if revoked {
            event!(Level::DEBUG, "Revoked access token");
        }

        Ok(revoked)
    }

    async fn revoke_refresh(
        &self,
        token: &str,
        client_id: &ClientId,
    ) -> Result<bool, RevocationError> {
        let token = RefreshToken(token.to_string());

        let revoked = self
            .store
            .revoke_refresh_token(&token, client_id)
            .await
            .map_err(|e| {
                event!(Level::ERROR, error = %e, "Refresh token revocation failed");
                RevocationErrorKind::ServerError
            })?;

        if revoked {
            event!(Level::DEBUG, "Revoked refresh token");
        }

        Ok(revoked)
    }
}

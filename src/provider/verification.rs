use std::time::{Duration, SystemTime};

use crate::auth::{
    verification::{VerificationError, VerificationErrorKind, VerificationResponse},
    Store,
};
use crate::core::types::{unix_secs, AccessToken, BearerToken};
use crate::provider::error::VerifyFailure;

use super::OAuth2Provider;

use tracing::{event, Level};

impl<S: Store> OAuth2Provider<S> {
    #[tracing::instrument(skip_all)]
    pub async fn verification_request(
        &self,
        token: BearerToken,
    ) -> Result<VerificationResponse, VerificationError> {
        let token = AccessToken(token.0);

        let data = self.store.get_access_token(&token).await.map_err(|e| {
            event!(Level::ERROR, error = %e, "Access token lookup failed");
            VerificationErrorKind::ServerError
        })?;

        let now = SystemTime::now();

        let failure = match data {
            None => VerifyFailure::Missing,
            Some(data) => {
                if data.expires_at <= now {
                    VerifyFailure::Expired
                } else if data.revoked {
                    VerifyFailure::Revoked
                } else {
                    return Ok(VerificationResponse {
                        client_id: data.client_id,
                        subject: data.subject,
                        scope: data.scope,
                        expires_at: unix_secs(data.expires_at),
                        expires_in: data
                            .expires_at
                            .duration_since(now)
                            .unwrap_or(Duration::from_secs(0))
                            .as_secs(),
                    });
                }
            }
        };

        event!(Level::DEBUG, reason = ?failure, "Rejecting bearer token");
        Err(VerificationErrorKind::InvalidToken.into())
    }
}

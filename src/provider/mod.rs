use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{event, Level};

use crate::auth::{AccessTokenError, AccessTokenErrorKind, ClientCredentials, Store, TokenType};
use crate::core::models::Client;
use crate::core::types::{AccessToken, AuthCode, GrantType, RefreshToken};
use crate::http::server::Server;
use crate::store::{seed_clients, MemoryStore};
use crate::util::hash::HashingService;
use crate::util::random::OpaqueGenerator;

mod access_token;
mod authorization;
pub mod error;
mod revocation;
mod verification;

pub use error::Error;

/// A username and password checker, injected by the embedding
/// application. The engine never inspects passwords itself.
pub type PasswordCheck = Box<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// What happens to a refresh token once it has been exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRotation {
    /// Every exchange invalidates the presented token and issues a
    /// replacement.
    Rotate,
    /// The presented token stays valid and is re-bound to the freshly
    /// issued access token.
    Reuse,
}

pub struct ProviderOptions {
    pub token_lifetime: Duration,
    pub code_lifetime: Duration,
    pub grant_types: HashSet<GrantType>,
    pub rotation: RefreshRotation,
    pub password_check: Option<PasswordCheck>,
    pub generator: OpaqueGenerator,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        // The password grant stays off until a check is injected.
        let grant_types = [
            GrantType::AuthorizationCode,
            GrantType::Implicit,
            GrantType::ClientCredentials,
        ]
        .iter()
        .copied()
        .collect();

        Self {
            token_lifetime: Duration::from_secs(60 * 60),
            code_lifetime: Duration::from_secs(10 * 60),
            grant_types,
            rotation: RefreshRotation::Rotate,
            password_check: None,
            generator: OpaqueGenerator::default(),
        }
    }
}

impl std::fmt::Debug for ProviderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProviderOptions {{ ... }}")
    }
}

pub struct OAuth2Provider<S> {
    store: S,
    hasher: HashingService,
    codes: CodeService,
    tokens: TokenService,
    grant_types: HashSet<GrantType>,
    rotation: RefreshRotation,
    password_check: Option<PasswordCheck>,
}

impl<S> std::fmt::Debug for OAuth2Provider<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OAuth2Provider {{ ... }}")
    }
}

impl<S: Store> OAuth2Provider<S> {
    pub fn new(store: S, hasher: HashingService, options: ProviderOptions) -> Self {
        let codes = CodeService::new(options.generator.clone(), options.code_lifetime);
        let tokens = TokenService::new(options.generator, options.token_lifetime);

        Self {
            store,
            hasher,
            codes,
            tokens,
            grant_types: options.grant_types,
            rotation: options.rotation,
            password_check: options.password_check,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) async fn check_client_authentication(
        &self,
        cred: &ClientCredentials,
    ) -> Result<Client, AccessTokenError> {
        let client = match self.store.get_client(&cred.client_id).await {
            Ok(client) => client,
            Err(e) => {
                event!(Level::ERROR, error = %e, "Client lookup failed");
                return Err(AccessTokenErrorKind::ServerError.into());
            }
        };

        match client {
            Some(c) => {
                let result = self
                    .hasher
                    .verify(&cred.client_secret, &c.secret)
                    .unwrap_or(false);
                if result {
                    return Ok(c);
                }
                event!(Level::DEBUG, "Client secret mismatch");
            }
            None => {
                event!(Level::DEBUG, "Unknown client");
            }
        }

        Err(AccessTokenError::described(
            AccessTokenErrorKind::InvalidClient,
            "Bad authentication",
        ))
    }

    pub(crate) fn require_grant(
        &self,
        client: &Client,
        grant: GrantType,
    ) -> Result<(), AccessTokenError> {
        if !self.grant_types.contains(&grant) {
            event!(Level::WARN, grant = ?grant, "Grant type disabled by configuration");
            return Err(AccessTokenErrorKind::UnsupportedGrantType.into());
        }

        if !client.allows_grant(grant) {
            event!(
                Level::WARN,
                client_id = ?client.id,
                grant = ?grant,
                "Grant type not registered for client"
            );
            return Err(AccessTokenErrorKind::UnauthorizedClient.into());
        }

        Ok(())
    }

    pub async fn start_clean_up_worker(&self) -> Result<(), Error> {
        use tokio::time::interval;

        let mut interval = interval(Duration::from_secs(15));

        loop {
            interval.tick().await;
            self.store.clean_up(SystemTime::now()).await?
        }
    }
}

#[derive(Debug)]
pub struct CodeService {
    generator: OpaqueGenerator,
    lifetime: Duration,
}

impl CodeService {
    pub fn new(generator: OpaqueGenerator, lifetime: Duration) -> Self {
        Self {
            generator,
            lifetime,
        }
    }

    pub fn new_code(&self) -> AuthCode {
        self.generator.auth_code()
    }

    pub fn expiry_for(&self, now: SystemTime) -> SystemTime {
        now.checked_add(self.lifetime).unwrap_or(now)
    }
}

#[derive(Debug)]
pub struct TokenService {
    generator: OpaqueGenerator,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(generator: OpaqueGenerator, lifetime: Duration) -> Self {
        Self {
            generator,
            lifetime,
        }
    }

    pub fn token_type() -> TokenType {
        TokenType::Bearer
    }

    pub fn new_access_token(&self) -> AccessToken {
        self.generator.access_token()
    }

    pub fn new_refresh_token(&self) -> RefreshToken {
        self.generator.refresh_token()
    }

    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime.as_secs()
    }

    pub fn expiry_for(&self, now: SystemTime) -> SystemTime {
        now.checked_add(self.lifetime).unwrap_or(now)
    }
}

async fn sekimorid(config: Config) -> Result<(), Error> {
    let store = MemoryStore::new();
    seed_clients(&store, &config.clients_file).await?;

    let hasher = HashingService::with_secret_key(config.hash_secret);

    let mut options = ProviderOptions::default();
    if let Some(secs) = config.token_lifetime_secs {
        options.token_lifetime = Duration::from_secs(secs);
    }
    if let Some(grant_types) = config.grant_types {
        options.grant_types = grant_types;
    }

    let provider = Arc::new(OAuth2Provider::new(store, hasher, options));

    let _clean_up = {
        let provider = Arc::clone(&provider);
        tokio::spawn(async move { provider.start_clean_up_worker().await })
    };

    let server = Server::new(provider, config.bind_addr);
    server.serve().await;
    Ok(())
}

#[derive(Debug)]
pub struct Config {
    bind_addr: SocketAddr,
    hash_secret: String,
    clients_file: String,
    token_lifetime_secs: Option<u64>,
    grant_types: Option<HashSet<GrantType>>,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .map(|addr| addr.parse().expect("Bad BIND_ADDR"))
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8001)));

        let token_lifetime_secs = std::env::var("TOKEN_LIFETIME_SECS")
            .ok()
            .map(|secs| secs.parse().expect("Bad TOKEN_LIFETIME_SECS"));

        let grant_types = std::env::var("GRANT_TYPES").ok().map(|list| {
            list.split(',')
                .map(|grant| grant.trim().parse().expect("Bad GRANT_TYPES"))
                .collect()
        });

        Self {
            bind_addr,
            hash_secret: std::env::var("HASH_SECRET").expect("Supply HASH_SECRET"),
            clients_file: std::env::var("CLIENTS_FILE").expect("Supply CLIENTS_FILE"),
            token_lifetime_secs,
            grant_types,
        }
    }
}

pub async fn main() -> Result<(), ()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();
    let config = Config::from_env();
    sekimorid(config).await.map_err(|e| {
        event!(Level::ERROR, error = %e, "Fatal error");
    })
}

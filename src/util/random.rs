use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::core::types::{AccessToken, AuthCode, ClientSecret, RefreshToken};

/// Source of token randomness. Production code uses the operating
/// system RNG; tests may inject a predictable source.
pub trait Entropy: Send + Sync {
    fn fill(&self, buf: &mut [u8]);
}

#[derive(Debug, Default)]
pub struct SystemEntropy;

impl Entropy for SystemEntropy {
    fn fill(&self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }
}

#[derive(Clone)]
pub struct OpaqueGenerator {
    entropy: Arc<dyn Entropy>,
}

impl std::fmt::Debug for OpaqueGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpaqueGenerator {{ ... }}")
    }
}

impl Default for OpaqueGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemEntropy))
    }
}

impl OpaqueGenerator {
    pub fn new(entropy: Arc<dyn Entropy>) -> Self {
        Self { entropy }
    }

    fn opaque(&self, len: usize) -> String {
        let mut buf = vec![0u8; len];
        self.entropy.fill(&mut buf);
        base64::encode_config(buf, base64::URL_SAFE_NO_PAD)
    }

    pub fn auth_code(&self) -> AuthCode {
        AuthCode(self.opaque(32))
    }

    pub fn access_token(&self) -> AccessToken {
        AccessToken(self.opaque(32))
    }

    pub fn refresh_token(&self) -> RefreshToken {
        RefreshToken(self.opaque(48))
    }

    pub fn client_secret(&self) -> ClientSecret {
        ClientSecret(self.opaque(32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ZeroEntropy;

    impl Entropy for ZeroEntropy {
        fn fill(&self, buf: &mut [u8]) {
            for b in buf.iter_mut() {
                *b = 0;
            }
        }
    }

    #[test]
    fn tokens_are_url_safe() {
        let generator = OpaqueGenerator::default();
        let token = generator.access_token();

        assert!(token
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn tokens_carry_at_least_128_bits() {
        let generator = OpaqueGenerator::default();

        // 32 and 48 raw bytes, before encoding.
        assert!(generator.access_token().0.len() >= 43);
        assert!(generator.refresh_token().0.len() >= 64);
        assert!(generator.auth_code().0.len() >= 43);
    }

    #[test]
    fn consecutive_tokens_differ() {
        let generator = OpaqueGenerator::default();
        assert_ne!(generator.access_token(), generator.access_token());
    }

    #[test]
    fn an_injected_source_makes_tokens_predictable() {
        let generator = OpaqueGenerator::new(Arc::new(ZeroEntropy));
        let token = generator.access_token();

        assert_eq!(token.0, "A".repeat(43));
        assert_eq!(generator.access_token(), token);
    }
}

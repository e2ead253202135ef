use crate::core::types::{AuthCode, ClientSecret, HashedAuthCode, HashedClientSecret};

#[derive(Debug)]
pub struct Salt(pub String);

impl Salt {
    fn generate() -> Self {
        use rand::Rng;

        let salt: String = rand::thread_rng()
            .sample_iter(rand::distributions::Alphanumeric)
            .take(16)
            .map(|b| b as char)
            .collect();
        Self(salt)
    }
}

#[derive(Debug)]
pub struct HashingService {
    secret_key: String,
}

pub trait HashTo: AsRef<str> {
    type HashedType;
}

impl HashTo for ClientSecret {
    type HashedType = HashedClientSecret;
}

impl HashTo for AuthCode {
    type HashedType = HashedAuthCode;
}

impl HashingService {
    pub fn with_secret_key(secret_key: String) -> Self {
        Self { secret_key }
    }

    fn get_config(&self) -> argon2::Config {
        let mut config = argon2::Config::default();
        config.secret = self.secret_key.as_bytes();
        config
    }

    pub fn hash<T, H>(&self, to_hash: &T) -> Result<H, ()>
    where
        T: HashTo<HashedType = H>,
        H: From<String>,
    {
        let s = to_hash.as_ref();
        let salt = Salt::generate();
        let hash = argon2::hash_encoded(s.as_bytes(), salt.0.as_bytes(), &self.get_config())
            .map_err(|_| ())?;

        Ok(hash.into())
    }

    pub fn verify<T, H>(&self, secret: &T, hashed: &H) -> Result<bool, ()>
    where
        T: HashTo<HashedType = H>,
        H: AsRef<str>,
    {
        let hashed = hashed.as_ref();
        argon2::verify_encoded_ext(
            hashed,
            secret.as_ref().as_bytes(),
            self.secret_key.as_bytes(),
            &[],
        )
        .map_err(|_| ())
    }

    /// Codes are looked up by value, so they are digested without a
    /// per-entry salt to keep the digest stable.
    pub fn hash_without_salt<T, H>(&self, to_hash: &T) -> H
    where
        T: HashTo<HashedType = H>,
        H: From<String>,
    {
        use sha2::Digest;

        let to_hash = to_hash.as_ref();
        let digest = sha2::Sha512::digest(to_hash.as_bytes());
        let hash = base64::encode_config(digest, base64::URL_SAFE);
        hash.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_a_hashed_secret() {
        let service = HashingService::with_secret_key("key".to_string());
        let secret = ClientSecret("hunter2".to_string());

        let hashed: HashedClientSecret = service.hash(&secret).unwrap();
        assert!(service.verify(&secret, &hashed).unwrap());

        let wrong = ClientSecret("hunter3".to_string());
        assert!(!service.verify(&wrong, &hashed).unwrap());
    }

    #[test]
    fn a_different_service_key_rejects_the_secret() {
        let service = HashingService::with_secret_key("key".to_string());
        let secret = ClientSecret("hunter2".to_string());
        let hashed: HashedClientSecret = service.hash(&secret).unwrap();

        let other = HashingService::with_secret_key("other-key".to_string());
        assert!(!other.verify(&secret, &hashed).unwrap());
    }

    #[test]
    fn unsalted_digests_are_stable() {
        let service = HashingService::with_secret_key("key".to_string());

        let a: HashedAuthCode = service.hash_without_salt(&AuthCode("code".to_string()));
        let b: HashedAuthCode = service.hash_without_salt(&AuthCode("code".to_string()));
        let c: HashedAuthCode = service.hash_without_salt(&AuthCode("other".to_string()));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

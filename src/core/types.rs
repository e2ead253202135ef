use std::{
    collections::HashSet,
    str::FromStr,
    time::{Duration, SystemTime},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    #[serde(rename = "implicit_grant")]
    Implicit,
    Password,
    ClientCredentials,
}

impl FromStr for GrantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization_code" => Ok(Self::AuthorizationCode),
            "implicit_grant" | "implicit" => Ok(Self::Implicit),
            "password" => Ok(Self::Password),
            "client_credentials" => Ok(Self::ClientCredentials),
            other => Err(format!("unknown grant type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope(HashSet<String>);

impl Scope {
    pub fn from_parts(parts: Vec<String>) -> Self {
        Self(parts.into_iter().collect())
    }

    pub fn from_delimited_parts(parts: &str) -> Self {
        Self(parts.split(' ').map(str::to_string).collect())
    }

    pub fn as_joined(&self) -> String {
        self.0.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    pub fn contains_all(&self, other: &Scope) -> bool {
        self.0.is_superset(&other.0)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(|parts| Self::from_delimited_parts(&parts))
    }
}

impl Serialize for Scope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_joined())
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl FromStr for ClientId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct RedirectUri(pub String);

impl RedirectUri {
    pub fn is_valid(&self) -> bool {
        url::Url::parse(&self.0).is_ok()
    }
}

impl FromStr for RedirectUri {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(pub String);

impl AsRef<str> for ClientSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct HashedClientSecret(pub String);

impl From<String> for HashedClientSecret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for HashedClientSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AuthCode(pub String);

impl AsRef<str> for AuthCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashedAuthCode(pub String);

impl From<String> for HashedAuthCode {
    fn from(from: String) -> Self {
        Self(from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct Subject(pub String);

#[derive(Debug)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn from_header(header: &str) -> Option<Self> {
        match header.split_once("Bearer ") {
            Some(("", token)) => Some(Self(token.to_string())),
            _ => None,
        }
    }
}

pub fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_equality_ignores_order() {
        let lhs = Scope::from_delimited_parts("read write");
        let rhs = Scope::from_parts(vec!["write".to_string(), "read".to_string()]);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn scope_narrowing() {
        let granted = Scope::from_delimited_parts("read write");
        let narrower = Scope::from_delimited_parts("read");
        let wider = Scope::from_delimited_parts("read admin");

        assert!(granted.contains_all(&narrower));
        assert!(!granted.contains_all(&wider));
    }

    #[test]
    fn bearer_token_from_header() {
        let token = BearerToken::from_header("Bearer abc123");
        assert_eq!(token.unwrap().0, "abc123");

        assert!(BearerToken::from_header("Basic abc123").is_none());
        assert!(BearerToken::from_header("bearer abc123").is_none());
        assert!(BearerToken::from_header("xBearer abc123").is_none());
    }

    #[test]
    fn grant_type_from_str() {
        assert_eq!(
            "authorization_code".parse::<GrantType>(),
            Ok(GrantType::AuthorizationCode)
        );
        assert_eq!("implicit_grant".parse::<GrantType>(), Ok(GrantType::Implicit));
        assert!("hybrid".parse::<GrantType>().is_err());
    }
}

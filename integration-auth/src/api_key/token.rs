//! Workspace API key format.
//!
//! A key is `tap_<live|test>_<secret>` where the secret is 32 random bytes encoded as
//! unpadded base64url. Only the SHA-256 digest of the whole token is ever stored.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{ApiKeyErrorKind, Error};

pub const TOKEN_PREFIX: &str = "tap";

const SECRET_BYTES: usize = 32;

// Characters of the secret kept in the displayable prefix
const DISPLAY_SECRET_CHARS: usize = 4;

/// Which environment a key was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Live,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Live => "live",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "live" => Ok(Environment::Live),
            "test" => Ok(Environment::Test),
            other => Err(Error::api_key(
                ApiKeyErrorKind::InvalidEnvironment,
                &format!("'{other}'"),
            )),
        }
    }
}

/// A syntactically valid key presented by a caller.
#[derive(Debug, Clone)]
pub struct ApiKeyToken {
    environment: Environment,
    token: SecretString,
}

impl ApiKeyToken {
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Digest used for the stored-key lookup.
    pub fn hash(&self) -> String {
        hash_api_key(self.token.expose_secret())
    }
}

/// A freshly minted key. `token` must be handed to the caller once and then dropped.
#[derive(Debug)]
pub struct GeneratedApiKey {
    pub token: SecretString,
    pub prefix: String,
    pub hash: String,
    pub environment: Environment,
}

/// Mints a new key for the given environment.
pub fn generate(environment: Environment) -> GeneratedApiKey {
    let mut secret = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut secret);

    let token = format!(
        "{TOKEN_PREFIX}_{}_{}",
        environment.as_str(),
        URL_SAFE_NO_PAD.encode(secret)
    );
    let prefix_len = TOKEN_PREFIX.len() + environment.as_str().len() + 2 + DISPLAY_SECRET_CHARS;
    let prefix = token[..prefix_len].to_string();
    let hash = hash_api_key(&token);

    GeneratedApiKey {
        token: SecretString::new(token),
        prefix,
        hash,
        environment,
    }
}

/// Lowercase hex SHA-256 of the full token string.
pub fn hash_api_key(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Validates the shape of a bare token.
pub fn parse(token: &str) -> Result<ApiKeyToken, Error> {
    // The secret is base64url, which may itself contain '_'
    let mut parts = token.splitn(3, '_');
    let (prefix, environment, secret) = match (parts.next(), parts.next(), parts.next()) {
        (Some(prefix), Some(environment), Some(secret)) => (prefix, environment, secret),
        _ => {
            return Err(Error::api_key(
                ApiKeyErrorKind::InvalidFormat,
                "API key must look like tap_<env>_<secret>",
            ))
        }
    };

    if prefix != TOKEN_PREFIX {
        return Err(Error::api_key(
            ApiKeyErrorKind::InvalidFormat,
            "API key has an unknown prefix",
        ));
    }

    let environment = environment.parse::<Environment>()?;

    if secret.is_empty() || URL_SAFE_NO_PAD.decode(secret).is_err() {
        return Err(Error::api_key(
            ApiKeyErrorKind::InvalidFormat,
            "API key secret is not base64url",
        ));
    }

    Ok(ApiKeyToken {
        environment,
        token: SecretString::new(token.to_string()),
    })
}

/// Extracts and validates a key from an `Authorization` header value.
pub fn parse_bearer(header: &str) -> Result<ApiKeyToken, Error> {
    let (scheme, token) = header.trim().split_once(' ').ok_or_else(|| {
        Error::api_key(
            ApiKeyErrorKind::InvalidFormat,
            "Authorization header is not a bearer token",
        )
    })?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Error::api_key(
            ApiKeyErrorKind::InvalidFormat,
            "Authorization header is not a bearer token",
        ));
    }

    parse(token.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_generate_produces_parseable_live_key() {
        let key = generate(Environment::Live);
        let token = key.token.expose_secret();

        assert!(token.starts_with("tap_live_"));
        // 32 bytes of unpadded base64url is 43 characters
        assert_eq!(token.len(), "tap_live_".len() + 43);
        assert_eq!(key.prefix.len(), "tap_live_".len() + 4);
        assert!(token.starts_with(&key.prefix));

        let parsed = parse(token).unwrap();
        assert_eq!(parsed.environment(), Environment::Live);
        assert_eq!(parsed.hash(), key.hash);
    }

    #[test]
    fn test_generate_test_environment() {
        let key = generate(Environment::Test);
        assert!(key.token.expose_secret().starts_with("tap_test_"));
        assert_eq!(key.environment, Environment::Test);
    }

    #[test]
    fn test_generated_keys_are_unique() {
        let a = generate(Environment::Live);
        let b = generate(Environment::Live);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_hash_api_key_is_deterministic() {
        let first = hash_api_key("tap_live_AAAA");
        let second = hash_api_key("tap_live_AAAA");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert_ne!(first, hash_api_key("tap_live_AAAB"));
    }

    #[test]
    fn test_hash_api_key_known_digest() {
        assert_eq!(
            hash_api_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_parse_bearer_accepts_short_secret() {
        let parsed = parse_bearer("Bearer tap_live_AAAA").unwrap();
        assert_eq!(parsed.environment(), Environment::Live);
        assert_eq!(parsed.hash(), hash_api_key("tap_live_AAAA"));
    }

    #[test]
    fn test_parse_accepts_underscore_in_secret() {
        assert!(parse("tap_test_ab_c-dA").is_ok());
    }

    #[test]
    fn test_parse_bearer_rejects_other_schemes() {
        let err = parse_bearer("Basic dXNlcjpwYXNz").unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::ApiKey(ApiKeyErrorKind::InvalidFormat)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_tokens() {
        for token in ["", "tap", "tap_live", "tap_live_", "sk_live_AAAA", "tap_live_AA=A"] {
            assert!(parse(token).is_err(), "{token} should be rejected");
        }
    }

    #[test]
    fn test_parse_rejects_unknown_environment() {
        let err = parse("tap_prod_AAAA").unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::ApiKey(ApiKeyErrorKind::InvalidEnvironment)
        );
    }
}

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;

/// Access tokens expiring within this many minutes are refreshed before use.
pub const REFRESH_THRESHOLD_MINUTES: i64 = 5;

/// Bearer tokens held for one provider connection.
#[derive(Debug, Clone)]
pub struct Tokens {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    /// `None` when the provider did not report a lifetime.
    pub expires_at: Option<DateTime<Utc>>,
    pub scopes: Vec<String>,
}

impl Tokens {
    /// True if the access token is expired or expires within the refresh threshold of `now`.
    /// Tokens without a known expiry are treated as valid.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires| expires <= now + Duration::minutes(REFRESH_THRESHOLD_MINUTES))
    }
}

/// Tokens returned by a refresh grant.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub tokens: Tokens,
    /// The server issued a replacement refresh token, which must replace the stored one.
    pub refresh_token_rotated: bool,
}

impl From<Tokens> for RefreshResult {
    fn from(tokens: Tokens) -> Self {
        Self {
            refresh_token_rotated: tokens.refresh_token.is_some(),
            tokens,
        }
    }
}

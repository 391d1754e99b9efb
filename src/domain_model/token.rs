use crate::domain_model::{IssuerId, Salt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AccessTokenId(pub uuid::Uuid);

impl AccessTokenId {
    pub fn generate() -> Self {
        AccessTokenId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for AccessTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccessTokenId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(AccessTokenId)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RefreshTokenId(pub uuid::Uuid);

impl RefreshTokenId {
    pub fn generate() -> Self {
        RefreshTokenId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for RefreshTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RefreshTokenId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(RefreshTokenId)
    }
}

/// What the access-token store holds per live access token: enough for a
/// verifier to recover the bound salt, and the expiration driving the TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRecord {
    pub id: AccessTokenId,
    pub salt: Salt,
    pub expires_at: DateTime<Utc>,
}

/// Long-lived session record, keyed by owner. Created once per login and
/// mutated on every successful refresh; `owner` never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRecord {
    pub id: RefreshTokenId,
    pub owner: IssuerId,
    pub token: String,
    pub csrf_salt: Salt,
    pub access_token_id: AccessTokenId,
    pub access_expiration: DateTime<Utc>,
    /// The `exp` baked into `token` when it was encoded. A kept token keeps
    /// this through refreshes; the store TTL must never outlive it.
    pub token_expiration: DateTime<Utc>,
}

/// The triple returned by login and refresh: three opaque strings bound by
/// one salt.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub csrf: String,
    pub access: String,
    pub refresh: String,
}

use crate::application_port::SessionError;
use crate::domain_model::*;

/// TTL-aware registry of live access tokens, keyed by access id. An entry
/// disappears exactly when revoked or when its TTL runs out.
#[async_trait::async_trait]
pub trait AccessTokenStore: Send + Sync {
    async fn register(&self, record: &AccessRecord, ttl_secs: u64) -> Result<(), SessionError>;
    async fn get(&self, id: AccessTokenId) -> Result<Option<AccessRecord>, SessionError>;
    async fn revoke(&self, id: AccessTokenId) -> Result<(), SessionError>;
}

/// Refresh records partitioned by owner: single-entry lookup by `(id, owner)`,
/// multi-entry enumeration, and a guarded swap for rotation.
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create(&self, record: &RefreshRecord, ttl_secs: u64) -> Result<(), SessionError>;

    async fn find(
        &self,
        id: RefreshTokenId,
        owner: &IssuerId,
    ) -> Result<Option<RefreshRecord>, SessionError>;

    async fn all(&self, owner: &IssuerId) -> Result<Vec<RefreshRecord>, SessionError>;

    /// Replace the record `(prev_id, next.owner)` with `next`, but only while
    /// it still references `expected_access_id`. Returns `false` when the
    /// record is gone or another writer got there first; the caller treats
    /// that as a lost rotation race. `next.id` may differ from `prev_id`.
    async fn update(
        &self,
        prev_id: RefreshTokenId,
        expected_access_id: AccessTokenId,
        next: &RefreshRecord,
        ttl_secs: u64,
    ) -> Result<bool, SessionError>;
}

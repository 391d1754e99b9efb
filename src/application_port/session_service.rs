use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// Two kinds cover the whole core: a lookup/ownership/race failure the caller
/// must not be able to tell apart from "not found", and a fatal store or codec
/// failure propagated unchanged.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("store error: {0}")]
    Store(String),
}

/// Hook invoked during refresh when the current access token has not yet
/// expired, with `(refresh_id, owner, access_expiration)`. The return value is
/// not interpreted.
pub type UnexpiredHook = Box<dyn FnOnce(RefreshTokenId, &IssuerId, DateTime<Utc>) + Send>;

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Issue a fresh CSRF/access/refresh triple for an already-authenticated
    /// issuer. The payload is carried verbatim inside the access claims.
    async fn login(
        &self,
        issuer: IssuerId,
        payload: ClaimsMap,
    ) -> Result<SessionTokens, SessionError>;

    /// Rotate the triple referenced by `refresh_claims["id"]`. The old access
    /// token is revoked before the new one becomes visible; a concurrent
    /// refresh of the same record loses with `Unauthorized`.
    async fn refresh(
        &self,
        issuer: IssuerId,
        payload: ClaimsMap,
        refresh_claims: ClaimsMap,
        on_unexpired: Option<UnexpiredHook>,
    ) -> Result<SessionTokens, SessionError>;

    /// Re-mask the CSRF value of an existing session, reconstructed from the
    /// stored salt. Same lookup rule as `refresh`.
    async fn masked_csrf(
        &self,
        issuer: IssuerId,
        refresh_claims: ClaimsMap,
    ) -> Result<String, SessionError>;

    /// Verify a presented masked CSRF value against the salt registered for
    /// the presented access token. `Ok(false)` when the access entry is gone
    /// or the value does not match.
    async fn valid_csrf(&self, access_token: &str, masked: &str) -> Result<bool, SessionError>;

    /// Every live refresh record owned by the issuer, i.e. every active
    /// session/device.
    async fn all(&self, issuer: IssuerId) -> Result<Vec<RefreshRecord>, SessionError>;
}

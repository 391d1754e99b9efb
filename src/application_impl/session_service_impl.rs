use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Whether a successful refresh mints a new refresh id/token or keeps the old
/// one. Rotating shrinks the exposure window of the long-lived token; keeping
/// it avoids invalidating other concurrently-held references.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RotationPolicy {
    Rotate,
    Keep,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub rotation: RotationPolicy,
}

/// Composes codec and stores into the login/refresh/masking protocols. Holds
/// no per-call state of its own: every operation is a function of its inputs
/// plus the injected stores.
pub struct SessionOrchestrator {
    codec: Arc<dyn TokenCodec>,
    access_store: Arc<dyn AccessTokenStore>,
    refresh_store: Arc<dyn RefreshTokenStore>,
    config: SessionConfig,
}

impl SessionOrchestrator {
    pub fn new(
        codec: Arc<dyn TokenCodec>,
        access_store: Arc<dyn AccessTokenStore>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        config: SessionConfig,
    ) -> Self {
        Self {
            codec,
            access_store,
            refresh_store,
            config,
        }
    }

    fn ttl_secs(until: DateTime<Utc>) -> u64 {
        // Round up so a store entry never evicts ahead of the token's exp.
        let millis = (until - Utc::now()).num_milliseconds();
        if millis <= 0 {
            1
        } else {
            (millis as u64).div_ceil(1000)
        }
    }

    /// Mint an access token bound to `salt`: encode `payload ∪ {token_uid,
    /// exp}`, then register `(id → salt, exp)` with TTL until expiry.
    async fn mint_access(
        &self,
        payload: &ClaimsMap,
        salt: Salt,
    ) -> Result<(AccessRecord, String), SessionError> {
        let id = AccessTokenId::generate();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.config.access_ttl)
                .map_err(|e| SessionError::Store(e.to_string()))?;

        let mut claims = payload.clone();
        claims.insert(CLAIM_TOKEN_UID.to_string(), id.to_string().into());
        claims.insert(CLAIM_EXP.to_string(), expires_at.timestamp().into());
        let token = self.codec.encode(&claims).await?;

        let record = AccessRecord {
            id,
            salt,
            expires_at,
        };
        self.access_store
            .register(&record, Self::ttl_secs(expires_at))
            .await?;
        Ok((record, token))
    }

    async fn encode_refresh(
        &self,
        id: RefreshTokenId,
        owner: &IssuerId,
        expires_at: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let mut claims = ClaimsMap::new();
        claims.insert(CLAIM_REFRESH_ID.to_string(), id.to_string().into());
        claims.insert(CLAIM_ISSUER_ID.to_string(), owner.0.clone().into());
        claims.insert(CLAIM_EXP.to_string(), expires_at.timestamp().into());
        self.codec.encode(&claims).await
    }

    /// Lookup by `(claims["id"], owner)`. A malformed id, a missing record,
    /// and a record owned by someone else are indistinguishable.
    async fn retrieve_refresh(
        &self,
        issuer: &IssuerId,
        refresh_claims: &ClaimsMap,
    ) -> Result<RefreshRecord, SessionError> {
        let id = refresh_claims
            .get(CLAIM_REFRESH_ID)
            .and_then(|v| v.as_str())
            .and_then(|s| RefreshTokenId::from_str(s).ok())
            .ok_or(SessionError::Unauthorized)?;
        self.refresh_store
            .find(id, issuer)
            .await?
            .ok_or(SessionError::Unauthorized)
    }
}

#[async_trait::async_trait]
impl SessionService for SessionOrchestrator {
    async fn login(
        &self,
        issuer: IssuerId,
        payload: ClaimsMap,
    ) -> Result<SessionTokens, SessionError> {
        let csrf = CsrfToken::mint();
        let (access_record, access_token) = self.mint_access(&payload, csrf.salt()).await?;

        let refresh_id = RefreshTokenId::generate();
        let refresh_exp = Utc::now()
            + chrono::Duration::from_std(self.config.refresh_ttl)
                .map_err(|e| SessionError::Store(e.to_string()))?;
        let refresh_token = self.encode_refresh(refresh_id, &issuer, refresh_exp).await?;

        let record = RefreshRecord {
            id: refresh_id,
            owner: issuer,
            token: refresh_token.clone(),
            csrf_salt: csrf.salt(),
            access_token_id: access_record.id,
            access_expiration: access_record.expires_at,
            token_expiration: refresh_exp,
        };
        self.refresh_store
            .create(&record, Self::ttl_secs(refresh_exp))
            .await?;

        Ok(SessionTokens {
            csrf: csrf.token(),
            access: access_token,
            refresh: refresh_token,
        })
    }

    async fn refresh(
        &self,
        issuer: IssuerId,
        payload: ClaimsMap,
        refresh_claims: ClaimsMap,
        on_unexpired: Option<UnexpiredHook>,
    ) -> Result<SessionTokens, SessionError> {
        let current = self.retrieve_refresh(&issuer, &refresh_claims).await?;

        if let Some(hook) = on_unexpired {
            if current.access_expiration > Utc::now() {
                hook(current.id, &issuer, current.access_expiration);
            }
        }

        // Revoke before the replacement becomes visible: at no point are two
        // access entries live for one refresh record.
        self.access_store.revoke(current.access_token_id).await?;

        let csrf = CsrfToken::mint();
        let (access_record, access_token) = self.mint_access(&payload, csrf.salt()).await?;

        let refresh_exp = Utc::now()
            + chrono::Duration::from_std(self.config.refresh_ttl)
                .map_err(|e| SessionError::Store(e.to_string()))?;
        // A rotated token gets a fresh exp. A kept token still carries the exp
        // it was encoded with, so its record TTL is capped there rather than
        // extended to the full window on every refresh.
        let (next_id, refresh_token, token_expiration) = match self.config.rotation {
            RotationPolicy::Rotate => {
                let id = RefreshTokenId::generate();
                let token = self.encode_refresh(id, &issuer, refresh_exp).await?;
                (id, token, refresh_exp)
            }
            RotationPolicy::Keep => (current.id, current.token.clone(), current.token_expiration),
        };

        let next = RefreshRecord {
            id: next_id,
            owner: issuer,
            token: refresh_token.clone(),
            csrf_salt: csrf.salt(),
            access_token_id: access_record.id,
            access_expiration: access_record.expires_at,
            token_expiration,
        };
        let swapped = self
            .refresh_store
            .update(
                current.id,
                current.access_token_id,
                &next,
                Self::ttl_secs(token_expiration),
            )
            .await?;
        if !swapped {
            // Lost the rotation race. Take back the access token minted above
            // and report exactly what a failed lookup reports.
            self.access_store.revoke(access_record.id).await?;
            return Err(SessionError::Unauthorized);
        }

        Ok(SessionTokens {
            csrf: csrf.token(),
            access: access_token,
            refresh: refresh_token,
        })
    }

    async fn masked_csrf(
        &self,
        issuer: IssuerId,
        refresh_claims: ClaimsMap,
    ) -> Result<String, SessionError> {
        let record = self.retrieve_refresh(&issuer, &refresh_claims).await?;
        Ok(CsrfToken::from_salt(record.csrf_salt).token())
    }

    async fn valid_csrf(&self, access_token: &str, masked: &str) -> Result<bool, SessionError> {
        let claims = self.codec.decode(access_token).await?;
        let id = claims
            .get(CLAIM_TOKEN_UID)
            .and_then(|v| v.as_str())
            .and_then(|s| AccessTokenId::from_str(s).ok())
            .ok_or(SessionError::Unauthorized)?;
        match self.access_store.get(id).await? {
            Some(record) => Ok(CsrfToken::from_salt(record.salt).matches(masked)),
            None => Ok(false),
        }
    }

    async fn all(&self, issuer: IssuerId) -> Result<Vec<RefreshRecord>, SessionError> {
        self.refresh_store.all(&issuer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_jwt::{JwtConfig, JwtHs256Codec};
    use crate::infra_memory::{MemoryAccessTokenStore, MemoryRefreshTokenStore};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Harness {
        orchestrator: SessionOrchestrator,
        codec: Arc<dyn TokenCodec>,
        access_store: Arc<MemoryAccessTokenStore>,
        refresh_store: Arc<MemoryRefreshTokenStore>,
    }

    fn harness(config: SessionConfig) -> Harness {
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: "tricord.test".to_string(),
            audience: "tricord-client".to_string(),
            signing_key: b"test-signing-key".to_vec(),
        }));
        let access_store = Arc::new(MemoryAccessTokenStore::new());
        let refresh_store = Arc::new(MemoryRefreshTokenStore::new());
        let orchestrator = SessionOrchestrator::new(
            codec.clone(),
            access_store.clone(),
            refresh_store.clone(),
            config,
        );
        Harness {
            orchestrator,
            codec,
            access_store,
            refresh_store,
        }
    }

    fn config(rotation: RotationPolicy) -> SessionConfig {
        SessionConfig {
            access_ttl: Duration::from_secs(300),
            refresh_ttl: Duration::from_secs(3600),
            rotation,
        }
    }

    fn payload() -> ClaimsMap {
        let mut payload = ClaimsMap::new();
        payload.insert("role".to_string(), "admin".into());
        payload
    }

    async fn refresh_claims_of(h: &Harness, tokens: &SessionTokens) -> ClaimsMap {
        h.codec.decode(&tokens.refresh).await.unwrap()
    }

    async fn access_record_of(h: &Harness, tokens: &SessionTokens) -> AccessRecord {
        let claims = h.codec.decode(&tokens.access).await.unwrap();
        let id = claims
            .get(CLAIM_TOKEN_UID)
            .and_then(|v| v.as_str())
            .and_then(|s| AccessTokenId::from_str(s).ok())
            .unwrap();
        h.access_store.get(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn login_returns_three_distinct_opaque_strings() {
        let h = harness(config(RotationPolicy::Rotate));
        let tokens = h
            .orchestrator
            .login(IssuerId::from("user-1"), payload())
            .await
            .unwrap();

        assert!(!tokens.csrf.is_empty());
        assert!(!tokens.access.is_empty());
        assert!(!tokens.refresh.is_empty());
        assert_ne!(tokens.csrf, tokens.access);
        assert_ne!(tokens.access, tokens.refresh);
        assert_ne!(tokens.csrf, tokens.refresh);
    }

    #[tokio::test]
    async fn login_binds_one_salt_across_the_triple() {
        let h = harness(config(RotationPolicy::Rotate));
        let issuer = IssuerId::from("user-1");
        let tokens = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();

        let access = access_record_of(&h, &tokens).await;
        let sessions = h.orchestrator.all(issuer).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].csrf_salt, access.salt);
        assert_eq!(sessions[0].access_token_id, access.id);

        // The transported CSRF value unmasks to the value derived from that
        // same salt.
        assert!(CsrfToken::from_salt(access.salt).matches(&tokens.csrf));
    }

    #[tokio::test]
    async fn login_payload_lands_in_access_claims() {
        let h = harness(config(RotationPolicy::Rotate));
        let tokens = h
            .orchestrator
            .login(IssuerId::from("user-1"), payload())
            .await
            .unwrap();
        let claims = h.codec.decode(&tokens.access).await.unwrap();
        assert_eq!(claims.get("role"), Some(&"admin".into()));
        assert!(claims.contains_key(CLAIM_TOKEN_UID));
        assert!(claims.contains_key(CLAIM_EXP));
    }

    #[tokio::test]
    async fn all_is_scoped_to_the_owner() {
        let h = harness(config(RotationPolicy::Rotate));
        let alice = IssuerId::from("alice");
        let bob = IssuerId::from("bob");
        h.orchestrator.login(alice.clone(), payload()).await.unwrap();
        h.orchestrator.login(alice.clone(), payload()).await.unwrap();
        h.orchestrator.login(bob.clone(), payload()).await.unwrap();

        let alice_sessions = h.orchestrator.all(alice.clone()).await.unwrap();
        assert_eq!(alice_sessions.len(), 2);
        assert!(alice_sessions.iter().all(|r| r.owner == alice));
        assert_eq!(h.orchestrator.all(bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn refresh_rotates_salt_and_revokes_old_access() {
        let h = harness(config(RotationPolicy::Rotate));
        let issuer = IssuerId::from("user-1");
        let first = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let old_access = access_record_of(&h, &first).await;

        let claims = refresh_claims_of(&h, &first).await;
        let second = h
            .orchestrator
            .refresh(issuer.clone(), payload(), claims, None)
            .await
            .unwrap();

        assert_ne!(first.access, second.access);
        let new_access = access_record_of(&h, &second).await;
        assert_ne!(new_access.salt, old_access.salt);

        // The previous access entry is no longer retrievable.
        assert!(h.access_store.get(old_access.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn refresh_with_unknown_or_foreign_id_is_unauthorized() {
        let h = harness(config(RotationPolicy::Rotate));
        let alice = IssuerId::from("alice");
        let bob = IssuerId::from("bob");
        let tokens = h.orchestrator.login(alice, payload()).await.unwrap();

        let mut unknown = ClaimsMap::new();
        unknown.insert(
            CLAIM_REFRESH_ID.to_string(),
            uuid::Uuid::new_v4().to_string().into(),
        );
        let err = h
            .orchestrator
            .refresh(bob.clone(), payload(), unknown, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unauthorized));

        // A live id presented under the wrong owner fails identically.
        let claims = refresh_claims_of(&h, &tokens).await;
        let err = h
            .orchestrator
            .refresh(bob, payload(), claims, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unauthorized));
    }

    #[tokio::test]
    async fn refresh_with_malformed_id_is_unauthorized() {
        let h = harness(config(RotationPolicy::Rotate));
        let mut claims = ClaimsMap::new();
        claims.insert(CLAIM_REFRESH_ID.to_string(), "does-not-exist".into());
        let err = h
            .orchestrator
            .refresh(IssuerId::from("user-1"), payload(), claims, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unauthorized));
    }

    #[tokio::test]
    async fn rotation_policy_rotate_invalidates_the_old_refresh_id() {
        let h = harness(config(RotationPolicy::Rotate));
        let issuer = IssuerId::from("user-1");
        let first = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let claims = refresh_claims_of(&h, &first).await;

        let second = h
            .orchestrator
            .refresh(issuer.clone(), payload(), claims.clone(), None)
            .await
            .unwrap();
        assert_ne!(first.refresh, second.refresh);

        // Replaying the pre-rotation claims fails like any unknown id.
        let err = h
            .orchestrator
            .refresh(issuer.clone(), payload(), claims, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unauthorized));
        assert_eq!(h.orchestrator.all(issuer).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rotation_policy_keep_preserves_id_and_token() {
        let h = harness(config(RotationPolicy::Keep));
        let issuer = IssuerId::from("user-1");
        let first = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let before = h.orchestrator.all(issuer.clone()).await.unwrap();

        let claims = refresh_claims_of(&h, &first).await;
        let second = h
            .orchestrator
            .refresh(issuer.clone(), payload(), claims.clone(), None)
            .await
            .unwrap();

        // Same long-lived token, new salt and access reference.
        assert_eq!(first.refresh, second.refresh);
        let after = h.orchestrator.all(issuer.clone()).await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, before[0].id);
        assert_ne!(after[0].csrf_salt, before[0].csrf_salt);
        assert_ne!(after[0].access_token_id, before[0].access_token_id);

        // The kept id still refreshes.
        h.orchestrator
            .refresh(issuer, payload(), claims, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_refreshes_of_one_session_yield_one_winner() {
        let h = harness(config(RotationPolicy::Rotate));
        let issuer = IssuerId::from("user-1");
        let tokens = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let claims = refresh_claims_of(&h, &tokens).await;

        let (a, b) = tokio::join!(
            h.orchestrator
                .refresh(issuer.clone(), payload(), claims.clone(), None),
            h.orchestrator.refresh(issuer.clone(), payload(), claims, None),
        );
        assert!(a.is_ok() != b.is_ok(), "exactly one refresh may win");
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(SessionError::Unauthorized)));

        // The surviving session references exactly one live access entry.
        let sessions = h.orchestrator.all(issuer).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(
            h.access_store
                .get(sessions[0].access_token_id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn lost_race_leaves_no_orphan_access_entry() {
        let h = harness(config(RotationPolicy::Rotate));
        let issuer = IssuerId::from("user-1");
        let tokens = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let claims = refresh_claims_of(&h, &tokens).await;

        h.orchestrator
            .refresh(issuer.clone(), payload(), claims.clone(), None)
            .await
            .unwrap();
        h.orchestrator
            .refresh(issuer.clone(), payload(), claims, None)
            .await
            .unwrap_err();

        // Only the winner's access entry exists.
        let sessions = h.refresh_store.all(&issuer).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(
            h.access_store
                .get(sessions[0].access_token_id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn unexpired_hook_fires_while_access_is_still_valid() {
        let h = harness(config(RotationPolicy::Rotate));
        let issuer = IssuerId::from("user-1");
        let tokens = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let claims = refresh_claims_of(&h, &tokens).await;

        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let expected_owner = issuer.clone();
        let hook: UnexpiredHook = Box::new(move |_id, owner, expiration| {
            assert_eq!(owner, &expected_owner);
            assert!(expiration > Utc::now());
            flag.store(true, Ordering::SeqCst);
        });
        h.orchestrator
            .refresh(issuer, payload(), claims, Some(hook))
            .await
            .unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unexpired_hook_skipped_once_access_expired() {
        let h = harness(SessionConfig {
            access_ttl: Duration::ZERO,
            refresh_ttl: Duration::from_secs(3600),
            rotation: RotationPolicy::Rotate,
        });
        let issuer = IssuerId::from("user-1");
        let tokens = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let claims = refresh_claims_of(&h, &tokens).await;

        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let hook: UnexpiredHook = Box::new(move |_, _, _| flag.store(true, Ordering::SeqCst));
        h.orchestrator
            .refresh(issuer, payload(), claims, Some(hook))
            .await
            .unwrap();
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn masked_csrf_differs_per_call_but_stays_valid() {
        let h = harness(config(RotationPolicy::Rotate));
        let issuer = IssuerId::from("user-1");
        let tokens = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let claims = refresh_claims_of(&h, &tokens).await;

        let a = h
            .orchestrator
            .masked_csrf(issuer.clone(), claims.clone())
            .await
            .unwrap();
        let b = h.orchestrator.masked_csrf(issuer.clone(), claims).await.unwrap();
        assert_ne!(a, b);

        let access = access_record_of(&h, &tokens).await;
        let csrf = CsrfToken::from_salt(access.salt);
        assert!(csrf.matches(&a));
        assert!(csrf.matches(&b));
    }

    #[tokio::test]
    async fn masked_csrf_foreign_owner_is_unauthorized() {
        let h = harness(config(RotationPolicy::Rotate));
        let tokens = h
            .orchestrator
            .login(IssuerId::from("alice"), payload())
            .await
            .unwrap();
        let claims = refresh_claims_of(&h, &tokens).await;
        let err = h
            .orchestrator
            .masked_csrf(IssuerId::from("bob"), claims)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unauthorized));
    }

    #[tokio::test]
    async fn valid_csrf_accepts_own_and_rejects_foreign() {
        let h = harness(config(RotationPolicy::Rotate));
        let own = h
            .orchestrator
            .login(IssuerId::from("alice"), payload())
            .await
            .unwrap();
        let other = h
            .orchestrator
            .login(IssuerId::from("bob"), payload())
            .await
            .unwrap();

        assert!(
            h.orchestrator
                .valid_csrf(&own.access, &own.csrf)
                .await
                .unwrap()
        );
        assert!(
            !h.orchestrator
                .valid_csrf(&own.access, &other.csrf)
                .await
                .unwrap()
        );
        assert!(matches!(
            h.orchestrator.valid_csrf("garbage", &own.csrf).await,
            Err(SessionError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn valid_csrf_false_after_revocation() {
        let h = harness(config(RotationPolicy::Rotate));
        let issuer = IssuerId::from("user-1");
        let first = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let claims = refresh_claims_of(&h, &first).await;
        h.orchestrator
            .refresh(issuer, payload(), claims, None)
            .await
            .unwrap();

        // The old access entry is gone, so its CSRF no longer validates.
        assert!(
            !h.orchestrator
                .valid_csrf(&first.access, &first.csrf)
                .await
                .unwrap()
        );
    }

    #[test]
    fn ttl_rounds_partial_seconds_up() {
        let ttl = SessionOrchestrator::ttl_secs(Utc::now() + chrono::Duration::milliseconds(1500));
        assert_eq!(ttl, 2);
        let past = SessionOrchestrator::ttl_secs(Utc::now() - chrono::Duration::seconds(5));
        assert_eq!(past, 1);
    }

    #[tokio::test]
    async fn refresh_succeeds_until_the_token_actually_expires() {
        // A refresh presented inside the window but past a whole-second
        // boundary must still find its record in the store.
        let h = harness(SessionConfig {
            access_ttl: Duration::from_secs(300),
            refresh_ttl: Duration::from_secs(2),
            rotation: RotationPolicy::Rotate,
        });
        let issuer = IssuerId::from("user-1");
        let tokens = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let claims = refresh_claims_of(&h, &tokens).await;

        tokio::time::sleep(Duration::from_millis(1200)).await;
        h.orchestrator
            .refresh(issuer, payload(), claims, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn keep_policy_does_not_extend_the_session_past_the_kept_token() {
        let h = harness(SessionConfig {
            access_ttl: Duration::from_secs(300),
            refresh_ttl: Duration::from_secs(2),
            rotation: RotationPolicy::Keep,
        });
        let issuer = IssuerId::from("user-1");
        let tokens = h.orchestrator.login(issuer.clone(), payload()).await.unwrap();
        let minted_exp = h.orchestrator.all(issuer.clone()).await.unwrap()[0].token_expiration;
        let claims = refresh_claims_of(&h, &tokens).await;

        tokio::time::sleep(Duration::from_millis(1200)).await;
        h.orchestrator
            .refresh(issuer.clone(), payload(), claims.clone(), None)
            .await
            .unwrap();

        // The record still carries the exp the kept token was encoded with.
        let sessions = h.orchestrator.all(issuer.clone()).await.unwrap();
        assert_eq!(sessions[0].token_expiration, minted_exp);

        // Once that exp passes, the record is gone even though the last
        // refresh happened well inside a full window.
        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert!(h.orchestrator.all(issuer.clone()).await.unwrap().is_empty());
        let err = h
            .orchestrator
            .refresh(issuer, payload(), claims, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Unauthorized));
    }
}

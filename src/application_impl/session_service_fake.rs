use crate::application_port::*;
use crate::domain_model::*;
use chrono::{Duration, Utc};

#[derive(Debug)]
pub struct FakeSessionService;

impl FakeSessionService {
    pub fn new() -> Self {
        Self
    }
}

fn fake_refresh_id(issuer: &IssuerId) -> RefreshTokenId {
    RefreshTokenId(uuid::Uuid::new_v5(
        &uuid::Uuid::NAMESPACE_OID,
        issuer.0.as_bytes(),
    ))
}

fn fake_tokens(issuer: &IssuerId) -> SessionTokens {
    SessionTokens {
        csrf: format!("fake-csrf:{}", issuer),
        access: format!("fake-access:{}", issuer),
        refresh: format!("fake-refresh:{}", issuer),
    }
}

// Minimal fake implementation for basic use only.
// Extend to simulate more error cases and configurable responses when needed.
#[async_trait::async_trait]
impl SessionService for FakeSessionService {
    async fn login(
        &self,
        issuer: IssuerId,
        _payload: ClaimsMap,
    ) -> Result<SessionTokens, SessionError> {
        Ok(fake_tokens(&issuer))
    }

    async fn refresh(
        &self,
        issuer: IssuerId,
        _payload: ClaimsMap,
        refresh_claims: ClaimsMap,
        _on_unexpired: Option<UnexpiredHook>,
    ) -> Result<SessionTokens, SessionError> {
        if refresh_claims.contains_key(CLAIM_REFRESH_ID) {
            Ok(fake_tokens(&issuer))
        } else {
            Err(SessionError::Unauthorized)
        }
    }

    async fn masked_csrf(
        &self,
        issuer: IssuerId,
        refresh_claims: ClaimsMap,
    ) -> Result<String, SessionError> {
        if refresh_claims.contains_key(CLAIM_REFRESH_ID) {
            Ok(format!("fake-masked-csrf:{}", issuer))
        } else {
            Err(SessionError::Unauthorized)
        }
    }

    async fn valid_csrf(&self, access_token: &str, masked: &str) -> Result<bool, SessionError> {
        match access_token.strip_prefix("fake-access:") {
            Some(issuer) => Ok(masked == format!("fake-masked-csrf:{}", issuer)),
            None => Err(SessionError::Unauthorized),
        }
    }

    async fn all(&self, issuer: IssuerId) -> Result<Vec<RefreshRecord>, SessionError> {
        let id = fake_refresh_id(&issuer);
        Ok(vec![RefreshRecord {
            id,
            owner: issuer.clone(),
            token: format!("fake-refresh:{}", issuer),
            csrf_salt: Salt::generate(),
            access_token_id: AccessTokenId::generate(),
            access_expiration: Utc::now() + Duration::days(1),
            token_expiration: Utc::now() + Duration::days(7),
        }])
    }
}

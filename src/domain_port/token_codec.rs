use crate::application_port::SessionError;
use crate::domain_model::ClaimsMap;

/// Turns a claims mapping into an opaque signed string and back. Stateless;
/// treated as a black box by the orchestrator.
#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn encode(&self, claims: &ClaimsMap) -> Result<String, SessionError>;

    /// Decode and verify. A token that fails verification (signature,
    /// expiration, audience) is `Unauthorized`.
    async fn decode(&self, token: &str) -> Result<ClaimsMap, SessionError>;
}

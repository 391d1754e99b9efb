/// Caller-supplied claims payload plus the claims this crate reserves.
pub type ClaimsMap = serde_json::Map<String, serde_json::Value>;

/// Access-token claim carrying the access record id.
pub const CLAIM_TOKEN_UID: &str = "token_uid";
/// Refresh-token claim carrying the refresh record id.
pub const CLAIM_REFRESH_ID: &str = "id";
/// Claim carrying the owning issuer id.
pub const CLAIM_ISSUER_ID: &str = "issuer_id";
/// Expiration, integer seconds since epoch.
pub const CLAIM_EXP: &str = "exp";

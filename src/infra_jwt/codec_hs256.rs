use crate::application_port::SessionError;
use crate::domain_model::ClaimsMap;
use crate::domain_port::TokenCodec;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub signing_key: Vec<u8>,
}

/// HS256 codec over an arbitrary JSON claims map. Adds `iss`/`aud` on encode
/// and validates them (plus `exp`) on decode. Expirations live inside the
/// claims supplied by the caller.
pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn encode(&self, claims: &ClaimsMap) -> Result<String, SessionError> {
        let mut full = claims.clone();
        full.insert("iss".to_string(), self.cfg.issuer.clone().into());
        full.insert("aud".to_string(), self.cfg.audience.clone().into());
        encode(
            &Header::new(Algorithm::HS256),
            &serde_json::Value::Object(full),
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|e| SessionError::Store(e.to_string()))
    }

    async fn decode(&self, token: &str) -> Result<ClaimsMap, SessionError> {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = true;
        v.set_audience(&[self.cfg.audience.clone()]);
        v.set_issuer(&[self.cfg.issuer.clone()]);
        let data = decode::<ClaimsMap>(token, &DecodingKey::from_secret(&self.cfg.signing_key), &v)
            .map_err(|_| SessionError::Unauthorized)?;
        Ok(data.claims)
    }
}

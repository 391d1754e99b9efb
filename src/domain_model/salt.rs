use rand::RngCore;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const SALT_LENGTH: usize = 32;

/// Random value binding one CSRF/access/refresh triple together. Persisted as
/// lowercase hex in store payloads.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_LENGTH];
        rand::rng().fill_bytes(&mut bytes);
        Salt(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let bytes: [u8; SALT_LENGTH] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Salt(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", self.to_hex())
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Salt::from_hex(&s).map_err(D::Error::custom)
    }
}

use crate::domain_model::Salt;
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, KeyInit, Mac};
use rand::RngCore;
use sha2::Sha256;

/// Fixed byte length of the raw CSRF value, shared by masker and unmasker.
pub const CSRF_LENGTH: usize = 32;

const CSRF_TAG: &[u8] = b"tricord-csrf-v1";

/// Per-session anti-forgery secret. The raw value is a pure function of the
/// salt, so a verifier holding only the salt can reconstruct it; nothing raw
/// is ever persisted. The transported form is masked (`token`) and changes on
/// every call.
#[derive(Clone)]
pub struct CsrfToken {
    salt: Salt,
    raw: [u8; CSRF_LENGTH],
}

impl CsrfToken {
    /// Mint a token over a fresh random salt.
    pub fn mint() -> Self {
        Self::from_salt(Salt::generate())
    }

    /// Reconstruct the token for a previously stored salt.
    pub fn from_salt(salt: Salt) -> Self {
        let mut mac = Hmac::<Sha256>::new_from_slice(salt.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(CSRF_TAG);
        let raw: [u8; CSRF_LENGTH] = mac.finalize().into_bytes().into();
        CsrfToken { salt, raw }
    }

    pub fn salt(&self) -> Salt {
        self.salt
    }

    /// Freshly masked wire form. Different on every call, but every output
    /// unmasks to the same raw value.
    pub fn token(&self) -> String {
        mask(&self.raw)
    }

    /// Unmask a presented wire value and compare it against this token in
    /// constant time.
    pub fn matches(&self, masked: &str) -> bool {
        match unmask(masked) {
            Some(raw) => ct_eq(&raw, &self.raw),
            None => false,
        }
    }
}

/// One-time-pad masking: a fresh random pad XORed over the raw bytes, output
/// `base64(pad ‖ cipher)`, so a fixed secret never shows a constant byte
/// pattern on the wire.
pub fn mask(raw: &[u8; CSRF_LENGTH]) -> String {
    let mut pad = [0u8; CSRF_LENGTH];
    rand::rng().fill_bytes(&mut pad);

    let mut out = [0u8; CSRF_LENGTH * 2];
    out[..CSRF_LENGTH].copy_from_slice(&pad);
    for i in 0..CSRF_LENGTH {
        out[CSRF_LENGTH + i] = pad[i] ^ raw[i];
    }
    STANDARD.encode(out)
}

/// Invert `mask`: split into halves of `CSRF_LENGTH` and XOR them.
pub fn unmask(encoded: &str) -> Option<[u8; CSRF_LENGTH]> {
    let bytes = STANDARD.decode(encoded).ok()?;
    if bytes.len() != CSRF_LENGTH * 2 {
        return None;
    }
    let mut raw = [0u8; CSRF_LENGTH];
    for i in 0..CSRF_LENGTH {
        raw[i] = bytes[i] ^ bytes[CSRF_LENGTH + i];
    }
    Some(raw)
}

fn ct_eq(a: &[u8; CSRF_LENGTH], b: &[u8; CSRF_LENGTH]) -> bool {
    let mut diff = 0u8;
    for i in 0..CSRF_LENGTH {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}

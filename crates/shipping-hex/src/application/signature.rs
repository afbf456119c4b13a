//! Webhook authenticity checks. Both schemes compare in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use shipping_types::domain::integration::SignatureScheme;
use subtle::ConstantTimeEq;

/// hex(HMAC-SHA256(secret, payload)).
pub fn compute_hmac(secret: &[u8], payload: &[u8]) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).ok()?;
    mac.update(payload);
    Some(hex::encode(mac.finalize().into_bytes()))
}

fn verify_hmac(secret: &[u8], payload: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&signature).is_ok()
}

pub fn verify(scheme: SignatureScheme, secret: &str, provided: Option<&str>, payload: &[u8]) -> bool {
    let Some(provided) = provided.filter(|s| !s.is_empty()) else {
        return false;
    };
    match scheme {
        SignatureScheme::SharedSecret => provided.as_bytes().ct_eq(secret.as_bytes()).into(),
        SignatureScheme::HmacSha256 => verify_hmac(secret.as_bytes(), payload, provided),
    }
}

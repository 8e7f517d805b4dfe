//! Token signing: ECDSA over NIST P-192 with a reproducible nonce.
//!
//! The payload is hashed with SHA-1 and signed as a prehash. The signature is
//! the fixed-width `r || s` encoding (48 bytes).
//!
//! Nonce derivation reads `FIELD_LEN + 1` bytes from an [`EntropySource`],
//! takes the leading 192 bits as a big-endian integer `x` and uses `k = x + 1`
//! when `1 <= k < n`. With [`FixedEntropy`] every signature is reproducible
//! from key and payload alone.
//!
//! WARNING: a fixed entropy source means every signature made with one key
//! reuses the same `k` (and so the same `r`). Anyone holding two tokens signed
//! by the same key can recover it. This is kept so that tokens and keys
//! already in circulation stay compatible; inject a real random source through
//! [`create_signed_token_with`] where that does not matter.

use chrono::{DateTime, Utc};
use ecdsa::hazmat::sign_prehashed;
use p192::{FieldBytes, NistP192, Scalar};
use sha1::{Digest, Sha1};

use crate::error::TokenError;
use crate::keys::{KeyProvider, SigningKey};
use crate::types::*;

/// The phrase [`FixedEntropy`] repeats by default.
pub const ENTROPY_PHRASE: &[u8] = b"duckietown is a place of relaxed introspection";

/// How many entropy reads nonce derivation attempts before giving up.
const NONCE_ATTEMPTS: usize = 16;

/// Byte stream the signer draws its nonce from.
pub trait EntropySource {
    /// Fill `dest` completely.
    fn fill(&mut self, dest: &mut [u8]);
}

impl<F: FnMut(&mut [u8])> EntropySource for F {
    fn fill(&mut self, dest: &mut [u8]) {
        self(dest)
    }
}

/// A non-secret, repeating byte sequence. Every request is served from the
/// start of the phrase, so repeated requests return identical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEntropy {
    phrase: &'static [u8],
}

impl FixedEntropy {
    pub const fn new(phrase: &'static [u8]) -> Self {
        FixedEntropy { phrase }
    }
}

impl Default for FixedEntropy {
    fn default() -> Self {
        FixedEntropy::new(ENTROPY_PHRASE)
    }
}

impl EntropySource for FixedEntropy {
    fn fill(&mut self, dest: &mut [u8]) {
        for (d, s) in dest.iter_mut().zip(self.phrase.iter().cycle()) {
            *d = *s;
        }
    }
}

/// Sign `payload` with `key`, returning the raw `r || s` signature bytes.
pub fn sign_payload(
    key: &SigningKey,
    payload: &[u8],
    entropy: &mut impl EntropySource,
) -> Result<Vec<u8>, TokenError> {
    let d = *key.to_nonzero_scalar();
    let z = digest_bytes(payload);
    let k = derive_nonce(entropy)?;

    let (signature, _) = sign_prehashed::<NistP192, Scalar>(&d, k, &z)
        .map_err(|e| TokenError::SigningFailed(e.to_string()))?;
    Ok(signature.to_bytes().to_vec())
}

/// Sign `payload` with the provider's signing key and the fixed entropy
/// source.
pub fn create_signed_token(keys: &KeyProvider, payload: &[u8]) -> Result<Token, TokenError> {
    create_signed_token_with(keys, payload, &mut FixedEntropy::default())
}

/// Sign `payload` with the provider's signing key, drawing the nonce from
/// `entropy`.
pub fn create_signed_token_with(
    keys: &KeyProvider,
    payload: &[u8],
    entropy: &mut impl EntropySource,
) -> Result<Token, TokenError> {
    let key = keys.signing_key()?;
    tracing::debug!(payload = %String::from_utf8_lossy(payload), "signing payload");
    let signature = sign_payload(&key, payload, entropy)?;
    Ok(Token {
        payload: payload.to_vec(),
        signature,
    })
}

/// Build the claims payload for `uid` and sign it.
pub fn mint(keys: &KeyProvider, uid: i64, expiration: DateTime<Utc>) -> Result<Token, TokenError> {
    let payload = Claims::new(uid, expiration).to_payload()?;
    create_signed_token(keys, &payload)
}

/// SHA-1 of `payload`, left-padded to the field width.
#[allow(clippy::indexing_slicing)] // digest (20 bytes) is shorter than FIELD_LEN
fn digest_bytes(payload: &[u8]) -> FieldBytes {
    let digest = Sha1::digest(payload);
    let mut field = FieldBytes::default();
    field[FIELD_LEN - digest.len()..].copy_from_slice(&digest);
    field
}

#[allow(clippy::indexing_slicing)] // buf is FIELD_LEN + 1 bytes
fn derive_nonce(entropy: &mut impl EntropySource) -> Result<Scalar, TokenError> {
    let mut buf = [0u8; FIELD_LEN + 1];
    for _ in 0..NONCE_ATTEMPTS {
        entropy.fill(&mut buf);
        if let Ok(x) = Scalar::from_slice(&buf[..FIELD_LEN]) {
            let k = x + Scalar::ONE;
            if !bool::from(k.is_zero()) {
                return Ok(k);
            }
        }
    }
    Err(TokenError::SigningFailed(
        "entropy source produced no usable nonce".into(),
    ))
}

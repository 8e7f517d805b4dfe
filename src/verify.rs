//! Signature verification against a single P-192 verify key.

use p192::ecdsa::signature::hazmat::PrehashVerifier;
use p192::ecdsa::Signature;
use sha1::{Digest, Sha1};

use crate::error::TokenError;
use crate::keys::{trusted_verifying_key, VerifyingKey};
use crate::types::Token;

/// Checks token signatures against one verify key.
#[derive(Debug, Clone)]
pub struct Verifier {
    key: VerifyingKey,
}

impl Verifier {
    pub fn new(key: VerifyingKey) -> Self {
        Verifier { key }
    }

    /// A verifier bound to the compiled-in trusted issuer key.
    pub fn trusted() -> Result<Self, TokenError> {
        Ok(Verifier::new(trusted_verifying_key()?))
    }

    pub fn key(&self) -> &VerifyingKey {
        &self.key
    }

    /// Whether `token`'s signature is valid for its payload.
    ///
    /// A signature of the wrong length is simply invalid, not an error.
    pub fn verify(&self, token: &Token) -> bool {
        let Ok(signature) = Signature::from_slice(token.signature()) else {
            return false;
        };
        let digest = Sha1::digest(token.payload());
        self.key.verify_prehash(&digest, &signature).is_ok()
    }
}

/// Verify `token` against the trusted issuer key.
pub fn verify_token(token: &Token) -> Result<bool, TokenError> {
    Ok(Verifier::trusted()?.verify(token))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::keys::{generate_signing_key, verifying_key_for};
    use crate::sign::{sign_payload, FixedEntropy};

    fn signed(payload: &[u8]) -> (Verifier, Vec<u8>) {
        let key = generate_signing_key();
        let signature = sign_payload(&key, payload, &mut FixedEntropy::default()).unwrap();
        (Verifier::new(verifying_key_for(&key)), signature)
    }

    fn token(payload: &[u8], signature: &[u8]) -> Token {
        codec::decode(&codec::encode(payload, signature)).unwrap()
    }

    #[test]
    fn test_verify_valid() {
        let (verifier, sig) = signed(b"payload");
        assert!(verifier.verify(&token(b"payload", &sig)));
    }

    #[test]
    fn test_verify_mutated_payload() {
        let (verifier, sig) = signed(b"payload");
        assert!(!verifier.verify(&token(b"pAyload", &sig)));
    }

    #[test]
    fn test_verify_wrong_key() {
        let (_, sig) = signed(b"payload");
        let other = Verifier::new(verifying_key_for(&generate_signing_key()));
        assert!(!other.verify(&token(b"payload", &sig)));
    }

    #[test]
    fn test_verify_wrong_length_signature() {
        let (verifier, sig) = signed(b"payload");
        assert!(!verifier.verify(&token(b"payload", &sig[..47])));
        assert!(!verifier.verify(&token(b"payload", &[])));
        let mut longer = sig.clone();
        longer.push(0);
        assert!(!verifier.verify(&token(b"payload", &longer)));
    }

    #[test]
    fn test_verify_corrupt_every_signature_byte() {
        let (verifier, sig) = signed(b"payload");
        for i in 0..sig.len() {
            let mut corrupted = sig.clone();
            corrupted[i] ^= 0x01;
            assert!(
                !verifier.verify(&token(b"payload", &corrupted)),
                "corrupting byte {i} should cause verification failure"
            );
        }
    }

    #[test]
    fn test_locally_signed_token_fails_trusted_key() {
        let (_, sig) = signed(b"payload");
        assert!(!verify_token(&token(b"payload", &sig)).unwrap());
    }
}

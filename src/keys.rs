//! Key resolution.
//!
//! Two independent paths:
//!   - the signing key lives in a local PEM file and is created on first use;
//!   - the verify key used by validation is the single trusted issuer key
//!     compiled into the crate.
//!
//! A locally generated signing key is NOT the counterpart of the trusted key,
//! so tokens minted on a fresh machine only verify against
//! [`KeyProvider::local_verify_key`], not against [`KeyProvider::verify_key`].
//!
//! File layout:
//!   key1.pem      SEC1 PEM ("EC PRIVATE KEY"), PKCS#8 also accepted on load
//!   key1-pub.pem  SPKI PEM ("PUBLIC KEY")

use std::fs;
use std::path::{Path, PathBuf};

use p192::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding};
use zeroize::Zeroizing;

use crate::error::TokenError;
use crate::types::{DEFAULT_PRIVATE_KEY_PATH, DEFAULT_PUBLIC_KEY_PATH};

pub use p192::ecdsa::VerifyingKey;

/// A P-192 private scalar.
pub type SigningKey = p192::elliptic_curve::SecretKey<p192::NistP192>;

/// Public key of the production issuer. Every verifying client trusts exactly
/// this key.
pub const TRUSTED_ISSUER_KEY_PEM: &str = "-----BEGIN PUBLIC KEY-----
MEkwEwYHKoZIzj0CAQYIKoZIzj0DAQEDMgAEQr/8RJmJZT+Bh1YMb1aqc2ao5teE
ixOeCMGTO79Dbvw5dGmHJLYyNPwnKkWayyJS
-----END PUBLIC KEY-----
";

/// Resolves signing and verify keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyProvider {
    private_path: PathBuf,
    public_path: PathBuf,
}

impl Default for KeyProvider {
    fn default() -> Self {
        KeyProvider::new(DEFAULT_PRIVATE_KEY_PATH, DEFAULT_PUBLIC_KEY_PATH)
    }
}

impl KeyProvider {
    pub fn new(private_path: impl Into<PathBuf>, public_path: impl Into<PathBuf>) -> Self {
        KeyProvider {
            private_path: private_path.into(),
            public_path: public_path.into(),
        }
    }

    pub fn private_path(&self) -> &Path {
        &self.private_path
    }

    pub fn public_path(&self) -> &Path {
        &self.public_path
    }

    /// Load the signing key, creating and persisting a new keypair if no
    /// private key exists yet.
    ///
    /// The returned key is always read back from storage, never the freshly
    /// generated in-memory value. Not safe against two processes racing on
    /// the first call.
    pub fn signing_key(&self) -> Result<SigningKey, TokenError> {
        if !self.private_path.exists() {
            tracing::info!(path = %self.private_path.display(), "creating private key");
            let generated = generate_signing_key();
            self.store(&generated)?;
        }
        load_signing_key(&self.private_path)
    }

    /// The fixed trusted issuer key. Independent of any local key files.
    pub fn verify_key(&self) -> Result<VerifyingKey, TokenError> {
        trusted_verifying_key()
    }

    /// The public half written alongside the local signing key.
    pub fn local_verify_key(&self) -> Result<VerifyingKey, TokenError> {
        load_verifying_key(&self.public_path)
    }

    fn store(&self, key: &SigningKey) -> Result<(), TokenError> {
        let private_pem = key
            .to_sec1_pem(LineEnding::LF)
            .map_err(|e| TokenError::key_storage(&self.private_path, e))?;
        fs::write(&self.private_path, private_pem.as_bytes())
            .map_err(|e| TokenError::key_storage(&self.private_path, e))?;

        let public_pem = key
            .public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| TokenError::key_storage(&self.public_path, e))?;
        fs::write(&self.public_path, public_pem)
            .map_err(|e| TokenError::key_storage(&self.public_path, e))?;
        Ok(())
    }
}

/// Generate a fresh P-192 signing key from the OS RNG.
#[must_use]
pub fn generate_signing_key() -> SigningKey {
    let mut rng = rand::rngs::OsRng;
    SigningKey::random(&mut rng)
}

/// Parse the compiled-in trusted issuer key.
pub fn trusted_verifying_key() -> Result<VerifyingKey, TokenError> {
    VerifyingKey::from_public_key_pem(TRUSTED_ISSUER_KEY_PEM)
        .map_err(|e| TokenError::key_storage("<trusted issuer key>", e))
}

/// Load a private key from a SEC1 or PKCS#8 PEM file.
pub fn load_signing_key(path: &Path) -> Result<SigningKey, TokenError> {
    let pem =
        Zeroizing::new(fs::read_to_string(path).map_err(|e| TokenError::key_storage(path, e))?);
    parse_signing_key_pem(&pem).map_err(|reason| TokenError::key_storage(path, reason))
}

/// Load a public key from an SPKI PEM file.
pub fn load_verifying_key(path: &Path) -> Result<VerifyingKey, TokenError> {
    let pem = fs::read_to_string(path).map_err(|e| TokenError::key_storage(path, e))?;
    VerifyingKey::from_public_key_pem(&pem).map_err(|e| TokenError::key_storage(path, e))
}

fn parse_signing_key_pem(pem: &str) -> Result<SigningKey, String> {
    if let Ok(key) = SigningKey::from_sec1_pem(pem) {
        return Ok(key);
    }
    SigningKey::from_pkcs8_pem(pem).map_err(|e| format!("not a P-192 private key: {e}"))
}

/// The verify key matching a signing key.
#[must_use]
pub fn verifying_key_for(key: &SigningKey) -> VerifyingKey {
    VerifyingKey::from(key.public_key())
}

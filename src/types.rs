use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::TokenError;

/// Version tag that prefixes every token string.
pub const VERSION_TAG: &str = "dt1";

/// Separator between the version tag and the two base-58 segments.
pub const SEPARATOR: char = '-';

/// Reserved uid marking demonstration tokens. Never accepted as valid.
pub const SAMPLE_UID: i64 = -1;

/// Default location of the private signing key.
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "key1.pem";

/// Default location of the public half written next to the private key.
pub const DEFAULT_PUBLIC_KEY_PATH: &str = "key1-pub.pem";

/// Byte length of a P-192 field element / scalar.
pub const FIELD_LEN: usize = 24;

/// Byte length of a raw `r || s` signature.
pub const SIGNATURE_LEN: usize = 2 * FIELD_LEN;

/// A signed token: opaque payload bytes plus the signature over them.
///
/// Only the codec and the signer construct tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub(crate) payload: Vec<u8>,
    pub(crate) signature: Vec<u8>,
}

impl Token {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::encode(&self.payload, &self.signature))
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::decode(s)
    }
}

/// The JSON claims carried in a token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub uid: i64,
    /// Expiration as an ISO-8601 date/time string.
    pub exp: String,
}

impl Claims {
    /// Build claims expiring at `expiration`, written as a naive UTC timestamp.
    pub fn new(uid: i64, expiration: DateTime<Utc>) -> Self {
        Claims {
            uid,
            exp: expiration.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    pub fn to_payload(&self) -> Result<Vec<u8>, TokenError> {
        serde_json::to_vec(self).map_err(|e| TokenError::Payload(e.to_string()))
    }
}

/// Claims of a token that passed every validation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedClaims {
    pub uid: i64,
    /// Serialized as normalized RFC 3339 UTC (`2099-01-01T00:00:00Z`), not
    /// the raw `exp` text.
    pub expiration: DateTime<Utc>,
}

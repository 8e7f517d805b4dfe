//! Textual token encoding.
//!
//! Wire format:
//!   dt1-<base58(payload)>-<base58(signature)>
//!
//! Base-58 uses the Bitcoin alphabet, which contains no `-`, so the two
//! separators are the only hyphens in a well-formed token. Either segment may
//! be empty.

use crate::error::TokenError;
use crate::types::{Token, SEPARATOR, VERSION_TAG};

/// Encode payload and signature bytes into a token string.
#[must_use]
pub fn encode(payload: &[u8], signature: &[u8]) -> String {
    format!(
        "{VERSION_TAG}{SEPARATOR}{}{SEPARATOR}{}",
        bs58::encode(payload).into_string(),
        bs58::encode(signature).into_string()
    )
}

/// Decode a token string into its payload and signature bytes.
pub fn decode(s: &str) -> Result<Token, TokenError> {
    let parts: Vec<&str> = s.split(SEPARATOR).collect();
    let [version, payload_58, signature_58] = parts.as_slice() else {
        return Err(TokenError::Format(format!(
            "expected 3 parts separated by '{SEPARATOR}', got {}",
            parts.len()
        )));
    };

    if *version != VERSION_TAG {
        return Err(TokenError::Format(format!(
            "unsupported version {version:?} (expected {VERSION_TAG:?})"
        )));
    }

    let payload = decode_segment(payload_58, "payload")?;
    let signature = decode_segment(signature_58, "signature")?;
    Ok(Token { payload, signature })
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, TokenError> {
    bs58::decode(segment)
        .into_vec()
        .map_err(|e| TokenError::Format(format!("{what} is not valid base-58: {e}")))
}

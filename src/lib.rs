//! dtoken: compact signed identity tokens.
//!
//! A token binds a numeric user id and an expiration time:
//! `dt1-<base58 JSON payload>-<base58 signature>`. Tokens are minted offline
//! with a local ECDSA/P-192 signing key and verified anywhere against the one
//! trusted issuer key compiled into this crate.

pub mod codec;
pub mod error;
pub mod keys;
pub mod sign;
pub mod types;
pub mod validate;
pub mod verify;

pub use error::TokenError;
pub use keys::KeyProvider;
pub use types::{Claims, Token, ValidatedClaims};
pub use validate::TokenValidator;
pub use verify::Verifier;

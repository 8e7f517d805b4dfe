//! Token validation: decode, signature, payload, schema, sample uid, expiry.
//!
//! Each stage is a precondition for the next and fails with its own
//! [`TokenError`] variant, so callers can tell a malformed token from a forged
//! or expired one.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::codec;
use crate::error::TokenError;
use crate::types::{ValidatedClaims, SAMPLE_UID};
use crate::verify::Verifier;

/// Naive date/time layouts accepted for `exp`, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Validates token strings against one verifier.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    verifier: Verifier,
}

impl TokenValidator {
    pub fn new(verifier: Verifier) -> Self {
        TokenValidator { verifier }
    }

    /// A validator that trusts only the compiled-in issuer key.
    pub fn trusted() -> Result<Self, TokenError> {
        Ok(TokenValidator::new(Verifier::trusted()?))
    }

    /// Validate `token` against the current time.
    pub fn validate(&self, token: &str) -> Result<ValidatedClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate `token`, treating `now` as the current time.
    pub fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<ValidatedClaims, TokenError> {
        let token = codec::decode(token)?;

        if !self.verifier.verify(&token) {
            return Err(TokenError::Signature);
        }

        let data = parse_object(token.payload())?;
        let (uid, exp) = required_fields(&data)?;

        if is_sample_uid(uid) {
            return Err(TokenError::SampleToken);
        }
        let uid = uid_value(uid)?;

        let raw_exp = exp.as_str().ok_or_else(|| TokenError::InvalidField {
            field: "exp",
            reason: format!("expected a date/time string, got {exp}"),
        })?;
        let expiration = parse_expiration(raw_exp).ok_or_else(|| TokenError::InvalidField {
            field: "exp",
            reason: format!("cannot parse {raw_exp:?} as a date/time"),
        })?;

        if expiration < now {
            return Err(TokenError::Expired {
                expired_at: expiration,
                now,
            });
        }

        tracing::debug!(uid, %expiration, "token validated");
        Ok(ValidatedClaims { uid, expiration })
    }
}

/// Read the uid from a token WITHOUT checking its signature.
///
/// Only for display or routing; never treat the result as authenticated.
pub fn uid_unverified(token: &str) -> Result<i64, TokenError> {
    let token = codec::decode(token)?;
    let data = parse_object(token.payload())?;
    let uid = data.get("uid").ok_or(TokenError::MissingField("uid"))?;
    uid_value(uid)
}

fn parse_object(payload: &[u8]) -> Result<Map<String, Value>, TokenError> {
    match serde_json::from_slice::<Value>(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(TokenError::Payload(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(TokenError::Payload(format!(
            "{e} in {:?}",
            String::from_utf8_lossy(payload)
        ))),
    }
}

fn required_fields(data: &Map<String, Value>) -> Result<(&Value, &Value), TokenError> {
    let uid = data.get("uid").ok_or(TokenError::MissingField("uid"))?;
    let exp = data.get("exp").ok_or(TokenError::MissingField("exp"))?;
    Ok((uid, exp))
}

/// Numeric comparison, so `-1.0` is the sample uid too.
#[allow(clippy::float_cmp, clippy::cast_precision_loss)]
fn is_sample_uid(uid: &Value) -> bool {
    uid.as_f64() == Some(SAMPLE_UID as f64)
}

fn uid_value(uid: &Value) -> Result<i64, TokenError> {
    uid.as_i64().ok_or_else(|| TokenError::InvalidField {
        field: "uid",
        reason: format!("expected an integer, got {uid}"),
    })
}

/// Parse an ISO-8601-style date/time. Values without an offset are UTC.
pub fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

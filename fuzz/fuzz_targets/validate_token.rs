#![no_main]
use chrono::{DateTime, Utc};
use dtoken::validate::{parse_expiration, uid_unverified};
use dtoken::TokenValidator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // None of the validation stages may panic on arbitrary input.
    if let Ok(validator) = TokenValidator::trusted() {
        let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        let _ = validator.validate_at(s, now);
    }
    let _ = uid_unverified(s);
    let _ = parse_expiration(s);
});

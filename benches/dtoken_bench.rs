#![allow(clippy::expect_used)]

use chrono::{DateTime, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use dtoken::codec;
use dtoken::keys::{generate_signing_key, verifying_key_for};
use dtoken::sign::{sign_payload, FixedEntropy};
use dtoken::{TokenValidator, Verifier};

const PAYLOAD: &[u8] = br#"{"uid": 42, "exp": "2099-01-01T00:00:00"}"#;

fn bench_codec(c: &mut Criterion) {
    let signature = [0x5Au8; 48];
    let token = codec::encode(PAYLOAD, &signature);

    c.bench_function("codec_encode", |b| {
        b.iter(|| codec::encode(PAYLOAD, &signature));
    });
    c.bench_function("codec_decode", |b| {
        b.iter(|| codec::decode(&token).expect("decode"));
    });
}

fn bench_p192(c: &mut Criterion) {
    let key = generate_signing_key();
    let verifier = Verifier::new(verifying_key_for(&key));
    let signature = sign_payload(&key, PAYLOAD, &mut FixedEntropy::default()).expect("sign");
    let token = codec::decode(&codec::encode(PAYLOAD, &signature)).expect("decode");

    c.bench_function("p192_sign", |b| {
        b.iter(|| sign_payload(&key, PAYLOAD, &mut FixedEntropy::default()).expect("sign"));
    });
    c.bench_function("p192_verify", |b| {
        b.iter(|| assert!(verifier.verify(&token)));
    });
}

fn bench_validate(c: &mut Criterion) {
    let key = generate_signing_key();
    let validator = TokenValidator::new(Verifier::new(verifying_key_for(&key)));
    let signature = sign_payload(&key, PAYLOAD, &mut FixedEntropy::default()).expect("sign");
    let token = codec::encode(PAYLOAD, &signature);
    let now = DateTime::<Utc>::from_timestamp(0, 0).expect("epoch");

    c.bench_function("validate", |b| {
        b.iter(|| validator.validate_at(&token, now).expect("validate"));
    });
}

criterion_group!(benches, bench_codec, bench_p192, bench_validate);
criterion_main!(benches);

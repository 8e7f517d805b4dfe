#![no_main]
use dtoken::codec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (Vec<u8>, Vec<u8>)| {
    let (payload, signature) = input;
    let token = codec::decode(&codec::encode(&payload, &signature))
        .expect("encoded token must decode");
    assert_eq!(token.payload(), payload.as_slice());
    assert_eq!(token.signature(), signature.as_slice());
});

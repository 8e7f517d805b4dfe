#![no_main]
use dtoken::codec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // Base-58 is canonical, so anything that decodes must re-encode to itself.
    if let Ok(token) = codec::decode(s) {
        assert_eq!(
            codec::encode(token.payload(), token.signature()),
            s,
            "decode then encode produced a different string"
        );
    }
});

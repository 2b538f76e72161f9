#![no_main]
use libfuzzer_sys::fuzz_target;
use lzwin::compress::{decoder, encoder};
use lzwin::config::Config;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the level and sentinel, the rest is the input.
    let flags = data[0];
    let input = &data[1..];
    let mut config = Config::for_level(u32::from(flags % 10));
    if flags & 0x80 != 0 {
        config = config.with_sentinel(input.last().copied().unwrap_or(0));
    }

    let stream = encoder::encode_all(input, &config);
    let decoded = decoder::decode_all(&stream, &config).unwrap();
    assert_eq!(decoded, input);
});

#![no_main]
use libfuzzer_sys::fuzz_target;
use lzwin::compress::decoder;
use lzwin::config::Config;
use lzwin::format::StreamStats;

fuzz_target!(|data: &[u8]| {
    // Arbitrary streams must decode or fail cleanly, never panic.
    let decoded = decoder::decode_all(data, &Config::default());

    // A stream that decodes has a consistent token summary.
    if let Ok(out) = decoded {
        let stats = StreamStats::scan(data, Config::default().sentinel()).unwrap();
        assert_eq!(stats.decoded_len(), out.len());
    }
});

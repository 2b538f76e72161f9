// Sliding-window encoder.
//
// Walks the input once. At each position the match finder proposes the
// longest back-reference; short ones fall through to the literal path,
// which either extends the open literal run or starts a new one.

use crate::config::{Config, MAX_LITERAL_RUN};
use crate::format::{self, Token};
use crate::matching::{Match, MatchFinder};

// ---------------------------------------------------------------------------
// Literal-run accumulator
// ---------------------------------------------------------------------------

/// State of the literal run being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiteralRun {
    #[default]
    Closed,
    Open {
        /// Bytes in the run so far.
        len: usize,
        /// Output index of the run's length-prefix byte.
        prefix_at: usize,
    },
}

impl LiteralRun {
    /// Append `byte` as literal data and return the new run state.
    ///
    /// A full run (127 bytes) is left as is and a fresh run is opened.
    pub fn push(self, out: &mut Vec<u8>, byte: u8) -> LiteralRun {
        match self {
            LiteralRun::Open { len, prefix_at } if len < MAX_LITERAL_RUN => {
                let len = len + 1;
                out[prefix_at] = format::literal_prefix(len);
                out.push(byte);
                LiteralRun::Open { len, prefix_at }
            }
            _ => {
                let prefix_at = out.len();
                out.push(format::literal_prefix(1));
                out.push(byte);
                LiteralRun::Open { len: 1, prefix_at }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters collected while encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    pub input_len: usize,
    pub output_len: usize,
    pub match_tokens: usize,
    pub literal_runs: usize,
    pub literal_bytes: usize,
    /// Input bytes covered by back-reference copies.
    pub matched_bytes: usize,
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// One-pass encoder over an in-memory input.
///
/// # Example
/// ```
/// use lzwin::compress::encoder::Encoder;
/// use lzwin::config::Config;
///
/// let mut enc = Encoder::new(b"AAAAAAAAAA", Config::default());
/// while enc.step().is_some() {}
/// let (stream, stats) = enc.finish();
/// assert_eq!(stream, [129, b'A', 1, 9, b'$']);
/// assert_eq!(stats.match_tokens, 1);
/// ```
pub struct Encoder<'a> {
    input: &'a [u8],
    config: Config,
    finder: MatchFinder,
    pos: usize,
    run: LiteralRun,
    out: Vec<u8>,
    stats: EncodeStats,
}

impl<'a> Encoder<'a> {
    pub fn new(input: &'a [u8], config: Config) -> Self {
        Self {
            input,
            finder: MatchFinder::new(&config),
            config,
            pos: 0,
            run: LiteralRun::Closed,
            out: Vec::with_capacity(input.len() + input.len() / MAX_LITERAL_RUN + 1),
            stats: EncodeStats {
                input_len: input.len(),
                ..Default::default()
            },
        }
    }

    /// Current input position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Encode one token's worth of input.
    ///
    /// Returns the number of input bytes consumed, or `None` once the input
    /// is exhausted.
    pub fn step(&mut self) -> Option<usize> {
        if self.pos >= self.input.len() {
            return None;
        }

        let found = self.best_match();
        let consumed = if found.length < self.config.min_match_length() {
            self.emit_literal()
        } else {
            self.emit_match(found)
        };
        self.pos += consumed;
        Some(consumed)
    }

    /// Encode the rest of the input and return the stream.
    pub fn finish(mut self) -> (Vec<u8>, EncodeStats) {
        while self.step().is_some() {}
        self.stats.output_len = self.out.len();
        log::debug!(
            "encoded {} bytes into {} ({} matches, {} literal runs)",
            self.stats.input_len,
            self.stats.output_len,
            self.stats.match_tokens,
            self.stats.literal_runs
        );
        (self.out, self.stats)
    }

    /// Match-finder result, trimmed so a genuine sentinel byte never ends up
    /// as the continuation of the final token.
    fn best_match(&self) -> Match {
        let mut found = self.finder.find(self.input, self.pos);
        let last = self.input.len() - 1;
        if found.length >= self.config.min_match_length()
            && self.pos + found.length == last
            && self.input[last] == self.config.sentinel()
        {
            // The decoder would drop it. Stop one byte short and let a later
            // token carry the final byte.
            found.length -= 1;
        }
        found
    }

    fn emit_literal(&mut self) -> usize {
        self.run = self.run.push(&mut self.out, self.input[self.pos]);
        if let LiteralRun::Open { len: 1, .. } = self.run {
            self.stats.literal_runs += 1;
        }
        self.stats.literal_bytes += 1;
        1
    }

    fn emit_match(&mut self, found: Match) -> usize {
        self.run = LiteralRun::Closed;

        let next = self.pos + found.length;
        let continuation = self
            .input
            .get(next)
            .copied()
            .unwrap_or(self.config.sentinel());

        log::trace!(
            "match at {}: distance={} length={} continuation={:#04x}",
            self.pos,
            found.distance,
            found.length,
            continuation
        );

        Token::Match {
            distance: found.distance as u8,
            length: found.length as u8,
            continuation,
        }
        .write_to(&mut self.out);

        self.stats.match_tokens += 1;
        self.stats.matched_bytes += found.length;
        found.length + 1
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Encode `input` with `config`.
pub fn encode_all(input: &[u8], config: &Config) -> Vec<u8> {
    encode_with_stats(input, config).0
}

/// Encode `input` with `config`, returning the stream and counters.
pub fn encode_with_stats(input: &[u8], config: &Config) -> (Vec<u8>, EncodeStats) {
    Encoder::new(input, *config).finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_MATCH_LENGTH, SENTINEL};
    use crate::format::{StreamStats, Tokens};

    fn encode(input: &[u8]) -> Vec<u8> {
        encode_all(input, &Config::default())
    }

    #[test]
    fn empty_input() {
        let (stream, stats) = encode_with_stats(b"", &Config::default());
        assert!(stream.is_empty());
        assert_eq!(stats, EncodeStats::default());
    }

    #[test]
    fn short_input_is_one_literal_run() {
        assert_eq!(encode(b"AB"), [130, b'A', b'B']);
        assert_eq!(encode(b"A"), [129, b'A']);
    }

    #[test]
    fn repeated_byte_becomes_overlapping_match() {
        let (stream, stats) = encode_with_stats(b"AAAAAAAAAA", &Config::default());
        assert_eq!(stream, [129, b'A', 1, 9, SENTINEL]);
        assert_eq!(stats.match_tokens, 1);
        assert_eq!(stats.matched_bytes, 9);
        assert_eq!(stats.literal_runs, 1);
        assert_eq!(stats.output_len, 5);
    }

    #[test]
    fn match_takes_following_byte_as_continuation() {
        assert_eq!(
            encode(b"hello hello hello world"),
            [
                134, b'h', b'e', b'l', b'l', b'o', b' ', 6, 10, b'o', 134, b' ', b'w', b'o',
                b'r', b'l', b'd'
            ]
        );
    }

    #[test]
    fn literal_run_reopens_after_match() {
        assert_eq!(
            encode(b"abcabc$x"),
            [131, b'a', b'b', b'c', 3, 3, b'$', 129, b'x']
        );
    }

    #[test]
    fn literal_runs_split_at_127() {
        let input: Vec<u8> = (0..130u8).collect();
        let (stream, stats) = encode_with_stats(&input, &Config::default());
        assert_eq!(stream.len(), 132);
        assert_eq!(stream[0], 255);
        assert_eq!(&stream[1..128], &input[..127]);
        assert_eq!(stream[128], 131);
        assert_eq!(&stream[129..], &input[127..]);
        assert_eq!(stats.literal_runs, 2);
        assert_eq!(stats.literal_bytes, 130);
    }

    #[test]
    fn literal_run_state_transitions() {
        let mut out = Vec::new();
        let mut run = LiteralRun::Closed;
        run = run.push(&mut out, 1);
        assert_eq!(run, LiteralRun::Open { len: 1, prefix_at: 0 });
        for b in 2..=127u8 {
            run = run.push(&mut out, b);
        }
        assert_eq!(run, LiteralRun::Open { len: 127, prefix_at: 0 });
        assert_eq!(out[0], 255);
        run = run.push(&mut out, 200);
        assert_eq!(run, LiteralRun::Open { len: 1, prefix_at: 128 });
        assert_eq!(&out[128..], &[129, 200]);
    }

    #[test]
    fn final_sentinel_byte_is_not_a_continuation() {
        // Untrimmed, the last token would be [3, 9, '$'] and the decoder
        // would drop the '$'.
        assert_eq!(
            encode(b"abcabcabcabc$"),
            [131, b'a', b'b', b'c', 3, 8, b'c', 129, b'$']
        );
        assert_eq!(encode(b"AAAA$"), [133, b'A', b'A', b'A', b'A', b'$']);
    }

    #[test]
    fn sentinel_reached_by_copy_is_fine() {
        assert_eq!(
            encode(b"ab$ab$ab$"),
            [131, b'a', b'b', b'$', 3, 6, SENTINEL]
        );
    }

    #[test]
    fn store_level_emits_only_literals() {
        let input = [9u8; 300];
        let (stream, stats) = encode_with_stats(&input, &Config::for_level(0));
        assert_eq!(stats.match_tokens, 0);
        assert_eq!(stats.literal_runs, 3);
        assert_eq!(stream.len(), 303);
    }

    #[test]
    fn steps_advance_within_bounds() {
        let input: Vec<u8> = b"abracadabra ".iter().copied().cycle().take(2000).collect();
        for config in [Config::default(), Config::for_level(9)] {
            let mut enc = Encoder::new(&input, config);
            let mut total = 0;
            while let Some(n) = enc.step() {
                assert!((1..=MAX_MATCH_LENGTH + 1).contains(&n));
                total += n;
                assert_eq!(enc.position(), total);
            }
            assert_eq!(total, input.len());
        }
    }

    #[test]
    fn stats_agree_with_stream_scan() {
        let input = b"the cat sat on the mat; the cat sat on the hat".repeat(4);
        let (stream, stats) = encode_with_stats(&input, &Config::default());
        let scanned = StreamStats::scan(&stream, SENTINEL).unwrap();
        assert_eq!(scanned.match_tokens, stats.match_tokens);
        assert_eq!(scanned.literal_runs, stats.literal_runs);
        assert_eq!(scanned.literal_bytes, stats.literal_bytes);
        assert_eq!(scanned.copied_bytes, stats.matched_bytes);
        assert_eq!(scanned.decoded_len(), input.len());
        assert!(Tokens::new(&stream).all(|t| t.is_ok()));
    }

    #[test]
    fn every_constructible_config_yields_decodable_streams() {
        use crate::compress::decoder::decode_all;
        use crate::config::{ConfigError, MAX_DISTANCE};

        // A 200-byte window would need distance bytes that read as literal
        // prefixes; such a config cannot be built.
        assert_eq!(
            Config::new(200, MAX_MATCH_LENGTH, 10, 3, SENTINEL),
            Err(ConfigError::MaxDistance(200))
        );
        assert!(Config::default().with_min_match_length(0).is_err());

        let input: Vec<u8> = (0..=199u8).chain(0..10).collect();
        let configs = [
            Config::default(),
            Config::default().with_lookahead(1000),
            Config::default().with_min_match_length(1).unwrap(),
            Config::new(MAX_DISTANCE, MAX_MATCH_LENGTH, MAX_MATCH_LENGTH, 3, 0).unwrap(),
        ];
        for config in configs {
            let stream = encode_all(&input, &config);
            for item in Tokens::new(&stream) {
                if let (_, Token::Match { distance, .. }) = item.unwrap() {
                    assert!(distance as usize <= MAX_DISTANCE);
                }
            }
            assert_eq!(decode_all(&stream, &config).unwrap(), input, "{config:?}");
        }
    }

    #[test]
    fn custom_sentinel() {
        let config = Config::default().with_sentinel(0);
        assert_eq!(encode_all(b"AAAAAAAAAA", &config), [129, b'A', 1, 9, 0]);
    }
}

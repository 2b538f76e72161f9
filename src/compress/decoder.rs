// Token stream decoder.
//
// Two states: COPY reads the first byte of a token and either executes a
// match token or switches to LITERAL, which passes raw bytes through until
// the announced run is exhausted. A stream may only end in COPY.

use crate::config::Config;
use crate::format::{self, MATCH_TOKEN_LEN};

pub use crate::format::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Copy,
    Literal {
        /// Offset of the run's prefix byte, for error reports.
        offset: usize,
        remaining: usize,
    },
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decoder for one in-memory token stream.
pub struct Decoder {
    sentinel: u8,
    out: Vec<u8>,
    tokens_decoded: usize,
}

impl Decoder {
    pub fn new(config: &Config) -> Self {
        Self {
            sentinel: config.sentinel(),
            out: Vec::new(),
            tokens_decoded: 0,
        }
    }

    /// Decode `stream` into the output buffer.
    ///
    /// Each call decodes one self-contained stream: output and token count
    /// from a previous call are discarded first, so back-references never
    /// reach across streams.
    pub fn decode(&mut self, stream: &[u8]) -> Result<(), DecodeError> {
        self.out.clear();
        self.tokens_decoded = 0;
        self.out.reserve(stream.len() * 2);
        let mut state = State::Copy;
        let mut pos = 0usize;

        while pos < stream.len() {
            match state {
                State::Copy => {
                    let first = stream[pos];
                    if format::is_literal_prefix(first) {
                        state = State::Literal {
                            offset: pos,
                            remaining: format::literal_run_len(first),
                        };
                        pos += 1;
                        continue;
                    }
                    let Some(&[distance, length, continuation]) =
                        stream.get(pos..pos + MATCH_TOKEN_LEN)
                    else {
                        return Err(DecodeError::MalformedStream {
                            offset: pos,
                            needed: MATCH_TOKEN_LEN,
                            available: stream.len() - pos,
                        });
                    };
                    let last = pos + MATCH_TOKEN_LEN == stream.len();
                    self.apply_match(pos, distance, length, continuation, last)?;
                    pos += MATCH_TOKEN_LEN;
                }
                State::Literal { offset, remaining } => {
                    let take = remaining.min(stream.len() - pos);
                    self.out.extend_from_slice(&stream[pos..pos + take]);
                    pos += take;
                    if take == remaining {
                        self.tokens_decoded += 1;
                        state = State::Copy;
                    } else {
                        state = State::Literal {
                            offset,
                            remaining: remaining - take,
                        };
                    }
                }
            }
        }

        if let State::Literal { offset, remaining } = state {
            let run = format::literal_run_len(stream[offset]);
            return Err(DecodeError::MalformedStream {
                offset,
                needed: 1 + run,
                available: 1 + run - remaining,
            });
        }
        Ok(())
    }

    /// Execute one match token at `offset`.
    fn apply_match(
        &mut self,
        offset: usize,
        distance: u8,
        length: u8,
        continuation: u8,
        last: bool,
    ) -> Result<(), DecodeError> {
        let distance = distance as usize;
        let length = length as usize;
        let available = self.out.len();
        if distance > available || (distance == 0 && length > 0) {
            return Err(DecodeError::InvalidBackReference {
                offset,
                distance,
                available,
            });
        }

        copy_back(&mut self.out, distance, length);
        if !(last && continuation == self.sentinel) {
            self.out.push(continuation);
        }
        self.tokens_decoded += 1;
        Ok(())
    }

    /// Output produced so far.
    pub fn output(&self) -> &[u8] {
        &self.out
    }

    /// Number of complete tokens executed.
    pub fn tokens_decoded(&self) -> usize {
        self.tokens_decoded
    }

    pub fn into_output(self) -> Vec<u8> {
        self.out
    }
}

/// Append `length` bytes copied cyclically from the last `distance` bytes.
///
/// Byte `p` of the copy is `window[p % distance]`, so a copy longer than its
/// distance repeats the window.
pub fn copy_back(out: &mut Vec<u8>, distance: usize, length: usize) {
    if length == 0 {
        return;
    }
    let start = out.len() - distance;
    if length <= distance {
        out.extend_from_within(start..start + length);
        return;
    }
    out.reserve(length);
    for p in 0..length {
        let b = out[start + p % distance];
        out.push(b);
    }
}

// ---------------------------------------------------------------------------
// Convenience function
// ---------------------------------------------------------------------------

/// Decode a complete stream with `config`'s sentinel.
pub fn decode_all(stream: &[u8], config: &Config) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = Decoder::new(config);
    decoder.decode(stream)?;
    log::debug!(
        "decoded {} tokens ({} bytes) into {} bytes",
        decoder.tokens_decoded(),
        stream.len(),
        decoder.output().len()
    );
    Ok(decoder.into_output())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Token stream layout.
//
// Two token kinds, told apart by the first byte:
//   - Match:       [distance][length][continuation]   first byte <= 128
//   - Literal run: [128 + n][byte] x n                first byte  > 128
//
// There is no framing. The stream ends where the bytes end, and the last
// token's continuation may be the sentinel meaning "no byte".

use thiserror::Error;

use crate::config::{LITERAL_FLAG, MAX_LITERAL_RUN};

/// Encoded size of a match token.
pub const MATCH_TOKEN_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A token declares more bytes than the stream has left.
    #[error(
        "malformed stream: token at offset {offset} needs {needed} bytes, {available} available"
    )]
    MalformedStream {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// A match token points outside the output produced so far.
    #[error(
        "invalid back-reference at offset {offset}: distance {distance} with {available} bytes of output"
    )]
    InvalidBackReference {
        offset: usize,
        distance: usize,
        available: usize,
    },
}

// ---------------------------------------------------------------------------
// Prefix byte helpers
// ---------------------------------------------------------------------------

/// Whether `first` opens a literal run.
#[inline]
pub fn is_literal_prefix(first: u8) -> bool {
    first > LITERAL_FLAG
}

/// Run length announced by a literal-run prefix byte.
#[inline]
pub fn literal_run_len(first: u8) -> usize {
    (first - LITERAL_FLAG) as usize
}

/// Prefix byte announcing a literal run of `len` bytes.
#[inline]
pub fn literal_prefix(len: usize) -> u8 {
    debug_assert!((1..=MAX_LITERAL_RUN).contains(&len));
    LITERAL_FLAG + len as u8
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Match {
        distance: u8,
        length: u8,
        continuation: u8,
    },
    Literal(&'a [u8]),
}

impl Token<'_> {
    /// Bytes this token occupies in the stream.
    pub fn encoded_len(&self) -> usize {
        match self {
            Token::Match { .. } => MATCH_TOKEN_LEN,
            Token::Literal(bytes) => 1 + bytes.len(),
        }
    }

    /// Append this token's encoding to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match *self {
            Token::Match {
                distance,
                length,
                continuation,
            } => out.extend_from_slice(&[distance, length, continuation]),
            Token::Literal(bytes) => {
                out.push(literal_prefix(bytes.len()));
                out.extend_from_slice(bytes);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Token iterator
// ---------------------------------------------------------------------------

/// Iterates a stream as `(offset, token)` pairs.
///
/// Stops after the first error.
pub struct Tokens<'a> {
    stream: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(stream: &'a [u8]) -> Self {
        Self {
            stream,
            pos: 0,
            failed: false,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<(usize, Token<'a>), DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.stream.len() {
            return None;
        }
        let offset = self.pos;
        let rest = &self.stream[offset..];
        let first = rest[0];

        let needed = if is_literal_prefix(first) {
            1 + literal_run_len(first)
        } else {
            MATCH_TOKEN_LEN
        };
        if rest.len() < needed {
            self.failed = true;
            return Some(Err(DecodeError::MalformedStream {
                offset,
                needed,
                available: rest.len(),
            }));
        }

        let token = if is_literal_prefix(first) {
            Token::Literal(&rest[1..needed])
        } else {
            Token::Match {
                distance: first,
                length: rest[1],
                continuation: rest[2],
            }
        };
        self.pos += needed;
        Some(Ok((offset, token)))
    }
}

// ---------------------------------------------------------------------------
// Stream statistics
// ---------------------------------------------------------------------------

/// Token-level summary of a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub stream_len: usize,
    pub match_tokens: usize,
    pub literal_runs: usize,
    pub literal_bytes: usize,
    /// Bytes produced by back-reference copies.
    pub copied_bytes: usize,
    /// Continuation bytes that land in the output.
    pub continuation_bytes: usize,
}

impl StreamStats {
    /// Scan `stream` without decoding it.
    ///
    /// Back-references are not checked against the output length; only
    /// truncation is reported.
    pub fn scan(stream: &[u8], sentinel: u8) -> Result<Self, DecodeError> {
        let mut stats = StreamStats {
            stream_len: stream.len(),
            ..Default::default()
        };
        for item in Tokens::new(stream) {
            let (offset, token) = item?;
            match token {
                Token::Match {
                    length,
                    continuation,
                    ..
                } => {
                    stats.match_tokens += 1;
                    stats.copied_bytes += length as usize;
                    let terminal = continuation == sentinel
                        && offset + MATCH_TOKEN_LEN == stream.len();
                    if !terminal {
                        stats.continuation_bytes += 1;
                    }
                }
                Token::Literal(bytes) => {
                    stats.literal_runs += 1;
                    stats.literal_bytes += bytes.len();
                }
            }
        }
        Ok(stats)
    }

    /// Size of the output the stream decodes to.
    pub fn decoded_len(&self) -> usize {
        self.literal_bytes + self.copied_bytes + self.continuation_bytes
    }

    pub fn tokens(&self) -> usize {
        self.match_tokens + self.literal_runs
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

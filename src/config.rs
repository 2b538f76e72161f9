// Format constants and matcher profiles.
//
// The wire format fixes the field capacities; the profiles only change how far
// the match finder looks ahead, so every level decodes with the default config.

use thiserror::Error;

/// Largest back-reference distance a match token can carry.
pub const MAX_DISTANCE: usize = 127;

/// Largest match length a match token can carry.
pub const MAX_MATCH_LENGTH: usize = 127;

/// Default search horizon for the match finder.
pub const DEFAULT_LOOKAHEAD: usize = 10;

/// Shortest match worth a 3-byte token.
pub const MIN_MATCH_LENGTH: usize = 3;

/// Continuation byte meaning "no continuation, end of stream" on the last token.
pub const SENTINEL: u8 = b'$';

/// Longest literal run a single prefix byte can announce.
pub const MAX_LITERAL_RUN: usize = 127;

/// Added to the run length to form a literal-run prefix byte.
pub const LITERAL_FLAG: u8 = 128;

/// Default compression level.
pub const DEFAULT_LEVEL: u32 = 6;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max distance {0} out of range 1..={max}", max = MAX_DISTANCE)]
    MaxDistance(usize),
    #[error("max match length {0} out of range 1..={max}", max = MAX_MATCH_LENGTH)]
    MaxMatchLength(usize),
    #[error("min match length {min} out of range 1..={max}")]
    MinMatchLength { min: usize, max: usize },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Encoder/decoder configuration.
///
/// Only `sentinel` matters to the decoder. A `lookahead` of zero disables
/// matching entirely and the encoder emits literal runs only.
///
/// Fields are private: every `Config` in existence fits the token format.
///
/// ```compile_fail
/// use lzwin::config::Config;
///
/// let config = Config { max_distance: 200, ..Config::default() };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    max_distance: usize,
    max_match_length: usize,
    lookahead: usize,
    min_match_length: usize,
    sentinel: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_distance: MAX_DISTANCE,
            max_match_length: MAX_MATCH_LENGTH,
            lookahead: DEFAULT_LOOKAHEAD,
            min_match_length: MIN_MATCH_LENGTH,
            sentinel: SENTINEL,
        }
    }
}

impl Config {
    /// Build a validated configuration.
    pub fn new(
        max_distance: usize,
        max_match_length: usize,
        lookahead: usize,
        min_match_length: usize,
        sentinel: u8,
    ) -> Result<Self, ConfigError> {
        Self {
            max_distance,
            max_match_length,
            lookahead,
            min_match_length,
            sentinel,
        }
        .validate()
    }

    /// Default format with the lookahead of the profile for `level`.
    pub fn for_level(level: u32) -> Self {
        Self {
            lookahead: profile_for_level(level).lookahead,
            ..Self::default()
        }
    }

    /// Any lookahead is representable; lengths are capped by
    /// `max_match_length` during search.
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_min_match_length(mut self, min_match_length: usize) -> Result<Self, ConfigError> {
        self.min_match_length = min_match_length;
        self.validate()
    }

    pub fn with_sentinel(mut self, sentinel: u8) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Check every field against what the token format can represent.
    fn validate(self) -> Result<Self, ConfigError> {
        if !(1..=MAX_DISTANCE).contains(&self.max_distance) {
            return Err(ConfigError::MaxDistance(self.max_distance));
        }
        if !(1..=MAX_MATCH_LENGTH).contains(&self.max_match_length) {
            return Err(ConfigError::MaxMatchLength(self.max_match_length));
        }
        if !(1..=self.max_match_length).contains(&self.min_match_length) {
            return Err(ConfigError::MinMatchLength {
                min: self.min_match_length,
                max: self.max_match_length,
            });
        }
        Ok(self)
    }

    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    pub fn max_match_length(&self) -> usize {
        self.max_match_length
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    pub fn min_match_length(&self) -> usize {
        self.min_match_length
    }

    pub fn sentinel(&self) -> u8 {
        self.sentinel
    }

    /// Longest match the finder may report: the lookahead capped by the
    /// length field.
    pub fn search_limit(&self) -> usize {
        self.lookahead.min(self.max_match_length)
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Named match-finder tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    /// Name for display purposes.
    pub name: &'static str,
    /// Search horizon in bytes (0 = store only).
    pub lookahead: usize,
}

pub const STORE: Profile = Profile {
    name: "store",
    lookahead: 0,
};

pub const FASTEST: Profile = Profile {
    name: "fastest",
    lookahead: 4,
};

pub const FAST: Profile = Profile {
    name: "fast",
    lookahead: 6,
};

pub const DEFAULT: Profile = Profile {
    name: "default",
    lookahead: DEFAULT_LOOKAHEAD,
};

pub const SLOW: Profile = Profile {
    name: "slow",
    lookahead: 32,
};

pub const BEST: Profile = Profile {
    name: "best",
    lookahead: MAX_MATCH_LENGTH,
};

/// Compression levels mapping to profiles.
///
/// - Level 0: store (literal runs only)
/// - Level 1: fastest
/// - Levels 2-3: fast
/// - Levels 4-6: default
/// - Levels 7-8: slow
/// - Level 9: best
pub fn profile_for_level(level: u32) -> Profile {
    match level {
        0 => STORE,
        1 => FASTEST,
        2 | 3 => FAST,
        4..=6 => DEFAULT,
        7 | 8 => SLOW,
        _ => BEST,
    }
}

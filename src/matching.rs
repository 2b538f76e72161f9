// Sliding-window match finder.
//
// Exhaustive search over the backward window: every candidate start is
// compared against the bytes at the current position, bounded by the
// lookahead. Comparisons may run past the current position, which is how
// runs longer than their distance are detected (e.g. "AAAA..." at distance 1).

use crate::config::Config;

// ---------------------------------------------------------------------------
// Match result
// ---------------------------------------------------------------------------

/// Longest match found at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Backward offset from the current position to the match start.
    /// When `length == 0` this holds the window start instead.
    pub distance: usize,
    /// Number of matching bytes.
    pub length: usize,
}

// ---------------------------------------------------------------------------
// Match finder
// ---------------------------------------------------------------------------

/// Window-bounded longest-match search.
#[derive(Debug, Clone, Copy)]
pub struct MatchFinder {
    max_distance: usize,
    search_limit: usize,
}

impl MatchFinder {
    pub fn new(config: &Config) -> Self {
        Self {
            max_distance: config.max_distance(),
            search_limit: config.search_limit(),
        }
    }

    /// Oldest position still inside the window for `pos`.
    #[inline]
    pub fn window_start(&self, pos: usize) -> usize {
        pos.saturating_sub(self.max_distance)
    }

    /// Find the longest match for `input[pos..]` starting inside the window.
    ///
    /// Candidates are scanned from the oldest to the newest and only a strictly
    /// longer match replaces the best one, so ties resolve to the largest
    /// distance.
    pub fn find(&self, input: &[u8], pos: usize) -> Match {
        let start = self.window_start(pos);
        let end = (pos + self.search_limit).min(input.len());

        let mut best = Match {
            distance: start,
            length: 0,
        };
        if end <= pos {
            return best;
        }

        let ahead = &input[pos..end];
        for cand in start..pos {
            let len = common_prefix(&input[cand..end], ahead);
            if len > best.length {
                best = Match {
                    distance: pos - cand,
                    length: len,
                };
                if len == ahead.len() {
                    // Nothing later in the window can be strictly longer.
                    break;
                }
            }
        }
        best
    }
}

/// Length of the common prefix of `a` and `b`.
#[inline]
pub fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! lzwin: a sliding-window LZ77 compressor with literal-run escapes.
//!
//! The crate provides:
//! - The token format and its inspection helpers (`format`)
//! - The window-bounded match finder (`matching`)
//! - The encoder and decoder (`compress`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! let input = b"hello hello hello world";
//! let stream = lzwin::compress(input);
//! assert!(stream.len() < input.len());
//! assert_eq!(lzwin::decompress(&stream).unwrap(), input);
//! ```

pub mod compress;
pub mod config;
pub mod format;
pub mod io;
pub mod matching;

#[cfg(feature = "cli")]
pub mod cli;

pub use compress::DecodeError;
pub use config::Config;

/// Compress `input` with the default configuration.
pub fn compress(input: &[u8]) -> Vec<u8> {
    compress::encoder::encode_all(input, &Config::default())
}

/// Decompress a stream produced with the default configuration.
pub fn decompress(stream: &[u8]) -> Result<Vec<u8>, DecodeError> {
    compress::decoder::decode_all(stream, &Config::default())
}

// File-level helpers for compression/decompression.
//
// `compress_bytes()` and `decompress_bytes()` run the codec and collect
// stats; `compress_file()` and `decompress_file()` wrap them, reading the
// whole input and writing the whole output.
// Optionally computes a SHA-256 of the uncompressed data (feature-gated
// behind `file-io`).

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::compress::decoder::{self, DecodeError};
use crate::compress::encoder::{self, EncodeStats};
use crate::config::Config;

/// Extension appended to compressed files.
pub const EXTENSION: &str = "mkc";

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_file()`.
#[derive(Debug, Clone)]
pub struct CompressStats {
    /// Uncompressed input size in bytes.
    pub input_size: u64,
    /// Compressed output size in bytes.
    pub output_size: u64,
    /// Token counters from the encoder.
    pub encode: EncodeStats,
    /// Time spent in the encoder.
    pub elapsed: Duration,
    /// SHA-256 of the uncompressed input (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

impl CompressStats {
    /// Compressed size over original size, `None` for empty input.
    pub fn ratio(&self) -> Option<f64> {
        ratio(self.output_size, self.input_size)
    }
}

/// Statistics returned by `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecompressStats {
    /// Compressed input size in bytes.
    pub input_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Time spent in the decoder.
    pub elapsed: Duration,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

fn ratio(compressed: u64, original: u64) -> Option<f64> {
    (original > 0).then(|| compressed as f64 / original as f64)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Stream decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// No output name can be derived from the input name.
    #[error("cannot derive output name from {}: expected a .{} extension", .0.display(), EXTENSION)]
    OutputName(PathBuf),
}

// ---------------------------------------------------------------------------
// Output names
// ---------------------------------------------------------------------------

/// `name.ext` -> `name.ext.mkc`.
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".");
    name.push(EXTENSION);
    PathBuf::from(name)
}

/// `name.ext.mkc` -> `name.ext`; anything else is an error.
pub fn decompressed_path(input: &Path) -> Result<PathBuf, IoError> {
    let has_ext = input.extension().is_some_and(|e| e == EXTENSION);
    match input.file_stem() {
        Some(stem) if has_ext && !stem.is_empty() => Ok(input.with_file_name(stem)),
        _ => Err(IoError::OutputName(input.to_path_buf())),
    }
}

// ---------------------------------------------------------------------------
// In-memory codec with stats
// ---------------------------------------------------------------------------

/// Encode `input`, timing the encoder and hashing the input.
pub fn compress_bytes(input: &[u8], config: &Config) -> (Vec<u8>, CompressStats) {
    let t0 = Instant::now();
    let (stream, encode) = encoder::encode_with_stats(input, config);
    let elapsed = t0.elapsed();

    let stats = CompressStats {
        input_size: input.len() as u64,
        output_size: stream.len() as u64,
        encode,
        elapsed,
        input_sha256: sha256(input),
    };
    (stream, stats)
}

/// Decode `stream`, timing the decoder and hashing the output.
pub fn decompress_bytes(
    stream: &[u8],
    config: &Config,
) -> Result<(Vec<u8>, DecompressStats), DecodeError> {
    let t0 = Instant::now();
    let output = decoder::decode_all(stream, config)?;
    let elapsed = t0.elapsed();

    let stats = DecompressStats {
        input_size: stream.len() as u64,
        output_size: output.len() as u64,
        elapsed,
        output_sha256: sha256(&output),
    };
    Ok((output, stats))
}

// ---------------------------------------------------------------------------
// compress_file / decompress_file
// ---------------------------------------------------------------------------

/// Compress `input_path` into `output_path`.
///
/// The input is read fully into memory and the stream is written in one go.
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    config: &Config,
) -> Result<CompressStats, IoError> {
    let input = std::fs::read(input_path)?;
    let (stream, stats) = compress_bytes(&input, config);

    std::fs::write(output_path, &stream)?;
    log::info!(
        "{} -> {}: {} -> {} bytes",
        input_path.display(),
        output_path.display(),
        stats.input_size,
        stats.output_size
    );
    Ok(stats)
}

/// Decompress `input_path` into `output_path`.
///
/// Nothing is written when the stream fails to decode.
pub fn decompress_file(
    input_path: &Path,
    output_path: &Path,
    config: &Config,
) -> Result<DecompressStats, IoError> {
    let stream = std::fs::read(input_path)?;
    let (output, stats) = decompress_bytes(&stream, config)?;

    std::fs::write(output_path, &output)?;
    log::info!(
        "{} -> {}: {} -> {} bytes",
        input_path.display(),
        output_path.display(),
        stats.input_size,
        stats.output_size
    );
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Checksums (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
pub fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    use sha2::Digest;
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
pub fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

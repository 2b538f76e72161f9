// Compression pipeline over in-memory buffers.
//
// - `encoder`: match finding plus literal-run accumulation
// - `decoder`: COPY/LITERAL state machine with cyclic copies

pub mod decoder;
pub mod encoder;

pub use decoder::{DecodeError, Decoder};
pub use encoder::{EncodeStats, Encoder, LiteralRun};

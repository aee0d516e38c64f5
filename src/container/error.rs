// Error taxonomy for DVPL container encode/decode.
//
// Every validation failure is terminal: the caller gets the first failing
// check and no partial output.

use thiserror::Error;

use super::footer::FOOTER_LEN;

/// Errors produced while packing or unpacking a DVPL container.
#[derive(Debug, Error)]
pub enum DvplError {
    /// Input is too short to hold a footer.
    #[error("truncated container: {len} bytes, need at least {need}", need = FOOTER_LEN)]
    Truncated { len: usize },

    /// Trailing four bytes are not `DVPL`.
    #[error("invalid footer magic: {found:02X?}")]
    InvalidMagic { found: [u8; 4] },

    /// Payload length disagrees with the footer's compressed size.
    #[error("size mismatch: footer declares {expected} payload bytes, found {actual}")]
    SizeMismatch { expected: u32, actual: usize },

    /// CRC32 of the payload disagrees with the footer.
    #[error("checksum mismatch: expected {expected:#010X}, got {actual:#010X}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Stored (type 0) container whose original and compressed sizes differ.
    #[error("stored container size mismatch: original {original}, compressed {compressed}")]
    StoredSizeMismatch { original: u32, compressed: u32 },

    /// LZ4 decode failed or did not produce exactly `expected` bytes.
    #[error("decoded size mismatch: expected {expected} bytes, got {}", display_actual(.actual))]
    DecodedSizeMismatch {
        expected: u32,
        actual: Option<usize>,
    },

    /// Compression type tag outside {0, 1, 2}.
    #[error("unknown compression type {0}")]
    UnknownType(u32),

    /// The LZ4 encoder reported a failure.
    #[error("compression failed: {0}")]
    Compression(#[source] std::io::Error),

    /// Input does not fit the footer's 32-bit size fields or an LZ4 block.
    #[error("input too large for a DVPL container: {0} bytes")]
    TooLarge(usize),
}

fn display_actual(actual: &Option<usize>) -> String {
    match actual {
        Some(n) => n.to_string(),
        None => "decoder failure".to_string(),
    }
}

pub type DvplResult<T> = Result<T, DvplError>;

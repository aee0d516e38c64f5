// LZ4 block primitive used by the encoder and decoder.
//
// Raw LZ4 blocks, no size prefix and no frame header: the DVPL footer
// carries both sizes.

use ::lz4::block::{self, CompressionMode};

use super::error::{DvplError, DvplResult};

/// High-compression level used for type 2 payloads.
pub const HC_LEVEL: i32 = 3;

/// Largest input a single LZ4 block accepts (`LZ4_MAX_INPUT_SIZE`).
pub const MAX_BLOCK_INPUT: usize = 0x7E00_0000;

/// Upper bound on the LZ4 expansion ratio. A block cannot decode to more
/// than this many bytes per input byte.
const MAX_EXPANSION: usize = 255;

/// LZ4 compression mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Default (fast) LZ4.
    Fast,
    /// LZ4HC at the given level.
    High(i32),
}

impl Mode {
    fn to_lz4(self) -> CompressionMode {
        match self {
            Self::Fast => CompressionMode::DEFAULT,
            Self::High(level) => CompressionMode::HIGHCOMPRESSION(level),
        }
    }
}

/// Compress `src` into a fresh LZ4 block holding exactly the bytes written.
pub fn compress(src: &[u8], mode: Mode) -> DvplResult<Vec<u8>> {
    if src.len() > MAX_BLOCK_INPUT {
        return Err(DvplError::TooLarge(src.len()));
    }
    let bound = block::compress_bound(src.len()).map_err(DvplError::Compression)?;
    let mut out = vec![0u8; bound];
    let written = block::compress_to_buffer(src, Some(mode.to_lz4()), false, &mut out)
        .map_err(DvplError::Compression)?;
    out.truncate(written);
    Ok(out)
}

/// Decompress an LZ4 block that must expand to exactly `expected` bytes.
///
/// Any decoder failure, or a block that fills less than `expected` bytes,
/// yields [`DvplError::DecodedSizeMismatch`].
pub fn decompress_exact(src: &[u8], expected: u32) -> DvplResult<Vec<u8>> {
    let mismatch = |actual| DvplError::DecodedSizeMismatch { expected, actual };

    let size = expected as usize;
    let Ok(size_i32) = i32::try_from(expected) else {
        return Err(mismatch(None));
    };
    if size > src.len().saturating_mul(MAX_EXPANSION) {
        return Err(mismatch(None));
    }

    let mut out = vec![0u8; size];
    let written =
        block::decompress_to_buffer(src, Some(size_i32), &mut out).map_err(|e| {
            log::debug!("lz4 decode failed: {e}");
            mismatch(None)
        })?;
    if written != size {
        return Err(mismatch(Some(written)));
    }
    Ok(out)
}

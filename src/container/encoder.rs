// DVPL container encoder.
//
// Produces `payload ++ footer`. The payload is either the input verbatim
// (type 0) or a raw LZ4 block (types 1 and 2); the footer CRC always covers
// the payload as written.

use super::error::{DvplError, DvplResult};
use super::footer::{self, CompressionType, FOOTER_LEN};
use super::integrity;
use super::lz4::{self, HC_LEVEL, Mode};

/// File extension whose payloads are stored uncompressed.
pub const STORED_EXTENSION: &str = "tex";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Compression type written to the footer.
    pub compression: CompressionType,
    /// LZ4HC level used when `compression` is [`CompressionType::Lz4Hc`].
    pub hc_level: i32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compression: CompressionType::Lz4Hc,
            hc_level: HC_LEVEL,
        }
    }
}

impl EncodeOptions {
    /// Options for an explicit compression type, default HC level.
    pub fn with_compression(compression: CompressionType) -> Self {
        Self {
            compression,
            ..Default::default()
        }
    }

    /// Options chosen from a file extension hint.
    ///
    /// `.tex` (any case, dot optional) is stored; everything else, including
    /// no hint at all, is LZ4HC.
    pub fn for_extension(ext: Option<&str>) -> Self {
        Self::with_compression(compression_for_extension(ext))
    }
}

/// Compression type policy for an extension hint.
///
/// The match is ASCII case-insensitive and accepts the hint with or without
/// its leading dot, so `.TEX`, `tex` and `.tex` all select stored payloads.
/// This is intentionally looser than an exact `".tex"` comparison.
pub fn compression_for_extension(ext: Option<&str>) -> CompressionType {
    match ext.map(|e| e.strip_prefix('.').unwrap_or(e)) {
        Some(e) if e.eq_ignore_ascii_case(STORED_EXTENSION) => CompressionType::Stored,
        _ => CompressionType::Lz4Hc,
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `data` as an LZ4HC (type 2) container.
pub fn encode(data: &[u8]) -> DvplResult<Vec<u8>> {
    encode_with(data, EncodeOptions::default())
}

/// Encode `data`, picking the compression type from a file extension hint.
pub fn encode_with_extension(data: &[u8], ext: Option<&str>) -> DvplResult<Vec<u8>> {
    encode_with(data, EncodeOptions::for_extension(ext))
}

/// Encode `data` with explicit options.
pub fn encode_with(data: &[u8], opts: EncodeOptions) -> DvplResult<Vec<u8>> {
    let original_size = u32::try_from(data.len()).map_err(|_| DvplError::TooLarge(data.len()))?;

    let mut out = match opts.compression {
        CompressionType::Stored => {
            let mut out = Vec::with_capacity(data.len() + FOOTER_LEN);
            out.extend_from_slice(data);
            out
        }
        CompressionType::Lz4 => lz4::compress(data, Mode::Fast)?,
        CompressionType::Lz4Hc => lz4::compress(data, Mode::High(opts.hc_level))?,
    };

    // Bounded by compress_bound(MAX_BLOCK_INPUT), which fits in u32.
    let compressed_size = u32::try_from(out.len()).map_err(|_| DvplError::TooLarge(out.len()))?;
    let crc32 = integrity::checksum(&out);
    log::debug!(
        "encode: {} {original_size} -> {compressed_size} bytes, crc32 {crc32:#010X}",
        opts.compression
    );

    out.extend_from_slice(&footer::build(
        original_size,
        compressed_size,
        crc32,
        opts.compression.tag(),
    ));
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

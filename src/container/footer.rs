// DVPL trailing footer encoding/decoding.
//
// Layout (20 bytes, all integers little-endian):
//   [original_size u32][compressed_size u32][crc32 u32][type u32]["DVPL"]

use super::error::{DvplError, DvplResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Trailing magic marking a DVPL container.
pub const DVPL_MAGIC: [u8; 4] = *b"DVPL";

/// Size of the trailing footer in bytes.
pub const FOOTER_LEN: usize = 20;

// ---------------------------------------------------------------------------
// Compression type
// ---------------------------------------------------------------------------

/// Compression type tag stored in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CompressionType {
    /// Payload is the original bytes verbatim.
    Stored = 0,
    /// LZ4 block, fast mode.
    Lz4 = 1,
    /// LZ4 block, high-compression mode.
    Lz4Hc = 2,
}

impl CompressionType {
    /// Tag value written to the footer.
    pub fn tag(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Lz4 => "lz4",
            Self::Lz4Hc => "lz4hc",
        }
    }

    /// Whether the payload needs LZ4 decompression.
    pub fn is_compressed(self) -> bool {
        !matches!(self, Self::Stored)
    }
}

impl TryFrom<u32> for CompressionType {
    type Error = DvplError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Stored),
            1 => Ok(Self::Lz4),
            2 => Ok(Self::Lz4Hc),
            other => Err(DvplError::UnknownType(other)),
        }
    }
}

impl std::fmt::Display for CompressionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

/// Parsed DVPL footer.
///
/// `kind` keeps the raw tag so containers with an unknown type can still be
/// parsed and inspected; [`Footer::compression`] resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    /// Size of the fully decompressed payload.
    pub original_size: u32,
    /// Size of the payload block preceding the footer.
    pub compressed_size: u32,
    /// CRC32 of the payload block as stored (not of the original bytes).
    pub crc32: u32,
    /// Raw compression type tag.
    pub kind: u32,
}

impl Footer {
    /// Parse the footer from the last [`FOOTER_LEN`] bytes of `buf`.
    ///
    /// Only the magic is validated here. Size and checksum checks belong to
    /// the decoder.
    pub fn parse(buf: &[u8]) -> DvplResult<Self> {
        if buf.len() < FOOTER_LEN {
            return Err(DvplError::Truncated { len: buf.len() });
        }
        let footer = &buf[buf.len() - FOOTER_LEN..];

        let magic = read_array::<4>(footer, 16);
        if magic != DVPL_MAGIC {
            return Err(DvplError::InvalidMagic { found: magic });
        }

        let parsed = Self {
            original_size: read_u32(footer, 0),
            compressed_size: read_u32(footer, 4),
            crc32: read_u32(footer, 8),
            kind: read_u32(footer, 12),
        };
        log::trace!("parsed footer: {parsed:?}");
        Ok(parsed)
    }

    /// Serialize the footer to its 20-byte wire form.
    pub fn to_bytes(&self) -> [u8; FOOTER_LEN] {
        build(
            self.original_size,
            self.compressed_size,
            self.crc32,
            self.kind,
        )
    }

    /// Resolve the raw tag to a known compression type.
    pub fn compression(&self) -> DvplResult<CompressionType> {
        CompressionType::try_from(self.kind)
    }
}

/// Build a 20-byte footer from its four fields.
///
/// Pure serializer: no range or consistency checks.
pub fn build(original_size: u32, compressed_size: u32, crc32: u32, kind: u32) -> [u8; FOOTER_LEN] {
    let mut out = [0u8; FOOTER_LEN];
    out[0..4].copy_from_slice(&original_size.to_le_bytes());
    out[4..8].copy_from_slice(&compressed_size.to_le_bytes());
    out[8..12].copy_from_slice(&crc32.to_le_bytes());
    out[12..16].copy_from_slice(&kind.to_le_bytes());
    out[16..20].copy_from_slice(&DVPL_MAGIC);
    out
}

/// The payload region of a container: everything in front of the footer.
///
/// Callers must have parsed the footer first, so `buf.len() >= FOOTER_LEN`.
pub(crate) fn payload(buf: &[u8]) -> &[u8] {
    &buf[..buf.len() - FOOTER_LEN]
}

#[inline]
fn read_array<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    let mut dst = [0u8; N];
    dst.copy_from_slice(&buf[at..at + N]);
    dst
}

#[inline]
fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(read_array::<4>(buf, at))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// DVPL container decoder.
//
// Gate order is fixed: magic, payload size, checksum, then type dispatch.
// Nothing is decompressed until the payload has passed the first three.

use super::error::{DvplError, DvplResult};
use super::footer::{CompressionType, FOOTER_LEN, Footer, payload};
use super::integrity;
use super::lz4;

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Footer plus the checks that do not require decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    pub footer: Footer,
    /// Resolved compression type.
    pub compression: CompressionType,
    /// Total container length, footer included.
    pub container_len: usize,
}

impl ContainerInfo {
    /// Compressed size over original size; 1.0 for an empty original.
    pub fn ratio(&self) -> f64 {
        if self.footer.original_size == 0 {
            return 1.0;
        }
        self.footer.compressed_size as f64 / self.footer.original_size as f64
    }
}

/// Parse and validate a container without decompressing it.
///
/// Runs the magic, size and checksum gates and resolves the type tag.
pub fn inspect(buf: &[u8]) -> DvplResult<ContainerInfo> {
    let (footer, _) = validate(buf)?;
    let compression = footer.compression()?;
    Ok(ContainerInfo {
        footer,
        compression,
        container_len: buf.len(),
    })
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a DVPL container back to the original bytes.
pub fn decode(buf: &[u8]) -> DvplResult<Vec<u8>> {
    decode_with_info(buf).map(|(_, data)| data)
}

/// Decode a container and return its footer details alongside the data.
pub fn decode_with_info(buf: &[u8]) -> DvplResult<(ContainerInfo, Vec<u8>)> {
    let (footer, payload) = validate(buf)?;
    let compression = footer.compression()?;

    let data = match compression {
        CompressionType::Stored => {
            if footer.original_size != footer.compressed_size {
                return Err(DvplError::StoredSizeMismatch {
                    original: footer.original_size,
                    compressed: footer.compressed_size,
                });
            }
            log::debug!("decode: stored payload, {} bytes", payload.len());
            payload.to_vec()
        }
        ty @ (CompressionType::Lz4 | CompressionType::Lz4Hc) => {
            log::debug!(
                "decode: {ty} payload, {} -> {} bytes",
                payload.len(),
                footer.original_size
            );
            lz4::decompress_exact(payload, footer.original_size)?
        }
    };

    let info = ContainerInfo {
        footer,
        compression,
        container_len: buf.len(),
    };
    Ok((info, data))
}

/// Magic, size and checksum gates. Returns the footer and the payload slice.
fn validate(buf: &[u8]) -> DvplResult<(Footer, &[u8])> {
    let footer = Footer::parse(buf)?;
    let payload = payload(buf);
    debug_assert_eq!(payload.len() + FOOTER_LEN, buf.len());

    integrity::verify_size(payload, footer.compressed_size)?;
    integrity::verify_checksum(payload, footer.crc32)?;
    Ok((footer, payload))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Payload integrity checks.
//
// Both checks run before any decompression, size first so a truncated
// container is rejected without hashing it.

use super::error::{DvplError, DvplResult};

/// CRC32 (IEEE) of `block`.
#[inline]
pub fn checksum(block: &[u8]) -> u32 {
    crc32fast::hash(block)
}

/// Fail with [`DvplError::SizeMismatch`] unless `block` is `expected` bytes long.
pub fn verify_size(block: &[u8], expected: u32) -> DvplResult<()> {
    if u32::try_from(block.len()).ok() != Some(expected) {
        return Err(DvplError::SizeMismatch {
            expected,
            actual: block.len(),
        });
    }
    Ok(())
}

/// Fail with [`DvplError::ChecksumMismatch`] unless `block` hashes to `expected`.
pub fn verify_checksum(block: &[u8], expected: u32) -> DvplResult<()> {
    let actual = checksum(block);
    if actual != expected {
        return Err(DvplError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_crc32_vectors() {
        assert_eq!(checksum(b""), 0);
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
        assert_eq!(
            checksum(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
    }

    #[test]
    fn size_check() {
        assert!(verify_size(b"abcd", 4).is_ok());
        assert!(verify_size(b"", 0).is_ok());
        match verify_size(b"abc", 4) {
            Err(DvplError::SizeMismatch { expected, actual }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("expected SizeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn checksum_check() {
        let block = b"123456789";
        assert!(verify_checksum(block, 0xCBF4_3926).is_ok());
        match verify_checksum(block, 0) {
            Err(DvplError::ChecksumMismatch { expected, actual }) => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 0xCBF4_3926);
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }
}

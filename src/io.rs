// File-level helpers for packing/unpacking DVPL containers.
//
// Whole files are read into memory: the container format keeps its metadata
// at the end, so nothing can be emitted before the payload is complete.
// Optionally computes SHA-256 digests of the raw side (feature `file-io`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::container::{self, CompressionType, ContainerInfo, DvplError, EncodeOptions};

/// File suffix of packed containers.
pub const DVPL_SUFFIX: &str = ".dvpl";

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by [`pack_file`].
#[derive(Debug, Clone)]
pub struct PackStats {
    /// Raw input size in bytes.
    pub input_size: u64,
    /// Container size in bytes, footer included.
    pub output_size: u64,
    /// Compression type written to the footer.
    pub compression: CompressionType,
    /// SHA-256 of the raw input (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

/// Statistics returned by [`unpack_file`].
#[derive(Debug, Clone)]
pub struct UnpackStats {
    /// Container size in bytes.
    pub input_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Compression type read from the footer.
    pub compression: CompressionType,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Container encode/decode error.
    #[error("{path}: {source}")]
    Dvpl {
        path: PathBuf,
        #[source]
        source: DvplError,
    },
    /// Unpack target name could not be derived from the input name.
    #[error("{0}: file name does not end in {suffix}", suffix = DVPL_SUFFIX)]
    NotDvplName(PathBuf),
}

impl IoError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn dvpl(path: &Path, source: DvplError) -> Self {
        Self::Dvpl {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The container error behind this failure, if any.
    pub fn dvpl_error(&self) -> Option<&DvplError> {
        match self {
            Self::Dvpl { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Path naming
// ---------------------------------------------------------------------------

/// `name.ext` -> `name.ext.dvpl`.
pub fn packed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(DVPL_SUFFIX);
    PathBuf::from(name)
}

/// `name.ext.dvpl` -> `name.ext`. `None` if the name has no `.dvpl` suffix
/// (ASCII case-insensitive) or nothing in front of it.
pub fn unpacked_path(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_str()?;
    let stem_len = file_name.len().checked_sub(DVPL_SUFFIX.len())?;
    if stem_len == 0
        || !file_name.is_char_boundary(stem_len)
        || !file_name[stem_len..].eq_ignore_ascii_case(DVPL_SUFFIX)
    {
        return None;
    }
    Some(path.with_file_name(&file_name[..stem_len]))
}

/// Whether `path` names a packed container.
pub fn is_dvpl_path(path: &Path) -> bool {
    unpacked_path(path).is_some()
}

/// Extension hint for the encoder, with its leading dot (e.g. `".tex"`).
pub fn extension_hint(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

// ---------------------------------------------------------------------------
// pack_file / unpack_file / inspect_file
// ---------------------------------------------------------------------------

/// Pack `input` into a DVPL container at `output`.
///
/// With `opts == None` the compression type follows the input's extension.
pub fn pack_file(
    input: &Path,
    output: &Path,
    opts: Option<EncodeOptions>,
) -> Result<PackStats, IoError> {
    let data = std::fs::read(input).map_err(|e| IoError::io(input, e))?;
    let opts =
        opts.unwrap_or_else(|| EncodeOptions::for_extension(extension_hint(input).as_deref()));

    let packed = container::encode_with(&data, opts).map_err(|e| IoError::dvpl(input, e))?;
    std::fs::write(output, &packed).map_err(|e| IoError::io(output, e))?;
    log::info!(
        "packed {} -> {} ({} -> {} bytes, {})",
        input.display(),
        output.display(),
        data.len(),
        packed.len(),
        opts.compression
    );

    Ok(PackStats {
        input_size: data.len() as u64,
        output_size: packed.len() as u64,
        compression: opts.compression,
        input_sha256: sha256(&data),
    })
}

/// Unpack the container at `input` into `output`.
///
/// Nothing is written unless the container decodes completely.
pub fn unpack_file(input: &Path, output: &Path) -> Result<UnpackStats, IoError> {
    let (info, data) = read_and_decode(input)?;
    std::fs::write(output, &data).map_err(|e| IoError::io(output, e))?;
    log::info!(
        "unpacked {} -> {} ({} -> {} bytes, {})",
        input.display(),
        output.display(),
        info.container_len,
        data.len(),
        info.compression
    );

    Ok(UnpackStats {
        input_size: info.container_len as u64,
        output_size: data.len() as u64,
        compression: info.compression,
        output_sha256: sha256(&data),
    })
}

/// Fully decode the container at `input` without writing anything.
pub fn verify_file(input: &Path) -> Result<UnpackStats, IoError> {
    let (info, data) = read_and_decode(input)?;
    Ok(UnpackStats {
        input_size: info.container_len as u64,
        output_size: data.len() as u64,
        compression: info.compression,
        output_sha256: sha256(&data),
    })
}

/// Read the footer of the container at `input` and run the integrity gates.
pub fn inspect_file(input: &Path) -> Result<ContainerInfo, IoError> {
    let buf = std::fs::read(input).map_err(|e| IoError::io(input, e))?;
    container::inspect(&buf).map_err(|e| IoError::dvpl(input, e))
}

fn read_and_decode(input: &Path) -> Result<(ContainerInfo, Vec<u8>), IoError> {
    let buf = std::fs::read(input).map_err(|e| IoError::io(input, e))?;
    container::decode_with_info(&buf).map_err(|e| IoError::dvpl(input, e))
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    use sha2::Digest;
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

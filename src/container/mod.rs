// DVPL container codec.
//
// - `footer`    — 20-byte trailing footer layout and compression type tags
// - `integrity` — payload size and CRC32 gates
// - `lz4`       — raw LZ4 block compress / exact-size decompress
// - `decoder`   — container -> original bytes
// - `encoder`   — original bytes -> container, extension-driven type policy

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod footer;
pub mod integrity;
pub mod lz4;

pub use decoder::{ContainerInfo, decode, decode_with_info, inspect};
pub use encoder::{EncodeOptions, encode, encode_with, encode_with_extension};
pub use error::{DvplError, DvplResult};
pub use footer::{CompressionType, DVPL_MAGIC, FOOTER_LEN, Footer};

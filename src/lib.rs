//! dvpl: DVPL container packing/unpacking in Rust.
//!
//! A DVPL container is a payload (raw bytes or an LZ4 block) followed by a
//! 20-byte footer carrying the original size, payload size, CRC32 of the
//! payload, a compression type tag and the `DVPL` magic.
//!
//! The crate provides:
//! - The container codec (`container`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! let raw = b"tank hull mesh data".repeat(16);
//!
//! let packed = dvpl::encode_with_extension(&raw, Some(".sc2")).unwrap();
//! let unpacked = dvpl::decode(&packed).unwrap();
//! assert_eq!(unpacked, raw);
//! ```

pub mod container;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use container::{
    CompressionType, ContainerInfo, DvplError, DvplResult, EncodeOptions, Footer, decode,
    decode_with_info, encode, encode_with, encode_with_extension, inspect,
};

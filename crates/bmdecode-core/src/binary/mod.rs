//! Struct-descriptor driven decoding of hex payloads.
//!
//! Payloads are concatenations of fixed-size little-endian records, one per
//! channel. The layering follows the other decoders in this workspace:
//! - `layout`: field widths and the built-in wire layouts (source of truth)
//! - `descriptor`: the ordered field schema and its size calculator
//! - `reader`: hex conversion and safe little-endian reads
//! - `parser`: payload splitting and record unpacking (no direct indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure; payloads are never partially decoded. A payload whose
//! length does not match the channel list fails as a whole.

pub mod descriptor;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use descriptor::{FieldSpec, FieldType, StructDescriptor, struct_size_bytes};
pub use error::{DecodeError, DescriptorError};
pub use parser::{decode_payload_to_structs, decode_record};

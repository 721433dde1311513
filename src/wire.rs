//! The reader/writer runtime that generated procedures call into.
//!
//! Generated code only ever touches the methods here: array regions
//! (`read_array_start`/`has_next`, `write_array_start`/`write_array_end`),
//! struct boundaries (`align_struct`, `write_structure_start`), one entry
//! point per basic type, and the variant primitives. Every message owns
//! its own cursor, so procedures are reentrant across buffers.

mod reader;
mod writer;

pub use crate::signature::WireCode;
pub use reader::{ArrayEnd, Reader};
pub use writer::{ArrayStart, MessageWriter};

pub(crate) use writer::check_shape;

/// Longest array body the protocol permits.
pub(crate) const MAX_ARRAY_LEN: usize = 64 * 1024 * 1024;

/// Deepest nesting of variants inside variants that readers accept.
pub(crate) const MAX_VARIANT_DEPTH: usize = 64;

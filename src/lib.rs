//! Signature-driven marshalling code generation for DBus.
//!
//! Given DBus type signatures, this crate synthesizes, once per distinct
//! signature, the procedures that read a value of that type from a message
//! body and write one into it. Procedures are deduplicated by their
//! canonical signature: two interfaces that share a nested shape reference
//! one procedure.
//!
//! A generation pass runs in a [`Session`]:
//!
//! ```
//! use dbus_marshal_gen::{render_module, Session, Value};
//!
//! let mut session = Session::new();
//! let write = session.write_entry("a{sv}", false)?;
//! let read = session.read_entry("a{sv}", false)?;
//! let artifact = session.finish();
//!
//! // Execute the generated procedures directly...
//! let value = Value::dict("s", "v", vec![("k".into(), Value::variant(Value::U32(1)))]);
//! let message = artifact.write_message(&write, &[value.clone()])?;
//! assert_eq!(artifact.read_message(&read, &message)?, value);
//!
//! // ...or render them as Rust source.
//! assert!(render_module(&artifact).contains("pub fn read_dictionary_aesvz"));
//! # Ok::<(), dbus_marshal_gen::Error>(())
//! ```
//!
//! Whole interfaces, as described by introspection data, are handled by
//! [`Session::process_interface`]. Map types are chosen through the
//! [`policy`] module.
//!
//! Rendered code, and the [`Artifact`] evaluator, run on the reader and
//! writer in [`wire`] and the [`Message`] type. Transport, headers and the
//! rest of the DBus protocol are outside the scope of this crate.
//!
//! [`policy`]: crate::gen::policy

mod align;
pub mod cache;
pub mod error;
mod eval;
pub mod gen;
pub mod interface;
pub mod message;
pub mod native;
mod primitives;
pub mod procedure;
pub mod render;
pub mod signature;
pub mod value;
pub mod wire;

pub use error::{Error, GrammarError, Result};
pub use gen::{InterfaceReport, MemberFailure, Session};
pub use message::Message;
pub use procedure::Artifact;
pub use render::render_module;
pub use value::{DictKey, ObjectPath, Signature, UnixFd, Value};

//! The intermediate representation of generated procedures.
//!
//! Synthesizers append bodies here; [`render`](crate::render) turns them
//! into Rust text and [`eval`](crate::eval) executes them directly.

use crate::native::NativeType;
use crate::signature::{sanitize, Basic, WireCode};

use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcKind {
    Read,
    Write,
}

impl ProcKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ProcKind::Read => "read",
            ProcKind::Write => "write",
        }
    }
}

impl fmt::Display for ProcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// The shape a procedure handles, which also names it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Construct {
    Array,
    Dictionary,
    Struct,
    /// A whole message body of one or more values.
    Message,
    /// A message body holding a single variant of a known type.
    VariantMessage,
}

impl Construct {
    pub fn name(self) -> &'static str {
        match self {
            Construct::Array => "array",
            Construct::Dictionary => "dictionary",
            Construct::Struct => "struct",
            Construct::Message => "message",
            Construct::VariantMessage => "message_v",
        }
    }
}

/// `{kind}_{construct}_{sanitized signature}`, e.g. `read_array_ai`.
pub fn identifier(kind: ProcKind, construct: Construct, signature: &str) -> String {
    format!("{}_{}_{}", kind, construct.name(), sanitize(signature))
}

/// What a procedure calls to handle one nested value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Callee {
    /// A reader or writer entry point for a basic type.
    Primitive(Basic),
    /// The runtime's boxed variant primitive.
    Variant,
    /// Another generated procedure of the same kind.
    Procedure { ident: String, construct: Construct },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    Array {
        element: WireCode,
        item: Callee,
    },
    Dictionary {
        key: Callee,
        value: Callee,
    },
    Struct {
        members: Vec<Callee>,
    },
    Message {
        /// The statically expected signature inside a variant body.
        variant: Option<String>,
        values: Vec<Callee>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedProcedure {
    pub ident: String,
    pub kind: ProcKind,
    pub construct: Construct,
    /// Canonical signature handled; for messages, the body signature of
    /// the value(s) before any variant wrapping.
    pub signature: String,
    /// Read procedures: the single return type. Write procedures: one
    /// entry per value parameter.
    pub native: Vec<NativeType>,
    pub body: Body,
}

impl GeneratedProcedure {
    /// The signature the message header carries for an entry point.
    pub fn body_signature(&self) -> &str {
        match &self.body {
            Body::Message {
                variant: Some(_), ..
            } => "v",
            _ => &self.signature,
        }
    }
}

/// The frozen output of one generation pass. Immutable and shareable
/// across threads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Artifact {
    pub(crate) read: BTreeMap<String, GeneratedProcedure>,
    pub(crate) write: BTreeMap<String, GeneratedProcedure>,
}

impl Artifact {
    pub fn get(&self, kind: ProcKind, ident: &str) -> Option<&GeneratedProcedure> {
        match kind {
            ProcKind::Read => self.read.get(ident),
            ProcKind::Write => self.write.get(ident),
        }
    }

    pub fn len(&self) -> usize {
        self.read.len() + self.write.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read procedures first, each map in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedProcedure> {
        self.read.values().chain(self.write.values())
    }
}

#[cfg(test)]
mod tests {
    use super::{identifier, Artifact, Construct, ProcKind};
    use test_log::test;

    #[test]
    fn identifiers() {
        assert_eq!(
            identifier(ProcKind::Read, Construct::Array, "ai"),
            "read_array_ai"
        );
        assert_eq!(
            identifier(ProcKind::Write, Construct::Dictionary, "a{sv}"),
            "write_dictionary_aesvz"
        );
        assert_eq!(
            identifier(ProcKind::Read, Construct::Struct, "(sii)"),
            "read_struct_rsiiz"
        );
        assert_eq!(
            identifier(ProcKind::Read, Construct::VariantMessage, "s"),
            "read_message_v_s"
        );
    }

    #[test]
    fn artifact_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Artifact>();
        assert!(Artifact::default().is_empty());
    }
}

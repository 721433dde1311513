//! Generation sessions.
//!
//! A [`Session`] owns the [`MethodCache`] and the [`TypeMapper`] for one
//! pass. Procedures are synthesized lazily, the first time any caller asks
//! for a signature, and every later request for the same signature reuses
//! the registered identifier. [`Session::finish`] freezes the result into
//! an [`Artifact`].
//!
//! The synthesizers themselves live in the [`read`], [`write`] and
//! [`entry`] submodules; this module holds the session and the processing
//! of whole interfaces.

use crate::cache::MethodCache;
use crate::error::{Error, Result};
use crate::interface::{Access, Arg, Direction, Interface, Member};
use crate::native::TypeMapper;
use crate::procedure::{Artifact, Callee, Construct};
use crate::signature::{parse, Tag, TypeNode};

use log::warn;

mod entry;
pub mod policy;
mod read;
mod write;

use policy::{DefaultGeneratorPolicy, GeneratorPolicy};

pub struct Session<P: GeneratorPolicy = DefaultGeneratorPolicy> {
    cache: MethodCache,
    mapper: TypeMapper<P>,
}

/// Result of processing one interface: the entry points it produced and
/// the members that could not be generated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterfaceReport {
    pub interface: String,
    pub entry_points: Vec<String>,
    pub failures: Vec<MemberFailure>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemberFailure {
    pub member: String,
    pub error: Error,
}

impl InterfaceReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

// Basics and variants are handled by runtime primitives directly, the
// rest by generated procedures.
enum Shape {
    Leaf(Callee),
    Container(Construct),
}

fn shape(node: &TypeNode) -> Shape {
    match node.tag() {
        Tag::Basic(basic) => Shape::Leaf(Callee::Primitive(basic)),
        Tag::Variant => Shape::Leaf(Callee::Variant),
        Tag::Array => Shape::Container(Construct::Array),
        Tag::DictEntry => Shape::Container(Construct::Dictionary),
        Tag::Struct => Shape::Container(Construct::Struct),
    }
}

// Every arg must be exactly one complete type on its own; a body
// signature is only their concatenation.
fn body_signature<'a>(args: impl Iterator<Item = &'a Arg>) -> Result<String> {
    let mut signature = String::new();
    for arg in args {
        parse(&arg.signature)?;
        signature.push_str(&arg.signature);
    }
    Ok(signature)
}

impl Session {
    pub fn new() -> Self {
        Self::with_policy(DefaultGeneratorPolicy)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GeneratorPolicy> Session<P> {
    pub fn with_policy(policy: P) -> Self {
        Self {
            cache: MethodCache::new(),
            mapper: TypeMapper::with_policy(policy),
        }
    }

    pub fn cache(&self) -> &MethodCache {
        &self.cache
    }

    pub fn finish(self) -> Artifact {
        self.cache.freeze()
    }

    /// Generates the entry points every member of `interface` needs.
    ///
    /// Method in-args are written and out-args read; signal args are
    /// read; property values travel in variants and are read when the
    /// property is readable and written when it is writable. A member
    /// that fails is recorded and the rest are still processed.
    pub fn process_interface(&mut self, interface: &Interface) -> InterfaceReport {
        let mut report = InterfaceReport {
            interface: interface.name.clone(),
            ..InterfaceReport::default()
        };
        for member in interface.members() {
            if let Err(error) = self.process_member(&member, &mut report.entry_points) {
                warn!("{}.{}: {}", interface.name, member.name(), error);
                report.failures.push(MemberFailure {
                    member: member.name().to_owned(),
                    error,
                });
            }
        }
        report
    }

    pub fn process_interfaces(&mut self, interfaces: &[Interface]) -> Vec<InterfaceReport> {
        interfaces
            .iter()
            .map(|interface| self.process_interface(interface))
            .collect()
    }

    fn process_member(&mut self, member: &Member<'_>, entry_points: &mut Vec<String>) -> Result<()> {
        match member {
            Member::Method(method) => {
                let inputs = body_signature(
                    method
                        .args
                        .iter()
                        .filter(|arg| arg.direction != Some(Direction::Out)),
                )?;
                let outputs = body_signature(
                    method
                        .args
                        .iter()
                        .filter(|arg| arg.direction == Some(Direction::Out)),
                )?;
                if !inputs.is_empty() {
                    entry_points.push(self.write_entry(&inputs, false)?);
                }
                if !outputs.is_empty() {
                    entry_points.push(self.read_entry(&outputs, false)?);
                }
            }
            Member::Signal(signal) => {
                let args = body_signature(signal.args.iter())?;
                if !args.is_empty() {
                    entry_points.push(self.read_entry(&args, false)?);
                }
            }
            Member::Property(property) => {
                if matches!(property.access, Access::Read | Access::ReadWrite) {
                    entry_points.push(self.read_entry(&property.signature, true)?);
                }
                if matches!(property.access, Access::Write | Access::ReadWrite) {
                    entry_points.push(self.write_entry(&property.signature, true)?);
                }
            }
        }
        Ok(())
    }
}

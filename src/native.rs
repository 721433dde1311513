//! Mapping from type trees to the Rust types generated code works with.

use crate::error::{Error, Result};
use crate::gen::policy::{DefaultGeneratorPolicy, GeneratorPolicy};
use crate::signature::{Basic, Tag, TypeNode};

use std::fmt;

/// Whether a type is produced by a read procedure or consumed by a write
/// procedure. Writers borrow their input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessMode {
    Read,
    Write,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapStyle {
    HashMap,
    BTreeMap,
}

impl MapStyle {
    pub fn name(self) -> &'static str {
        match self {
            MapStyle::HashMap => "HashMap",
            MapStyle::BTreeMap => "BTreeMap",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeType {
    Basic(Basic),
    /// The boxed any-value a variant decodes to.
    Value,
    Vec(Box<NativeType>),
    Map {
        style: MapStyle,
        key: Box<NativeType>,
        value: Box<NativeType>,
    },
    Tuple(Vec<NativeType>),
    Ref(Box<NativeType>),
    Option(Box<NativeType>),
}

impl NativeType {
    fn basic_name(basic: Basic) -> &'static str {
        match basic {
            Basic::Byte => "u8",
            Basic::Bool => "bool",
            Basic::Int16 => "i16",
            Basic::UInt16 => "u16",
            Basic::Int32 => "i32",
            Basic::UInt32 => "u32",
            Basic::Int64 => "i64",
            Basic::UInt64 => "u64",
            Basic::Double => "f64",
            Basic::String => "String",
            Basic::ObjectPath => "ObjectPath",
            Basic::Signature => "Signature",
            Basic::UnixFd => "UnixFd",
        }
    }

    /// Whether any map of the given style occurs in this type.
    pub fn uses_map(&self, style: MapStyle) -> bool {
        match self {
            NativeType::Basic(_) | NativeType::Value => false,
            NativeType::Vec(inner) | NativeType::Ref(inner) | NativeType::Option(inner) => {
                inner.uses_map(style)
            }
            NativeType::Map {
                style: own,
                key,
                value,
            } => *own == style || key.uses_map(style) || value.uses_map(style),
            NativeType::Tuple(members) => members.iter().any(|member| member.uses_map(style)),
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::Basic(basic) => f.write_str(NativeType::basic_name(*basic)),
            NativeType::Value => f.write_str("Value"),
            NativeType::Vec(inner) => write!(f, "Vec<{}>", inner),
            NativeType::Map { style, key, value } => {
                write!(f, "{}<{}, {}>", style.name(), key, value)
            }
            NativeType::Tuple(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", member)?;
                }
                if members.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            NativeType::Ref(inner) => match inner.as_ref() {
                NativeType::Basic(Basic::String) => f.write_str("&str"),
                NativeType::Vec(element) => write!(f, "&[{}]", element),
                other => write!(f, "&{}", other),
            },
            NativeType::Option(inner) => write!(f, "Option<{}>", inner),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TypeMapper<P: GeneratorPolicy = DefaultGeneratorPolicy> {
    policy: P,
}

impl TypeMapper {
    pub fn new() -> Self {
        Self::with_policy(DefaultGeneratorPolicy)
    }
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GeneratorPolicy> TypeMapper<P> {
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }

    /// The native type for `node`. In write mode the outermost level is
    /// borrowed unless it is a `Copy` basic; `nullable` additionally wraps
    /// borrowed arrays and maps in `Option`.
    pub fn map(&self, node: &TypeNode, mode: AccessMode, nullable: bool) -> Result<NativeType> {
        let owned = self.owned(node)?;
        Ok(match (mode, node.tag()) {
            (AccessMode::Read, _) => owned,
            (AccessMode::Write, Tag::Basic(basic)) if basic.is_copy() => owned,
            (AccessMode::Write, Tag::Array) | (AccessMode::Write, Tag::DictEntry) if nullable => {
                NativeType::Option(Box::new(NativeType::Ref(Box::new(owned))))
            }
            (AccessMode::Write, _) => NativeType::Ref(Box::new(owned)),
        })
    }

    fn owned(&self, node: &TypeNode) -> Result<NativeType> {
        Ok(match node.tag() {
            Tag::Basic(basic) => NativeType::Basic(basic),
            Tag::Variant => NativeType::Value,
            Tag::Array => NativeType::Vec(Box::new(self.owned(&node.children()[0])?)),
            Tag::DictEntry => {
                let (key, value) = (&node.children()[0], &node.children()[1]);
                if key.tag() == Tag::Basic(Basic::Double) {
                    return Err(Error::UnsupportedKind {
                        code: 'd',
                        reason: "f64 cannot be a map key",
                    });
                }
                NativeType::Map {
                    style: self.policy.query_map_style(node.signature()),
                    key: Box::new(self.owned(key)?),
                    value: Box::new(self.owned(value)?),
                }
            }
            Tag::Struct => NativeType::Tuple(
                node.children()
                    .iter()
                    .map(|member| self.owned(member))
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessMode, MapStyle, NativeType, TypeMapper};
    use crate::error::{Error, Result};
    use crate::gen::policy::OrderedMapPolicy;
    use crate::signature::{parse, Basic};
    use test_log::test;

    fn render(sig: &str, mode: AccessMode, nullable: bool) -> Result<String> {
        Ok(TypeMapper::new()
            .map(&parse(sig)?, mode, nullable)?
            .to_string())
    }

    #[test]
    fn basic_table() -> Result<()> {
        let expected = [
            ("y", "u8"),
            ("b", "bool"),
            ("n", "i16"),
            ("q", "u16"),
            ("i", "i32"),
            ("u", "u32"),
            ("x", "i64"),
            ("t", "u64"),
            ("d", "f64"),
            ("s", "String"),
            ("o", "ObjectPath"),
            ("g", "Signature"),
            ("h", "UnixFd"),
            ("v", "Value"),
        ];
        for (sig, native) in expected.iter() {
            assert_eq!(render(sig, AccessMode::Read, false)?, *native);
        }
        Ok(())
    }

    #[test]
    fn containers() -> Result<()> {
        assert_eq!(render("ai", AccessMode::Read, false)?, "Vec<i32>");
        assert_eq!(render("a{sv}", AccessMode::Read, false)?, "HashMap<String, Value>");
        assert_eq!(render("(sii)", AccessMode::Read, false)?, "(String, i32, i32)");
        assert_eq!(render("(s)", AccessMode::Read, false)?, "(String,)");
        assert_eq!(
            render("a(sa{oi})", AccessMode::Read, false)?,
            "Vec<(String, HashMap<ObjectPath, i32>)>"
        );
        Ok(())
    }

    #[test]
    fn write_mode_borrows_outermost() -> Result<()> {
        assert_eq!(render("i", AccessMode::Write, true)?, "i32");
        assert_eq!(render("s", AccessMode::Write, true)?, "&str");
        assert_eq!(render("o", AccessMode::Write, false)?, "&ObjectPath");
        assert_eq!(render("v", AccessMode::Write, false)?, "&Value");
        assert_eq!(render("aai", AccessMode::Write, false)?, "&[Vec<i32>]");
        assert_eq!(render("aai", AccessMode::Write, true)?, "Option<&[Vec<i32>]>");
        assert_eq!(
            render("a{sv}", AccessMode::Write, true)?,
            "Option<&HashMap<String, Value>>"
        );
        assert_eq!(render("(si)", AccessMode::Write, true)?, "&(String, i32)");
        Ok(())
    }

    #[test]
    fn deterministic() -> Result<()> {
        let mapper = TypeMapper::new();
        let node = parse("a{s(iv)}")?;
        assert_eq!(
            mapper.map(&node, AccessMode::Read, false)?,
            mapper.map(&node, AccessMode::Read, false)?
        );
        Ok(())
    }

    #[test]
    fn double_keys_unsupported() -> Result<()> {
        let node = parse("a{dv}")?;
        assert!(matches!(
            TypeMapper::new().map(&node, AccessMode::Read, false),
            Err(Error::UnsupportedKind { code: 'd', .. })
        ));
        Ok(())
    }

    #[test]
    fn ordered_maps() -> Result<()> {
        let mapper = TypeMapper::with_policy(OrderedMapPolicy);
        let native = mapper.map(&parse("a{ss}")?, AccessMode::Read, false)?;
        assert_eq!(native.to_string(), "BTreeMap<String, String>");
        assert!(native.uses_map(MapStyle::BTreeMap));
        assert!(!native.uses_map(MapStyle::HashMap));
        assert!(!NativeType::Basic(Basic::Int32).uses_map(MapStyle::HashMap));
        Ok(())
    }
}

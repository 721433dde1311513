//! The boxed "any DBus value" that variants carry, and the newtypes for
//! basic types that have no natural Rust counterpart.

use crate::error::{Error, Result};
use crate::signature::Basic;

use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath(pub String);

impl ObjectPath {
    /// Checks the path syntax: `/`, or `/`-separated non-empty elements
    /// of `[A-Za-z0-9_]` with no trailing slash.
    pub fn validate(path: &str) -> Result<()> {
        let valid = path == "/"
            || (path.starts_with('/')
                && path[1..].split('/').all(|element| {
                    !element.is_empty()
                        && element
                            .bytes()
                            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
                }));
        if valid {
            Ok(())
        } else {
            Err(Error::InvalidObjectPath(path.to_owned()))
        }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(pub String);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index into the file descriptor array sent alongside a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnixFd(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Byte(u8),
    Bool(bool),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Double(f64),
    Str(String),
    ObjectPath(ObjectPath),
    Signature(Signature),
    UnixFd(UnixFd),
    Variant(Box<Value>),
    Array(Array),
    Dict(Dict),
    Struct(Vec<Value>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    /// Full array signature, `a` included.
    pub signature: String,
    pub items: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dict {
    /// Full dictionary signature, e.g. `a{sv}`.
    pub signature: String,
    pub entries: HashMap<DictKey, Value>,
}

/// The basic values usable as dictionary keys. Doubles are excluded as
/// they have no total equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DictKey {
    Byte(u8),
    Bool(bool),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Str(String),
    ObjectPath(ObjectPath),
    Signature(Signature),
    UnixFd(UnixFd),
}

impl Value {
    pub fn array(element: &str, items: Vec<Value>) -> Value {
        Value::Array(Array {
            signature: format!("a{}", element),
            items,
        })
    }

    pub fn dict<I>(key: &str, value: &str, entries: I) -> Value
    where
        I: IntoIterator<Item = (DictKey, Value)>,
    {
        Value::Dict(Dict {
            signature: format!("a{{{}{}}}", key, value),
            entries: entries.into_iter().collect(),
        })
    }

    pub fn variant(inner: Value) -> Value {
        Value::Variant(Box::new(inner))
    }

    pub fn signature(&self) -> String {
        match self {
            Value::Array(array) => array.signature.clone(),
            Value::Dict(dict) => dict.signature.clone(),
            Value::Struct(members) => {
                let mut sig = String::from("(");
                for member in members {
                    sig.push_str(&member.signature());
                }
                sig.push(')');
                sig
            }
            Value::Variant(_) => "v".to_owned(),
            basic => basic
                .basic()
                .map(|kind| kind.code().to_string())
                .unwrap_or_default(),
        }
    }

    /// The basic kind of this value, if it is one.
    pub fn basic(&self) -> Option<Basic> {
        match self {
            Value::Byte(_) => Some(Basic::Byte),
            Value::Bool(_) => Some(Basic::Bool),
            Value::I16(_) => Some(Basic::Int16),
            Value::U16(_) => Some(Basic::UInt16),
            Value::I32(_) => Some(Basic::Int32),
            Value::U32(_) => Some(Basic::UInt32),
            Value::I64(_) => Some(Basic::Int64),
            Value::U64(_) => Some(Basic::UInt64),
            Value::Double(_) => Some(Basic::Double),
            Value::Str(_) => Some(Basic::String),
            Value::ObjectPath(_) => Some(Basic::ObjectPath),
            Value::Signature(_) => Some(Basic::Signature),
            Value::UnixFd(_) => Some(Basic::UnixFd),
            Value::Variant(_) | Value::Array(_) | Value::Dict(_) | Value::Struct(_) => None,
        }
    }
}

impl From<DictKey> for Value {
    fn from(key: DictKey) -> Value {
        match key {
            DictKey::Byte(v) => Value::Byte(v),
            DictKey::Bool(v) => Value::Bool(v),
            DictKey::I16(v) => Value::I16(v),
            DictKey::U16(v) => Value::U16(v),
            DictKey::I32(v) => Value::I32(v),
            DictKey::U32(v) => Value::U32(v),
            DictKey::I64(v) => Value::I64(v),
            DictKey::U64(v) => Value::U64(v),
            DictKey::Str(v) => Value::Str(v),
            DictKey::ObjectPath(v) => Value::ObjectPath(v),
            DictKey::Signature(v) => Value::Signature(v),
            DictKey::UnixFd(v) => Value::UnixFd(v),
        }
    }
}

impl TryFrom<Value> for DictKey {
    type Error = Error;

    fn try_from(value: Value) -> Result<DictKey> {
        match value {
            Value::Byte(v) => Ok(DictKey::Byte(v)),
            Value::Bool(v) => Ok(DictKey::Bool(v)),
            Value::I16(v) => Ok(DictKey::I16(v)),
            Value::U16(v) => Ok(DictKey::U16(v)),
            Value::I32(v) => Ok(DictKey::I32(v)),
            Value::U32(v) => Ok(DictKey::U32(v)),
            Value::I64(v) => Ok(DictKey::I64(v)),
            Value::U64(v) => Ok(DictKey::U64(v)),
            Value::Str(v) => Ok(DictKey::Str(v)),
            Value::ObjectPath(v) => Ok(DictKey::ObjectPath(v)),
            Value::Signature(v) => Ok(DictKey::Signature(v)),
            Value::UnixFd(v) => Ok(DictKey::UnixFd(v)),
            Value::Double(_) => Err(Error::UnsupportedKind {
                code: 'd',
                reason: "doubles cannot be dictionary keys",
            }),
            other => Err(Error::ValueShape {
                expected: "basic type".to_owned(),
                found: other.signature(),
            }),
        }
    }
}

impl From<&str> for DictKey {
    fn from(key: &str) -> DictKey {
        DictKey::Str(key.to_owned())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Str(value.to_owned())
    }
}

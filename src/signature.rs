//! Parsing of DBus type signatures into [`TypeNode`] trees.
//!
//! The grammar is the one from the DBus specification: single-character
//! basic type codes, `a` as an array prefix, `(...)` for structs, `{kv}`
//! for dictionary entries (only directly inside an array) and `v` for
//! variants. [`parse`] accepts exactly one complete type, [`parse_multiple`]
//! accepts the concatenation of zero or more complete types, as found in
//! message bodies.

use crate::error::GrammarError;

use std::fmt;

const MAX_SIGNATURE_LEN: usize = 255;
const MAX_NESTING: usize = 32;

/// The thirteen basic (non-container, non-variant) DBus types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Basic {
    Byte,
    Bool,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    ObjectPath,
    Signature,
    UnixFd,
}

impl Basic {
    pub const ALL: [Basic; 13] = [
        Basic::Byte,
        Basic::Bool,
        Basic::Int16,
        Basic::UInt16,
        Basic::Int32,
        Basic::UInt32,
        Basic::Int64,
        Basic::UInt64,
        Basic::Double,
        Basic::String,
        Basic::ObjectPath,
        Basic::Signature,
        Basic::UnixFd,
    ];

    pub fn from_code(code: u8) -> Option<Basic> {
        match code {
            b'y' => Some(Basic::Byte),
            b'b' => Some(Basic::Bool),
            b'n' => Some(Basic::Int16),
            b'q' => Some(Basic::UInt16),
            b'i' => Some(Basic::Int32),
            b'u' => Some(Basic::UInt32),
            b'x' => Some(Basic::Int64),
            b't' => Some(Basic::UInt64),
            b'd' => Some(Basic::Double),
            b's' => Some(Basic::String),
            b'o' => Some(Basic::ObjectPath),
            b'g' => Some(Basic::Signature),
            b'h' => Some(Basic::UnixFd),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Basic::Byte => 'y',
            Basic::Bool => 'b',
            Basic::Int16 => 'n',
            Basic::UInt16 => 'q',
            Basic::Int32 => 'i',
            Basic::UInt32 => 'u',
            Basic::Int64 => 'x',
            Basic::UInt64 => 't',
            Basic::Double => 'd',
            Basic::String => 's',
            Basic::ObjectPath => 'o',
            Basic::Signature => 'g',
            Basic::UnixFd => 'h',
        }
    }

    pub fn wire_code(self) -> WireCode {
        match self {
            Basic::Byte => WireCode::Byte,
            Basic::Bool => WireCode::Bool,
            Basic::Int16 => WireCode::Int16,
            Basic::UInt16 => WireCode::UInt16,
            Basic::Int32 => WireCode::Int32,
            Basic::UInt32 => WireCode::UInt32,
            Basic::Int64 => WireCode::Int64,
            Basic::UInt64 => WireCode::UInt64,
            Basic::Double => WireCode::Double,
            Basic::String => WireCode::String,
            Basic::ObjectPath => WireCode::ObjectPath,
            Basic::Signature => WireCode::Signature,
            Basic::UnixFd => WireCode::UnixFd,
        }
    }

    /// Whether the native type is `Copy` and therefore passed by value
    /// to writers.
    pub fn is_copy(self) -> bool {
        !matches!(self, Basic::String | Basic::ObjectPath | Basic::Signature)
    }
}

/// Type codes as the reader and writer runtime see them when opening
/// an array region. Dictionary entries travel as [`WireCode::Struct`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireCode {
    Byte,
    Bool,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    ObjectPath,
    Signature,
    UnixFd,
    Array,
    Struct,
    Variant,
}

impl WireCode {
    pub fn alignment(self) -> usize {
        match self {
            WireCode::Byte => 1,
            WireCode::Bool => 4,
            WireCode::Int16 => 2,
            WireCode::UInt16 => 2,
            WireCode::Int32 => 4,
            WireCode::UInt32 => 4,
            WireCode::Int64 => 8,
            WireCode::UInt64 => 8,
            WireCode::Double => 8,
            WireCode::String => 4,
            WireCode::ObjectPath => 4,
            WireCode::Signature => 1,
            WireCode::UnixFd => 4,
            WireCode::Array => 4,
            WireCode::Struct => 8,
            WireCode::Variant => 1,
        }
    }

    /// The variant name, as it appears in generated source.
    pub fn name(self) -> &'static str {
        match self {
            WireCode::Byte => "Byte",
            WireCode::Bool => "Bool",
            WireCode::Int16 => "Int16",
            WireCode::UInt16 => "UInt16",
            WireCode::Int32 => "Int32",
            WireCode::UInt32 => "UInt32",
            WireCode::Int64 => "Int64",
            WireCode::UInt64 => "UInt64",
            WireCode::Double => "Double",
            WireCode::String => "String",
            WireCode::ObjectPath => "ObjectPath",
            WireCode::Signature => "Signature",
            WireCode::UnixFd => "UnixFd",
            WireCode::Array => "Array",
            WireCode::Struct => "Struct",
            WireCode::Variant => "Variant",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Basic(Basic),
    Variant,
    Array,
    /// An array of dictionary entries, `a{kv}`. The node covers the whole
    /// array and its two children are the key and value types.
    DictEntry,
    Struct,
}

/// One complete type parsed from a signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeNode {
    tag: Tag,
    signature: String,
    children: Vec<TypeNode>,
}

impl TypeNode {
    fn leaf(tag: Tag, signature: &str) -> Self {
        TypeNode {
            tag,
            signature: signature.to_owned(),
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The canonical signature of this node, e.g. `a{sv}`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn children(&self) -> &[TypeNode] {
        &self.children
    }

    pub fn is_basic(&self) -> bool {
        matches!(self.tag, Tag::Basic(_))
    }

    /// The code announced to the runtime when this node is an array element.
    pub fn wire_code(&self) -> WireCode {
        match self.tag {
            Tag::Basic(basic) => basic.wire_code(),
            Tag::Variant => WireCode::Variant,
            Tag::Array | Tag::DictEntry => WireCode::Array,
            Tag::Struct => WireCode::Struct,
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature)
    }
}

/// Parses a signature holding exactly one complete type.
pub fn parse(signature: &str) -> Result<TypeNode, GrammarError> {
    if signature.is_empty() {
        return Err(GrammarError::Empty);
    }
    let mut parser = Parser::new(signature)?;
    let node = parser.complete_type()?;
    if parser.ix != parser.sig.len() {
        return Err(GrammarError::Trailing { offset: parser.ix });
    }
    Ok(node)
}

/// Parses a signature holding any number of complete types, in order.
pub fn parse_multiple(signature: &str) -> Result<Vec<TypeNode>, GrammarError> {
    let mut parser = Parser::new(signature)?;
    let mut nodes = Vec::new();
    while parser.ix < parser.sig.len() {
        nodes.push(parser.complete_type()?);
    }
    Ok(nodes)
}

/// Turns a valid signature into a token usable inside an identifier.
///
/// Basic codes are kept, `(` becomes `r`, `{` becomes `e` and both closers
/// become `z`. None of `r`, `e`, `z` is a type code, and a closer is always
/// determined by the opener it matches, so distinct valid signatures never
/// share a token.
pub fn sanitize(signature: &str) -> String {
    signature
        .chars()
        .map(|c| match c {
            '(' => 'r',
            '{' => 'e',
            ')' | '}' => 'z',
            other => other,
        })
        .collect()
}

struct Parser<'s> {
    text: &'s str,
    sig: &'s [u8],
    ix: usize,
    arrays: usize,
    structs: usize,
}

impl<'s> Parser<'s> {
    fn new(text: &'s str) -> Result<Self, GrammarError> {
        if text.len() > MAX_SIGNATURE_LEN {
            return Err(GrammarError::TooLong(text.len()));
        }
        Ok(Parser {
            text,
            sig: text.as_bytes(),
            ix: 0,
            arrays: 0,
            structs: 0,
        })
    }

    // Callers guarantee there is at least one byte left.
    fn complete_type(&mut self) -> Result<TypeNode, GrammarError> {
        let start = self.ix;
        let code = self.sig[start];
        self.ix += 1;
        match code {
            b'a' => self.array(start),
            b'(' => self.structure(start),
            b'v' => Ok(TypeNode::leaf(Tag::Variant, "v")),
            b'{' => Err(GrammarError::DictEntryOutsideArray { offset: start }),
            b')' | b'}' => Err(GrammarError::UnexpectedClose {
                found: code as char,
                offset: start,
            }),
            other => match Basic::from_code(other) {
                Some(basic) => Ok(TypeNode::leaf(Tag::Basic(basic), &self.text[start..self.ix])),
                None => Err(GrammarError::UnknownCode {
                    code: self.text[start..].chars().next().unwrap_or('?'),
                    offset: start,
                }),
            },
        }
    }

    fn array(&mut self, start: usize) -> Result<TypeNode, GrammarError> {
        if self.ix >= self.sig.len() {
            return Err(GrammarError::MissingElement { offset: start });
        }
        self.arrays += 1;
        if self.arrays > MAX_NESTING {
            return Err(GrammarError::TooDeep {
                kind: "array",
                offset: start,
            });
        }
        let node = if self.sig[self.ix] == b'{' {
            self.dict_entry(start)?
        } else {
            let element = self.complete_type()?;
            TypeNode {
                tag: Tag::Array,
                signature: self.text[start..self.ix].to_owned(),
                children: vec![element],
            }
        };
        self.arrays -= 1;
        Ok(node)
    }

    fn dict_entry(&mut self, array_start: usize) -> Result<TypeNode, GrammarError> {
        let open = self.ix;
        self.ix += 1;
        let members = self.members(b'{', open)?;
        if members.len() != 2 {
            return Err(GrammarError::DictEntryArity {
                offset: open,
                count: members.len(),
            });
        }
        if !members[0].is_basic() {
            return Err(GrammarError::NonBasicKey { offset: open + 1 });
        }
        Ok(TypeNode {
            tag: Tag::DictEntry,
            signature: self.text[array_start..self.ix].to_owned(),
            children: members,
        })
    }

    fn structure(&mut self, open: usize) -> Result<TypeNode, GrammarError> {
        let members = self.members(b'(', open)?;
        if members.is_empty() {
            return Err(GrammarError::EmptyStruct { offset: open });
        }
        Ok(TypeNode {
            tag: Tag::Struct,
            signature: self.text[open..self.ix].to_owned(),
            children: members,
        })
    }

    // Reads complete types up to and including the closer matching `open`.
    fn members(&mut self, open: u8, offset: usize) -> Result<Vec<TypeNode>, GrammarError> {
        let close = if open == b'(' { b')' } else { b'}' };
        self.structs += 1;
        if self.structs > MAX_NESTING {
            return Err(GrammarError::TooDeep {
                kind: "struct",
                offset,
            });
        }
        let mut members = Vec::new();
        loop {
            match self.sig.get(self.ix) {
                None => {
                    return Err(GrammarError::Unbalanced {
                        open: open as char,
                        offset,
                    })
                }
                Some(&c) if c == close => {
                    self.ix += 1;
                    break;
                }
                Some(_) => members.push(self.complete_type()?),
            }
        }
        self.structs -= 1;
        Ok(members)
    }
}

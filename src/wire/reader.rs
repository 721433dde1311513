use super::{MAX_ARRAY_LEN, MAX_VARIANT_DEPTH};
use crate::align::align;
use crate::error::{Error, Result};
use crate::primitives::DbusPrimitive;
use crate::signature::{parse, Basic, Tag, TypeNode, WireCode};
use crate::value::{Array, Dict, DictKey, ObjectPath, Signature, UnixFd, Value};

use byteorder::{ByteOrder, LE};
use log::{error, trace};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::marker::PhantomData;

/// A cursor over one message body. Alignment is relative to the start of
/// the slice, which must itself be 8-aligned in the full message.
pub struct Reader<'a, B: ByteOrder = LE> {
    data: &'a [u8],
    ix: usize,
    variant_depth: usize,
    phantom: PhantomData<B>,
}

/// Marks where an array region ends, returned by
/// [`Reader::read_array_start`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayEnd {
    end_ix: usize,
    alignment: usize,
}

impl<'a, B: ByteOrder> Reader<'a, B> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            ix: 0,
            variant_depth: 0,
            phantom: PhantomData,
        }
    }

    pub fn position(&self) -> usize {
        self.ix
    }

    /// Fails if any bytes were left unread.
    pub fn complete(&self) -> Result<()> {
        let leftover_data = self.data.len() - self.ix;
        if leftover_data != 0 {
            return Err(Error::LeftoverData(leftover_data));
        }
        Ok(())
    }

    // Index after read must be valid for read to be valid
    fn validate_ix(&self, ix: usize) -> Result<()> {
        if ix > self.data.len() {
            error!("Index {} out of bounds of {} bytes", ix, self.data.len());
            return Err(Error::IndexOutOfBounds(ix));
        }
        Ok(())
    }

    pub(crate) fn align(&mut self, alignment: usize) -> Result<()> {
        let new_ix = align(self.ix, alignment);
        self.validate_ix(new_ix)?;
        self.ix = new_ix;
        Ok(())
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let old_ix = self.ix;
        let new_ix = old_ix
            .checked_add(len)
            .ok_or(Error::IndexOutOfBounds(usize::MAX))?;
        self.validate_ix(new_ix)?;
        self.ix = new_ix;
        Ok(&self.data[old_ix..new_ix])
    }

    fn read_primitive<T: DbusPrimitive>(&mut self) -> Result<T> {
        trace!("read {} at {}", T::wire_code().name(), self.ix);
        T::read_from(self)
    }

    /// Opens an array whose elements have type `element`.
    pub fn read_array_start(&mut self, element: WireCode) -> Result<ArrayEnd> {
        let len = self.read_primitive::<u32>()? as usize;
        if len > MAX_ARRAY_LEN {
            return Err(Error::ArrayTooLong(len));
        }
        self.align(element.alignment())?;
        let end_ix = self.ix + len;
        self.validate_ix(end_ix)?;
        trace!("array of {} bytes from {} to {}", len, self.ix, end_ix);
        Ok(ArrayEnd {
            end_ix,
            alignment: element.alignment(),
        })
    }

    /// Whether another element precedes `end`. Aligns to the next element.
    pub fn has_next(&mut self, end: &ArrayEnd) -> Result<bool> {
        match self.ix.cmp(&end.end_ix) {
            Ordering::Greater => Err(Error::ArrayElementOverrun(self.ix, end.end_ix)),
            Ordering::Equal => Ok(false),
            Ordering::Less => {
                self.align(end.alignment)?;
                if self.ix >= end.end_ix {
                    return Err(Error::ArrayElementOverrun(self.ix, end.end_ix));
                }
                Ok(true)
            }
        }
    }

    pub fn align_struct(&mut self) -> Result<()> {
        self.align(WireCode::Struct.alignment())
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.read_primitive()
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_primitive()
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_primitive()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_primitive()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_primitive()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_primitive()
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_primitive()
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_primitive()
    }

    pub fn read_double(&mut self) -> Result<f64> {
        self.read_primitive()
    }

    pub fn read_string(&mut self) -> Result<String> {
        self.read_primitive()
    }

    pub fn read_object_path(&mut self) -> Result<ObjectPath> {
        self.read_primitive()
    }

    pub fn read_signature(&mut self) -> Result<Signature> {
        self.read_primitive()
    }

    pub fn read_unix_fd(&mut self) -> Result<UnixFd> {
        self.read_primitive()
    }

    /// Reads the signature a variant starts with and checks it against
    /// the statically expected one.
    pub fn expect_signature(&mut self, expected: &str) -> Result<()> {
        let Signature(found) = self.read_signature()?;
        if found != expected {
            return Err(Error::ProtocolMismatch {
                expected: expected.to_owned(),
                found,
            });
        }
        Ok(())
    }

    /// Reads a variant: its embedded signature, then a value of that type.
    pub fn read_variant_value(&mut self) -> Result<Value> {
        let Signature(sig) = self.read_signature()?;
        let node = parse(&sig)?;
        if self.variant_depth >= MAX_VARIANT_DEPTH {
            return Err(Error::VariantDepth(MAX_VARIANT_DEPTH));
        }
        self.variant_depth += 1;
        let value = self.read_value(&node);
        self.variant_depth -= 1;
        value
    }

    pub fn read_basic(&mut self, basic: Basic) -> Result<Value> {
        Ok(match basic {
            Basic::Byte => Value::Byte(self.read_byte()?),
            Basic::Bool => Value::Bool(self.read_bool()?),
            Basic::Int16 => Value::I16(self.read_i16()?),
            Basic::UInt16 => Value::U16(self.read_u16()?),
            Basic::Int32 => Value::I32(self.read_i32()?),
            Basic::UInt32 => Value::U32(self.read_u32()?),
            Basic::Int64 => Value::I64(self.read_i64()?),
            Basic::UInt64 => Value::U64(self.read_u64()?),
            Basic::Double => Value::Double(self.read_double()?),
            Basic::String => Value::Str(self.read_string()?),
            Basic::ObjectPath => Value::ObjectPath(self.read_object_path()?),
            Basic::Signature => Value::Signature(self.read_signature()?),
            Basic::UnixFd => Value::UnixFd(self.read_unix_fd()?),
        })
    }

    // Decodes any value from its type tree; used for variant contents,
    // whose type is only known at run time.
    fn read_value(&mut self, node: &TypeNode) -> Result<Value> {
        match node.tag() {
            Tag::Basic(basic) => self.read_basic(basic),
            Tag::Variant => Ok(Value::variant(self.read_variant_value()?)),
            Tag::Array => {
                let element = &node.children()[0];
                let end = self.read_array_start(element.wire_code())?;
                let mut items = Vec::new();
                while self.has_next(&end)? {
                    items.push(self.read_value(element)?);
                }
                Ok(Value::Array(Array {
                    signature: node.signature().to_owned(),
                    items,
                }))
            }
            Tag::DictEntry => {
                let (key, value) = (&node.children()[0], &node.children()[1]);
                let end = self.read_array_start(WireCode::Struct)?;
                let mut entries = HashMap::new();
                while self.has_next(&end)? {
                    self.align_struct()?;
                    let k = DictKey::try_from(self.read_value(key)?)?;
                    let v = self.read_value(value)?;
                    entries.insert(k, v);
                }
                Ok(Value::Dict(Dict {
                    signature: node.signature().to_owned(),
                    entries,
                }))
            }
            Tag::Struct => {
                self.align_struct()?;
                let members = node
                    .children()
                    .iter()
                    .map(|member| self.read_value(member))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Struct(members))
            }
        }
    }
}

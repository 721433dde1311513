use crate::error::{Error, Result};
use crate::signature::{parse_multiple, WireCode};
use crate::value::{ObjectPath, Signature, UnixFd};
use crate::wire::{MessageWriter, Reader};

use byteorder::ByteOrder;
use log::trace;
use std::mem::size_of;
use std::str::from_utf8;

/// Encoding and decoding of one basic DBus type.
pub(crate) trait DbusPrimitive: Sized {
    fn wire_code() -> WireCode;
    fn write_to(&self, writer: &mut MessageWriter) -> Result<()>;
    fn read_from<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<Self>;
}

macro_rules! basic_primitive {
    ($type:ident, $code:expr, $read:ident) => {
        impl DbusPrimitive for $type {
            fn wire_code() -> WireCode {
                $code
            }

            fn write_to(&self, writer: &mut MessageWriter) -> Result<()> {
                writer.align(size_of::<$type>());
                writer.put(&self.to_le_bytes());
                Ok(())
            }

            fn read_from<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<Self> {
                reader.align(size_of::<$type>())?;
                Ok(B::$read(reader.read_bytes(size_of::<$type>())?))
            }
        }
    };
}

basic_primitive!(i16, WireCode::Int16, read_i16);
basic_primitive!(u16, WireCode::UInt16, read_u16);
basic_primitive!(i32, WireCode::Int32, read_i32);
basic_primitive!(u32, WireCode::UInt32, read_u32);
basic_primitive!(i64, WireCode::Int64, read_i64);
basic_primitive!(u64, WireCode::UInt64, read_u64);
basic_primitive!(f64, WireCode::Double, read_f64);

impl DbusPrimitive for u8 {
    fn wire_code() -> WireCode {
        WireCode::Byte
    }

    fn write_to(&self, writer: &mut MessageWriter) -> Result<()> {
        writer.put(&[*self]);
        Ok(())
    }

    fn read_from<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<Self> {
        Ok(reader.read_bytes(1)?[0])
    }
}

impl DbusPrimitive for bool {
    fn wire_code() -> WireCode {
        WireCode::Bool
    }

    fn write_to(&self, writer: &mut MessageWriter) -> Result<()> {
        (*self as u32).write_to(writer)
    }

    fn read_from<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<Self> {
        match u32::read_from(reader)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::InvalidBoolValue(other)),
        }
    }
}

impl DbusPrimitive for String {
    fn wire_code() -> WireCode {
        WireCode::String
    }

    fn write_to(&self, writer: &mut MessageWriter) -> Result<()> {
        write_text(writer, self, true)
    }

    fn read_from<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<Self> {
        Ok(read_text(reader, true)?.to_owned())
    }
}

impl DbusPrimitive for ObjectPath {
    fn wire_code() -> WireCode {
        WireCode::ObjectPath
    }

    fn write_to(&self, writer: &mut MessageWriter) -> Result<()> {
        ObjectPath::validate(&self.0)?;
        write_text(writer, &self.0, true)
    }

    fn read_from<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<Self> {
        let path = read_text(reader, true)?;
        ObjectPath::validate(path)?;
        Ok(ObjectPath(path.to_owned()))
    }
}

impl DbusPrimitive for Signature {
    fn wire_code() -> WireCode {
        WireCode::Signature
    }

    fn write_to(&self, writer: &mut MessageWriter) -> Result<()> {
        parse_multiple(&self.0)?;
        write_text(writer, &self.0, false)
    }

    fn read_from<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<Self> {
        let sig = read_text(reader, false)?;
        parse_multiple(sig)?;
        Ok(Signature(sig.to_owned()))
    }
}

impl DbusPrimitive for UnixFd {
    fn wire_code() -> WireCode {
        WireCode::UnixFd
    }

    fn write_to(&self, writer: &mut MessageWriter) -> Result<()> {
        self.0.write_to(writer)
    }

    fn read_from<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<Self> {
        Ok(UnixFd(u32::read_from(reader)?))
    }
}

// Strings and object paths carry a 4-byte length, signatures a 1-byte one.
// Both are followed by the bytes and a terminating nul.
pub(crate) fn write_text(writer: &mut MessageWriter, text: &str, wide: bool) -> Result<()> {
    let bytes = text.as_bytes();
    if bytes.contains(&0) {
        return Err(Error::InteriorNul);
    }
    let too_long = || Error::TextTooLong(bytes.len());
    if wide {
        u32::try_from(bytes.len())
            .map_err(|_| too_long())?
            .write_to(writer)?;
    } else {
        u8::try_from(bytes.len())
            .map_err(|_| too_long())?
            .write_to(writer)?;
    }
    writer.put(bytes);
    writer.put(&[0u8]);
    Ok(())
}

pub(crate) fn read_text<'a, B: ByteOrder>(reader: &mut Reader<'a, B>, wide: bool) -> Result<&'a str> {
    let len = if wide {
        u32::read_from(reader)? as usize
    } else {
        u8::read_from(reader)? as usize
    };
    trace!("text of {} bytes at {}", len, reader.position());
    let bytes = reader.read_bytes(len + 1)?;
    if bytes[len] != 0 {
        return Err(Error::MissingNul);
    }
    let bytes = &bytes[..len];
    if bytes.contains(&0) {
        return Err(Error::InteriorNul);
    }
    Ok(from_utf8(bytes)?)
}

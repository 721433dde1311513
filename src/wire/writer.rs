use super::MAX_ARRAY_LEN;
use crate::align::pad;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::primitives::{write_text, DbusPrimitive};
use crate::signature::{parse, parse_multiple, Tag, WireCode};
use crate::value::{DictKey, ObjectPath, Signature, UnixFd, Value};

use byteorder::{ByteOrder, LE};
use log::trace;

/// Builds one little-endian message body. Buffers are single use: after a
/// failed write the contents are unspecified.
#[derive(Debug, Default)]
pub struct MessageWriter {
    data: Vec<u8>,
}

/// Where an open array region's length field lives, returned by
/// [`MessageWriter::write_array_start`].
#[derive(Debug, PartialEq, Eq)]
pub struct ArrayStart {
    length_ix: usize,
    body_ix: usize,
}

impl MessageWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn align(&mut self, alignment: usize) {
        pad(&mut self.data, alignment);
    }

    pub(crate) fn put(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    fn write_primitive<T: DbusPrimitive>(&mut self, value: &T) -> Result<()> {
        trace!("write {} at {}", T::wire_code().name(), self.data.len());
        value.write_to(self)
    }

    /// Opens an array region. The length is unknown until
    /// [`write_array_end`](Self::write_array_end) backpatches it.
    pub fn write_array_start(&mut self, element: WireCode) -> ArrayStart {
        self.align(4);
        let length_ix = self.data.len();
        self.put(&[0u8; 4]);
        // The array length excludes the padding before the first element.
        self.align(element.alignment());
        ArrayStart {
            length_ix,
            body_ix: self.data.len(),
        }
    }

    pub fn write_array_end(&mut self, start: ArrayStart) -> Result<()> {
        let length = self.data.len() - start.body_ix;
        if length > MAX_ARRAY_LEN {
            return Err(Error::ArrayTooLong(length));
        }
        trace!("array of {} bytes at {}", length, start.body_ix);
        LE::write_u32(
            &mut self.data[start.length_ix..start.length_ix + 4],
            length as u32,
        );
        Ok(())
    }

    pub fn write_structure_start(&mut self) {
        self.align(WireCode::Struct.alignment());
    }

    pub fn write_byte(&mut self, value: u8) -> Result<()> {
        self.write_primitive(&value)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_primitive(&value)
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_primitive(&value)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_primitive(&value)
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_primitive(&value)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_primitive(&value)
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_primitive(&value)
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_primitive(&value)
    }

    pub fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_primitive(&value)
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        trace!("write String at {}", self.data.len());
        write_text(self, value, true)
    }

    pub fn write_object_path(&mut self, value: &ObjectPath) -> Result<()> {
        self.write_primitive(value)
    }

    pub fn write_signature(&mut self, value: &Signature) -> Result<()> {
        self.write_primitive(value)
    }

    /// Writes a signature given as text, validating it first.
    pub fn write_signature_str(&mut self, value: &str) -> Result<()> {
        parse_multiple(value)?;
        write_text(self, value, false)
    }

    pub fn write_unix_fd(&mut self, value: UnixFd) -> Result<()> {
        self.write_primitive(&value)
    }

    /// Writes a variant: the value's own signature, then the value.
    pub fn write_variant(&mut self, value: &Value) -> Result<()> {
        let sig = value.signature();
        parse(&sig)?;
        self.write_signature_str(&sig)?;
        self.write_value(value)
    }

    pub(crate) fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Byte(v) => self.write_byte(*v),
            Value::Bool(v) => self.write_bool(*v),
            Value::I16(v) => self.write_i16(*v),
            Value::U16(v) => self.write_u16(*v),
            Value::I32(v) => self.write_i32(*v),
            Value::U32(v) => self.write_u32(*v),
            Value::I64(v) => self.write_i64(*v),
            Value::U64(v) => self.write_u64(*v),
            Value::Double(v) => self.write_double(*v),
            Value::Str(v) => self.write_string(v),
            Value::ObjectPath(v) => self.write_object_path(v),
            Value::Signature(v) => self.write_signature(v),
            Value::UnixFd(v) => self.write_unix_fd(*v),
            Value::Variant(inner) => self.write_variant(inner),
            Value::Array(array) => {
                let node = parse(&array.signature)?;
                let element = match (node.tag(), node.children()) {
                    (Tag::Array, [element]) => element,
                    _ => {
                        return Err(Error::ValueShape {
                            expected: "array".to_owned(),
                            found: array.signature.clone(),
                        })
                    }
                };
                let start = self.write_array_start(element.wire_code());
                for item in &array.items {
                    check_shape(element.signature(), item)?;
                    self.write_value(item)?;
                }
                self.write_array_end(start)
            }
            Value::Dict(dict) => {
                let node = parse(&dict.signature)?;
                let (key_sig, value_sig) = match (node.tag(), node.children()) {
                    (Tag::DictEntry, [key, value]) => (key.signature(), value.signature()),
                    _ => {
                        return Err(Error::ValueShape {
                            expected: "dictionary".to_owned(),
                            found: dict.signature.clone(),
                        })
                    }
                };
                let start = self.write_array_start(WireCode::Struct);
                for (key, value) in &dict.entries {
                    self.write_structure_start();
                    self.write_key(key_sig, key)?;
                    check_shape(value_sig, value)?;
                    self.write_value(value)?;
                }
                self.write_array_end(start)
            }
            Value::Struct(members) => {
                if members.is_empty() {
                    return Err(Error::ValueShape {
                        expected: "struct with members".to_owned(),
                        found: "()".to_owned(),
                    });
                }
                self.write_structure_start();
                for member in members {
                    self.write_value(member)?;
                }
                Ok(())
            }
        }
    }

    pub(crate) fn write_key(&mut self, expected: &str, key: &DictKey) -> Result<()> {
        let value = Value::from(key.clone());
        check_shape(expected, &value)?;
        self.write_value(&value)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Seals the body into a message with the given body signature.
    pub fn finish(self, signature: &str) -> Message {
        Message {
            data: self.data,
            signature: signature.to_owned(),
        }
    }
}

pub(crate) fn check_shape(expected: &str, value: &Value) -> Result<()> {
    let found = value.signature();
    if found != expected {
        return Err(Error::ValueShape {
            expected: expected.to_owned(),
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::MessageWriter;
    use crate::error::{Error, Result};
    use crate::message::Message;
    use crate::signature::WireCode;
    use crate::value::{ObjectPath, Value};
    use crate::wire::MAX_ARRAY_LEN;
    use test_log::test;

    #[test]
    fn write_int() -> Result<()> {
        let mut writer = MessageWriter::new();
        writer.write_i32(37)?;
        let message = writer.finish("i");

        let correct_message = Message {
            data: vec![37, 0, 0, 0],
            signature: "i".to_owned(),
        };
        assert_eq!(
            correct_message, message,
            "i32 message serialized incorrectly"
        );
        Ok(())
    }

    #[test]
    fn write_variant_int() -> Result<()> {
        let mut writer = MessageWriter::new();
        writer.write_variant(&Value::I32(37))?;
        assert_eq!(
            writer.into_bytes(),
            vec![1, 105, 0, 0, 37, 0, 0, 0],
            "variant of i32 message serialized incorrectly"
        );
        Ok(())
    }

    #[test]
    fn write_variant_farray() -> Result<()> {
        let mut writer = MessageWriter::new();
        let value = Value::array(
            "d",
            vec![
                Value::Double(1.0),
                Value::Double(2.0),
                Value::Double(3.0),
                Value::Double(4.0),
            ],
        );
        writer.write_variant(&value)?;
        assert_eq!(
            writer.into_bytes(),
            vec![
                2, 97, 100, 0, 32, 0, 0, 0, 0, 0, 0, 0, 0, 0, 240, 63, 0, 0, 0, 0, 0, 0, 0, 64, 0,
                0, 0, 0, 0, 0, 8, 64, 0, 0, 0, 0, 0, 0, 16, 64,
            ],
            "array message serialized incorrectly"
        );
        Ok(())
    }

    #[test]
    fn write_intary() -> Result<()> {
        let mut writer = MessageWriter::new();
        let start = writer.write_array_start(WireCode::Int32);
        for i in 1..=4 {
            writer.write_i32(i)?;
        }
        writer.write_array_end(start)?;
        assert_eq!(
            writer.into_bytes(),
            vec![
                16u8, 0u8, 0u8, 0u8, 1u8, 0u8, 0u8, 0u8, 2u8, 0u8, 0u8, 0u8, 3u8, 0u8, 0u8, 0u8,
                4u8, 0u8, 0u8, 0u8,
            ],
            "array message serialized incorrectly"
        );
        Ok(())
    }

    #[test]
    fn write_struct() -> Result<()> {
        let mut writer = MessageWriter::new();
        writer.write_structure_start();
        writer.write_string("Hi")?;
        writer.write_double(0.2)?;
        writer.write_structure_start();
        writer.write_string("Hello")?;
        writer.write_double(8.3)?;
        assert_eq!(
            writer.into_bytes(),
            vec![
                2u8, 0u8, 0u8, 0u8, 72u8, 105u8, 0u8, 0u8, 154u8, 153u8, 153u8, 153u8, 153u8,
                153u8, 201u8, 63u8, 5u8, 0u8, 0u8, 0u8, 72u8, 101u8, 108u8, 108u8, 111u8, 0u8, 0u8,
                0u8, 0u8, 0u8, 0u8, 0u8, 154u8, 153u8, 153u8, 153u8, 153u8, 153u8, 32u8, 64u8,
            ],
            "struct message serialized incorrectly"
        );
        Ok(())
    }

    #[test]
    fn write_dict() -> Result<()> {
        let entries = vec![
            ("a", Value::from("Hi")),
            ("b", Value::Double(0.2)),
            (
                "c",
                Value::Struct(vec![Value::from("Hello"), Value::Double(8.3)]),
            ),
        ];

        let mut writer = MessageWriter::new();
        let start = writer.write_array_start(WireCode::Struct);
        for (key, value) in &entries {
            writer.write_structure_start();
            writer.write_string(key)?;
            writer.write_variant(value)?;
        }
        writer.write_array_end(start)?;

        let correct_data = vec![
            88u8, 0u8, 0u8, 0u8, // 88 bytes of array
            0u8, 0u8, 0u8, 0u8, // padding(8)
            1u8, 0u8, 0u8, 0u8, // 1 byte string
            97u8, 0u8, // "a"
            1u8, // 1 byte signature
            115u8, 0u8, // 's'
            0u8, 0u8, 0u8, // padding(4)
            2u8, 0u8, 0u8, 0u8, // 2 byte string
            72u8, 105u8, 0u8, // "Hi"
            0u8, 0u8, 0u8, 0u8, 0u8, // padding(8)
            1u8, 0u8, 0u8, 0u8, // 1 byte string
            98u8, 0u8, // "b"
            1u8, // 1 byte signature
            100u8, 0u8, // "d"
            0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, // padding(8)
            154u8, 153u8, 153u8, 153u8, 153u8, 153u8, 201u8, 63u8, // double 0.2
            1u8, 0u8, 0u8, 0u8, // 1 byte string
            99u8, 0u8, // "c"
            4u8, // 4 byte signature
            40u8, 115u8, 100u8, 41u8, 0u8, // "(sd)"
            0u8, 0u8, 0u8, 0u8, // padding(8)
            5u8, 0u8, 0u8, 0u8, // 5 byte string
            72u8, 101u8, 108u8, 108u8, 111u8, 0u8, // "Hello"
            0u8, 0u8, 0u8, 0u8, 0u8, 0u8, // padding(8)
            154u8, 153u8, 153u8, 153u8, 153u8, 153u8, 32u8, 64u8, // double 8.3
        ];
        assert_eq!(
            writer.into_bytes(),
            correct_data,
            "dict message serialized incorrectly"
        );
        Ok(())
    }

    #[test]
    fn empty_array_keeps_element_padding() -> Result<()> {
        let mut writer = MessageWriter::new();
        let start = writer.write_array_start(WireCode::Int64);
        writer.write_array_end(start)?;
        assert_eq!(writer.into_bytes(), vec![0u8; 8]);
        Ok(())
    }

    #[test]
    fn array_length_capped() {
        let mut writer = MessageWriter::new();
        let start = writer.write_array_start(WireCode::Byte);
        writer.put(&vec![0u8; MAX_ARRAY_LEN]);
        assert_eq!(writer.write_array_end(start), Ok(()));

        let mut writer = MessageWriter::new();
        let start = writer.write_array_start(WireCode::Byte);
        writer.put(&vec![0u8; MAX_ARRAY_LEN + 1]);
        assert_eq!(
            writer.write_array_end(start),
            Err(Error::ArrayTooLong(MAX_ARRAY_LEN + 1))
        );
    }

    #[test]
    fn rejects_bad_text() {
        let mut writer = MessageWriter::new();
        assert_eq!(writer.write_string("a\0b"), Err(Error::InteriorNul));
        assert!(writer
            .write_object_path(&ObjectPath("no/slash".to_owned()))
            .is_err());
        assert!(writer.write_signature_str("a{").is_err());
    }

    #[test]
    fn variant_rejects_mixed_array() {
        let mut writer = MessageWriter::new();
        let value = Value::array("i", vec![Value::I32(1), Value::from("x")]);
        assert_eq!(
            writer.write_variant(&value),
            Err(Error::ValueShape {
                expected: "i".to_owned(),
                found: "s".to_owned()
            })
        );
    }
}

// @generated by dbus-marshal-gen. Do not edit.

#![allow(dead_code, unused_imports)]

use byteorder::ByteOrder;
use dbus_marshal_gen::wire::{MessageWriter, Reader, WireCode};
use dbus_marshal_gen::{Message, ObjectPath, Result, Signature, UnixFd, Value};
use std::collections::{BTreeMap, HashMap};

pub fn read_array_aai<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<Vec<Vec<i32>>> {
    let end = reader.read_array_start(WireCode::Array)?;
    let mut items = Vec::new();
    while reader.has_next(&end)? {
        items.push(read_array_ai(reader)?);
    }
    Ok(items)
}

pub fn read_array_ai<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<Vec<i32>> {
    let end = reader.read_array_start(WireCode::Int32)?;
    let mut items = Vec::new();
    while reader.has_next(&end)? {
        items.push(reader.read_i32()?);
    }
    Ok(items)
}

pub fn read_dictionary_aesvz<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<HashMap<String, Value>> {
    let end = reader.read_array_start(WireCode::Struct)?;
    let mut items = HashMap::new();
    while reader.has_next(&end)? {
        let key = reader.read_string()?;
        let value = reader.read_variant_value()?;
        items.insert(key, value);
    }
    Ok(items)
}

pub fn read_message_aai(message: &Message) -> Result<Vec<Vec<i32>>> {
    let mut reader = message.body_reader_for("aai")?;
    let value0 = read_array_aai(&mut reader)?;
    reader.complete()?;
    Ok(value0)
}

pub fn read_message_aesvz(message: &Message) -> Result<HashMap<String, Value>> {
    let mut reader = message.body_reader_for("a{sv}")?;
    let value0 = read_dictionary_aesvz(&mut reader)?;
    reader.complete()?;
    Ok(value0)
}

pub fn read_message_rsiiz(message: &Message) -> Result<(String, i32, i32)> {
    let mut reader = message.body_reader_for("(sii)")?;
    let value0 = read_struct_rsiiz(&mut reader)?;
    reader.complete()?;
    Ok(value0)
}

pub fn read_struct_rsiiz<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<(String, i32, i32)> {
    reader.align_struct()?;
    let member0 = reader.read_string()?;
    let member1 = reader.read_i32()?;
    let member2 = reader.read_i32()?;
    Ok((member0, member1, member2))
}

pub fn write_array_aai(writer: &mut MessageWriter, values: Option<&[Vec<i32>]>) -> Result<()> {
    let start = writer.write_array_start(WireCode::Array);
    if let Some(values) = values {
        for value in values {
            write_array_ai(writer, Some(value.as_slice()))?;
        }
    }
    writer.write_array_end(start)
}

pub fn write_array_ai(writer: &mut MessageWriter, values: Option<&[i32]>) -> Result<()> {
    let start = writer.write_array_start(WireCode::Int32);
    if let Some(values) = values {
        for value in values {
            writer.write_i32(*value)?;
        }
    }
    writer.write_array_end(start)
}

pub fn write_dictionary_aesvz(writer: &mut MessageWriter, values: Option<&HashMap<String, Value>>) -> Result<()> {
    let start = writer.write_array_start(WireCode::Struct);
    if let Some(values) = values {
        for (key, value) in values {
            writer.write_structure_start();
            writer.write_string(key)?;
            writer.write_variant(value)?;
        }
    }
    writer.write_array_end(start)
}

pub fn write_message_aai(arg0: Option<&[Vec<i32>]>) -> Result<Message> {
    let mut writer = MessageWriter::new();
    write_array_aai(&mut writer, arg0)?;
    Ok(writer.finish("aai"))
}

pub fn write_message_aesvz(arg0: Option<&HashMap<String, Value>>) -> Result<Message> {
    let mut writer = MessageWriter::new();
    write_dictionary_aesvz(&mut writer, arg0)?;
    Ok(writer.finish("a{sv}"))
}

pub fn write_message_rsiiz(arg0: &(String, i32, i32)) -> Result<Message> {
    let mut writer = MessageWriter::new();
    write_struct_rsiiz(&mut writer, arg0)?;
    Ok(writer.finish("(sii)"))
}

pub fn write_struct_rsiiz(writer: &mut MessageWriter, value: &(String, i32, i32)) -> Result<()> {
    writer.write_structure_start();
    writer.write_string(&value.0)?;
    writer.write_i32(value.1)?;
    writer.write_i32(value.2)?;
    Ok(())
}

//! Direct execution of an [`Artifact`]'s procedures against the wire
//! runtime, without compiling rendered source.
//!
//! Values are self-describing [`Value`]s: a struct is a `Value::Struct`,
//! and a nested variant is a `Value::Variant` around its contents. Entry
//! points reading a variant body return the contents directly, since
//! their type is fixed. Multi-value bodies read as a `Value::Struct`.

use crate::error::{Error, Result};
use crate::message::Message;
use crate::procedure::{Artifact, Body, Callee, GeneratedProcedure, ProcKind};
use crate::value::{Array, Dict, DictKey, Value};
use crate::wire::{check_shape, MessageWriter, Reader, WireCode};

use byteorder::{ByteOrder, LE};
use log::trace;
use std::collections::HashMap;
use std::convert::TryFrom;

fn shape_error(expected: &str, found: Option<&Value>) -> Error {
    Error::ValueShape {
        expected: expected.to_owned(),
        found: found.map_or_else(|| "nothing".to_owned(), Value::signature),
    }
}

impl Artifact {
    fn lookup(&self, kind: ProcKind, ident: &str) -> Result<&GeneratedProcedure> {
        self.get(kind, ident)
            .ok_or_else(|| Error::UnknownProcedure(ident.to_owned()))
    }

    fn lookup_entry(&self, kind: ProcKind, ident: &str) -> Result<&GeneratedProcedure> {
        let procedure = self.lookup(kind, ident)?;
        match procedure.body {
            Body::Message { .. } => Ok(procedure),
            _ => Err(Error::UnknownProcedure(ident.to_owned())),
        }
    }

    /// Runs read procedure `ident` over a whole little-endian buffer.
    pub fn read(&self, ident: &str, data: &[u8]) -> Result<Value> {
        let mut reader = Reader::<LE>::new(data);
        let value = self.read_with(ident, &mut reader)?;
        reader.complete()?;
        Ok(value)
    }

    pub fn read_with<B: ByteOrder>(&self, ident: &str, reader: &mut Reader<'_, B>) -> Result<Value> {
        let procedure = self.lookup(ProcKind::Read, ident)?;
        trace!("evaluating {} at {}", ident, reader.position());
        match &procedure.body {
            Body::Array { element, item } => {
                let end = reader.read_array_start(*element)?;
                let mut items = Vec::new();
                while reader.has_next(&end)? {
                    items.push(self.read_callee(item, reader)?);
                }
                Ok(Value::Array(Array {
                    signature: procedure.signature.clone(),
                    items,
                }))
            }
            Body::Dictionary { key, value } => {
                let end = reader.read_array_start(WireCode::Struct)?;
                let mut entries = HashMap::new();
                while reader.has_next(&end)? {
                    let k = DictKey::try_from(self.read_callee(key, reader)?)?;
                    let v = self.read_callee(value, reader)?;
                    // A repeated key replaces the earlier value.
                    entries.insert(k, v);
                }
                Ok(Value::Dict(Dict {
                    signature: procedure.signature.clone(),
                    entries,
                }))
            }
            Body::Struct { members } => {
                reader.align_struct()?;
                let members = members
                    .iter()
                    .map(|member| self.read_callee(member, reader))
                    .collect::<Result<_>>()?;
                Ok(Value::Struct(members))
            }
            Body::Message { variant, values } => {
                if let Some(expected) = variant {
                    reader.expect_signature(expected)?;
                }
                let mut values = values
                    .iter()
                    .map(|value| self.read_callee(value, reader))
                    .collect::<Result<Vec<_>>>()?;
                if values.len() == 1 {
                    Ok(values.remove(0))
                } else {
                    Ok(Value::Struct(values))
                }
            }
        }
    }

    fn read_callee<B: ByteOrder>(&self, callee: &Callee, reader: &mut Reader<'_, B>) -> Result<Value> {
        match callee {
            Callee::Primitive(basic) => reader.read_basic(*basic),
            Callee::Variant => Ok(Value::variant(reader.read_variant_value()?)),
            Callee::Procedure { ident, .. } => self.read_with(ident, reader),
        }
    }

    /// Reads a message with entry point `ident`, checking its header
    /// signature and that the body is consumed exactly.
    pub fn read_message(&self, ident: &str, message: &Message) -> Result<Value> {
        let procedure = self.lookup_entry(ProcKind::Read, ident)?;
        let mut reader = message.body_reader_for(procedure.body_signature())?;
        let value = self.read_with(ident, &mut reader)?;
        reader.complete()?;
        Ok(value)
    }

    /// Runs write procedure `ident`. `None` stands for an absent array or
    /// map and writes an empty one.
    pub fn write(&self, ident: &str, value: Option<&Value>) -> Result<Vec<u8>> {
        let mut writer = MessageWriter::new();
        self.write_with(ident, &mut writer, value)?;
        Ok(writer.into_bytes())
    }

    pub fn write_with(
        &self,
        ident: &str,
        writer: &mut MessageWriter,
        value: Option<&Value>,
    ) -> Result<()> {
        let procedure = self.lookup(ProcKind::Write, ident)?;
        trace!("evaluating {} at {}", ident, writer.len());
        let signature = procedure.signature.as_str();
        let entry_point = matches!(procedure.body, Body::Message { .. });
        if let (Some(value), false) = (value, entry_point) {
            check_shape(signature, value)?;
        }
        match (&procedure.body, value) {
            (Body::Array { element, item }, value) => {
                let start = writer.write_array_start(*element);
                if let Some(Value::Array(array)) = value {
                    for value in &array.items {
                        self.write_callee(item, writer, value)?;
                    }
                }
                writer.write_array_end(start)
            }
            (Body::Dictionary { key, value: entry }, value) => {
                let start = writer.write_array_start(WireCode::Struct);
                if let Some(Value::Dict(dict)) = value {
                    for (k, v) in &dict.entries {
                        writer.write_structure_start();
                        self.write_callee(key, writer, &Value::from(k.clone()))?;
                        self.write_callee(entry, writer, v)?;
                    }
                }
                writer.write_array_end(start)
            }
            (Body::Struct { members }, Some(Value::Struct(values))) => {
                writer.write_structure_start();
                for (member, value) in members.iter().zip(values) {
                    self.write_callee(member, writer, value)?;
                }
                Ok(())
            }
            (Body::Message { values: callees, .. }, Some(value)) => match value {
                Value::Struct(values) if callees.len() != 1 => {
                    self.write_body(procedure, writer, values)
                }
                value => self.write_body(procedure, writer, std::slice::from_ref(value)),
            },
            (_, value) => Err(shape_error(signature, value)),
        }
    }

    fn write_callee(&self, callee: &Callee, writer: &mut MessageWriter, value: &Value) -> Result<()> {
        match (callee, value) {
            (Callee::Primitive(basic), value) if value.basic() == Some(*basic) => {
                writer.write_value(value)
            }
            (Callee::Primitive(basic), value) => {
                Err(shape_error(&basic.code().to_string(), Some(value)))
            }
            (Callee::Variant, Value::Variant(inner)) => writer.write_variant(inner),
            (Callee::Variant, value) => Err(shape_error("v", Some(value))),
            (Callee::Procedure { ident, .. }, value) => self.write_with(ident, writer, Some(value)),
        }
    }

    fn write_body(
        &self,
        procedure: &GeneratedProcedure,
        writer: &mut MessageWriter,
        values: &[Value],
    ) -> Result<()> {
        let (variant, callees) = match &procedure.body {
            Body::Message { variant, values } => (variant, values),
            _ => return Err(Error::UnknownProcedure(procedure.ident.clone())),
        };
        if callees.len() != values.len() {
            return Err(Error::ValueShape {
                expected: procedure.signature.clone(),
                found: values.iter().map(Value::signature).collect(),
            });
        }
        if let Some(signature) = variant {
            writer.write_signature_str(signature)?;
        }
        for (callee, value) in callees.iter().zip(values) {
            self.write_callee(callee, writer, value)?;
        }
        Ok(())
    }

    /// Writes `values`, one per complete type of the entry point's
    /// signature, into a new message.
    pub fn write_message(&self, ident: &str, values: &[Value]) -> Result<Message> {
        let procedure = self.lookup_entry(ProcKind::Write, ident)?;
        let mut writer = MessageWriter::new();
        self.write_body(procedure, &mut writer, values)?;
        Ok(writer.finish(procedure.body_signature()))
    }
}

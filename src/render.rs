//! Rendering of an [`Artifact`] as Rust source.
//!
//! The module produced calls into [`wire`](crate::wire) exactly as the
//! procedure bodies describe. Read procedures are generic over the byte
//! order of the [`Reader`](crate::wire::Reader); write procedures take
//! borrowed input, with `None` standing for an absent array or map.

use crate::native::NativeType;
use crate::procedure::{Artifact, Body, Callee, Construct, GeneratedProcedure, ProcKind};
use crate::signature::Basic;

const HEADER: &str = "\
// @generated by dbus-marshal-gen. Do not edit.

#![allow(dead_code, unused_imports)]

use byteorder::ByteOrder;
use dbus_marshal_gen::wire::{MessageWriter, Reader, WireCode};
use dbus_marshal_gen::{Message, ObjectPath, Result, Signature, UnixFd, Value};
use std::collections::{BTreeMap, HashMap};
";

struct Emitter {
    out: String,
    indent: usize,
}

impl Emitter {
    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self) {
        self.indent -= 1;
        self.line("}");
    }
}

fn primitive_name(basic: Basic) -> &'static str {
    match basic {
        Basic::Byte => "byte",
        Basic::Bool => "bool",
        Basic::Int16 => "i16",
        Basic::UInt16 => "u16",
        Basic::Int32 => "i32",
        Basic::UInt32 => "u32",
        Basic::Int64 => "i64",
        Basic::UInt64 => "u64",
        Basic::Double => "double",
        Basic::String => "string",
        Basic::ObjectPath => "object_path",
        Basic::Signature => "signature",
        Basic::UnixFd => "unix_fd",
    }
}

fn tuple(items: &[String]) -> String {
    if items.len() == 1 {
        format!("({},)", items[0])
    } else {
        format!("({})", items.join(", "))
    }
}

// `reader` is the expression naming a `&mut Reader`.
fn read_call(callee: &Callee, reader: &str) -> String {
    match callee {
        Callee::Primitive(basic) => format!("reader.read_{}()?", primitive_name(*basic)),
        Callee::Variant => "reader.read_variant_value()?".to_owned(),
        Callee::Procedure { ident, .. } => format!("{}({})?", ident, reader),
    }
}

/// How the value handed to a write call is bound in the caller.
enum Binding<'a> {
    /// A reference, such as a loop variable over a slice.
    Ref(&'a str),
    /// An owned place, such as a tuple field.
    Place(String),
    /// An entry point parameter, already in the callee's form.
    Param(&'a str),
}

fn write_arg(callee: &Callee, binding: &Binding<'_>) -> String {
    match binding {
        Binding::Param(name) => (*name).to_owned(),
        Binding::Ref(name) => match callee {
            Callee::Primitive(basic) if basic.is_copy() => format!("*{}", name),
            Callee::Procedure {
                construct: Construct::Array,
                ..
            } => format!("Some({}.as_slice())", name),
            Callee::Procedure {
                construct: Construct::Dictionary,
                ..
            } => format!("Some({})", name),
            _ => (*name).to_owned(),
        },
        Binding::Place(place) => match callee {
            Callee::Primitive(basic) if basic.is_copy() => place.clone(),
            Callee::Procedure {
                construct: Construct::Array,
                ..
            } => format!("Some({}.as_slice())", place),
            Callee::Procedure {
                construct: Construct::Dictionary,
                ..
            } => format!("Some(&{})", place),
            _ => format!("&{}", place),
        },
    }
}

// `writer` is the expression naming a `&mut MessageWriter`.
fn write_call(callee: &Callee, writer: &str, binding: &Binding<'_>) -> String {
    let arg = write_arg(callee, binding);
    match callee {
        Callee::Primitive(basic) => format!("writer.write_{}({})?;", primitive_name(*basic), arg),
        Callee::Variant => format!("writer.write_variant({})?;", arg),
        Callee::Procedure { ident, .. } => format!("{}({}, {})?;", ident, writer, arg),
    }
}

fn return_type(procedure: &GeneratedProcedure) -> String {
    procedure
        .native
        .first()
        .map(NativeType::to_string)
        .unwrap_or_else(|| "()".to_owned())
}

fn map_constructor(procedure: &GeneratedProcedure) -> String {
    match procedure.native.first() {
        Some(NativeType::Map { style, .. }) => format!("{}::new()", style.name()),
        Some(NativeType::Option(inner)) => match inner.as_ref() {
            NativeType::Ref(map) => match map.as_ref() {
                NativeType::Map { style, .. } => format!("{}::new()", style.name()),
                _ => "HashMap::new()".to_owned(),
            },
            _ => "HashMap::new()".to_owned(),
        },
        _ => "HashMap::new()".to_owned(),
    }
}

fn render_read(e: &mut Emitter, procedure: &GeneratedProcedure) {
    let ident = &procedure.ident;
    let ret = return_type(procedure);
    if let Body::Message { variant, values } = &procedure.body {
        e.open(&format!(
            "pub fn {}(message: &Message) -> Result<{}> {{",
            ident, ret
        ));
        e.line(&format!(
            "let mut reader = message.body_reader_for({:?})?;",
            procedure.body_signature()
        ));
        if let Some(expected) = variant {
            e.line(&format!("reader.expect_signature({:?})?;", expected));
        }
        let names: Vec<String> = (0..values.len()).map(|i| format!("value{}", i)).collect();
        for (name, value) in names.iter().zip(values) {
            e.line(&format!("let {} = {};", name, read_call(value, "&mut reader")));
        }
        e.line("reader.complete()?;");
        if names.len() == 1 {
            e.line(&format!("Ok({})", names[0]));
        } else {
            e.line(&format!("Ok({})", tuple(&names)));
        }
        e.close();
        return;
    }

    e.open(&format!(
        "pub fn {}<B: ByteOrder>(reader: &mut Reader<'_, B>) -> Result<{}> {{",
        ident, ret
    ));
    match &procedure.body {
        Body::Array { element, item } => {
            e.line(&format!(
                "let end = reader.read_array_start(WireCode::{})?;",
                element.name()
            ));
            e.line("let mut items = Vec::new();");
            e.open("while reader.has_next(&end)? {");
            e.line(&format!("items.push({});", read_call(item, "reader")));
            e.close();
            e.line("Ok(items)");
        }
        Body::Dictionary { key, value } => {
            e.line("let end = reader.read_array_start(WireCode::Struct)?;");
            e.line(&format!("let mut items = {};", map_constructor(procedure)));
            e.open("while reader.has_next(&end)? {");
            e.line(&format!("let key = {};", read_call(key, "reader")));
            e.line(&format!("let value = {};", read_call(value, "reader")));
            e.line("items.insert(key, value);");
            e.close();
            e.line("Ok(items)");
        }
        Body::Struct { members } => {
            e.line("reader.align_struct()?;");
            let names: Vec<String> = (0..members.len()).map(|i| format!("member{}", i)).collect();
            for (name, member) in names.iter().zip(members) {
                e.line(&format!("let {} = {};", name, read_call(member, "reader")));
            }
            e.line(&format!("Ok({})", tuple(&names)));
        }
        Body::Message { .. } => {}
    }
    e.close();
}

fn render_write(e: &mut Emitter, procedure: &GeneratedProcedure) {
    let ident = &procedure.ident;
    let param = procedure
        .native
        .first()
        .map(NativeType::to_string)
        .unwrap_or_else(|| "()".to_owned());
    match &procedure.body {
        Body::Array { element, item } => {
            e.open(&format!(
                "pub fn {}(writer: &mut MessageWriter, values: {}) -> Result<()> {{",
                ident, param
            ));
            e.line(&format!(
                "let start = writer.write_array_start(WireCode::{});",
                element.name()
            ));
            e.open("if let Some(values) = values {");
            e.open("for value in values {");
            e.line(&write_call(item, "writer", &Binding::Ref("value")));
            e.close();
            e.close();
            e.line("writer.write_array_end(start)");
        }
        Body::Dictionary { key, value } => {
            e.open(&format!(
                "pub fn {}(writer: &mut MessageWriter, values: {}) -> Result<()> {{",
                ident, param
            ));
            e.line("let start = writer.write_array_start(WireCode::Struct);");
            e.open("if let Some(values) = values {");
            e.open("for (key, value) in values {");
            e.line("writer.write_structure_start();");
            e.line(&write_call(key, "writer", &Binding::Ref("key")));
            e.line(&write_call(value, "writer", &Binding::Ref("value")));
            e.close();
            e.close();
            e.line("writer.write_array_end(start)");
        }
        Body::Struct { members } => {
            e.open(&format!(
                "pub fn {}(writer: &mut MessageWriter, value: {}) -> Result<()> {{",
                ident, param
            ));
            e.line("writer.write_structure_start();");
            for (i, member) in members.iter().enumerate() {
                let place = Binding::Place(format!("value.{}", i));
                e.line(&write_call(member, "writer", &place));
            }
            e.line("Ok(())");
        }
        Body::Message { variant, values } => {
            let params: Vec<String> = procedure
                .native
                .iter()
                .enumerate()
                .map(|(i, native)| format!("arg{}: {}", i, native))
                .collect();
            e.open(&format!(
                "pub fn {}({}) -> Result<Message> {{",
                ident,
                params.join(", ")
            ));
            e.line("let mut writer = MessageWriter::new();");
            if let Some(signature) = variant {
                e.line(&format!("writer.write_signature_str({:?})?;", signature));
            }
            for (i, value) in values.iter().enumerate() {
                let name = format!("arg{}", i);
                e.line(&write_call(value, "&mut writer", &Binding::Param(&name)));
            }
            e.line(&format!(
                "Ok(writer.finish({:?}))",
                procedure.body_signature()
            ));
        }
    }
    e.close();
}

/// Renders every procedure of `artifact` into one Rust module.
pub fn render_module(artifact: &Artifact) -> String {
    let mut e = Emitter {
        out: String::from(HEADER),
        indent: 0,
    };
    for procedure in artifact.iter() {
        e.line("");
        match procedure.kind {
            ProcKind::Read => render_read(&mut e, procedure),
            ProcKind::Write => render_write(&mut e, procedure),
        }
    }
    e.out
}

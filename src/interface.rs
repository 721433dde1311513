//! Interface descriptions, as found in DBus introspection data.
//!
//! These are plain `serde` structs; the command-line tool reads them from
//! JSON. Field names follow the introspection XML attributes, so `type`
//! holds an argument's signature.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Arg>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Arg>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub signature: String,
    /// Method arguments without a direction are inputs.
    #[serde(default)]
    pub direction: Option<Direction>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub signature: String,
    pub access: Access,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

/// Any member of an interface.
#[derive(Clone, Copy, Debug)]
pub enum Member<'a> {
    Method(&'a Method),
    Signal(&'a Signal),
    Property(&'a Property),
}

impl Member<'_> {
    pub fn name(&self) -> &str {
        match self {
            Member::Method(method) => &method.name,
            Member::Signal(signal) => &signal.name,
            Member::Property(property) => &property.name,
        }
    }
}

impl Interface {
    /// Methods, then signals, then properties, each in declared order.
    pub fn members(&self) -> impl Iterator<Item = Member<'_>> {
        self.methods
            .iter()
            .map(Member::Method)
            .chain(self.signals.iter().map(Member::Signal))
            .chain(self.properties.iter().map(Member::Property))
    }
}

use super::Session;
use crate::error::{GrammarError, Result};
use crate::gen::policy::GeneratorPolicy;
use crate::native::{AccessMode, NativeType};
use crate::procedure::{identifier, Body, Construct, GeneratedProcedure, ProcKind};
use crate::signature::{parse_multiple, TypeNode};

use log::{debug, trace};

impl<P: GeneratorPolicy> Session<P> {
    /// Generates the entry point that reads a whole message body with
    /// signature `signature`. With `variant` set, the body is a single
    /// variant that must hold exactly that type.
    pub fn read_entry(&mut self, signature: &str, variant: bool) -> Result<String> {
        let (construct, nodes) = entry_nodes(signature, variant)?;
        let ident = identifier(ProcKind::Read, construct, signature);
        if self.cache.contains(ProcKind::Read, &ident) {
            trace!("reusing {}", ident);
            return Ok(ident);
        }

        let mut natives = nodes
            .iter()
            .map(|node| self.mapper.map(node, AccessMode::Read, false))
            .collect::<Result<Vec<_>>>()?;
        let native = if natives.len() == 1 {
            natives.remove(0)
        } else {
            NativeType::Tuple(natives)
        };
        let values = nodes
            .iter()
            .map(|node| self.read_callee(node))
            .collect::<Result<_>>()?;

        debug!("generated {} returning {}", ident, native);
        self.cache.insert(GeneratedProcedure {
            ident: ident.clone(),
            kind: ProcKind::Read,
            construct,
            signature: signature.to_owned(),
            native: vec![native],
            body: Body::Message {
                variant: variant.then(|| signature.to_owned()),
                values,
            },
        });
        Ok(ident)
    }

    /// Generates the entry point that writes `signature` as a message
    /// body, one parameter per complete type.
    pub fn write_entry(&mut self, signature: &str, variant: bool) -> Result<String> {
        let (construct, nodes) = entry_nodes(signature, variant)?;
        let ident = identifier(ProcKind::Write, construct, signature);
        if self.cache.contains(ProcKind::Write, &ident) {
            trace!("reusing {}", ident);
            return Ok(ident);
        }

        let native = nodes
            .iter()
            .map(|node| self.mapper.map(node, AccessMode::Write, true))
            .collect::<Result<Vec<_>>>()?;
        let values = nodes
            .iter()
            .map(|node| self.write_callee(node))
            .collect::<Result<_>>()?;

        debug!("generated {} with {} parameters", ident, native.len());
        self.cache.insert(GeneratedProcedure {
            ident: ident.clone(),
            kind: ProcKind::Write,
            construct,
            signature: signature.to_owned(),
            native,
            body: Body::Message {
                variant: variant.then(|| signature.to_owned()),
                values,
            },
        });
        Ok(ident)
    }
}

fn entry_nodes(signature: &str, variant: bool) -> Result<(Construct, Vec<TypeNode>)> {
    let nodes = parse_multiple(signature)?;
    match nodes.first() {
        None => Err(GrammarError::Empty.into()),
        Some(first) if variant && nodes.len() > 1 => Err(GrammarError::Trailing {
            offset: first.signature().len(),
        }
        .into()),
        Some(_) if variant => Ok((Construct::VariantMessage, nodes)),
        Some(_) => Ok((Construct::Message, nodes)),
    }
}

use super::{shape, Session, Shape};
use crate::error::Result;
use crate::gen::policy::GeneratorPolicy;
use crate::native::AccessMode;
use crate::procedure::{identifier, Body, Callee, Construct, GeneratedProcedure, ProcKind};
use crate::signature::TypeNode;

use log::{debug, trace};

impl<P: GeneratorPolicy> Session<P> {
    /// What a reader calls to decode `node`, generating the read
    /// procedure (and those of everything nested in it) on first use.
    pub fn read_callee(&mut self, node: &TypeNode) -> Result<Callee> {
        let construct = match shape(node) {
            Shape::Leaf(callee) => return Ok(callee),
            Shape::Container(construct) => construct,
        };
        let ident = identifier(ProcKind::Read, construct, node.signature());
        if self.cache.contains(ProcKind::Read, &ident) {
            trace!("reusing {}", ident);
            return Ok(Callee::Procedure { ident, construct });
        }

        let native = self.mapper.map(node, AccessMode::Read, false)?;
        let children = node.children();
        let body = match construct {
            Construct::Array => Body::Array {
                element: children[0].wire_code(),
                item: self.read_callee(&children[0])?,
            },
            Construct::Dictionary => Body::Dictionary {
                key: self.read_callee(&children[0])?,
                value: self.read_callee(&children[1])?,
            },
            _ => Body::Struct {
                members: children
                    .iter()
                    .map(|member| self.read_callee(member))
                    .collect::<Result<_>>()?,
            },
        };

        debug!("generated {} returning {}", ident, native);
        self.cache.insert(GeneratedProcedure {
            ident: ident.clone(),
            kind: ProcKind::Read,
            construct,
            signature: node.signature().to_owned(),
            native: vec![native],
            body,
        });
        Ok(Callee::Procedure { ident, construct })
    }
}

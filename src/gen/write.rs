use super::{shape, Session, Shape};
use crate::error::Result;
use crate::gen::policy::GeneratorPolicy;
use crate::native::AccessMode;
use crate::procedure::{identifier, Body, Callee, Construct, GeneratedProcedure, ProcKind};
use crate::signature::TypeNode;

use log::{debug, trace};

impl<P: GeneratorPolicy> Session<P> {
    /// Mirror of [`read_callee`](Session::read_callee) for writers.
    pub fn write_callee(&mut self, node: &TypeNode) -> Result<Callee> {
        let construct = match shape(node) {
            Shape::Leaf(callee) => return Ok(callee),
            Shape::Container(construct) => construct,
        };
        let ident = identifier(ProcKind::Write, construct, node.signature());
        if self.cache.contains(ProcKind::Write, &ident) {
            trace!("reusing {}", ident);
            return Ok(Callee::Procedure { ident, construct });
        }

        // Arrays and maps accept an absent input and write an empty region.
        let native = self.mapper.map(node, AccessMode::Write, true)?;
        let children = node.children();
        let body = match construct {
            Construct::Array => Body::Array {
                element: children[0].wire_code(),
                item: self.write_callee(&children[0])?,
            },
            Construct::Dictionary => Body::Dictionary {
                key: self.write_callee(&children[0])?,
                value: self.write_callee(&children[1])?,
            },
            _ => Body::Struct {
                members: children
                    .iter()
                    .map(|member| self.write_callee(member))
                    .collect::<Result<_>>()?,
            },
        };

        debug!("generated {} taking {}", ident, native);
        self.cache.insert(GeneratedProcedure {
            ident: ident.clone(),
            kind: ProcKind::Write,
            construct,
            signature: node.signature().to_owned(),
            native: vec![native],
            body,
        });
        Ok(Callee::Procedure { ident, construct })
    }
}

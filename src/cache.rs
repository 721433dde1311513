use crate::procedure::{Artifact, GeneratedProcedure, ProcKind};

use log::trace;
use std::collections::BTreeMap;

/// Registry of the procedures generated during one pass, one map per
/// kind. Append-only: an identifier, once registered, keeps its procedure.
#[derive(Debug, Default)]
pub struct MethodCache {
    read: BTreeMap<String, GeneratedProcedure>,
    write: BTreeMap<String, GeneratedProcedure>,
}

impl MethodCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, kind: ProcKind) -> &BTreeMap<String, GeneratedProcedure> {
        match kind {
            ProcKind::Read => &self.read,
            ProcKind::Write => &self.write,
        }
    }

    pub fn contains(&self, kind: ProcKind, ident: &str) -> bool {
        self.map(kind).contains_key(ident)
    }

    pub fn get(&self, kind: ProcKind, ident: &str) -> Option<&GeneratedProcedure> {
        self.map(kind).get(ident)
    }

    /// Registers `procedure` unless its identifier is taken. Returns
    /// whether it was added.
    pub fn insert(&mut self, procedure: GeneratedProcedure) -> bool {
        let map = match procedure.kind {
            ProcKind::Read => &mut self.read,
            ProcKind::Write => &mut self.write,
        };
        if map.contains_key(&procedure.ident) {
            trace!("{} already registered", procedure.ident);
            return false;
        }
        map.insert(procedure.ident.clone(), procedure);
        true
    }

    pub fn len(&self) -> usize {
        self.read.len() + self.write.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_len(&self) -> usize {
        self.read.len()
    }

    pub fn write_len(&self) -> usize {
        self.write.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedProcedure> {
        self.read.values().chain(self.write.values())
    }

    pub fn freeze(self) -> Artifact {
        Artifact {
            read: self.read,
            write: self.write,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MethodCache;
    use crate::native::NativeType;
    use crate::procedure::{Body, Callee, Construct, GeneratedProcedure, ProcKind};
    use crate::signature::{Basic, WireCode};
    use test_log::test;

    fn int_array(kind: ProcKind) -> GeneratedProcedure {
        GeneratedProcedure {
            ident: format!("{}_array_ai", kind),
            kind,
            construct: Construct::Array,
            signature: "ai".to_owned(),
            native: vec![NativeType::Vec(Box::new(NativeType::Basic(Basic::Int32)))],
            body: Body::Array {
                element: WireCode::Int32,
                item: Callee::Primitive(Basic::Int32),
            },
        }
    }

    #[test]
    fn append_only() {
        let mut cache = MethodCache::new();
        assert!(cache.is_empty());
        assert!(cache.insert(int_array(ProcKind::Read)));
        assert!(!cache.insert(int_array(ProcKind::Read)));
        assert!(cache.insert(int_array(ProcKind::Write)));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.read_len(), 1);
        assert_eq!(cache.write_len(), 1);
        assert!(cache.contains(ProcKind::Read, "read_array_ai"));
        assert!(!cache.contains(ProcKind::Write, "read_array_ai"));
        assert_eq!(
            cache.get(ProcKind::Write, "write_array_ai").map(|p| p.kind),
            Some(ProcKind::Write)
        );
    }

    #[test]
    fn freeze_keeps_everything() {
        let mut cache = MethodCache::new();
        cache.insert(int_array(ProcKind::Read));
        cache.insert(int_array(ProcKind::Write));
        let idents: Vec<String> = cache.iter().map(|p| p.ident.clone()).collect();
        let artifact = cache.freeze();
        assert_eq!(artifact.len(), 2);
        assert_eq!(
            artifact.iter().map(|p| p.ident.clone()).collect::<Vec<_>>(),
            idents
        );
        assert!(artifact.get(ProcKind::Read, "read_array_ai").is_some());
    }
}

use crate::native::MapStyle;

/// Customizes choices that the wire format leaves open to the generated
/// code. Implement this to pick a map type per dictionary signature.
pub trait GeneratorPolicy: Clone {
    fn query_map_style(&self, signature: &str) -> MapStyle;
}

/// Dictionaries become `HashMap`s.
#[derive(Clone, Debug, Default)]
pub struct DefaultGeneratorPolicy;

impl GeneratorPolicy for DefaultGeneratorPolicy {
    fn query_map_style(&self, _: &str) -> MapStyle {
        MapStyle::HashMap
    }
}

/// Dictionaries become `BTreeMap`s, so iteration and therefore written
/// output follow key order.
#[derive(Clone, Debug, Default)]
pub struct OrderedMapPolicy;

impl GeneratorPolicy for OrderedMapPolicy {
    fn query_map_style(&self, _: &str) -> MapStyle {
        MapStyle::BTreeMap
    }
}

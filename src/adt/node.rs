//! The owned logical tree model shared by both decoders.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::adt::value::AdtValue;

/// Placeholder used when a node carries no `name` property.
pub const UNNAMED: &str = "<unnamed>";

/// A named, typed property attached to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdtProp {
    pub name: String,
    /// Carried through from the vendor encoding's packed size word; never
    /// interpreted here. Always `false` for flattened-tree sources.
    pub template: bool,
    pub value: AdtValue,
}

impl AdtProp {
    pub fn new(name: &str, value: AdtValue) -> Self {
        Self {
            name: name.to_string(),
            template: false,
            value,
        }
    }
}

/// A device tree vertex: ordered properties, then ordered children.
///
/// Insertion order is significant and round-trips through the vendor codec.
/// By convention the first property is named `name` and holds the node's
/// display name; only the synthetic root may lack it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdtNode {
    pub props: Vec<AdtProp>,
    pub children: Vec<AdtNode>,
}

impl AdtNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A node seeded with its `name` property.
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Self {
            props: alloc::vec![AdtProp::new("name", AdtValue::Str(name.to_string()))],
            children: Vec::new(),
        }
    }

    /// The node's first property with the given name.
    #[must_use]
    pub fn prop(&self, name: &str) -> Option<&AdtProp> {
        self.props.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn prop_value(&self, name: &str) -> Option<&AdtValue> {
        self.prop(name).map(|p| &p.value)
    }

    /// The node's display name, if its `name` property is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.prop_value("name") {
            Some(AdtValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// The display name, substituting [`UNNAMED`] when absent.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(UNNAMED)
    }

    /// The first child whose `name` property matches.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&AdtNode> {
        self.children.iter().find(|c| c.name() == Some(name))
    }
}

//! Nodes: named, typed groups of properties.
//!
//! A node represents one logical facet of a device. A ranged node stands
//! for an indexed family of identical instances that share one node-level
//! input handler.

use std::fmt;

use thiserror::Error;

use crate::property::{Property, PropertyBuilder, PropertyDescriptor, PropertyMeta};
use crate::range::{RangeBounds, RangeContext, RangeError};

/// The default node input handler. Rejects every value.
pub fn reject_node_input(_range: &RangeContext, _property: &str, _value: &str) -> bool {
    false
}

/// Node-level behaviour: the fallback input handler plus lifecycle hooks.
///
/// Any closure `Fn(&RangeContext, &str, &str) -> bool` is a handler with
/// no-op hooks. Implement the trait on a struct to also react to
/// `setup`, `run_loop` and `on_ready_to_operate`, which the host drives
/// through the [`Registry`](crate::registry::Registry).
pub trait NodeHandler: Send + Sync {
    /// Handle a write to `property` that no settable property claimed.
    fn handle_input(&self, range: &RangeContext, property: &str, value: &str) -> bool;

    /// Called once before the device starts operating.
    fn setup(&mut self) {}

    /// Called on every iteration of the host's main loop.
    fn run_loop(&mut self) {}

    /// Called once the device is connected and ready.
    fn on_ready_to_operate(&mut self) {}
}

impl<F> NodeHandler for F
where
    F: Fn(&RangeContext, &str, &str) -> bool + Send + Sync,
{
    fn handle_input(&self, range: &RangeContext, property: &str, value: &str) -> bool {
        self(range, property, value)
    }
}

/// Read-only view of a node, as needed by the dispatcher and the
/// advertisement collaborator.
pub trait NodeDescriptor {
    type Property: PropertyDescriptor;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn node_type(&self) -> &str;
    /// Bounds of the indexed family, `None` for a plain node.
    fn range(&self) -> Option<RangeBounds>;
    /// Properties in advertisement (declaration) order.
    fn properties(&self) -> &[Self::Property];

    fn is_range(&self) -> bool {
        self.range().is_some()
    }
}

/// A logical device facet owning an ordered list of properties.
pub struct Node {
    id: String,
    name: String,
    node_type: String,
    range: Option<RangeBounds>,
    properties: Vec<Property>,
    handler: Option<Box<dyn NodeHandler>>,
}

impl Node {
    /// Create a plain (non-range) node with no properties and the default
    /// rejecting input handler.
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            range: None,
            properties: Vec::new(),
            handler: None,
        }
    }

    /// Turn this node into a ranged node covering `[lower, upper]`.
    pub fn with_range(mut self, lower: u16, upper: u16) -> Result<Self, RangeError> {
        self.range = Some(RangeBounds::new(lower, upper)?);
        Ok(self)
    }

    /// Attach the node-level input handler.
    pub fn with_input_handler<H>(mut self, handler: H) -> Self
    where
        H: NodeHandler + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Declare a property with empty metadata.
    pub fn advertise(&mut self, id: impl Into<String>) -> Result<PropertyBuilder<'_>, NodeError> {
        self.advertise_with(id, PropertyMeta::default())
    }

    /// Declare a property, append it to the advertisement order and return
    /// its builder.
    ///
    /// Property ids are unique within a node; redeclaring one fails and
    /// leaves the first declaration untouched.
    pub fn advertise_with(
        &mut self,
        id: impl Into<String>,
        meta: PropertyMeta,
    ) -> Result<PropertyBuilder<'_>, NodeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(NodeError::EmptyIdentifier {
                node: self.id.clone(),
            });
        }
        if self.property(&id).is_some() {
            return Err(NodeError::DuplicateIdentifier {
                node: self.id.clone(),
                property: id,
            });
        }

        let index = self.properties.len();
        self.properties.push(Property::new(id, meta));
        Ok(PropertyBuilder::new(&mut self.properties[index]))
    }

    /// First property with the given id, in declaration order.
    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id() == id)
    }

    /// True if a caller-supplied node-level handler is attached.
    pub fn has_input_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Invoke the node-level handler, or [`reject_node_input`] if none.
    pub fn handle_input(&self, range: &RangeContext, property: &str, value: &str) -> bool {
        match &self.handler {
            Some(handler) => handler.handle_input(range, property, value),
            None => reject_node_input(range, property, value),
        }
    }

    pub(crate) fn handler_mut(&mut self) -> Option<&mut (dyn NodeHandler + 'static)> {
        self.handler.as_deref_mut()
    }
}

impl NodeDescriptor for Node {
    type Property = Property;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn node_type(&self) -> &str {
        &self.node_type
    }

    fn range(&self) -> Option<RangeBounds> {
        self.range
    }

    fn properties(&self) -> &[Property] {
        &self.properties
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("node_type", &self.node_type)
            .field("range", &self.range)
            .field("properties", &self.properties)
            .field("has_input_handler", &self.has_input_handler())
            .finish()
    }
}

/// Errors raised while declaring properties on a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("Empty property id on node '{node}'")]
    EmptyIdentifier { node: String },

    #[error("Property '{property}' already declared on node '{node}'")]
    DuplicateIdentifier { node: String, property: String },
}

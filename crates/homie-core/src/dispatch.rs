//! Inbound command dispatch.
//!
//! Resolves one `(node, property, range index, value)` command against the
//! registry and invokes exactly one handler:
//!
//! 1. Unknown node id → [`DispatchError::UnknownNode`].
//! 2. Ranged node with a missing or out-of-bounds index →
//!    [`DispatchError::RangeOutOfBounds`].
//! 3. First property with a matching id, in declaration order:
//!    - settable → its input handler;
//!    - not settable → the node-level handler if the node has one,
//!      otherwise [`DispatchError::NotSettable`];
//!    - no such property → the node-level handler.
//! 4. A handler returning `false` → [`DispatchError::HandlerRejected`].
//!
//! The dispatcher never stores values; that is the handler's business.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::node::{Node, NodeDescriptor};
use crate::property::PropertyDescriptor;
use crate::range::{RangeContext, RangeError};
use crate::registry::Registry;

/// Which handler accepted a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The matched property's own input handler.
    Property,
    /// The owning node's node-level handler.
    NodeFallback,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Property => f.write_str("property handler"),
            Route::NodeFallback => f.write_str("node handler"),
        }
    }
}

/// Reasons a command was not accepted. None of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown node '{0}'")]
    UnknownNode(String),

    #[error("Node '{node}': {source}")]
    RangeOutOfBounds { node: String, source: RangeError },

    #[error("Property '{node}/{property}' is not settable")]
    NotSettable { node: String, property: String },

    #[error("Value for '{node}/{property}' rejected by {route}")]
    HandlerRejected {
        node: String,
        property: String,
        route: Route,
    },
}

/// Routes inbound set commands to the handlers declared in a [`Registry`].
///
/// Stateless apart from the borrowed registry; each call is independent.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    registry: &'a Registry,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Dispatch one command and report which handler accepted it.
    pub fn dispatch(
        &self,
        node_id: &str,
        property_id: &str,
        range_index: Option<u16>,
        value: &str,
    ) -> Result<Route, DispatchError> {
        let node = self
            .registry
            .find(node_id)
            .ok_or_else(|| DispatchError::UnknownNode(node_id.to_string()))?;

        let range = resolve_range(node, range_index)?;

        let (accepted, route) = match node.property(property_id) {
            Some(property) if property.is_settable() => {
                debug!(node = node_id, property = property_id, index = ?range.index(), "dispatching to property handler");
                (property.input_handler().call(&range, value), Route::Property)
            }
            Some(_) if !node.has_input_handler() => {
                warn!(node = node_id, property = property_id, "write to non-settable property");
                return Err(DispatchError::NotSettable {
                    node: node_id.to_string(),
                    property: property_id.to_string(),
                });
            }
            _ => {
                debug!(node = node_id, property = property_id, index = ?range.index(), "dispatching to node handler");
                (
                    node.handle_input(&range, property_id, value),
                    Route::NodeFallback,
                )
            }
        };

        if !accepted {
            debug!(node = node_id, property = property_id, value, "rejected value");
            warn!(node = node_id, property = property_id, %route, "value rejected");
            return Err(DispatchError::HandlerRejected {
                node: node_id.to_string(),
                property: property_id.to_string(),
                route,
            });
        }
        Ok(route)
    }

    /// Dispatch one command, collapsing the outcome to "accepted or not".
    pub fn handle(
        &self,
        node_id: &str,
        property_id: &str,
        range_index: Option<u16>,
        value: &str,
    ) -> bool {
        self.dispatch(node_id, property_id, range_index, value).is_ok()
    }
}

/// Build the handler's range context. An index sent to a plain node is
/// ignored.
fn resolve_range(node: &Node, range_index: Option<u16>) -> Result<RangeContext, DispatchError> {
    match node.range() {
        Some(bounds) => bounds.resolve(range_index).map_err(|source| {
            warn!(node = node.id(), index = ?range_index, %bounds, "range index rejected");
            DispatchError::RangeOutOfBounds {
                node: node.id().to_string(),
                source,
            }
        }),
        None => {
            if let Some(index) = range_index {
                debug!(node = node.id(), index, "ignoring range index for plain node");
            }
            Ok(RangeContext::single())
        }
    }
}

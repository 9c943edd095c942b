//! The node registry.
//!
//! An append-only list of every node the device declares. It is filled
//! once during initialization and only read afterwards: by the dispatcher
//! on inbound commands and by the advertisement collaborator.
//!
//! There is no global instance. The host constructs one and hands
//! references to whoever needs it.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::node::{Node, NodeDescriptor};
use crate::property::PropertyDescriptor;

/// Append-only collection of declared nodes.
#[derive(Debug, Default)]
pub struct Registry {
    config: RegistryConfig,
    nodes: Vec<Node>,
}

impl Registry {
    /// Create an empty registry with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given settings.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Take ownership of `node` and append it.
    ///
    /// Node ids are unique for the lifetime of the registry; a rejected
    /// node is dropped and the registry is left unchanged.
    pub fn register(&mut self, node: Node) -> Result<(), RegistryError> {
        self.check(&node)?;

        for property in node.properties().iter().filter(|p| p.is_placeholder()) {
            warn!(
                node = node.id(),
                property = property.id(),
                "settable property has no input handler"
            );
        }
        info!(
            node = node.id(),
            properties = node.properties().len(),
            range = ?node.range(),
            "registered node"
        );
        self.nodes.push(node);
        Ok(())
    }

    fn check(&self, node: &Node) -> Result<(), RegistryError> {
        if node.id().is_empty() {
            return Err(RegistryError::EmptyIdentifier);
        }
        if self.nodes.iter().any(|n| n.id() == node.id()) {
            return Err(RegistryError::DuplicateIdentifier(node.id().to_string()));
        }
        if self.nodes.len() >= self.config.max_nodes {
            return Err(RegistryError::TooManyNodes(self.config.max_nodes));
        }
        if node.properties().len() > self.config.max_properties_per_node {
            return Err(RegistryError::TooManyProperties {
                node: node.id().to_string(),
                limit: self.config.max_properties_per_node,
            });
        }
        if !self.config.is_valid_identifier(node.id()) {
            return Err(RegistryError::InvalidIdentifier(node.id().to_string()));
        }
        if let Some(property) = node
            .properties()
            .iter()
            .find(|p| !self.config.is_valid_identifier(p.id()))
        {
            return Err(RegistryError::InvalidIdentifier(format!(
                "{}/{}",
                node.id(),
                property.id()
            )));
        }
        Ok(())
    }

    /// First node with the given id, in declaration order.
    pub fn find(&self, id: &str) -> Option<&Node> {
        let node = self.nodes.iter().find(|n| n.id() == id);
        if node.is_none() {
            debug!(node = id, "node not found");
        }
        node
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Run every node's `setup` hook, in declaration order.
    pub fn setup_nodes(&mut self) {
        for node in &mut self.nodes {
            if let Some(handler) = node.handler_mut() {
                handler.setup();
            }
        }
    }

    /// Run every node's `run_loop` hook, in declaration order.
    pub fn loop_nodes(&mut self) {
        for node in &mut self.nodes {
            if let Some(handler) = node.handler_mut() {
                handler.run_loop();
            }
        }
    }

    /// Run every node's `on_ready_to_operate` hook, in declaration order.
    pub fn notify_ready(&mut self) {
        for node in &mut self.nodes {
            if let Some(handler) = node.handler_mut() {
                handler.on_ready_to_operate();
            }
        }
    }
}

/// Errors raised when registering a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Empty node id")]
    EmptyIdentifier,

    #[error("Node '{0}' already registered")]
    DuplicateIdentifier(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Node limit of {0} reached")]
    TooManyNodes(usize),

    #[error("Node '{node}' exceeds the limit of {limit} properties")]
    TooManyProperties { node: String, limit: usize },
}

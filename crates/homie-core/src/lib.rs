//! # homie-core
//!
//! Attribute registration and command dispatch for Homie devices.
//!
//! This crate provides:
//! - Range bounds for indexed node families
//! - Property descriptors and the builder used to declare them
//! - Nodes and the append-only node registry
//! - The dispatcher that routes inbound "set" commands to handlers
//!
//! This crate is intentionally runtime-agnostic and contains no async code
//! or I/O, making it usable on both Linux and embedded targets.

pub mod config;
pub mod dispatch;
pub mod node;
pub mod property;
pub mod range;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use config::RegistryConfig;
pub use dispatch::{DispatchError, Dispatcher, Route};
pub use node::{reject_node_input, Node, NodeDescriptor, NodeError, NodeHandler};
pub use property::{
    reject_property_input, Property, PropertyBuilder, PropertyDescriptor, PropertyInputHandler,
    PropertyMeta,
};
pub use range::{RangeBounds, RangeContext, RangeError};
pub use registry::{Registry, RegistryError};

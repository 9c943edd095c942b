//! # homie-protocol
//!
//! The transport-facing side of a Homie device core.
//!
//! This crate turns a node registry into advertisement messages and turns
//! inbound command topics back into dispatch calls. It performs no network
//! I/O; an MQTT client (or anything else) publishes and subscribes.

pub mod codec;
pub mod messages;

pub use codec::*;
pub use messages::*;

//! Advertisement and command message types.
//!
//! Advertisements are owned snapshots of what the registry declares, in
//! the shape the transport needs to publish. [`SetCommand`] is the inbound
//! half: one decoded write command, ready for the dispatcher.

use serde::{Deserialize, Serialize};

use homie_core::{
    DispatchError, Dispatcher, NodeDescriptor, PropertyDescriptor, RangeBounds, Registry, Route,
};

/// Advertised attributes of one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAdvertisement {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datatype: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(default)]
    pub settable: bool,
}

impl PropertyAdvertisement {
    pub fn from_descriptor<P: PropertyDescriptor>(property: &P) -> Self {
        Self {
            id: property.id().to_string(),
            name: property.name().to_string(),
            datatype: property.datatype().to_string(),
            unit: property.unit().to_string(),
            format: property.format().to_string(),
            settable: property.is_settable(),
        }
    }
}

/// Advertised attributes of one node and its properties.
///
/// `lower_bound`/`upper_bound` are only meaningful when `is_range` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAdvertisement {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub is_range: bool,
    #[serde(default)]
    pub lower_bound: u16,
    #[serde(default)]
    pub upper_bound: u16,
    pub properties: Vec<PropertyAdvertisement>,
}

impl NodeAdvertisement {
    pub fn from_descriptor<N: NodeDescriptor>(node: &N) -> Self {
        let range = node.range();
        Self {
            id: node.id().to_string(),
            name: node.name().to_string(),
            node_type: node.node_type().to_string(),
            is_range: range.is_some(),
            lower_bound: range.map(|r| r.lower()).unwrap_or_default(),
            upper_bound: range.map(|r| r.upper()).unwrap_or_default(),
            properties: node
                .properties()
                .iter()
                .map(PropertyAdvertisement::from_descriptor)
                .collect(),
        }
    }

    /// The `$array` attribute value (`"lower-upper"`) for ranged nodes.
    ///
    /// `None` for plain nodes and for decoded advertisements whose bounds
    /// are inverted.
    pub fn array(&self) -> Option<String> {
        if !self.is_range {
            return None;
        }
        RangeBounds::new(self.lower_bound, self.upper_bound)
            .ok()
            .map(|bounds| bounds.to_string())
    }
}

/// Every node a device advertises, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAdvertisement {
    pub nodes: Vec<NodeAdvertisement>,
}

impl DeviceAdvertisement {
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            nodes: registry
                .nodes()
                .iter()
                .map(NodeAdvertisement::from_descriptor)
                .collect(),
        }
    }
}

/// A decoded inbound write command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCommand {
    pub node_id: String,
    pub property_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_index: Option<u16>,
    pub value: String,
}

impl SetCommand {
    /// Hand the command to the dispatcher.
    pub fn dispatch(&self, dispatcher: &Dispatcher<'_>) -> Result<Route, DispatchError> {
        dispatcher.dispatch(
            &self.node_id,
            &self.property_id,
            self.range_index,
            &self.value,
        )
    }
}

/// One retained attribute publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMessage {
    pub topic: String,
    pub payload: String,
    pub retained: bool,
}

impl AttributeMessage {
    pub fn retained(topic: String, payload: impl Into<String>) -> Self {
        Self {
            topic,
            payload: payload.into(),
            retained: true,
        }
    }
}

//! Topic codec for the Homie convention.
//!
//! Attributes are published under `<base><node>/...` where `base` is the
//! device prefix (e.g. `"homie/my-device/"`). Writes arrive on
//! `<base><node>[_<index>]/<property>/set`; a trailing `_<digits>` on the
//! node segment selects a member of a ranged node, unless the whole segment
//! is itself a declared node id.

use thiserror::Error;
use tracing::debug;

use homie_core::{NodeDescriptor, PropertyDescriptor, Registry};

use crate::messages::{AttributeMessage, DeviceAdvertisement, SetCommand};

/// Errors that can occur while encoding or decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization failed.
    #[error("Failed to serialize advertisement: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// The topic is not under this device's base topic.
    #[error("Topic '{0}' is outside the device base topic")]
    ForeignTopic(String),

    /// The topic does not have the `<node>/<property>/set` shape.
    #[error("Malformed command topic '{0}'")]
    MalformedTopic(String),

    /// The range suffix is not a valid index.
    #[error("Invalid range index '{0}'")]
    InvalidRangeIndex(String),
}

/// Normalize a base topic so it ends with exactly one `/`.
pub fn normalize_base(base: &str) -> String {
    format!("{}/", base.trim_end_matches('/'))
}

/// Build the retained attribute messages for one node, in publication
/// order. Empty property metadata is omitted.
pub fn attribute_messages<N: NodeDescriptor>(base: &str, node: &N) -> Vec<AttributeMessage> {
    let prefix = format!("{}{}", normalize_base(base), node.id());
    let mut messages = vec![
        AttributeMessage::retained(format!("{prefix}/$name"), node.name()),
        AttributeMessage::retained(format!("{prefix}/$type"), node.node_type()),
        AttributeMessage::retained(
            format!("{prefix}/$properties"),
            node.properties()
                .iter()
                .map(|p| p.id())
                .collect::<Vec<_>>()
                .join(","),
        ),
    ];
    if let Some(bounds) = node.range() {
        messages.push(AttributeMessage::retained(
            format!("{prefix}/$array"),
            bounds.to_string(),
        ));
    }

    for property in node.properties() {
        let topic = format!("{prefix}/{}", property.id());
        let optional = [
            ("$name", property.name()),
            ("$datatype", property.datatype()),
            ("$unit", property.unit()),
            ("$format", property.format()),
        ];

        messages.push(AttributeMessage::retained(
            format!("{topic}/$settable"),
            property.is_settable().to_string(),
        ));
        messages.extend(
            optional
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(attribute, value)| {
                    AttributeMessage::retained(format!("{topic}/{attribute}"), value)
                }),
        );
    }
    messages
}

/// Encode a device advertisement as JSON.
pub fn encode_advertisement(advertisement: &DeviceAdvertisement) -> Result<String, CodecError> {
    serde_json::to_string(advertisement).map_err(CodecError::from)
}

/// The wildcard topic a transport subscribes to for inbound writes.
pub fn set_subscription(base: &str) -> String {
    format!("{}+/+/set", normalize_base(base))
}

/// Decode an inbound `<base><node>[_<index>]/<property>/set` topic.
///
/// The node segment is resolved against `registry`: an exact node id wins,
/// and a trailing `_<digits>` is only read as a range index when the part
/// before it names a ranged node. Anything else is passed through whole so
/// the dispatcher reports the unknown node.
pub fn parse_set_topic(
    registry: &Registry,
    base: &str,
    topic: &str,
    payload: &str,
) -> Result<SetCommand, CodecError> {
    let base = normalize_base(base);
    let rest = topic
        .strip_prefix(&base)
        .ok_or_else(|| CodecError::ForeignTopic(topic.to_string()))?;

    let (node_segment, property_id) = match rest.split('/').collect::<Vec<_>>().as_slice() {
        [node, property, "set"] if !node.is_empty() && !property.is_empty() => (*node, *property),
        _ => {
            debug!(topic, "not a set command topic");
            return Err(CodecError::MalformedTopic(topic.to_string()));
        }
    };

    let (node_id, range_index) = resolve_node_segment(registry, node_segment)?;

    Ok(SetCommand {
        node_id: node_id.to_string(),
        property_id: property_id.to_string(),
        range_index,
        value: payload.to_string(),
    })
}

fn resolve_node_segment<'a>(
    registry: &Registry,
    segment: &'a str,
) -> Result<(&'a str, Option<u16>), CodecError> {
    let declared = |id: &str| registry.nodes().iter().find(|n| n.id() == id);

    if declared(segment).is_some() {
        return Ok((segment, None));
    }
    match split_range_suffix(segment) {
        Some((node_id, suffix)) if declared(node_id).is_some_and(|n| n.is_range()) => {
            let index = suffix
                .parse::<u16>()
                .map_err(|_| CodecError::InvalidRangeIndex(suffix.to_string()))?;
            Ok((node_id, Some(index)))
        }
        _ => Ok((segment, None)),
    }
}

/// Split `<id>_<digits>` into its parts, without parsing the digits.
fn split_range_suffix(segment: &str) -> Option<(&str, &str)> {
    segment.rsplit_once('_').filter(|(node_id, suffix)| {
        !node_id.is_empty() && !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit())
    })
}

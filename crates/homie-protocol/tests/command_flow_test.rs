//! Integration tests: inbound topics decoded by the codec and routed by
//! the core dispatcher.

use std::sync::{Arc, Mutex};

use homie_core::{
    DispatchError, Dispatcher, Node, PropertyMeta, RangeContext, RangeError, Registry, Route,
};
use homie_protocol::{attribute_messages, parse_set_topic, DeviceAdvertisement};

const BASE: &str = "homie/kitchen/";

/// Build a device with a relay and a three-channel dimmer, recording every
/// accepted write.
fn device(log: Arc<Mutex<Vec<String>>>) -> Registry {
    let relay_log = log.clone();
    let mut relay = Node::new("relay", "Relay", "switch");
    relay
        .advertise_with("on", PropertyMeta::new().name("On").datatype("boolean"))
        .unwrap()
        .settable(move |_, value| {
            let ok = matches!(value, "true" | "false");
            if ok {
                relay_log.lock().unwrap().push(format!("relay/on={value}"));
            }
            ok
        });

    let dimmer_log = log;
    let mut dimmer = Node::new("dimmer", "Dimmer", "light")
        .with_range(1, 3)
        .unwrap()
        .with_input_handler(
            move |range: &RangeContext, property: &str, value: &str| {
                dimmer_log
                    .lock()
                    .unwrap()
                    .push(format!("dimmer_{}/{property}={value}", range.index));
                true
            },
        );
    dimmer
        .advertise_with("level", PropertyMeta::new().datatype("integer").format("0:100"))
        .unwrap();

    let mut registry = Registry::new();
    registry.register(relay).unwrap();
    registry.register(dimmer).unwrap();
    registry
}

#[test]
fn topics_route_to_handlers() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = device(log.clone());
    let dispatcher = Dispatcher::new(&registry);

    let inbound = [
        ("homie/kitchen/relay/on/set", "true"),
        ("homie/kitchen/dimmer_2/level/set", "40"),
        ("homie/kitchen/dimmer_3/fade/set", "500"),
    ];
    for (topic, payload) in inbound {
        let command = parse_set_topic(&registry, BASE, topic, payload).unwrap();
        assert!(command.dispatch(&dispatcher).is_ok(), "{topic} rejected");
    }

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "relay/on=true".to_string(),
            "dimmer_2/level=40".to_string(),
            "dimmer_3/fade=500".to_string(),
        ]
    );
}

#[test]
fn rejected_commands_leave_handlers_untouched() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = device(log.clone());
    let dispatcher = Dispatcher::new(&registry);

    let out_of_range =
        parse_set_topic(&registry, BASE, "homie/kitchen/dimmer_4/level/set", "10").unwrap();
    assert!(matches!(
        out_of_range.dispatch(&dispatcher),
        Err(DispatchError::RangeOutOfBounds {
            source: RangeError::OutOfBounds { index: 4, .. },
            ..
        })
    ));

    let missing_index =
        parse_set_topic(&registry, BASE, "homie/kitchen/dimmer/level/set", "10").unwrap();
    assert!(matches!(
        missing_index.dispatch(&dispatcher),
        Err(DispatchError::RangeOutOfBounds {
            source: RangeError::MissingIndex,
            ..
        })
    ));

    let unknown =
        parse_set_topic(&registry, BASE, "homie/kitchen/fan/speed/set", "3").unwrap();
    assert_eq!(
        unknown.dispatch(&dispatcher),
        Err(DispatchError::UnknownNode("fan".to_string()))
    );

    let bad_value =
        parse_set_topic(&registry, BASE, "homie/kitchen/relay/on/set", "maybe").unwrap();
    assert!(matches!(
        bad_value.dispatch(&dispatcher),
        Err(DispatchError::HandlerRejected {
            route: Route::Property,
            ..
        })
    ));

    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn advertisement_covers_every_node() {
    let registry = device(Arc::new(Mutex::new(Vec::new())));

    let advertisement = DeviceAdvertisement::from_registry(&registry);
    let ids: Vec<&str> = advertisement.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["relay", "dimmer"]);

    let dimmer_attributes = attribute_messages(BASE, &registry.nodes()[1]);
    assert!(dimmer_attributes
        .iter()
        .any(|m| m.topic == "homie/kitchen/dimmer/$array" && m.payload == "1-3"));
    assert!(dimmer_attributes
        .iter()
        .any(|m| m.topic == "homie/kitchen/dimmer/level/$format" && m.payload == "0:100"));
}

#[test]
fn plain_node_with_numeric_suffix_receives_commands() {
    let mut relay = Node::new("relay_1", "Relay 1", "switch");
    relay.advertise("on").unwrap().settable(|_, value| value == "true");
    let mut registry = Registry::new();
    registry.register(relay).unwrap();
    let dispatcher = Dispatcher::new(&registry);

    let command =
        parse_set_topic(&registry, "homie/dev/", "homie/dev/relay_1/on/set", "true").unwrap();
    assert_eq!(command.node_id, "relay_1");
    assert_eq!(command.range_index, None);
    assert_eq!(command.dispatch(&dispatcher), Ok(Route::Property));
}

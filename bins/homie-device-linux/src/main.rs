use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use homie_core::{
    Dispatcher, Node, NodeHandler, PropertyMeta, RangeContext, Registry, RegistryConfig,
};
use homie_protocol::{attribute_messages, parse_set_topic, set_subscription};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Device settings, loaded from an optional JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DeviceSettings {
    device_id: String,
    base_topic: String,
    registry: RegistryConfig,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            device_id: "homie-device-rust".to_string(),
            base_topic: "homie/".to_string(),
            registry: RegistryConfig {
                validate_identifiers: true,
                ..Default::default()
            },
        }
    }
}

impl DeviceSettings {
    /// Topic prefix for this device, e.g. `homie/homie-device-rust/`.
    fn device_topic(&self) -> String {
        format!(
            "{}/{}/",
            self.base_topic.trim_end_matches('/'),
            self.device_id
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,homie_core=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Homie device starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => load_settings(Path::new(&path)).await?,
        None => DeviceSettings::default(),
    };
    let device_topic = settings.device_topic();

    let mut registry = Registry::with_config(settings.registry.clone());
    declare_nodes(&mut registry)?;
    registry.setup_nodes();

    for node in registry.nodes() {
        for message in attribute_messages(&device_topic, node) {
            tracing::info!("publish {} = {}", message.topic, message.payload);
        }
    }
    registry.notify_ready();

    tracing::info!("Ready! Subscribed to {}", set_subscription(&device_topic));
    tracing::info!("Type commands as '<topic> <payload>', e.g.:");
    tracing::info!("   {}relay/on/set true", device_topic);
    tracing::info!("   {}sensor_1/reset/set 1", device_topic);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down...");
                break;
            }
            _ = interval.tick() => {
                registry.loop_nodes();
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => handle_line(&registry, &device_topic, &line),
                    None => {
                        tracing::warn!("stdin closed");
                        break;
                    }
                }
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn load_settings(path: &Path) -> anyhow::Result<DeviceSettings> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Settings file {} not found, using defaults", path.display());
            Ok(DeviceSettings::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Decode one `<topic> <payload>` line and dispatch it.
fn handle_line(registry: &Registry, device_topic: &str, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    let (topic, payload) = line.split_once(' ').unwrap_or((line, ""));

    let command = match parse_set_topic(registry, device_topic, topic, payload) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("Ignoring '{}': {}", topic, e);
            return;
        }
    };

    match command.dispatch(&Dispatcher::new(registry)) {
        Ok(route) => tracing::info!("Accepted {} = {} ({})", topic, payload, route),
        Err(e) => {
            tracing::debug!("Rejected payload for {}: {:?}", topic, payload);
            tracing::warn!("Rejected {}: {}", topic, e);
        }
    }
}

/// Declare the demo device: a relay, a three-channel temperature sensor
/// and an LED whose color is not wired yet.
fn declare_nodes(registry: &mut Registry) -> anyhow::Result<()> {
    let relay_state = Arc::new(AtomicBool::new(false));
    let mut relay = Node::new("relay", "Relay", "switch");
    relay
        .advertise_with("on", PropertyMeta::new().name("On").datatype("boolean"))?
        .settable(move |_, value| match value {
            "true" | "false" => {
                relay_state.store(value == "true", Ordering::SeqCst);
                tracing::info!("relay switched {}", value);
                true
            }
            _ => false,
        });
    registry.register(relay)?;

    let mut sensor = Node::new("sensor", "Temperature sensor", "temperature")
        .with_range(0, 2)?
        .with_input_handler(TemperatureSensor::new(3));
    sensor.advertise_with(
        "temperature",
        PropertyMeta::new()
            .name("Temperature")
            .datatype("float")
            .unit("°C"),
    )?;
    registry.register(sensor)?;

    let mut led = Node::new("led", "Status LED", "light");
    led.advertise_with("color", PropertyMeta::new().datatype("color").format("rgb"))?
        .settable_without_handler();
    registry.register(led)?;

    Ok(())
}

/// Node-level handler for the sensor family: accepts `reset` on any
/// channel and counts main-loop ticks.
struct TemperatureSensor {
    resets: Vec<AtomicU32>,
    ticks: u64,
}

impl TemperatureSensor {
    fn new(channels: usize) -> Self {
        Self {
            resets: (0..channels).map(|_| AtomicU32::new(0)).collect(),
            ticks: 0,
        }
    }
}

impl NodeHandler for TemperatureSensor {
    fn handle_input(&self, range: &RangeContext, property: &str, _value: &str) -> bool {
        if property != "reset" {
            return false;
        }
        match self.resets.get(usize::from(range.index)) {
            Some(count) => {
                let total = count.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::info!("sensor channel {} reset ({} total)", range.index, total);
                true
            }
            None => false,
        }
    }

    fn setup(&mut self) {
        tracing::debug!("sensor setup with {} channels", self.resets.len());
    }

    fn run_loop(&mut self) {
        self.ticks += 1;
    }

    fn on_ready_to_operate(&mut self) {
        tracing::info!("sensor ready");
    }
}

//! Property descriptors and the builder used to declare them.
//!
//! A property is one addressable attribute of a node. Declaring code never
//! constructs a [`Property`] directly: it calls [`Node::advertise`] and gets
//! back a [`PropertyBuilder`] whose only job is to mark the new property
//! settable and attach its input handler.
//!
//! [`Node::advertise`]: crate::node::Node::advertise

use std::fmt;

use tracing::warn;

use crate::range::RangeContext;

/// The default property input handler. Rejects every value.
pub fn reject_property_input(_range: &RangeContext, _value: &str) -> bool {
    false
}

type InputFn = dyn Fn(&RangeContext, &str) -> bool + Send + Sync;

/// Input handler attached to a settable property.
///
/// Either a caller-supplied closure or the default [`reject_property_input`].
/// Keeping the default as a distinct value lets collaborators tell a
/// placeholder apart from a wired handler.
pub struct PropertyInputHandler {
    custom: Option<Box<InputFn>>,
}

impl PropertyInputHandler {
    /// Wrap a caller-supplied handler.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&RangeContext, &str) -> bool + Send + Sync + 'static,
    {
        Self {
            custom: Some(Box::new(handler)),
        }
    }

    /// The default handler that rejects all input.
    pub fn reject() -> Self {
        Self { custom: None }
    }

    /// True if this is the default rejecting handler.
    pub fn is_default(&self) -> bool {
        self.custom.is_none()
    }

    /// Invoke the handler.
    pub fn call(&self, range: &RangeContext, value: &str) -> bool {
        match &self.custom {
            Some(handler) => handler(range, value),
            None => reject_property_input(range, value),
        }
    }
}

impl Default for PropertyInputHandler {
    fn default() -> Self {
        Self::reject()
    }
}

impl fmt::Debug for PropertyInputHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("PropertyInputHandler(reject)")
        } else {
            f.write_str("PropertyInputHandler(custom)")
        }
    }
}

/// Optional descriptive metadata for a property.
///
/// Every field defaults to empty. None of it is interpreted here; it is
/// advertised as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMeta {
    pub name: String,
    pub datatype: String,
    pub unit: String,
    pub format: String,
}

impl PropertyMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = datatype.into();
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

/// Read-only view of a property, as needed by the dispatcher and the
/// advertisement collaborator.
pub trait PropertyDescriptor {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn datatype(&self) -> &str;
    fn unit(&self) -> &str;
    fn format(&self) -> &str;
    fn is_settable(&self) -> bool;
}

/// One addressable attribute of a node.
#[derive(Debug)]
pub struct Property {
    id: String,
    meta: PropertyMeta,
    settable: bool,
    input_handler: PropertyInputHandler,
}

impl Property {
    pub(crate) fn new(id: impl Into<String>, meta: PropertyMeta) -> Self {
        Self {
            id: id.into(),
            meta,
            settable: false,
            input_handler: PropertyInputHandler::reject(),
        }
    }

    /// The attached input handler. Ignored by the dispatcher unless the
    /// property is settable.
    pub fn input_handler(&self) -> &PropertyInputHandler {
        &self.input_handler
    }

    /// True if the property is settable but still carries the default
    /// rejecting handler.
    pub fn is_placeholder(&self) -> bool {
        self.settable && self.input_handler.is_default()
    }
}

impl PropertyDescriptor for Property {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.meta.name
    }

    fn datatype(&self) -> &str {
        &self.meta.datatype
    }

    fn unit(&self) -> &str {
        &self.meta.unit
    }

    fn format(&self) -> &str {
        &self.meta.format
    }

    fn is_settable(&self) -> bool {
        self.settable
    }
}

/// Short-lived handle to a property that was just advertised.
///
/// Borrows the property from its node for the duration of the declaration
/// chain; it never owns it.
pub struct PropertyBuilder<'a> {
    property: &'a mut Property,
}

impl<'a> PropertyBuilder<'a> {
    pub(crate) fn new(property: &'a mut Property) -> Self {
        Self { property }
    }

    /// Mark the property settable and attach `handler`.
    ///
    /// Calling this again replaces the previous handler.
    pub fn settable<F>(self, handler: F) -> Self
    where
        F: Fn(&RangeContext, &str) -> bool + Send + Sync + 'static,
    {
        self.property.settable = true;
        self.property.input_handler = PropertyInputHandler::new(handler);
        self
    }

    /// Mark the property settable without wiring a handler yet.
    ///
    /// Every write is rejected until a real handler is attached.
    pub fn settable_without_handler(self) -> Self {
        warn!(
            property = %self.property.id,
            "property marked settable without an input handler, all writes will be rejected"
        );
        self.property.settable = true;
        self.property.input_handler = PropertyInputHandler::reject();
        self
    }

    /// Id of the property being declared.
    pub fn id(&self) -> &str {
        &self.property.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_property_input_rejects_everything() {
        assert!(!reject_property_input(&RangeContext::single(), "true"));
        assert!(!reject_property_input(&RangeContext::at(3), ""));
    }

    #[test]
    fn test_new_property_defaults() {
        let property = Property::new("temperature", PropertyMeta::new());
        assert_eq!(property.id(), "temperature");
        assert_eq!(property.name(), "");
        assert_eq!(property.datatype(), "");
        assert_eq!(property.unit(), "");
        assert_eq!(property.format(), "");
        assert!(!property.is_settable());
        assert!(property.input_handler().is_default());
        assert!(!property.is_placeholder());
    }

    #[test]
    fn test_meta_is_stored_verbatim() {
        let meta = PropertyMeta::new()
            .name("Temperature")
            .datatype("float")
            .unit("°C")
            .format("-40:125");
        let property = Property::new("temperature", meta);
        assert_eq!(property.name(), "Temperature");
        assert_eq!(property.datatype(), "float");
        assert_eq!(property.unit(), "°C");
        assert_eq!(property.format(), "-40:125");
    }

    #[test]
    fn test_settable_attaches_handler() {
        let mut property = Property::new("on", PropertyMeta::new());
        PropertyBuilder::new(&mut property).settable(|_, value| value == "true");

        assert!(property.is_settable());
        assert!(!property.input_handler().is_default());
        assert!(property.input_handler().call(&RangeContext::single(), "true"));
        assert!(!property.input_handler().call(&RangeContext::single(), "false"));
    }

    #[test]
    fn test_settable_without_handler_is_placeholder() {
        let mut property = Property::new("on", PropertyMeta::new());
        PropertyBuilder::new(&mut property).settable_without_handler();

        assert!(property.is_settable());
        assert!(property.is_placeholder());
        assert!(!property.input_handler().call(&RangeContext::single(), "true"));
    }

    #[test]
    fn test_settable_last_write_wins() {
        let mut property = Property::new("level", PropertyMeta::new());
        PropertyBuilder::new(&mut property)
            .settable(|_, _| false)
            .settable(|_, _| true);

        assert!(property.input_handler().call(&RangeContext::single(), "1"));
    }

    #[test]
    fn test_handler_debug_names_kind() {
        assert_eq!(
            format!("{:?}", PropertyInputHandler::reject()),
            "PropertyInputHandler(reject)"
        );
        assert_eq!(
            format!("{:?}", PropertyInputHandler::new(|_, _| true)),
            "PropertyInputHandler(custom)"
        );
    }
}

//! Synced Attributes
//!
//! Attributes whose live state is held in a host property (or an action)
//! rather than in the attribute itself. Setting the attribute alone would
//! not change what the user sees once they have interacted with the node.

use serde_json::Value;

use crate::host::Host;

/// Mirror an added attribute into host state
pub(crate) fn added<H: Host>(host: &mut H, node: &H::Node, name: &str, value: &str) {
    match name {
        "checked" | "selected" => host.set_property(node, name, Value::Bool(true)),
        "value" => host.set_property(node, name, Value::from(value)),
        "autofocus" => host.focus(node),
        "autoplay" => {
            if let Err(error) = host.play(node) {
                tracing::error!(?node, %error, "autoplay failed");
            }
        }
        _ => {}
    }
}

/// Mirror a removed attribute into host state
pub(crate) fn removed<H: Host>(host: &mut H, node: &H::Node, name: &str) {
    if matches!(name, "checked" | "selected") {
        host.set_property(node, name, Value::Bool(false));
    }
}

/// Initial-state attributes that map to a default property and never
/// appear as attributes
pub(crate) fn default_property(name: &str, value: &str) -> Option<(&'static str, Value)> {
    match name {
        "virtual:defaultValue" => Some(("defaultValue", Value::from(value))),
        "virtual:defaultChecked" => Some(("defaultChecked", Value::Bool(true))),
        "virtual:defaultSelected" => Some(("defaultSelected", Value::Bool(true))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_property() {
        assert_eq!(
            default_property("virtual:defaultValue", "x"),
            Some(("defaultValue", Value::from("x")))
        );
        assert_eq!(
            default_property("virtual:defaultChecked", ""),
            Some(("defaultChecked", Value::Bool(true)))
        );
        assert_eq!(default_property("value", "x"), None);
    }
}

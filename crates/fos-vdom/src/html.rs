//! HTML Serialization
//!
//! Render a virtual tree to markup, e.g. for a first paint that is later
//! adopted with [`crate::Reconciler::virtualise`].

use crate::vattr::Attribute;
use crate::vnode::Node;

impl<Msg> Node<Msg> {
    /// Serialize this subtree to HTML.
    ///
    /// Properties and listeners have no markup form and are skipped. The
    /// `virtual:default*` attributes render as the plain attribute they
    /// initialize.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_node(self, &mut out);
        out
    }
}

fn write_node<Msg>(node: &Node<Msg>, out: &mut String) {
    match node {
        Node::Fragment(fragment) => {
            for child in &fragment.children {
                write_node(child, out);
            }
        }
        Node::Element(element) => {
            open_tag(&element.tag, &element.attributes, out);
            if element.self_closing {
                out.push_str("/>");
                return;
            }
            out.push('>');
            if element.void {
                return;
            }
            for child in &element.children {
                write_node(child, out);
            }
            close_tag(&element.tag, out);
        }
        Node::Text(text) => escape_into(&text.content, false, out),
        Node::RawHtml(raw) => {
            open_tag(&raw.tag, &raw.attributes, out);
            out.push('>');
            out.push_str(&raw.inner_html);
            close_tag(&raw.tag, out);
        }
    }
}

fn open_tag<Msg>(tag: &str, attributes: &[Attribute<Msg>], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for attribute in attributes {
        let Attribute::Attr { name, value } = attribute else {
            continue;
        };
        let name = match name.as_str() {
            "virtual:defaultValue" => "value",
            "virtual:defaultChecked" => "checked",
            "virtual:defaultSelected" => "selected",
            other => other,
        };
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
    }
}

fn close_tag(tag: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::element::{element, fragment, raw_html, text};
    use crate::vattr::{attribute, class, default_checked, on, property, Handler};
    use crate::vnode::Node;
    use serde_json::Value;

    #[test]
    fn test_element_html() {
        let node: Node<()> = element(
            "p",
            vec![class("lead"), on("click", |_| Ok(Handler::new(())))],
            vec![text("a < b & \"c\"")],
        );
        assert_eq!(node.to_html(), "<p class=\"lead\">a &lt; b &amp; \"c\"</p>");
    }

    #[test]
    fn test_void_and_self_closing() {
        let input: Node<()> = element(
            "input",
            vec![attribute("type", "checkbox"), default_checked(true), property("value", Value::from("x"))],
            vec![],
        );
        assert_eq!(input.to_html(), "<input type=\"checkbox\" checked>");

        let circle: Node<()> = element("circle", vec![attribute("r", "2")], vec![]).self_closing();
        assert_eq!(circle.to_html(), "<circle r=\"2\"/>");
    }

    #[test]
    fn test_fragment_and_raw() {
        let node: Node<()> = fragment(vec![
            text("a"),
            raw_html("", "div", vec![], "<b>bold</b>"),
            text("c"),
        ]);
        assert_eq!(node.to_html(), "a<div><b>bold</b></div>c");
    }
}

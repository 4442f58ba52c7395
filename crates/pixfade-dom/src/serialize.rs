//! HTML serialization

use crate::{DomTree, NodeData, NodeId};

/// Elements that never have a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are emitted raw
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

impl DomTree {
    /// Serialize a node and its subtree
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id, false);
        out
    }

    /// Serialize only the children of a node
    pub fn inner_html(&self, id: NodeId) -> String {
        let raw = self
            .tag_name(id)
            .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
        let mut out = String::new();
        for (child, _) in self.children(id) {
            self.write_node(&mut out, child, raw);
        }
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId, raw_text: bool) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => {
                for (child, _) in self.children(id) {
                    self.write_node(out, child, false);
                }
            }
            NodeData::Doctype { name } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeData::Text(text) => {
                if raw_text {
                    out.push_str(text);
                } else {
                    escape_text(out, text);
                }
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element(elem) => {
                out.push('<');
                out.push_str(&elem.tag);
                for attr in &elem.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_attr(out, &attr.value);
                    out.push('"');
                }
                out.push('>');
                if is_void(&elem.tag) {
                    return;
                }
                let raw = RAW_TEXT_ELEMENTS.contains(&elem.tag.as_str());
                for (child, _) in self.children(id) {
                    self.write_node(out, child, raw);
                }
                out.push_str("</");
                out.push_str(&elem.tag);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::DomTree;

    #[test]
    fn test_serialize_void_and_attrs() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let img = tree.create_element("img");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, img).unwrap();
        tree.set_attr(div, "data-image-wrapper", "").unwrap();
        tree.set_attr(img, "alt", "Tom & \"Jerry\"").unwrap();

        assert_eq!(
            tree.outer_html(div),
            r#"<div data-image-wrapper=""><img alt="Tom &amp; &quot;Jerry&quot;"></div>"#
        );
    }

    #[test]
    fn test_serialize_text_escaping() {
        let mut tree = DomTree::new();
        let p = tree.create_element("p");
        let text = tree.create_text("a < b");
        tree.append_child(tree.root(), p).unwrap();
        tree.append_child(p, text).unwrap();

        assert_eq!(tree.inner_html(p), "a &lt; b");
        assert_eq!(tree.outer_html(tree.root()), "<p>a &lt; b</p>");
    }

    #[test]
    fn test_serialize_raw_text() {
        let mut tree = DomTree::new();
        let style = tree.create_element("style");
        let css = tree.create_text("a > b { color: red }");
        tree.append_child(tree.root(), style).unwrap();
        tree.append_child(style, css).unwrap();

        assert_eq!(tree.outer_html(style), "<style>a > b { color: red }</style>");
    }
}

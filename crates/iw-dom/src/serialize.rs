//! HTML fragment serialization of live document nodes.

use crate::document::Document;
use crate::node::NodeData;
use crate::node::NodeHandle;
use crate::node::is_raw_text_element;
use crate::node::is_void_element;

impl Document {
    /// Markup of `node` including its own tags.
    pub fn outer_html(&self, node: NodeHandle) -> String {
        let mut out = String::new();
        self.write_tree(vec![Step::Enter(node, false)], &mut out);
        out
    }

    /// Markup of the children of `node`.
    pub fn inner_html(&self, node: NodeHandle) -> String {
        let raw_parent = self
            .tag_name(node)
            .is_some_and(is_raw_text_element);
        let mut out = String::new();
        self.write_tree(self.child_steps(node, raw_parent), &mut out);
        out
    }

    /// Serializes with an explicit work stack so nesting depth never
    /// touches the call stack.
    fn write_tree<'a>(&'a self, mut pending: Vec<Step<'a>>, out: &mut String) {
        while let Some(step) = pending.pop() {
            let (node, raw_parent) = match step {
                Step::Close(tag) => {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                    continue;
                }
                Step::Enter(node, raw_parent) => (node, raw_parent),
            };
            let Some(data) = self.data(node) else {
                continue;
            };

            match data {
                NodeData::Document => pending.extend(self.child_steps(node, false)),
                NodeData::Doctype { name } => {
                    out.push_str("<!DOCTYPE ");
                    out.push_str(name);
                    out.push('>');
                }
                NodeData::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                NodeData::Text(text) if raw_parent => out.push_str(text),
                NodeData::Text(text) => escape_text(text, out),
                NodeData::Element(element) => {
                    out.push('<');
                    out.push_str(&element.tag);
                    for attr in &element.attrs {
                        out.push(' ');
                        out.push_str(&attr.name);
                        out.push_str("=\"");
                        escape_attribute(&attr.value, out);
                        out.push('"');
                    }
                    out.push('>');

                    if !is_void_element(&element.tag) {
                        pending.push(Step::Close(&element.tag));
                        pending.extend(self.child_steps(node, is_raw_text_element(&element.tag)));
                    }
                }
            }
        }
    }

    /// Children of `node` in reverse, ready to be popped in document order.
    fn child_steps(&self, node: NodeHandle, raw_parent: bool) -> Vec<Step<'_>> {
        let mut steps: Vec<Step<'_>> = self
            .children(node)
            .map(|child| Step::Enter(child, raw_parent))
            .collect();
        steps.reverse();
        steps
    }
}

enum Step<'a> {
    /// Node to write; the flag marks a raw-text parent.
    Enter(NodeHandle, bool),
    Close(&'a str),
}

fn escape_text(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

use iw_dom::Document;
use iw_dom::NodeHandle;

const ROOT_SEGMENT: &str = "html";
const SEPARATOR: &str = " > ";

/// Human-readable locator for an element, e.g.
/// `html > body:nth-of-type(1) > main:nth-of-type(1) > section#hero`.
///
/// The walk stops at the first ancestor with a non-empty `id` and never
/// includes the document element itself; `html` is always prepended.
/// Returns an empty string for `None`, stale handles, and non-elements.
pub fn element_path(doc: &Document, node: Option<NodeHandle>) -> String {
    let Some(node) = node.filter(|node| doc.is_element(*node)) else {
        return String::new();
    };

    let mut segments: Vec<String> = Vec::new();
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        let Some(tag) = doc.tag_name(current) else {
            break;
        };
        if tag == ROOT_SEGMENT {
            break;
        }

        if let Some(id) = doc.get_attribute(current, "id").filter(|id| !id.is_empty()) {
            segments.push(format!("{tag}#{id}"));
            break;
        }

        let segment = match ordinal(doc, current) {
            Some(k) => format!("{tag}:nth-of-type({k})"),
            None => tag.to_owned(),
        };
        segments.push(segment);
        cursor = doc.parent_element(current);
    }

    segments.push(ROOT_SEGMENT.to_owned());
    segments.reverse();
    segments.join(SEPARATOR)
}

/// Ordinal among same-tag element siblings; only defined under an element
/// parent.
fn ordinal(doc: &Document, node: NodeHandle) -> Option<usize> {
    doc.parent_element(node)?;
    doc.nth_of_type(node).filter(|k| *k > 0)
}

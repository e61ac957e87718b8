use crate::markers::MarkerClasses;
use iw_dom::Document;
use iw_dom::NodeHandle;

/// Editable mirror of the addressed element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyForm {
    pub id: String,
    pub class: String,
    pub style: String,
    pub text: String,
}

impl PropertyForm {
    /// Reads the live element. Absent attributes become empty strings and
    /// editor marker classes are left out of `class`.
    pub fn from_element(doc: &Document, node: NodeHandle, markers: &MarkerClasses) -> Self {
        let attr = |name: &str| doc.get_attribute(node, name).unwrap_or_default().to_owned();
        Self {
            id: attr("id"),
            class: markers.strip_from(doc.get_attribute(node, "class").unwrap_or_default()),
            style: attr("style"),
            text: doc.text_content(node),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

use crate::config::EditorConfig;
use crate::config::MarkerStyle;
use iw_core::EditorResult;
use iw_dom::Document;
use iw_dom::NodeHandle;

/// Attribute that tags the injected marker stylesheet.
pub const MARKER_STYLESHEET_ATTRIBUTE: &str = "data-inkwell";

/// Class tokens the editor adds to the addressed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerClasses {
    pub hover: String,
    pub lock: String,
}

impl MarkerClasses {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            hover: config.hover_marker.class_name.clone(),
            lock: config.lock_marker.class_name.clone(),
        }
    }

    pub fn is_marker(&self, token: &str) -> bool {
        token == self.hover || token == self.lock
    }

    pub fn for_lock(&self, locked: bool) -> &str {
        if locked { &self.lock } else { &self.hover }
    }

    pub fn clear(&self, doc: &mut Document, node: NodeHandle) -> EditorResult<()> {
        doc.remove_class(node, &self.hover)?;
        doc.remove_class(node, &self.lock)
    }

    /// Replaces whatever marker `node` carries with the one for `locked`.
    pub fn mark(&self, doc: &mut Document, node: NodeHandle, locked: bool) -> EditorResult<()> {
        self.clear(doc, node)?;
        doc.add_class(node, self.for_lock(locked))
    }

    /// `class` attribute value without editor tokens.
    pub fn strip_from(&self, class_value: &str) -> String {
        class_value
            .split_ascii_whitespace()
            .filter(|token| !self.is_marker(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// CSS text for the marker stylesheet.
pub fn marker_stylesheet(config: &EditorConfig) -> String {
    let rule = |marker: &MarkerStyle| {
        let cursor = if marker.pointer_cursor {
            " cursor: pointer;"
        } else {
            ""
        };
        format!(
            ".{} {{ outline: {}px solid {}; outline-offset: {}px;{cursor} }}",
            marker.class_name,
            config.marker_outline_width_px,
            marker.outline_color,
            config.marker_outline_offset_px,
        )
    };
    format!(
        "\n{}\n{}\n",
        rule(&config.hover_marker),
        rule(&config.lock_marker)
    )
}

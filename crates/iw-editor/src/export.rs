use crate::config::EditorConfig;
use crate::markers::MarkerClasses;
use crate::surface::marker_stylesheet_node;
use iw_core::EditorError;
use iw_core::EditorResult;
use iw_dom::Document;
use std::fs;
use std::path::Path;

/// Serialized template ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTemplate {
    pub file_name: String,
    pub media_type: String,
    pub contents: String,
}

impl ExportedTemplate {
    /// Serializes the live tree: doctype prefix, then the document element's
    /// outer markup. Editor markers are stripped from a copy first so the
    /// live document keeps its selection.
    pub fn from_document(
        doc: &Document,
        markers: &MarkerClasses,
        config: &EditorConfig,
    ) -> EditorResult<Self> {
        let mut copy = doc.clone();
        strip_editor_artifacts(&mut copy, markers)?;

        let root = copy.document_element().ok_or_else(|| {
            EditorError::new("export.no_document", "document has no root element")
        })?;

        let mut contents = config.doctype_prefix.clone();
        contents.push_str(&copy.outer_html(root));
        Ok(Self {
            file_name: config.export_file_name.clone(),
            media_type: config.export_media_type.clone(),
            contents,
        })
    }

    /// Writes the contents to `path`, creating missing parent directories.
    pub fn write_to(&self, path: &Path) -> EditorResult<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| {
                EditorError::new(
                    "export.write_failed",
                    format!("failed to create directory `{}`: {error}", parent.display()),
                )
            })?;
        }

        fs::write(path, self.contents.as_bytes()).map_err(|error| {
            EditorError::new(
                "export.write_failed",
                format!("failed to write `{}`: {error}", path.display()),
            )
        })
    }
}

fn strip_editor_artifacts(doc: &mut Document, markers: &MarkerClasses) -> EditorResult<()> {
    if let Some(style) = marker_stylesheet_node(doc) {
        doc.detach(style)?;
    }

    for node in doc.descendants(doc.root()) {
        if doc.has_class(node, &markers.hover) {
            doc.remove_class(node, &markers.hover)?;
        }
        if doc.has_class(node, &markers.lock) {
            doc.remove_class(node, &markers.lock)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ExportedTemplate;
    use crate::config::EditorConfig;
    use crate::markers::MarkerClasses;
    use iw_dom::Document;
    use iw_html::HtmlParser;
    use std::time::SystemTime;
    use std::time::UNIX_EPOCH;

    fn temp_export_dir() -> std::path::PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|value| value.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("inkwell-export-test-{stamp}"))
    }

    #[test]
    fn strips_markers_from_copy_only() {
        let config = EditorConfig::default();
        let markers = MarkerClasses::from_config(&config);
        let mut doc = HtmlParser.parse(
            "<head><style data-inkwell=\"markers\">.x{}</style></head><body><p class=\"__iw-lock-marker\">a</p><p class=\"lead __iw-hover-marker\">b</p></body>",
        );

        let Ok(exported) = ExportedTemplate::from_document(&doc, &markers, &config) else {
            panic!("export should succeed");
        };
        assert_eq!(
            exported.contents,
            "<!DOCTYPE html>\n<html><head></head><body><p>a</p><p class=\"lead\">b</p></body></html>"
        );
        assert_eq!(exported.file_name, "template-editado.html");
        assert_eq!(exported.media_type, "text/html;charset=utf-8");

        let paragraphs = doc.elements_by_tag_name("p");
        assert!(doc.has_class(paragraphs[0], "__iw-lock-marker"));
        assert!(doc.set_attribute(paragraphs[0], "id", "kept").is_ok());
    }

    #[test]
    fn requires_a_root_element() {
        let config = EditorConfig::default();
        let markers = MarkerClasses::from_config(&config);
        let exported = ExportedTemplate::from_document(&Document::new(), &markers, &config);
        assert!(matches!(exported, Err(error) if error.code == "export.no_document"));
    }

    #[test]
    fn writes_to_new_directories() {
        let config = EditorConfig::default();
        let markers = MarkerClasses::from_config(&config);
        let doc = HtmlParser.parse("<p>Olá</p>");
        let Ok(exported) = ExportedTemplate::from_document(&doc, &markers, &config) else {
            panic!("export should succeed");
        };

        let dir = temp_export_dir();
        let path = dir.join("nested").join(&exported.file_name);
        assert!(exported.write_to(&path).is_ok());
        assert_eq!(std::fs::read_to_string(&path).ok(), Some(exported.contents.clone()));

        let _ = std::fs::remove_dir_all(dir);
    }
}

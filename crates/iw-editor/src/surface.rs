//! Isolated rendering context that owns the document being edited.

use crate::markers::MARKER_STYLESHEET_ATTRIBUTE;
use iw_core::EditorResult;
use iw_dom::Attribute;
use iw_dom::Document;
use iw_dom::NodeHandle;
use iw_dom::events;
use iw_dom::events::CaptureListener;
use iw_dom::events::DispatchOutcome;
use iw_dom::events::DomEvent;
use iw_dom::events::EventKind;
use iw_html::HtmlParser;
use tracing::debug;

/// Holds the live document tree. Every read or write of document structure
/// goes through here; until a source is loaded there is no document and
/// dependent operations are no-ops.
#[derive(Debug)]
pub struct PreviewSurface {
    document: Option<Document>,
    parser: HtmlParser,
    capture_kinds: Vec<EventKind>,
    marker_css: String,
}

impl PreviewSurface {
    pub fn new(marker_css: impl Into<String>) -> Self {
        Self {
            document: None,
            parser: HtmlParser,
            capture_kinds: Vec::new(),
            marker_css: marker_css.into(),
        }
    }

    /// Replaces the document with `source`, parsed as-is. Listeners and the
    /// marker stylesheet belong to the previous document and are dropped.
    pub fn load_source(&mut self, source: &str) {
        let document = self.parser.parse(source);
        debug!(
            generation = document.generation(),
            nodes = document.node_count(),
            "preview source loaded"
        );
        self.document = Some(document);
        self.capture_kinds.clear();
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn document_mut(&mut self) -> Option<&mut Document> {
        self.document.as_mut()
    }

    pub fn title(&self) -> Option<String> {
        self.document.as_ref().and_then(Document::title)
    }

    /// Routes `kind` events through the capture listener passed to
    /// [`PreviewSurface::dispatch`] for the current document.
    pub fn add_capture_listener(&mut self, kind: EventKind) {
        if !self.capture_kinds.contains(&kind) {
            self.capture_kinds.push(kind);
        }
    }

    pub fn has_capture_listener(&self, kind: EventKind) -> bool {
        self.capture_kinds.contains(&kind)
    }

    /// Injects (or refreshes) the marker `<style>` element in `head`.
    pub fn install_marker_stylesheet(&mut self) -> EditorResult<Option<NodeHandle>> {
        let Some(doc) = self.document.as_mut() else {
            return Ok(None);
        };

        if let Some(existing) = marker_stylesheet_node(doc) {
            doc.set_text_content(existing, &self.marker_css)?;
            return Ok(Some(existing));
        }

        let Some(parent) = doc.head().or_else(|| doc.document_element()) else {
            return Ok(None);
        };
        let style = doc.create_element_with_attrs(
            "style",
            vec![Attribute::new(MARKER_STYLESHEET_ATTRIBUTE, "markers")],
        );
        doc.set_text_content(style, &self.marker_css)?;
        doc.append_child(parent, style)?;
        Ok(Some(style))
    }

    /// Dispatches `event` into the document. `listener` sees it first when
    /// a capture listener is registered for the event kind. `None` when no
    /// document is loaded.
    pub fn dispatch(
        &mut self,
        event: DomEvent,
        listener: &mut dyn CaptureListener,
    ) -> Option<DispatchOutcome> {
        let document = self.document.as_mut()?;
        let capture = if self.capture_kinds.contains(&event.kind()) {
            Some(listener)
        } else {
            None
        };
        Some(events::dispatch(document, event, capture))
    }
}

/// The injected marker stylesheet, if present.
pub fn marker_stylesheet_node(doc: &Document) -> Option<NodeHandle> {
    doc.elements_by_tag_name("style")
        .into_iter()
        .find(|style| doc.has_attribute(*style, MARKER_STYLESHEET_ATTRIBUTE))
}

#[cfg(test)]
mod tests {
    use super::PreviewSurface;
    use super::marker_stylesheet_node;
    use iw_dom::Document;
    use iw_dom::events::CaptureListener;
    use iw_dom::events::DomEvent;
    use iw_dom::events::EventKind;

    #[derive(Default)]
    struct Counter {
        seen: usize,
    }

    impl CaptureListener for Counter {
        fn handle_event(&mut self, _document: &mut Document, event: &mut DomEvent) {
            self.seen += 1;
            event.prevent_default();
        }
    }

    #[test]
    fn nothing_happens_before_a_document_is_loaded() {
        let mut surface = PreviewSurface::new(".m { outline: 1px solid red; }");
        assert!(!surface.is_loaded());
        assert!(surface.document().is_none());
        assert_eq!(surface.install_marker_stylesheet(), Ok(None));

        let other = Document::new();
        let mut counter = Counter::default();
        let outcome = surface.dispatch(DomEvent::new(EventKind::Click, other.root()), &mut counter);
        assert!(outcome.is_none());
        assert_eq!(counter.seen, 0);
    }

    #[test]
    fn installs_marker_stylesheet_once_in_head() {
        let mut surface = PreviewSurface::new(".m { outline: 1px solid red; }");
        surface.load_source("<title>T</title><p>x</p>");

        let first = surface.install_marker_stylesheet();
        let second = surface.install_marker_stylesheet();
        assert_eq!(first, second);

        let Some(doc) = surface.document() else {
            panic!("document should be loaded");
        };
        assert_eq!(doc.elements_by_tag_name("style").len(), 1);
        let Some(style) = marker_stylesheet_node(doc) else {
            panic!("marker stylesheet missing");
        };
        assert_eq!(doc.parent(style), doc.head());
        assert_eq!(doc.text_content(style), ".m { outline: 1px solid red; }");
        assert_eq!(surface.title().as_deref(), Some("T"));
    }

    #[test]
    fn capture_listeners_are_per_document_and_per_kind() {
        let mut surface = PreviewSurface::new("");
        surface.load_source("<p>x</p>");
        surface.add_capture_listener(EventKind::Click);
        assert!(surface.has_capture_listener(EventKind::Click));
        assert!(!surface.has_capture_listener(EventKind::PointerOver));

        let Some(paragraph) = surface
            .document()
            .and_then(|doc| doc.elements_by_tag_name("p").first().copied())
        else {
            panic!("paragraph missing");
        };

        let mut counter = Counter::default();
        let clicked = surface.dispatch(DomEvent::new(EventKind::Click, paragraph), &mut counter);
        assert!(clicked.is_some_and(|outcome| outcome.event.default_prevented()));
        let hovered = surface.dispatch(
            DomEvent::new(EventKind::PointerOver, paragraph),
            &mut counter,
        );
        assert!(hovered.is_some_and(|outcome| !outcome.event.default_prevented()));
        assert_eq!(counter.seen, 1);

        surface.load_source("<p>y</p>");
        assert!(!surface.has_capture_listener(EventKind::Click));
    }
}

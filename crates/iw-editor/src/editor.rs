use crate::config::EditorConfig;
use crate::export::ExportedTemplate;
use crate::form::PropertyForm;
use crate::load::FileCandidate;
use crate::markers::MarkerClasses;
use crate::markers::marker_stylesheet;
use crate::session::EditorSession;
use crate::session::SelectionState;
use crate::surface::PreviewSurface;
use iw_core::EditorError;
use iw_core::EditorResult;
use iw_dom::Document;
use iw_dom::NodeHandle;
use iw_dom::events::DispatchOutcome;
use iw_dom::events::DomEvent;
use iw_dom::events::EventKind;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Preview surface and editor session wired together.
///
/// Pointer input enters through [`Editor::pointer_over`] and
/// [`Editor::click`], which dispatch DOM events so the session observes
/// them as the document-level capture listener. Panel actions call the
/// session directly against the live document.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    surface: PreviewSurface,
    session: EditorSession,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Creates an editor showing the configured sample template.
    pub fn new(config: EditorConfig) -> Self {
        let surface = PreviewSurface::new(marker_stylesheet(&config));
        let session = EditorSession::new(MarkerClasses::from_config(&config));
        let sample = config.sample_template.clone();
        let mut editor = Self {
            config,
            surface,
            session,
        };
        editor.load_source(&sample);
        editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &PreviewSurface {
        &self.surface
    }

    pub fn document(&self) -> Option<&Document> {
        self.surface.document()
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn state(&self) -> SelectionState {
        self.session.state()
    }

    pub fn addressed(&self) -> Option<NodeHandle> {
        self.session.addressed()
    }

    pub fn is_locked(&self) -> bool {
        self.session.is_locked()
    }

    pub fn form(&self) -> &PropertyForm {
        self.session.form()
    }

    pub fn form_mut(&mut self) -> &mut PropertyForm {
        self.session.form_mut()
    }

    /// Apply and reload are only available with an addressed element.
    pub fn can_edit(&self) -> bool {
        self.session.addressed().is_some() && self.surface.is_loaded()
    }

    /// Replaces the preview with `source`, re-installs the marker
    /// stylesheet and capture listeners, and resets the session.
    pub fn load_source(&mut self, source: &str) {
        self.surface.load_source(source);
        if let Err(error) = self.surface.install_marker_stylesheet() {
            warn!(%error, "marker stylesheet not installed");
        }
        self.surface.add_capture_listener(EventKind::PointerOver);
        self.surface.add_capture_listener(EventKind::Click);
        self.session.reset();
    }

    /// Loads a picked or dropped file. Non-HTML candidates are rejected with
    /// `load.unsupported_media_type` and leave the editor untouched.
    pub fn load_file(&mut self, candidate: FileCandidate) -> EditorResult<()> {
        let name = candidate.name.clone();
        let source = candidate.into_html_source().inspect_err(|error| {
            warn!(%error, "file ignored");
        })?;
        self.load_source(&source);
        info!(file = %name, bytes = source.len(), "template loaded");
        Ok(())
    }

    pub fn pointer_over(&mut self, target: NodeHandle) -> Option<DispatchOutcome> {
        self.dispatch(EventKind::PointerOver, target)
    }

    pub fn click(&mut self, target: NodeHandle) -> Option<DispatchOutcome> {
        self.dispatch(EventKind::Click, target)
    }

    /// External lock switch; see [`EditorSession::set_locked`].
    pub fn set_locked(&mut self, locked: bool) {
        self.session.set_locked(self.surface.document_mut(), locked);
    }

    /// Writes the form into the addressed element. `Ok(false)` when there
    /// is no document or nothing is addressed.
    pub fn apply_edits(&mut self) -> EditorResult<bool> {
        let Some(doc) = self.surface.document_mut() else {
            return Ok(false);
        };
        self.session.apply_edits(doc)
    }

    pub fn reload_from_element(&mut self) -> bool {
        match self.surface.document() {
            Some(doc) => self.session.reload_from_element(doc),
            None => false,
        }
    }

    pub fn path_descriptor(&self) -> String {
        self.surface
            .document()
            .map(|doc| self.session.path_descriptor(doc))
            .unwrap_or_default()
    }

    pub fn export(&self) -> EditorResult<ExportedTemplate> {
        let doc = self
            .surface
            .document()
            .ok_or_else(|| EditorError::new("export.no_document", "no document is loaded"))?;
        let exported = ExportedTemplate::from_document(doc, self.session.markers(), &self.config)?;
        info!(bytes = exported.contents.len(), "template exported");
        Ok(exported)
    }

    fn dispatch(&mut self, kind: EventKind, target: NodeHandle) -> Option<DispatchOutcome> {
        let outcome = self
            .surface
            .dispatch(DomEvent::new(kind, target), &mut self.session)?;
        if !outcome.content_handlers.is_empty() {
            debug!(
                event = kind.as_str(),
                handlers = outcome.content_handlers.len(),
                "content handlers not executed"
            );
        }
        if let Some(action) = &outcome.default_action {
            debug!(event = kind.as_str(), ?action, "default action not performed");
        }
        Some(outcome)
    }
}

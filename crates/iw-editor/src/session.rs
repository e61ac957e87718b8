//! Hover, lock, and edit state for one loaded document.

use crate::form::PropertyForm;
use crate::markers::MarkerClasses;
use crate::path::element_path;
use iw_core::EditorResult;
use iw_dom::Document;
use iw_dom::NodeHandle;
use iw_dom::events::CaptureListener;
use iw_dom::events::DomEvent;
use iw_dom::events::EventKind;
use tracing::debug;
use tracing::warn;

/// What the session addresses. `Idle` means nothing is addressed and says
/// nothing about the lock flag: the switch can be turned on before any
/// element is picked, which only suppresses hovering. Read
/// [`EditorSession::is_locked`] for the flag itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    Hovering(NodeHandle),
    Locked(NodeHandle),
}

/// The single record of editor interaction state.
///
/// At most one element is addressed at a time. The handle is only
/// meaningful against the document it was taken from; callers reset the
/// session whenever that document is replaced.
#[derive(Debug, Clone)]
pub struct EditorSession {
    addressed: Option<NodeHandle>,
    locked: bool,
    form: PropertyForm,
    markers: MarkerClasses,
}

impl EditorSession {
    pub fn new(markers: MarkerClasses) -> Self {
        Self {
            addressed: None,
            locked: false,
            form: PropertyForm::default(),
            markers,
        }
    }

    pub fn state(&self) -> SelectionState {
        match (self.addressed, self.locked) {
            (None, _) => SelectionState::Idle,
            (Some(node), false) => SelectionState::Hovering(node),
            (Some(node), true) => SelectionState::Locked(node),
        }
    }

    pub fn addressed(&self) -> Option<NodeHandle> {
        self.addressed
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn form(&self) -> &PropertyForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PropertyForm {
        &mut self.form
    }

    pub fn markers(&self) -> &MarkerClasses {
        &self.markers
    }

    /// Forgets the addressed element and unlocks. Used on document load.
    pub fn reset(&mut self) {
        self.addressed = None;
        self.locked = false;
        self.form.clear();
    }

    /// Pointer entered `target`. Ignored while locked and for targets that
    /// are not attached elements. Returns whether the addressed element
    /// changed.
    pub fn pointer_over(&mut self, doc: &mut Document, target: NodeHandle) -> bool {
        if self.locked || !is_addressable(doc, target) {
            return false;
        }

        let previous = self.addressed;
        if let Some(previous) = previous.filter(|previous| *previous != target) {
            self.clear_marker(doc, previous);
        }
        self.address(doc, target, false);
        previous != Some(target)
    }

    /// Click on `target`: toggles the lock and re-addresses in every state.
    pub fn click(&mut self, doc: &mut Document, target: NodeHandle) {
        if !is_addressable(doc, target) {
            return;
        }

        self.locked = !self.locked;
        if let Some(previous) = self.addressed {
            self.clear_marker(doc, previous);
        }
        self.address(doc, target, self.locked);
        debug!(locked = self.locked, path = %element_path(doc, Some(target)), "selection toggled");
    }

    /// External lock switch. Keeps the addressed element and swaps its
    /// marker so the outline always agrees with the lock flag.
    pub fn set_locked(&mut self, doc: Option<&mut Document>, locked: bool) {
        self.locked = locked;
        let (Some(doc), Some(node)) = (doc, self.addressed) else {
            return;
        };
        if let Err(error) = self.markers.mark(doc, node, locked) {
            warn!(%error, "could not swap selection marker");
        }
    }

    /// Writes the form into the addressed element. Returns `Ok(false)` when
    /// nothing is addressed. Addressing and lock are left untouched.
    pub fn apply_edits(&mut self, doc: &mut Document) -> EditorResult<bool> {
        let Some(node) = self.addressed else {
            return Ok(false);
        };

        let id = self.form.id.trim();
        if doc.get_element_by_id(id).is_some_and(|other| other != node) {
            warn!(id, "id is already used by another element");
        }
        set_or_remove(doc, node, "id", &self.form.id)?;
        set_or_remove(doc, node, "class", &self.form.class)?;
        doc.add_class(node, self.markers.for_lock(self.locked))?;
        set_or_remove(doc, node, "style", &self.form.style)?;
        doc.set_text_content(node, &self.form.text)?;

        debug!(path = %element_path(doc, Some(node)), "edits applied");
        Ok(true)
    }

    /// Discards unapplied edits by re-reading the addressed element.
    pub fn reload_from_element(&mut self, doc: &Document) -> bool {
        match self.addressed.filter(|node| doc.is_element(*node)) {
            Some(node) => {
                self.form = PropertyForm::from_element(doc, node, &self.markers);
                true
            }
            None => false,
        }
    }

    pub fn path_descriptor(&self, doc: &Document) -> String {
        element_path(doc, self.addressed)
    }

    fn address(&mut self, doc: &mut Document, node: NodeHandle, locked: bool) {
        if let Err(error) = self.markers.mark(doc, node, locked) {
            warn!(%error, "could not mark addressed element");
        }
        self.addressed = Some(node);
        self.form = PropertyForm::from_element(doc, node, &self.markers);
    }

    fn clear_marker(&self, doc: &mut Document, node: NodeHandle) {
        // A handle from a replaced document has nothing left to clear.
        if doc.contains(node) {
            if let Err(error) = self.markers.clear(doc, node) {
                warn!(%error, "could not clear selection marker");
            }
        }
    }
}

impl CaptureListener for EditorSession {
    fn handle_event(&mut self, document: &mut Document, event: &mut DomEvent) {
        match event.kind() {
            EventKind::PointerOver => {
                self.pointer_over(document, event.target());
            }
            EventKind::Click => {
                // Clicks on text or detached nodes keep their default action.
                if !is_addressable(document, event.target()) {
                    return;
                }
                event.prevent_default();
                event.stop_propagation();
                self.click(document, event.target());
            }
        }
    }
}

fn is_addressable(doc: &Document, node: NodeHandle) -> bool {
    doc.is_element(node) && doc.is_connected(node)
}

/// Sets the trimmed value, or removes the attribute when it is blank.
fn set_or_remove(doc: &mut Document, node: NodeHandle, name: &str, value: &str) -> EditorResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        doc.remove_attribute(node, name)?;
        Ok(())
    } else {
        doc.set_attribute(node, name, trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::EditorSession;
    use super::SelectionState;
    use crate::config::EditorConfig;
    use crate::markers::MarkerClasses;
    use iw_dom::Document;
    use iw_dom::NodeHandle;
    use iw_dom::events::DefaultAction;
    use iw_dom::events::DomEvent;
    use iw_dom::events::EventKind;
    use iw_dom::events::dispatch;
    use iw_html::HtmlParser;

    const HOVER: &str = "__iw-hover-marker";
    const LOCK: &str = "__iw-lock-marker";

    fn fixture() -> (Document, EditorSession, NodeHandle, NodeHandle) {
        let doc = HtmlParser.parse(
            "<section id=\"hero\" class=\"hero\"><h2>Título</h2><a class=\"btn\" href=\"#go\" onclick=\"track()\">Ir</a></section>",
        );
        let section = doc.elements_by_tag_name("section")[0];
        let link = doc.elements_by_tag_name("a")[0];
        let session = EditorSession::new(MarkerClasses::from_config(&EditorConfig::default()));
        (doc, session, section, link)
    }

    #[test]
    fn hover_addresses_and_moves_marker() {
        let (mut doc, mut session, section, link) = fixture();

        assert!(session.pointer_over(&mut doc, section));
        assert_eq!(session.state(), SelectionState::Hovering(section));
        assert_eq!(session.form().id, "hero");
        assert_eq!(session.form().class, "hero");
        assert!(doc.has_class(section, HOVER));

        assert!(session.pointer_over(&mut doc, link));
        assert!(!doc.has_class(section, HOVER));
        assert!(doc.has_class(link, HOVER));
        assert_eq!(session.form().text, "Ir");

        assert!(!session.pointer_over(&mut doc, link));
    }

    #[test]
    fn click_toggles_lock_in_every_state() {
        let (mut doc, mut session, section, link) = fixture();

        session.click(&mut doc, section);
        assert_eq!(session.state(), SelectionState::Locked(section));
        assert!(doc.has_class(section, LOCK));

        session.click(&mut doc, section);
        assert_eq!(session.state(), SelectionState::Hovering(section));
        assert!(doc.has_class(section, HOVER));
        assert!(!doc.has_class(section, LOCK));

        session.click(&mut doc, section);
        session.click(&mut doc, link);
        assert_eq!(session.state(), SelectionState::Hovering(link));
        assert_eq!(doc.class_list(section), vec!["hero"]);
        assert!(doc.has_class(link, HOVER));
    }

    #[test]
    fn locked_session_ignores_pointer_over() {
        let (mut doc, mut session, section, link) = fixture();
        session.click(&mut doc, section);
        let form_before = session.form().clone();

        assert!(!session.pointer_over(&mut doc, link));
        assert_eq!(session.addressed(), Some(section));
        assert_eq!(session.form(), &form_before);
        assert!(!doc.has_class(link, HOVER));
    }

    #[test]
    fn capture_listener_swallows_clicks() {
        let (mut doc, mut session, _, link) = fixture();

        let outcome = dispatch(
            &mut doc,
            DomEvent::new(EventKind::Click, link),
            Some(&mut session),
        );
        assert!(outcome.event.default_prevented());
        assert!(outcome.content_handlers.is_empty());
        assert_eq!(outcome.default_action, None);
        assert_eq!(session.state(), SelectionState::Locked(link));

        let hover = dispatch(
            &mut doc,
            DomEvent::new(EventKind::PointerOver, link),
            Some(&mut session),
        );
        assert!(!hover.event.default_prevented());

        let unhandled = dispatch(&mut doc, DomEvent::new(EventKind::Click, link), None);
        assert_eq!(
            unhandled.default_action,
            Some(DefaultAction::FollowLink {
                href: "#go".to_owned()
            })
        );
    }

    #[test]
    fn external_lock_switch_keeps_element_and_swaps_marker() {
        let (mut doc, mut session, section, _) = fixture();
        session.pointer_over(&mut doc, section);

        session.set_locked(Some(&mut doc), true);
        assert_eq!(session.state(), SelectionState::Locked(section));
        assert!(doc.has_class(section, LOCK));
        assert!(!doc.has_class(section, HOVER));

        session.set_locked(Some(&mut doc), false);
        assert_eq!(session.state(), SelectionState::Hovering(section));
        assert!(doc.has_class(section, HOVER));

        session.set_locked(None, true);
        assert!(session.is_locked());
    }

    #[test]
    fn apply_writes_trimmed_values_and_keeps_marker() {
        let (mut doc, mut session, section, _) = fixture();
        session.click(&mut doc, section);

        let form = session.form_mut();
        form.id = "  main-hero ".to_owned();
        form.class = "hero wide".to_owned();
        form.style = " color: red ".to_owned();
        form.text = "Novo texto".to_owned();

        assert_eq!(session.apply_edits(&mut doc), Ok(true));
        assert_eq!(doc.get_attribute(section, "id"), Some("main-hero"));
        assert_eq!(doc.class_list(section), vec!["hero", "wide", LOCK]);
        assert_eq!(doc.get_attribute(section, "style"), Some("color: red"));
        assert_eq!(doc.text_content(section), "Novo texto");
        assert_eq!(session.state(), SelectionState::Locked(section));
    }

    #[test]
    fn apply_removes_blank_attributes_and_children() {
        let (mut doc, mut session, section, _) = fixture();
        session.click(&mut doc, section);

        let form = session.form_mut();
        form.id = String::new();
        form.class = "   ".to_owned();
        form.style = String::new();
        form.text = String::new();

        assert_eq!(session.apply_edits(&mut doc), Ok(true));
        assert!(!doc.has_attribute(section, "id"));
        assert!(!doc.has_attribute(section, "style"));
        assert_eq!(doc.class_list(section), vec![LOCK]);
        assert_eq!(doc.children(section).count(), 0);
    }

    #[test]
    fn apply_and_reload_need_an_addressed_element() {
        let (mut doc, mut session, _, _) = fixture();
        assert_eq!(session.apply_edits(&mut doc), Ok(false));
        assert!(!session.reload_from_element(&doc));
        assert_eq!(session.path_descriptor(&doc), "");
    }

    #[test]
    fn reload_discards_unapplied_edits() {
        let (mut doc, mut session, _, link) = fixture();
        session.click(&mut doc, link);
        session.form_mut().text = "rascunho".to_owned();

        assert!(session.reload_from_element(&doc));
        assert_eq!(session.form().text, "Ir");
        assert_eq!(session.form().class, "btn");
    }

    #[test]
    fn stale_handles_are_ignored() {
        let (mut doc, mut session, _, _) = fixture();
        let other = HtmlParser.parse("<p>x</p>");
        let foreign = other.elements_by_tag_name("p")[0];

        assert!(!session.pointer_over(&mut doc, foreign));
        session.click(&mut doc, foreign);
        assert_eq!(session.state(), SelectionState::Idle);
        assert!(!session.is_locked());
    }

    #[test]
    fn capture_listener_leaves_non_element_clicks_alone() {
        let (mut doc, mut session, section, _) = fixture();
        let Some(text) = doc.children(section).next().and_then(|heading| doc.children(heading).next()) else {
            panic!("heading text missing");
        };

        let outcome = dispatch(&mut doc, DomEvent::new(EventKind::Click, text), Some(&mut session));
        assert!(!outcome.event.default_prevented());
        assert!(!outcome.event.propagation_stopped());
        assert_eq!(session.state(), SelectionState::Idle);
        assert!(!session.is_locked());
    }

    #[test]
    fn detached_elements_are_not_addressed() {
        let (mut doc, mut session, section, link) = fixture();
        session.click(&mut doc, section);
        session.form_mut().text = "só texto".to_owned();
        assert_eq!(session.apply_edits(&mut doc), Ok(true));
        assert!(doc.contains(link));

        session.click(&mut doc, section);
        assert!(!session.pointer_over(&mut doc, link));
        session.click(&mut doc, link);
        assert_eq!(session.state(), SelectionState::Hovering(section));
        assert!(!doc.has_class(link, HOVER));
    }

    #[test]
    fn lock_switch_without_selection_stays_idle() {
        let (mut doc, mut session, section, _) = fixture();
        session.set_locked(Some(&mut doc), true);
        assert_eq!(session.state(), SelectionState::Idle);
        assert!(session.is_locked());

        assert!(!session.pointer_over(&mut doc, section));
        assert_eq!(session.addressed(), None);
    }

    #[test]
    fn reset_returns_to_idle() {
        let (mut doc, mut session, section, _) = fixture();
        session.click(&mut doc, section);
        session.reset();
        assert_eq!(session.state(), SelectionState::Idle);
        assert!(!session.is_locked());
        assert_eq!(session.form().id, "");
    }
}

//! Pointer event dispatch with a document-level capture phase.
//!
//! The host registers one [`CaptureListener`] that observes every event at
//! the document before the loaded content does. Content handlers (inline
//! `on*` attributes) are never executed; dispatch only reports which ones
//! would have run so callers can log them.

use crate::document::Document;
use crate::node::NodeHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerOver,
    Click,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PointerOver => "mouseover",
            Self::Click => "click",
        }
    }

    fn inline_handler_attribute(self) -> &'static str {
        match self {
            Self::PointerOver => "onmouseover",
            Self::Click => "onclick",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    kind: EventKind,
    target: NodeHandle,
    phase: EventPhase,
    current_target: Option<NodeHandle>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: NodeHandle) -> Self {
        Self {
            kind,
            target,
            phase: EventPhase::None,
            current_target: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> NodeHandle {
        self.target
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn current_target(&self) -> Option<NodeHandle> {
        self.current_target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Host hook invoked during the capture phase at the document node.
pub trait CaptureListener {
    fn handle_event(&mut self, document: &mut Document, event: &mut DomEvent);
}

/// A content-owned handler reached by propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineHandler {
    pub node: NodeHandle,
    pub attribute: &'static str,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultAction {
    FollowLink { href: String },
    SubmitForm { form: NodeHandle, action: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub event: DomEvent,
    pub content_handlers: Vec<InlineHandler>,
    pub default_action: Option<DefaultAction>,
}

/// Dispatches `event` through `document`.
///
/// Order: capture listener at the document node, then target and bubbling
/// content handlers unless propagation was stopped, then the default action
/// unless it was prevented. Events whose target does not belong to the
/// document are returned untouched.
pub fn dispatch(
    document: &mut Document,
    mut event: DomEvent,
    capture: Option<&mut dyn CaptureListener>,
) -> DispatchOutcome {
    let mut outcome_handlers = Vec::new();
    if !document.contains(event.target) {
        return DispatchOutcome {
            event,
            content_handlers: outcome_handlers,
            default_action: None,
        };
    }

    if let Some(listener) = capture {
        event.phase = EventPhase::Capturing;
        event.current_target = Some(document.root());
        listener.handle_event(document, &mut event);
    }

    if !event.propagation_stopped {
        let attribute = event.kind.inline_handler_attribute();
        let path = std::iter::once(event.target).chain(document.ancestors(event.target));
        for (depth, node) in path.enumerate() {
            event.phase = if depth == 0 {
                EventPhase::AtTarget
            } else {
                EventPhase::Bubbling
            };
            event.current_target = Some(node);
            if let Some(source) = document.get_attribute(node, attribute) {
                outcome_handlers.push(InlineHandler {
                    node,
                    attribute,
                    source: source.to_owned(),
                });
            }
        }
    }

    event.phase = EventPhase::None;
    event.current_target = None;

    let default_action = if event.default_prevented {
        None
    } else {
        default_action_for(document, &event)
    };

    DispatchOutcome {
        event,
        content_handlers: outcome_handlers,
        default_action,
    }
}

fn default_action_for(document: &Document, event: &DomEvent) -> Option<DefaultAction> {
    if event.kind != EventKind::Click {
        return None;
    }

    let path = std::iter::once(event.target).chain(document.ancestors(event.target));
    for node in path {
        match document.tag_name(node) {
            Some("a") => {
                if let Some(href) = document.get_attribute(node, "href") {
                    return Some(DefaultAction::FollowLink {
                        href: href.to_owned(),
                    });
                }
            }
            Some("button") | Some("input") if is_submit_control(document, node) => {
                let form = document
                    .ancestors(node)
                    .find(|ancestor| document.tag_name(*ancestor) == Some("form"))?;
                return Some(DefaultAction::SubmitForm {
                    form,
                    action: document.get_attribute(form, "action").map(str::to_owned),
                });
            }
            _ => {}
        }
    }

    None
}

fn is_submit_control(document: &Document, node: NodeHandle) -> bool {
    let kind = document
        .get_attribute(node, "type")
        .map(str::to_ascii_lowercase);
    match document.tag_name(node) {
        Some("button") => matches!(kind.as_deref(), None | Some("submit")),
        Some("input") => matches!(kind.as_deref(), Some("submit") | Some("image")),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::CaptureListener;
    use super::DefaultAction;
    use super::DomEvent;
    use super::EventKind;
    use super::EventPhase;
    use super::dispatch;
    use crate::document::Document;
    use crate::node::Attribute;
    use crate::node::NodeHandle;

    struct Recorder {
        seen: Vec<(EventKind, NodeHandle, EventPhase)>,
        intercept: bool,
    }

    impl CaptureListener for Recorder {
        fn handle_event(&mut self, _document: &mut Document, event: &mut DomEvent) {
            self.seen.push((event.kind(), event.target(), event.phase()));
            if self.intercept {
                event.prevent_default();
                event.stop_propagation();
            }
        }
    }

    fn link_document() -> (Document, NodeHandle, NodeHandle) {
        let mut doc = Document::new();
        let body = doc.create_element_with_attrs(
            "body",
            vec![Attribute::new("onclick", "track()")],
        );
        let link = doc.create_element_with_attrs(
            "a",
            vec![
                Attribute::new("href", "#cta"),
                Attribute::new("onclick", "go()"),
            ],
        );
        let label = doc.create_element("span");
        let _ = doc.append_child(doc.root(), body);
        let _ = doc.append_child(body, link);
        let _ = doc.append_child(link, label);
        (doc, link, label)
    }

    #[test]
    fn capture_listener_sees_event_first_and_suppresses_content() {
        let (mut doc, _, label) = link_document();
        let mut recorder = Recorder {
            seen: Vec::new(),
            intercept: true,
        };

        let outcome = dispatch(
            &mut doc,
            DomEvent::new(EventKind::Click, label),
            Some(&mut recorder),
        );

        assert_eq!(
            recorder.seen,
            vec![(EventKind::Click, label, EventPhase::Capturing)]
        );
        assert!(outcome.event.default_prevented());
        assert!(outcome.content_handlers.is_empty());
        assert_eq!(outcome.default_action, None);
    }

    #[test]
    fn unintercepted_click_reports_handlers_and_default_action() {
        let (mut doc, link, label) = link_document();
        let mut recorder = Recorder {
            seen: Vec::new(),
            intercept: false,
        };

        let outcome = dispatch(
            &mut doc,
            DomEvent::new(EventKind::Click, label),
            Some(&mut recorder),
        );

        let sources: Vec<&str> = outcome
            .content_handlers
            .iter()
            .map(|handler| handler.source.as_str())
            .collect();
        assert_eq!(sources, vec!["go()", "track()"]);
        assert_eq!(outcome.content_handlers[0].node, link);
        assert_eq!(
            outcome.default_action,
            Some(DefaultAction::FollowLink {
                href: "#cta".to_owned()
            })
        );
    }

    #[test]
    fn submit_buttons_inside_forms_submit_by_default() {
        let mut doc = Document::new();
        let form = doc.create_element_with_attrs("form", vec![Attribute::new("action", "/send")]);
        let button = doc.create_element("button");
        let _ = doc.append_child(doc.root(), form);
        let _ = doc.append_child(form, button);

        let outcome = dispatch(&mut doc, DomEvent::new(EventKind::Click, button), None);
        assert_eq!(
            outcome.default_action,
            Some(DefaultAction::SubmitForm {
                form,
                action: Some("/send".to_owned())
            })
        );

        let hover = dispatch(&mut doc, DomEvent::new(EventKind::PointerOver, button), None);
        assert_eq!(hover.default_action, None);
    }

    #[test]
    fn foreign_targets_are_not_dispatched() {
        let (_, _, label) = link_document();
        let mut other = Document::new();
        let mut recorder = Recorder {
            seen: Vec::new(),
            intercept: false,
        };
        let outcome = dispatch(
            &mut other,
            DomEvent::new(EventKind::Click, label),
            Some(&mut recorder),
        );
        assert!(recorder.seen.is_empty());
        assert_eq!(outcome.default_action, None);
    }
}

//! Visual template editing on top of the Inkwell DOM.
//!
//! [`Editor`] owns a [`PreviewSurface`] (the live document) and an
//! [`EditorSession`] (hover/lock/form state). Everything here is
//! synchronous; the desktop shell drives it from its frame loop.

mod config;
mod editor;
mod export;
mod form;
mod load;
mod markers;
mod path;
mod session;
mod surface;

pub use config::EditorConfig;
pub use config::MarkerStyle;
pub use config::SAMPLE_TEMPLATE;
pub use editor::Editor;
pub use export::ExportedTemplate;
pub use form::PropertyForm;
pub use load::FileCandidate;
pub use load::media_type_for_name;
pub use markers::MARKER_STYLESHEET_ATTRIBUTE;
pub use markers::MarkerClasses;
pub use markers::marker_stylesheet;
pub use path::element_path;
pub use session::EditorSession;
pub use session::SelectionState;
pub use surface::PreviewSurface;
pub use surface::marker_stylesheet_node;

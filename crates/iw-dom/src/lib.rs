//! DOM tree data structures.
//!
//! One [`Document`] is the live tree being edited. Nodes are addressed by
//! [`NodeHandle`]s stamped with the document generation, so a handle kept
//! across a document reload resolves to nothing instead of a reused slot.

mod document;
pub mod events;
mod node;
mod serialize;

pub use document::Ancestors;
pub use document::Document;
pub use node::Attribute;
pub use node::ElementData;
pub use node::NodeData;
pub use node::NodeHandle;
pub use node::is_raw_text_element;
pub use node::is_void_element;

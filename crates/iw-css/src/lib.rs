//! CSS parsing, selector matching, and computed styles.
//!
//! Only the subset the template preview needs: compound selectors joined by
//! descendant and child combinators, and the box, text, and outline
//! properties the renderer paints.

mod parser;
mod selector;
mod style;
mod values;

pub use parser::CssParser;
pub use parser::CssRule;
pub use parser::Declaration;
pub use parser::StyleSheet;
pub use parser::parse_declarations;
pub use selector::Combinator;
pub use selector::Compound;
pub use selector::Selector;
pub use selector::Specificity;
pub use style::ComputedStyle;
pub use style::Display;
pub use style::Stroke;
pub use style::StyleResolver;
pub use style::TextAlign;
pub use style::document_css;
pub use values::Edges;
pub use values::ROOT_FONT_SIZE;
pub use values::Rgba;
pub use values::parse_color;
pub use values::parse_length;

//! HTML tokenization and tree building.
//!
//! Error tolerant by construction: any input yields a document with an
//! `html` element holding `head` and `body`. Malformed markup is repaired the
//! way the tree builder sees fit, never rejected.

mod entities;
mod tokenizer;
mod tree_builder;

use iw_dom::Document;

/// Parses raw HTML into a live DOM document.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> Document {
        tree_builder::build_tree(tokenizer::tokenize(input))
    }
}

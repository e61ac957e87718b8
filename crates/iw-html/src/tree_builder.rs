use crate::tokenizer::Token;
use iw_dom::Attribute;
use iw_dom::Document;
use iw_dom::NodeData;
use iw_dom::NodeHandle;
use iw_dom::is_void_element;

/// Open-element limit below `head`/`body`. Deeper start tags become
/// siblings of the deepest open element, as in Chromium.
pub(crate) const MAX_OPEN_ELEMENTS: usize = 512;

/// Builds a document from tokens, always producing `html > head + body`.
pub(crate) fn build_tree(tokens: Vec<Token>) -> Document {
    let mut builder = TreeBuilder::new();
    for token in tokens {
        builder.process(token);
    }
    builder.finish()
}

struct TreeBuilder {
    doc: Document,
    html: Option<NodeHandle>,
    head: Option<NodeHandle>,
    body: Option<NodeHandle>,
    /// Open elements below `head` or `body` (the first entry is one of them).
    stack: Vec<NodeHandle>,
    seen_doctype: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            doc: Document::new(),
            html: None,
            head: None,
            body: None,
            stack: Vec::new(),
            seen_doctype: false,
        }
    }

    fn process(&mut self, token: Token) {
        match token {
            Token::Doctype { name } => {
                if !self.seen_doctype && self.html.is_none() {
                    self.seen_doctype = true;
                    let doctype = self.doc.create_doctype(&name);
                    self.append(self.doc.root(), doctype);
                }
            }
            Token::Comment(text) => {
                let parent = self.current_parent();
                let comment = self.doc.create_comment(&text);
                self.append(parent, comment);
            }
            Token::Text(text) => self.insert_text(&text),
            Token::RawText(text) => {
                let parent = self.current_parent();
                self.append_text(parent, &text);
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => self.start_tag(name, attrs, self_closing),
            Token::End { name } => self.end_tag(&name),
        }
    }

    fn finish(mut self) -> Document {
        self.ensure_body();
        self.doc
    }

    fn current_parent(&self) -> NodeHandle {
        self.stack
            .last()
            .copied()
            .or(self.html)
            .unwrap_or_else(|| self.doc.root())
    }

    fn insert_text(&mut self, text: &str) {
        let whitespace_only = text.chars().all(|ch| ch.is_ascii_whitespace());
        if self.body.is_none() {
            // Text inside `<title>` and friends stays in head; loose
            // whitespace between head tags too. Anything else starts the body.
            if self.in_head() && (whitespace_only || self.stack.len() > 1) {
                let parent = self.current_parent();
                self.append_text(parent, text);
                return;
            }
            if whitespace_only {
                return;
            }
            self.ensure_body();
        }

        let parent = self.current_parent();
        self.append_text(parent, text);
    }

    fn start_tag(&mut self, name: String, attrs: Vec<(String, String)>, self_closing: bool) {
        let attrs: Vec<Attribute> = attrs
            .into_iter()
            .map(|(name, value)| Attribute::new(name, value))
            .collect();

        match name.as_str() {
            "html" => {
                let html = self.ensure_html();
                self.merge_attributes(html, attrs);
                return;
            }
            "head" => {
                if self.head.is_none() && self.body.is_none() {
                    let html = self.ensure_html();
                    let head = self.doc.create_element_with_attrs("head", attrs);
                    self.append(html, head);
                    self.head = Some(head);
                    self.stack = vec![head];
                }
                return;
            }
            "body" => {
                match self.body {
                    Some(body) => self.merge_attributes(body, attrs),
                    None => {
                        self.ensure_head();
                        let html = self.ensure_html();
                        let body = self.doc.create_element_with_attrs("body", attrs);
                        self.append(html, body);
                        self.body = Some(body);
                        self.stack = vec![body];
                    }
                }
                return;
            }
            _ => {}
        }

        if self.body.is_none() && is_head_element(&name) {
            let head = self.ensure_head();
            if !self.in_head() {
                self.stack = vec![head];
            }
        } else {
            self.ensure_body();
            self.close_implied(&name);
        }

        if self.stack.len() >= MAX_OPEN_ELEMENTS {
            self.stack.truncate(MAX_OPEN_ELEMENTS - 1);
        }

        // `/>` only ends an element in SVG and MathML content.
        let closes_itself = self_closing && (is_foreign_root(&name) || self.in_foreign_content());
        let parent = self.current_parent();
        let element = self.doc.create_element_with_attrs(&name, attrs);
        self.append(parent, element);
        if !closes_itself && !is_void_element(&name) {
            self.stack.push(element);
        }
    }

    fn in_foreign_content(&self) -> bool {
        self.stack
            .iter()
            .any(|open| self.doc.tag_name(*open).is_some_and(is_foreign_root))
    }

    fn end_tag(&mut self, name: &str) {
        match name {
            "html" | "body" => return,
            "head" => {
                if self.in_head() {
                    self.stack.clear();
                }
                return;
            }
            _ => {}
        }

        // The first entry (head or body) is never closed by ordinary end tags.
        let Some(position) = self
            .stack
            .iter()
            .skip(1)
            .rposition(|open| self.doc.tag_name(*open) == Some(name))
        else {
            return;
        };
        self.stack.truncate(position + 1);
    }

    /// Pops elements that the incoming start tag implicitly ends.
    fn close_implied(&mut self, incoming: &str) {
        if closes_paragraph(incoming) {
            self.close_open("p", &[]);
        }

        match incoming {
            "li" => self.close_open("li", &["ul", "ol"]),
            "dt" | "dd" => {
                self.close_open("dt", &["dl"]);
                self.close_open("dd", &["dl"]);
            }
            "option" => self.close_open("option", &["select", "datalist"]),
            "tr" => self.close_open("tr", &["table", "thead", "tbody", "tfoot"]),
            "td" | "th" => {
                self.close_open("td", &["tr", "table"]);
                self.close_open("th", &["tr", "table"]);
            }
            "thead" | "tbody" | "tfoot" => {
                for section in ["thead", "tbody", "tfoot"] {
                    self.close_open(section, &["table"]);
                }
            }
            _ => {}
        }
    }

    /// Closes the nearest open `tag` unless a `boundary` element is nearer.
    fn close_open(&mut self, tag: &str, boundaries: &[&str]) {
        for position in (1..self.stack.len()).rev() {
            let open = self.doc.tag_name(self.stack[position]).unwrap_or_default();
            if open == tag {
                self.stack.truncate(position);
                return;
            }
            if boundaries.contains(&open) {
                return;
            }
        }
    }

    fn in_head(&self) -> bool {
        self.head.is_some() && self.stack.first() == self.head.as_ref()
    }

    fn ensure_html(&mut self) -> NodeHandle {
        if let Some(html) = self.html {
            return html;
        }
        let html = self.doc.create_element("html");
        self.append(self.doc.root(), html);
        self.html = Some(html);
        html
    }

    fn ensure_head(&mut self) -> NodeHandle {
        if let Some(head) = self.head {
            return head;
        }
        let html = self.ensure_html();
        let head = self.doc.create_element("head");
        self.append(html, head);
        self.head = Some(head);
        head
    }

    fn ensure_body(&mut self) -> NodeHandle {
        if let Some(body) = self.body {
            if self.stack.is_empty() || self.in_head() {
                self.stack = vec![body];
            }
            return body;
        }
        self.ensure_head();
        let html = self.ensure_html();
        let body = self.doc.create_element("body");
        self.append(html, body);
        self.body = Some(body);
        self.stack = vec![body];
        body
    }

    fn merge_attributes(&mut self, element: NodeHandle, attrs: Vec<Attribute>) {
        for attr in attrs {
            if !self.doc.has_attribute(element, &attr.name) {
                let _ = self.doc.set_attribute(element, &attr.name, &attr.value);
            }
        }
    }

    fn append_text(&mut self, parent: NodeHandle, text: &str) {
        let last = self.doc.children(parent).last();
        if let Some(last) = last {
            if let Some(NodeData::Text(existing)) = self.doc.data(last) {
                let merged = format!("{existing}{text}");
                let _ = self.doc.set_text_content(last, &merged);
                return;
            }
        }
        let node = self.doc.create_text(text);
        self.append(parent, node);
    }

    fn append(&mut self, parent: NodeHandle, child: NodeHandle) {
        // Only void-element parents can fail here, and they are never on the stack.
        let _ = self.doc.append_child(parent, child);
    }
}

fn is_foreign_root(tag: &str) -> bool {
    matches!(tag, "svg" | "math")
}

fn is_head_element(tag: &str) -> bool {
    matches!(
        tag,
        "base" | "link" | "meta" | "noscript" | "script" | "style" | "template" | "title"
    )
}

fn closes_paragraph(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "details"
            | "div"
            | "dl"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

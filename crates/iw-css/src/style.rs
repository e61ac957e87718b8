use crate::parser::CssParser;
use crate::parser::Declaration;
use crate::parser::StyleSheet;
use crate::parser::parse_declarations;
use crate::selector::Specificity;
use crate::values::Edges;
use crate::values::ROOT_FONT_SIZE;
use crate::values::Rgba;
use crate::values::parse_color;
use crate::values::parse_edges;
use crate::values::parse_length;
use crate::values::split_value_tokens;
use iw_dom::Document;
use iw_dom::NodeHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
    InlineBlock,
    ListItem,
    Flex,
    None,
}

impl Display {
    pub fn is_inline(self) -> bool {
        matches!(self, Self::Inline | Self::InlineBlock)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Rgba,
}

/// Resolved style of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub color: Rgba,
    pub background: Option<Rgba>,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub monospace: bool,
    pub text_align: TextAlign,
    pub padding: Edges,
    pub margin: Edges,
    pub border: Option<Stroke>,
    pub corner_radius: f32,
    pub outline: Option<Stroke>,
    pub outline_offset: f32,
    pub pointer_cursor: bool,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            color: Rgba::BLACK,
            background: None,
            font_size: ROOT_FONT_SIZE,
            bold: false,
            italic: false,
            underline: false,
            monospace: false,
            text_align: TextAlign::Left,
            padding: Edges::ZERO,
            margin: Edges::ZERO,
            border: None,
            corner_radius: 0.0,
            outline: None,
            outline_offset: 0.0,
            pointer_cursor: false,
        }
    }
}

impl ComputedStyle {
    /// Starting point for an element: inherited properties from the parent,
    /// everything else at its initial value, then user-agent defaults.
    fn initial_for(tag: &str, parent: &ComputedStyle) -> Self {
        let mut style = Self {
            color: parent.color,
            font_size: parent.font_size,
            bold: parent.bold,
            italic: parent.italic,
            underline: parent.underline,
            monospace: parent.monospace,
            text_align: parent.text_align,
            pointer_cursor: parent.pointer_cursor,
            display: default_display(tag),
            ..Self::default()
        };
        apply_user_agent_defaults(tag, &mut style);
        style
    }

    fn apply(&mut self, declaration: &Declaration, parent: &ComputedStyle) {
        let value = declaration.value.as_str();
        let em = self.font_size;

        match declaration.name.as_str() {
            "display" => {
                if let Some(display) = parse_display(value) {
                    self.display = display;
                }
            }
            "color" => {
                if let Some(color) = parse_color(value) {
                    self.color = color;
                }
            }
            "background" | "background-color" => {
                self.background = split_value_tokens(value)
                    .into_iter()
                    .find_map(parse_color)
                    .or_else(|| parse_color(value))
                    .filter(|color| !color.is_transparent());
            }
            "font-size" => {
                if let Some(size) = parse_font_size(value, parent.font_size) {
                    self.font_size = size.max(6.0);
                }
            }
            "font-weight" => {
                if let Some(bold) = parse_font_weight(value) {
                    self.bold = bold;
                }
            }
            "font-style" => self.italic = matches!(value, "italic" | "oblique"),
            "font-family" => self.monospace = value.to_ascii_lowercase().contains("monospace"),
            "text-decoration" | "text-decoration-line" => {
                let lower = value.to_ascii_lowercase();
                if lower.contains("none") {
                    self.underline = false;
                } else if lower.contains("underline") {
                    self.underline = true;
                }
            }
            "text-align" => {
                if let Some(align) = parse_text_align(value) {
                    self.text_align = align;
                }
            }
            "padding" => {
                if let Some(edges) = parse_edges(value, em) {
                    self.padding = edges;
                }
            }
            "margin" => {
                if let Some(edges) = parse_edges(value, em) {
                    self.margin = edges;
                }
            }
            "padding-top" | "padding-right" | "padding-bottom" | "padding-left" => {
                set_edge(&mut self.padding, &declaration.name, value, em);
            }
            "margin-top" | "margin-right" | "margin-bottom" | "margin-left" => {
                set_edge(&mut self.margin, &declaration.name, value, em);
            }
            "border" => self.border = parse_stroke(value, em, self.color),
            "border-radius" => {
                if let Some(radius) = split_value_tokens(value)
                    .first()
                    .and_then(|token| parse_length(token, em))
                {
                    self.corner_radius = radius.max(0.0);
                }
            }
            "outline" => self.outline = parse_stroke(value, em, self.color),
            "outline-offset" => {
                if let Some(offset) = parse_length(value, em) {
                    self.outline_offset = offset;
                }
            }
            "outline-color" => {
                if let (Some(outline), Some(color)) = (self.outline.as_mut(), parse_color(value)) {
                    outline.color = color;
                }
            }
            "cursor" => self.pointer_cursor = value.eq_ignore_ascii_case("pointer"),
            _ => {}
        }
    }
}

/// Cascade key: later entries win ties, so the sort is stable on source
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct CascadePriority {
    important: bool,
    inline: bool,
    specificity: Specificity,
}

/// Text of every `<style>` element in document order, joined by newlines.
pub fn document_css(doc: &Document) -> String {
    doc.elements_by_tag_name("style")
        .into_iter()
        .map(|style| doc.text_content(style))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Computes element styles from every `<style>` element of a document plus
/// inline `style` attributes.
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    sheet: StyleSheet,
}

impl StyleResolver {
    pub fn new(sheet: StyleSheet) -> Self {
        Self { sheet }
    }

    pub fn from_css(source: &str) -> Self {
        Self::new(CssParser.parse(source))
    }

    /// Style for `node` given its parent's computed style (`None` for the
    /// root element). Non-element nodes get the parent style unchanged.
    pub fn compute(
        &self,
        doc: &Document,
        node: NodeHandle,
        parent: Option<&ComputedStyle>,
    ) -> ComputedStyle {
        let root = ComputedStyle::default();
        let parent = parent.unwrap_or(&root);
        let Some(tag) = doc.tag_name(node) else {
            return parent.clone();
        };

        let inline = doc
            .get_attribute(node, "style")
            .map(parse_declarations)
            .unwrap_or_default();

        let mut matched: Vec<(CascadePriority, &Declaration)> = Vec::new();
        for rule in &self.sheet.rules {
            if !rule.selector.matches(doc, node) {
                continue;
            }
            for declaration in &rule.declarations {
                let priority = CascadePriority {
                    important: declaration.important,
                    inline: false,
                    specificity: rule.specificity,
                };
                matched.push((priority, declaration));
            }
        }

        for declaration in &inline {
            let priority = CascadePriority {
                important: declaration.important,
                inline: true,
                specificity: Specificity::default(),
            };
            matched.push((priority, declaration));
        }

        matched.sort_by_key(|(priority, _)| *priority);

        let mut style = ComputedStyle::initial_for(tag, parent);
        for (_, declaration) in matched {
            style.apply(declaration, parent);
        }
        style
    }
}

fn default_display(tag: &str) -> Display {
    match tag {
        "head" | "script" | "style" | "title" | "meta" | "link" | "template" | "base"
        | "noscript" => Display::None,
        "a" | "span" | "b" | "strong" | "i" | "em" | "u" | "small" | "code" | "label" | "abbr"
        | "sub" | "sup" | "mark" | "s" | "br" | "img" | "kbd" | "time" | "cite" | "q" => {
            Display::Inline
        }
        "button" | "input" | "select" | "textarea" => Display::InlineBlock,
        "li" => Display::ListItem,
        _ => Display::Block,
    }
}

fn apply_user_agent_defaults(tag: &str, style: &mut ComputedStyle) {
    // (font scale, vertical margin in em)
    let heading_metrics = match tag {
        "h1" => Some((2.0, 0.67)),
        "h2" => Some((1.5, 0.83)),
        "h3" => Some((1.17, 1.0)),
        "h4" => Some((1.0, 1.33)),
        "h5" => Some((0.83, 1.67)),
        "h6" => Some((0.67, 2.33)),
        _ => None,
    };
    if let Some((scale, margin)) = heading_metrics {
        style.font_size *= scale;
        style.bold = true;
        style.margin = Edges::symmetric(style.font_size * margin, 0.0);
        return;
    }

    match tag {
        "body" => style.margin = Edges::all(8.0),
        "p" | "blockquote" | "dl" | "figure" | "pre" => {
            style.margin = Edges::symmetric(style.font_size, 0.0);
        }
        "ul" | "ol" => {
            style.margin = Edges::symmetric(style.font_size, 0.0);
            style.padding.left = 40.0;
        }
        "a" => {
            style.color = Rgba::rgb(0, 0, 238);
            style.underline = true;
            style.pointer_cursor = true;
        }
        "b" | "strong" | "th" => style.bold = true,
        "i" | "em" | "cite" => style.italic = true,
        "u" | "ins" => style.underline = true,
        "small" => style.font_size *= 0.83,
        "code" | "kbd" | "samp" => style.monospace = true,
        "button" => {
            style.padding = Edges::symmetric(2.0, 6.0);
            style.background = Some(Rgba::rgb(239, 239, 239));
            style.border = Some(Stroke {
                width: 1.0,
                color: Rgba::rgb(118, 118, 118),
            });
        }
        _ => {}
    }

    if tag == "pre" {
        style.monospace = true;
    }
}

fn parse_display(value: &str) -> Option<Display> {
    match value.trim().to_ascii_lowercase().as_str() {
        "block" => Some(Display::Block),
        "inline" => Some(Display::Inline),
        "inline-block" | "inline-flex" => Some(Display::InlineBlock),
        "list-item" => Some(Display::ListItem),
        "flex" | "grid" => Some(Display::Flex),
        "none" => Some(Display::None),
        _ => None,
    }
}

fn parse_font_size(value: &str, parent_size: f32) -> Option<f32> {
    let raw = value.trim().to_ascii_lowercase();
    if let Some(percent) = raw.strip_suffix('%') {
        return percent.trim().parse::<f32>().ok().map(|p| parent_size * p / 100.0);
    }
    let keyword = match raw.as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "smaller" => Some(parent_size * 0.83),
        "larger" => Some(parent_size * 1.2),
        _ => None,
    };
    keyword.or_else(|| parse_length(&raw, parent_size))
}

fn parse_font_weight(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "normal" | "lighter" => Some(false),
        "bold" | "bolder" => Some(true),
        numeric => numeric.parse::<u16>().ok().map(|weight| weight >= 600),
    }
}

fn parse_text_align(value: &str) -> Option<TextAlign> {
    match value.trim().to_ascii_lowercase().as_str() {
        "left" | "start" => Some(TextAlign::Left),
        "center" => Some(TextAlign::Center),
        "right" | "end" => Some(TextAlign::Right),
        "justify" => Some(TextAlign::Justify),
        _ => None,
    }
}

/// `border`/`outline` shorthand: any of width, style, and color in any
/// order. `none` or `hidden` removes the stroke.
fn parse_stroke(value: &str, em: f32, current_color: Rgba) -> Option<Stroke> {
    let mut width = None;
    let mut color = None;
    for token in split_value_tokens(value) {
        let lower = token.to_ascii_lowercase();
        match lower.as_str() {
            "none" | "hidden" => return None,
            "solid" | "dashed" | "dotted" | "double" | "groove" | "ridge" | "inset" | "outset"
            | "auto" => {}
            "thin" => width = Some(1.0),
            "medium" => width = Some(3.0),
            "thick" => width = Some(5.0),
            _ => {
                if let Some(length) = parse_length(token, em) {
                    width = Some(length);
                } else if let Some(parsed) = parse_color(token) {
                    color = Some(parsed);
                }
            }
        }
    }

    let width = width.unwrap_or(3.0);
    (width > 0.0).then_some(Stroke {
        width,
        color: color.unwrap_or(current_color),
    })
}

fn set_edge(edges: &mut Edges, property: &str, value: &str, em: f32) {
    let Some(length) = parse_length(value, em) else {
        return;
    };
    if property.ends_with("-top") {
        edges.top = length;
    } else if property.ends_with("-right") {
        edges.right = length;
    } else if property.ends_with("-bottom") {
        edges.bottom = length;
    } else {
        edges.left = length;
    }
}

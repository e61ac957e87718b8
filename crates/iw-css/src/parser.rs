use crate::selector::Selector;
use crate::selector::Specificity;

/// One `name: value` pair with the `!important` flag split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

/// A style rule with a single selector. Comma lists are expanded into one
/// rule per selector sharing the same declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: Selector,
    pub specificity: Specificity,
    pub declarations: Vec<Declaration>,
}

/// Style rules compiled from source CSS, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub rules: Vec<CssRule>,
}

impl StyleSheet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// Parses CSS source text.
#[derive(Debug, Default)]
pub struct CssParser;

impl CssParser {
    pub fn parse(&self, input: &str) -> StyleSheet {
        let source = without_comments(input);
        let mut sheet = StyleSheet::empty();
        collect_rules(&source, &mut sheet.rules);
        sheet
    }
}

/// Parses an inline `style` attribute or a rule body.
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    split_outside_groups(input, b';')
        .into_iter()
        .filter_map(|chunk| {
            let chunk = chunk.trim();
            let colon = position_outside_groups(chunk, 0, b':')?;
            let name = chunk[..colon].trim().to_ascii_lowercase();
            let (value, important) = important_flag(&chunk[colon + 1..]);
            let value = squash_spaces(value);
            (!name.is_empty() && !value.is_empty()).then_some(Declaration {
                name,
                value,
                important,
            })
        })
        .collect()
}

fn collect_rules(source: &str, out: &mut Vec<CssRule>) {
    for block in RuleBlocks::new(source) {
        let prelude = squash_spaces(block.prelude);
        if prelude.is_empty() {
            continue;
        }

        if let Some(at_rule) = prelude.strip_prefix('@') {
            if opens_nested_rules(at_rule) {
                collect_rules(block.body, out);
            }
            continue;
        }

        let declarations = parse_declarations(block.body);
        if declarations.is_empty() {
            continue;
        }

        let selectors = split_outside_groups(&prelude, b',')
            .into_iter()
            .filter_map(Selector::parse);
        for selector in selectors {
            out.push(CssRule {
                specificity: selector.specificity(),
                selector,
                declarations: declarations.clone(),
            });
        }
    }
}

/// A `prelude { body }` pair borrowed from the source.
struct RuleBlock<'a> {
    prelude: &'a str,
    body: &'a str,
}

/// Walks the top-level blocks of a stylesheet. Stops at the first block
/// without a matching close brace.
struct RuleBlocks<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> RuleBlocks<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, offset: 0 }
    }
}

impl<'a> Iterator for RuleBlocks<'a> {
    type Item = RuleBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.source[self.offset..];
        let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ';');
        let start = self.offset + (rest.len() - trimmed.len());
        if start >= self.source.len() {
            return None;
        }

        let open = position_outside_groups(self.source, start, b'{')?;
        let close = closing_brace(self.source, open)?;
        self.offset = close + 1;
        Some(RuleBlock {
            prelude: &self.source[start..open],
            body: &self.source[open + 1..close],
        })
    }
}

/// At-rules whose body holds further style rules. Takes the name without `@`.
fn opens_nested_rules(at_rule: &str) -> bool {
    let name = at_rule
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(name.as_str(), "media" | "supports" | "layer" | "document")
}

/// Tracks whether the scanner is inside a quoted string.
#[derive(Default)]
struct Quotes {
    open: Option<u8>,
    escape: bool,
}

impl Quotes {
    /// Feeds one byte; returns true when it belongs to a string literal.
    fn consume(&mut self, byte: u8) -> bool {
        if let Some(quote) = self.open {
            if self.escape {
                self.escape = false;
            } else if byte == b'\\' {
                self.escape = true;
            } else if byte == quote {
                self.open = None;
            }
            return true;
        }
        if byte == b'\'' || byte == b'"' {
            self.open = Some(byte);
            return true;
        }
        false
    }
}

/// First `target` byte at or after `from` that is outside strings,
/// parentheses and brackets.
fn position_outside_groups(input: &str, from: usize, target: u8) -> Option<usize> {
    let mut quotes = Quotes::default();
    let mut nesting = 0_u32;

    input
        .bytes()
        .enumerate()
        .skip(from)
        .find(|&(_, byte)| {
            if quotes.consume(byte) {
                return false;
            }
            match byte {
                b'(' | b'[' => nesting += 1,
                b')' | b']' => nesting = nesting.saturating_sub(1),
                _ => return byte == target && nesting == 0,
            }
            false
        })
        .map(|(idx, _)| idx)
}

fn split_outside_groups(input: &str, delimiter: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut piece_start = 0_usize;
    while let Some(idx) = position_outside_groups(input, piece_start, delimiter) {
        parts.push(&input[piece_start..idx]);
        piece_start = idx + 1;
    }
    parts.push(&input[piece_start..]);
    parts
}

/// Index of the `}` closing the `{` at `open`.
fn closing_brace(input: &str, open: usize) -> Option<usize> {
    let mut quotes = Quotes::default();
    let mut nesting = 0_u32;

    for (idx, byte) in input.bytes().enumerate().skip(open) {
        if quotes.consume(byte) {
            continue;
        }
        if byte == b'{' {
            nesting += 1;
        } else if byte == b'}' {
            nesting = nesting.saturating_sub(1);
            if nesting == 0 {
                return Some(idx);
            }
        }
    }
    None
}

/// Drops `/* ... */` comments that are not inside string literals. An
/// unterminated comment swallows the rest of the input.
fn without_comments(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut kept = Vec::with_capacity(bytes.len());
    let mut quotes = Quotes::default();
    let mut idx = 0_usize;

    while let Some(&byte) = bytes.get(idx) {
        let in_string = quotes.consume(byte);
        if !in_string && byte == b'/' && bytes.get(idx + 1) == Some(&b'*') {
            idx = match input[idx + 2..].find("*/") {
                Some(len) => idx + len + 4,
                None => bytes.len(),
            };
            continue;
        }
        kept.push(byte);
        idx += 1;
    }

    String::from_utf8_lossy(&kept).into_owned()
}

const IMPORTANT: &str = "!important";

fn important_flag(value: &str) -> (&str, bool) {
    let value = value.trim();
    let Some(split) = value.len().checked_sub(IMPORTANT.len()) else {
        return (value, false);
    };
    match value.get(split..) {
        Some(suffix) if suffix.eq_ignore_ascii_case(IMPORTANT) => (value[..split].trim_end(), true),
        _ => (value, false),
    }
}

fn squash_spaces(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::CssParser;
    use super::Declaration;
    use super::parse_declarations;

    fn declaration(name: &str, value: &str, important: bool) -> Declaration {
        Declaration {
            name: name.to_owned(),
            value: value.to_owned(),
            important,
        }
    }

    #[test]
    fn parses_rules_in_source_order() {
        let sheet = CssParser.parse("body { color: red; } .card { padding: 8px; }");
        assert_eq!(sheet.rule_count(), 2);
        assert_eq!(sheet.rules[0].declarations, vec![declaration("color", "red", false)]);
        assert_eq!(sheet.rules[1].declarations, vec![declaration("padding", "8px", false)]);
    }

    #[test]
    fn drops_comments_pseudo_classes_and_empty_bodies() {
        let sheet = CssParser.parse("/* x */ p { font-size: 14px; } a:hover { color: red } div { }");
        assert_eq!(sheet.rule_count(), 1);
        assert_eq!(
            sheet.rules[0].declarations,
            vec![declaration("font-size", "14px", false)]
        );
    }

    #[test]
    fn flattens_media_rules_and_skips_other_at_rules() {
        let sheet = CssParser.parse(
            "@font-face { font-family: X; } @media screen and (min-width: 800px) { .hero { margin: 0 auto; } .title { color: #fff; } }",
        );
        assert_eq!(sheet.rule_count(), 2);
        assert_eq!(sheet.rules[0].declarations, vec![declaration("margin", "0 auto", false)]);
    }

    #[test]
    fn expands_selector_lists() {
        let sheet = CssParser.parse("h1, h2 , .lead { font-weight: bold }");
        assert_eq!(sheet.rule_count(), 3);
        assert!(sheet.rules.iter().all(|rule| rule.declarations.len() == 1));
    }

    #[test]
    fn keeps_semicolons_inside_function_values() {
        let declarations = parse_declarations(
            r#"background-image: url("data:image/svg+xml;utf8,<svg></svg>"); color: red"#,
        );
        assert_eq!(
            declarations,
            vec![
                declaration(
                    "background-image",
                    r#"url("data:image/svg+xml;utf8,<svg></svg>")"#,
                    false
                ),
                declaration("color", "red", false),
            ]
        );
    }

    #[test]
    fn honours_important_flag() {
        let declarations = parse_declarations("COLOR: blue !IMPORTANT; margin:;");
        assert_eq!(declarations, vec![declaration("color", "blue", true)]);
    }
}

use iw_dom::Document;
use iw_dom::NodeHandle;

/// `(ids, classes, tags)` in cascade order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u16, pub u16, pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// One compound such as `a.btn#cta`; all fields empty means `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

/// Compounds stored right to left: `segments[0]` is the subject and each
/// entry carries the combinator that links it to the next one leftwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    segments: Vec<(Compound, Option<Combinator>)>,
}

impl Selector {
    /// Parses a single complex selector. Sibling combinators, attribute
    /// selectors, and pseudo-classes are not supported and yield `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let mut compounds: Vec<String> = Vec::new();
        let mut combinators: Vec<Combinator> = Vec::new();
        let mut current = String::new();
        let mut pending_descendant = false;

        for ch in input.trim().chars() {
            match ch {
                '>' => {
                    if !current.is_empty() {
                        compounds.push(std::mem::take(&mut current));
                    } else if compounds.is_empty() {
                        return None;
                    }
                    pending_descendant = false;
                    combinators.push(Combinator::Child);
                }
                '+' | '~' | '[' | ':' | '(' => return None,
                _ if ch.is_whitespace() => {
                    if !current.is_empty() {
                        compounds.push(std::mem::take(&mut current));
                        pending_descendant = true;
                    }
                }
                _ => {
                    if pending_descendant {
                        combinators.push(Combinator::Descendant);
                        pending_descendant = false;
                    }
                    current.push(ch);
                }
            }
        }
        if !current.is_empty() {
            compounds.push(current);
        }

        if compounds.is_empty() || combinators.len() + 1 != compounds.len() {
            return None;
        }

        let parsed = compounds
            .iter()
            .map(|raw| parse_compound(raw))
            .collect::<Option<Vec<_>>>()?;

        let segments = parsed
            .into_iter()
            .enumerate()
            .rev()
            .map(|(index, compound)| {
                let link = index.checked_sub(1).and_then(|prev| combinators.get(prev).copied());
                (compound, link)
            })
            .collect();

        Some(Self { segments })
    }

    pub fn specificity(&self) -> Specificity {
        self.segments
            .iter()
            .fold(Specificity::default(), |acc, (compound, _)| {
                let classes = u16::try_from(compound.classes.len()).unwrap_or(u16::MAX);
                Specificity(
                    acc.0.saturating_add(u16::from(compound.id.is_some())),
                    acc.1.saturating_add(classes),
                    acc.2.saturating_add(u16::from(compound.tag.is_some())),
                )
            })
    }

    pub fn matches(&self, doc: &Document, node: NodeHandle) -> bool {
        let Some(((subject, link), rest)) = self.segments.split_first() else {
            return false;
        };
        if !subject.matches(doc, node) {
            return false;
        }
        matches_leftwards(rest, *link, doc, node)
    }
}

/// Walks the remaining compounds against the ancestors of `node`, retrying
/// descendant links at farther ancestors when a nearer one fails.
fn matches_leftwards(
    segments: &[(Compound, Option<Combinator>)],
    link: Option<Combinator>,
    doc: &Document,
    node: NodeHandle,
) -> bool {
    let Some(((compound, next_link), rest)) = segments.split_first() else {
        return true;
    };

    match link.unwrap_or(Combinator::Descendant) {
        Combinator::Child => doc.parent_element(node).is_some_and(|parent| {
            compound.matches(doc, parent) && matches_leftwards(rest, *next_link, doc, parent)
        }),
        Combinator::Descendant => {
            let mut cursor = doc.parent_element(node);
            while let Some(ancestor) = cursor {
                if compound.matches(doc, ancestor)
                    && matches_leftwards(rest, *next_link, doc, ancestor)
                {
                    return true;
                }
                cursor = doc.parent_element(ancestor);
            }
            false
        }
    }
}

impl Compound {
    pub fn matches(&self, doc: &Document, node: NodeHandle) -> bool {
        let Some(tag) = doc.tag_name(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|wanted| wanted != tag) {
            return false;
        }
        if let Some(id) = &self.id {
            if doc.get_attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|class| doc.has_class(node, class))
    }
}

fn parse_compound(input: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let bytes = input.as_bytes();
    let mut idx = 0_usize;

    if bytes.first() == Some(&b'*') {
        idx = 1;
    } else if bytes.first().is_some_and(u8::is_ascii_alphabetic) {
        while idx < bytes.len() && is_ident_char(bytes[idx]) {
            idx += 1;
        }
        compound.tag = Some(input[..idx].to_ascii_lowercase());
    }

    while idx < bytes.len() {
        let marker = bytes[idx];
        if marker != b'#' && marker != b'.' {
            return None;
        }
        idx += 1;
        let start = idx;
        while idx < bytes.len() && is_ident_char(bytes[idx]) {
            idx += 1;
        }
        if start == idx {
            return None;
        }
        let value = input[start..idx].to_owned();
        if marker == b'#' {
            if compound.id.is_some() {
                return None;
            }
            compound.id = Some(value);
        } else {
            compound.classes.push(value);
        }
    }

    Some(compound)
}

fn is_ident_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::Selector;
    use super::Specificity;
    use iw_dom::Document;
    use iw_html::HtmlParser;

    fn first(doc: &Document, tag: &str) -> iw_dom::NodeHandle {
        let found = doc.elements_by_tag_name(tag);
        let Some(node) = found.first() else {
            panic!("no <{tag}> in document");
        };
        *node
    }

    #[test]
    fn computes_specificity() {
        let Some(selector) = Selector::parse("main section.hero > a#cta.btn") else {
            panic!("selector should parse");
        };
        assert_eq!(selector.specificity(), Specificity(1, 2, 3));

        let Some(universal) = Selector::parse("*") else {
            panic!("universal selector should parse");
        };
        assert_eq!(universal.specificity(), Specificity(0, 0, 0));
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert_eq!(Selector::parse("a:hover"), None);
        assert_eq!(Selector::parse("h1 + p"), None);
        assert_eq!(Selector::parse("input[type=text]"), None);
        assert_eq!(Selector::parse("> p"), None);
        assert_eq!(Selector::parse(""), None);
    }

    #[test]
    fn matches_descendant_and_child_combinators() {
        let doc = HtmlParser.parse(
            "<main><section class=\"hero wide\"><div><a class=\"btn\" href=\"#\">Go</a></div></section></main>",
        );
        let link = first(&doc, "a");

        let matching = ["a", ".btn", "section a", "main .hero a.btn", "div > a", "*"];
        for source in matching {
            let Some(selector) = Selector::parse(source) else {
                panic!("{source} should parse");
            };
            assert!(selector.matches(&doc, link), "{source} should match");
        }

        let missing = ["section > a", "p a", "a#cta", ".hero.narrow a", "main > div a"];
        for source in missing {
            let Some(selector) = Selector::parse(source) else {
                panic!("{source} should parse");
            };
            assert!(!selector.matches(&doc, link), "{source} should not match");
        }
    }
}

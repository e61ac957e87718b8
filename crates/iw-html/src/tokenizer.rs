use crate::entities::decode_entities;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Doctype {
        name: String,
    },
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(String),
    /// Contents of `script`/`style`, never entity-decoded.
    RawText(String),
    Comment(String),
}

/// Splits `source` into tokens. Never fails: anything that does not parse as
/// markup becomes text.
pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer {
        input: source,
        pos: 0,
        tokens: Vec::new(),
    };
    tokenizer.run();
    tokenizer.tokens
}

/// How the body of an element is read until its end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextMode {
    /// `script`, `style`: verbatim.
    Raw,
    /// `title`, `textarea`: character references decoded, no child tags.
    Escapable,
}

fn text_mode(tag: &str) -> Option<TextMode> {
    match tag {
        "script" | "style" => Some(TextMode::Raw),
        "title" | "textarea" => Some(TextMode::Escapable),
        _ => None,
    }
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn run(&mut self) {
        while self.pos < self.input.len() {
            let rest = self.rest();
            let consumed = if rest.starts_with("<!--") {
                self.comment()
            } else if rest.starts_with("</") {
                self.end_tag()
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.declaration()
            } else if rest.starts_with('<') {
                self.start_tag()
            } else {
                false
            };

            if !consumed {
                self.text();
            }
        }
    }

    /// Text up to the next `<`. Always advances, so a `<` that opened no
    /// markup is kept as text.
    fn text(&mut self) {
        let rest = self.rest();
        let first = rest.chars().next().map_or(1, char::len_utf8);
        let len = rest[first..].find('<').map_or(rest.len(), |at| first + at);
        self.tokens.push(Token::Text(decode_entities(&rest[..len])));
        self.pos += len;
    }

    fn comment(&mut self) -> bool {
        let body = &self.rest()["<!--".len()..];
        let (text, used) = match body.find("-->") {
            Some(end) => (&body[..end], end + "-->".len()),
            None => (body, body.len()),
        };
        self.tokens.push(Token::Comment(text.to_owned()));
        self.pos += "<!--".len() + used;
        true
    }

    /// `<!...>` and `<?...>`: a doctype, or a bogus comment.
    fn declaration(&mut self) -> bool {
        let body = &self.rest()[2..];
        let (text, used) = match body.find('>') {
            Some(end) => (&body[..end], end + 1),
            None => (body, body.len()),
        };
        let token = match doctype_name(text) {
            Some(name) => Token::Doctype { name },
            None => Token::Comment(text.to_owned()),
        };
        self.tokens.push(token);
        self.pos += 2 + used;
        true
    }

    fn end_tag(&mut self) -> bool {
        let rest = self.rest();
        let mut scanner = Scanner::new(&rest[2..]);
        scanner.skip_whitespace();
        let name = scanner.take_while(is_tag_name_char);
        if name.is_empty() {
            return false;
        }
        let name = name.to_ascii_lowercase();
        scanner.take_while(|ch| ch != '>');
        if !scanner.eat('>') {
            return false;
        }

        self.tokens.push(Token::End { name });
        self.pos += 2 + scanner.offset;
        true
    }

    fn start_tag(&mut self) -> bool {
        let Some(tag) = scan_start_tag(self.rest()) else {
            return false;
        };
        self.pos += tag.consumed;

        let mode = if tag.self_closing {
            None
        } else {
            text_mode(&tag.name)
        };
        let name = tag.name.clone();
        self.tokens.push(Token::Start {
            name: tag.name,
            attrs: tag.attrs,
            self_closing: tag.self_closing,
        });

        if let Some(mode) = mode {
            self.text_body(name, mode);
        }
        true
    }

    /// Body of a raw or escapable text element, always followed by its end
    /// tag token even when the source never closes it.
    fn text_body(&mut self, tag: String, mode: TextMode) {
        let rest = self.rest();
        let (body, consumed) = match find_end_tag(rest, &tag) {
            Some((start, end)) => (&rest[..start], end),
            None => (rest, rest.len()),
        };

        if !body.is_empty() {
            self.tokens.push(match mode {
                TextMode::Raw => Token::RawText(body.to_owned()),
                TextMode::Escapable => Token::Text(decode_entities(body)),
            });
        }
        self.tokens.push(Token::End { name: tag });
        self.pos += consumed;
    }
}

struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    consumed: usize,
}

/// Parses a start tag at the beginning of `input`. `None` when it is not a
/// complete tag; the caller then treats the `<` as text.
fn scan_start_tag(input: &str) -> Option<StartTag> {
    let mut scanner = Scanner::new(input);
    if !scanner.eat('<') || !scanner.peek().is_some_and(|ch| ch.is_ascii_alphabetic()) {
        return None;
    }

    let name = scanner.take_while(is_tag_name_char).to_ascii_lowercase();
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        scanner.skip_whitespace();
        match scanner.peek()? {
            '>' => {
                scanner.bump();
                break;
            }
            '/' => {
                scanner.bump();
                self_closing = true;
                scanner.skip_whitespace();
                if scanner.eat('>') {
                    break;
                }
            }
            _ => {
                let attr_name = scanner.take_while(is_attr_name_char);
                if attr_name.is_empty() {
                    scanner.bump();
                    continue;
                }
                let attr_name = attr_name.to_ascii_lowercase();
                scanner.skip_whitespace();
                let value = if scanner.eat('=') {
                    scanner.skip_whitespace();
                    scanner.attribute_value()
                } else {
                    ""
                };
                // Duplicate attributes: the first one wins.
                if attrs.iter().all(|(existing, _)| *existing != attr_name) {
                    attrs.push((attr_name, decode_entities(value)));
                }
            }
        }
    }

    Some(StartTag {
        name,
        attrs,
        self_closing,
        consumed: scanner.offset,
    })
}

/// Finds `</tag\s*>` (ASCII case-insensitive). Returns the byte range of the
/// end tag.
fn find_end_tag(haystack: &str, tag: &str) -> Option<(usize, usize)> {
    let mut from = 0;
    while let Some(found) = haystack[from..].find("</") {
        let start = from + found;
        let after = &haystack[start + 2..];
        let same_name = after
            .get(..tag.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(tag));
        if same_name {
            let tail = after[tag.len()..].trim_start_matches(|ch: char| ch.is_ascii_whitespace());
            if tail.starts_with('>') {
                return Some((start, haystack.len() - tail.len() + 1));
            }
        }
        from = start + 2;
    }
    None
}

fn doctype_name(declaration: &str) -> Option<String> {
    let trimmed = declaration.trim_start();
    let keyword = trimmed.get(..7)?;
    if !keyword.eq_ignore_ascii_case("doctype") {
        return None;
    }
    let name = trimmed[7..]
        .split_whitespace()
        .next()
        .unwrap_or("html")
        .to_ascii_lowercase();
    Some(name)
}

/// Char cursor over a tag.
struct Scanner<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, offset: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.offset..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.offset += ch.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        let matched = self.peek() == Some(expected);
        if matched {
            self.bump();
        }
        matched
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = &self.input[self.offset..];
        let len = rest.find(|ch: char| !keep(ch)).unwrap_or(rest.len());
        self.offset += len;
        &rest[..len]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(|ch| ch.is_ascii_whitespace());
    }

    fn attribute_value(&mut self) -> &'a str {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let value = self.take_while(|ch| ch != quote);
                self.eat(quote);
                value
            }
            _ => self.take_while(|ch| !ch.is_ascii_whitespace() && ch != '>'),
        }
    }
}

fn is_tag_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':')
}

fn is_attr_name_char(ch: char) -> bool {
    !ch.is_ascii_whitespace() && !matches!(ch, '"' | '\'' | '>' | '/' | '=' | '<')
}

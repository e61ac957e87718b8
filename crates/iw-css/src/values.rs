/// Root font size used to resolve `rem`.
pub const ROOT_FONT_SIZE: f32 = 16.0;

/// Straight (non-premultiplied) sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Four box sides in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Self = Self::all(0.0);

    pub const fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(self) -> f32 {
        self.top + self.bottom
    }
}

/// Resolves a length to pixels. `em` is relative to `font_size`; unitless
/// numbers are taken as pixels.
pub fn parse_length(value: &str, font_size: f32) -> Option<f32> {
    let raw = value.trim().to_ascii_lowercase();
    if raw.is_empty() || raw == "auto" || raw.ends_with('%') {
        return None;
    }

    if let Some(px) = raw.strip_suffix("px") {
        return px.trim().parse::<f32>().ok();
    }
    if let Some(rem) = raw.strip_suffix("rem") {
        return rem.trim().parse::<f32>().ok().map(|v| v * ROOT_FONT_SIZE);
    }
    if let Some(em) = raw.strip_suffix("em") {
        return em.trim().parse::<f32>().ok().map(|v| v * font_size);
    }
    if let Some(pt) = raw.strip_suffix("pt") {
        return pt.trim().parse::<f32>().ok().map(|v| v * (96.0 / 72.0));
    }

    raw.parse::<f32>().ok()
}

/// Expands a 1-4 value box shorthand (`padding`, `margin`). `auto` counts as
/// zero since the preview does not center blocks.
pub fn parse_edges(value: &str, font_size: f32) -> Option<Edges> {
    let values = split_value_tokens(value)
        .into_iter()
        .map(|token| {
            if token.eq_ignore_ascii_case("auto") {
                Some(0.0)
            } else {
                parse_length(token, font_size)
            }
        })
        .collect::<Option<Vec<_>>>()?;

    match values.as_slice() {
        [all] => Some(Edges::all(*all)),
        [vertical, horizontal] => Some(Edges::symmetric(*vertical, *horizontal)),
        [top, horizontal, bottom] => Some(Edges {
            top: *top,
            right: *horizontal,
            bottom: *bottom,
            left: *horizontal,
        }),
        [top, right, bottom, left] => Some(Edges {
            top: *top,
            right: *right,
            bottom: *bottom,
            left: *left,
        }),
        _ => None,
    }
}

/// Splits a value on whitespace and commas outside parentheses, so
/// `2px solid hsl(217 91% 60%)` yields three tokens.
pub fn split_value_tokens(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0_u32;
    let mut start: Option<usize> = None;

    for (idx, ch) in value.char_indices() {
        match ch {
            '(' => depth = depth.saturating_add(1),
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }

        let separator = depth == 0 && (ch.is_whitespace() || ch == ',');
        match (separator, start) {
            (true, Some(begin)) => {
                tokens.push(&value[begin..idx]);
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }

    if let Some(begin) = start {
        tokens.push(&value[begin..]);
    }
    tokens
}

pub fn parse_color(value: &str) -> Option<Rgba> {
    let raw = value.trim().to_ascii_lowercase();

    if let Some(hex) = raw.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(args) = function_args(&raw, "rgba").or_else(|| function_args(&raw, "rgb")) {
        return parse_rgb_function(args);
    }

    if let Some(args) = function_args(&raw, "hsla").or_else(|| function_args(&raw, "hsl")) {
        return parse_hsl_function(args);
    }

    // Gradients paint as their first color stop.
    if raw.contains("gradient(") {
        let open = raw.find('(')?;
        let inner = raw.get(open + 1..raw.len().saturating_sub(1))?;
        return split_value_tokens(inner).into_iter().find_map(parse_color);
    }

    named_color(&raw)
}

fn named_color(name: &str) -> Option<Rgba> {
    let color = match name {
        "black" => Rgba::BLACK,
        "white" => Rgba::WHITE,
        "gray" | "grey" => Rgba::rgb(128, 128, 128),
        "silver" => Rgba::rgb(192, 192, 192),
        "red" => Rgba::rgb(255, 0, 0),
        "maroon" => Rgba::rgb(128, 0, 0),
        "orange" => Rgba::rgb(255, 165, 0),
        "yellow" => Rgba::rgb(255, 255, 0),
        "green" => Rgba::rgb(0, 128, 0),
        "lime" => Rgba::rgb(0, 255, 0),
        "teal" => Rgba::rgb(0, 128, 128),
        "blue" => Rgba::rgb(0, 0, 255),
        "navy" => Rgba::rgb(0, 0, 128),
        "purple" => Rgba::rgb(128, 0, 128),
        "pink" => Rgba::rgb(255, 192, 203),
        "transparent" => Rgba::TRANSPARENT,
        _ => return None,
    };
    Some(color)
}

fn function_args<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_hex(v: &str) -> Option<Rgba> {
    let nibble = |idx: usize| u8::from_str_radix(&v.get(idx..idx + 1)?.repeat(2), 16).ok();
    let byte = |idx: usize| u8::from_str_radix(v.get(idx..idx + 2)?, 16).ok();

    match v.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Accepts both `r, g, b[, a]` and `r g b[ / a]`.
fn color_args(args: &str) -> Option<(Vec<&str>, Option<&str>)> {
    let (channels, slash_alpha) = match args.split_once('/') {
        Some((channels, alpha)) => (channels, Some(alpha.trim())),
        None => (args, None),
    };
    let mut parts = split_value_tokens(channels);
    let alpha = match (parts.len(), slash_alpha) {
        (3, alpha) => alpha,
        (4, None) => parts.pop(),
        _ => return None,
    };
    Some((parts, alpha))
}

fn parse_rgb_function(args: &str) -> Option<Rgba> {
    let (parts, alpha) = color_args(args)?;
    let r = parse_rgb_channel(parts[0])?;
    let g = parse_rgb_channel(parts[1])?;
    let b = parse_rgb_channel(parts[2])?;
    let a = match alpha {
        Some(alpha) => parse_alpha_channel(alpha)?,
        None => 255,
    };
    Some(Rgba::rgba(r, g, b, a))
}

fn parse_hsl_function(args: &str) -> Option<Rgba> {
    let (parts, alpha) = color_args(args)?;
    let hue = parts[0].trim_end_matches("deg").parse::<f32>().ok()?;
    let saturation = parse_percent_fraction(parts[1])?;
    let lightness = parse_percent_fraction(parts[2])?;
    let a = match alpha {
        Some(alpha) => parse_alpha_channel(alpha)?,
        None => 255,
    };

    let (r, g, b) = hsl_to_rgb(hue, saturation, lightness);
    Some(Rgba::rgba(r, g, b, a))
}

fn parse_percent_fraction(value: &str) -> Option<f32> {
    let percent = value.trim().strip_suffix('%')?;
    Some((percent.trim().parse::<f32>().ok()? / 100.0).clamp(0.0, 1.0))
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let hue = hue.rem_euclid(360.0);
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = chroma * (1.0 - ((hue / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = lightness - chroma / 2.0;

    let (r, g, b) = match hue {
        h if h < 60.0 => (chroma, x, 0.0),
        h if h < 120.0 => (x, chroma, 0.0),
        h if h < 180.0 => (0.0, chroma, x),
        h if h < 240.0 => (0.0, x, chroma),
        h if h < 300.0 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let channel = |value: f32| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (channel(r), channel(g), channel(b))
}

fn parse_rgb_channel(value: &str) -> Option<u8> {
    let raw = value.trim();
    if let Some(percent) = raw.strip_suffix('%') {
        let value = percent.trim().parse::<f32>().ok()?.clamp(0.0, 100.0);
        return Some(((value / 100.0) * 255.0).round() as u8);
    }
    let value = raw.parse::<f32>().ok()?.clamp(0.0, 255.0);
    Some(value.round() as u8)
}

fn parse_alpha_channel(value: &str) -> Option<u8> {
    let raw = value.trim();
    if let Some(percent) = raw.strip_suffix('%') {
        let value = percent.trim().parse::<f32>().ok()?.clamp(0.0, 100.0);
        return Some(((value / 100.0) * 255.0).round() as u8);
    }
    let value = raw.parse::<f32>().ok()?.clamp(0.0, 1.0);
    Some((value * 255.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::Edges;
    use super::Rgba;
    use super::parse_color;
    use super::parse_edges;
    use super::parse_length;
    use super::split_value_tokens;

    #[test]
    fn parses_hex_rgb_and_named_colors() {
        assert_eq!(parse_color("#fff"), Some(Rgba::WHITE));
        assert_eq!(parse_color("#11223380"), Some(Rgba::rgba(0x11, 0x22, 0x33, 0x80)));
        assert_eq!(parse_color("rgb(10, 20, 30)"), Some(Rgba::rgb(10, 20, 30)));
        assert_eq!(parse_color("rgba(10 20 30 / 50%)"), Some(Rgba::rgba(10, 20, 30, 128)));
        assert_eq!(parse_color("White"), Some(Rgba::WHITE));
        assert_eq!(parse_color("transparent"), Some(Rgba::TRANSPARENT));
        assert_eq!(parse_color("nonsense"), None);
    }

    #[test]
    fn parses_hsl_in_both_syntaxes() {
        assert_eq!(parse_color("hsl(0, 100%, 50%)"), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(parse_color("hsl(120deg 100% 25%)"), Some(Rgba::rgb(0, 128, 0)));
        assert_eq!(parse_color("hsl(222.2 47.4% 11.2%)"), Some(Rgba::rgb(15, 23, 42)));
        assert_eq!(parse_color("hsla(0, 0%, 100%, 0.5)"), Some(Rgba::rgba(255, 255, 255, 128)));
    }

    #[test]
    fn gradients_use_first_stop() {
        assert_eq!(
            parse_color("linear-gradient(135deg, #000, hsl(0 0% 100%))"),
            Some(Rgba::BLACK)
        );
    }

    #[test]
    fn resolves_lengths_and_edges() {
        assert_eq!(parse_length("2rem", 10.0), Some(32.0));
        assert_eq!(parse_length("1.5em", 10.0), Some(15.0));
        assert_eq!(parse_length("12", 10.0), Some(12.0));
        assert_eq!(parse_length("50%", 10.0), None);
        assert_eq!(
            parse_edges("0.5rem 1rem", 16.0),
            Some(Edges::symmetric(8.0, 16.0))
        );
        assert_eq!(parse_edges("0 auto", 16.0), Some(Edges::ZERO));
        assert_eq!(parse_edges("1px 2px 3px 4px 5px", 16.0), None);
    }

    #[test]
    fn splits_tokens_outside_parentheses() {
        assert_eq!(
            split_value_tokens("2px solid hsl(217.2 91.2% 59.8%)"),
            vec!["2px", "solid", "hsl(217.2 91.2% 59.8%)"]
        );
    }
}

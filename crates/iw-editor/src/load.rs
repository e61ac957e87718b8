use encoding_rs::Encoding;
use encoding_rs::UTF_8;
use iw_core::EditorError;
use iw_core::EditorResult;
use std::fs;
use std::path::Path;

/// Bytes scanned for a `<meta charset>` declaration.
const CHARSET_SNIFF_BYTES: usize = 8192;

/// A file offered to the editor by the picker or a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    /// Declared media type; empty when the source did not provide one.
    pub declared_type: String,
    pub bytes: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            bytes,
        }
    }

    /// Reads `path`, inferring the media type from its extension.
    pub fn from_path(path: &Path) -> EditorResult<Self> {
        let bytes = fs::read(path).map_err(|error| {
            EditorError::new(
                "load.read_failed",
                format!("failed to read `{}`: {error}", path.display()),
            )
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let declared_type = media_type_for_name(&name).unwrap_or_default();
        Ok(Self::new(name, declared_type, bytes))
    }

    /// Declared type, falling back to the extension when none was given.
    pub fn media_type(&self) -> String {
        if self.declared_type.trim().is_empty() {
            media_type_for_name(&self.name).unwrap_or_default().to_owned()
        } else {
            self.declared_type.clone()
        }
    }

    pub fn is_html(&self) -> bool {
        self.media_type().to_ascii_lowercase().contains("html")
    }

    /// Decodes the bytes: BOM first, then a `<meta charset>` near the top,
    /// then UTF-8.
    pub fn decode_text(&self) -> String {
        let charset = Encoding::for_bom(&self.bytes)
            .map(|(encoding, _)| encoding)
            .or_else(|| {
                parse_charset_from_html_prefix(&self.bytes)
                    .and_then(|label| Encoding::for_label(label.as_bytes()))
            })
            .unwrap_or(UTF_8);
        let (decoded, _, _) = charset.decode(&self.bytes);
        decoded.into_owned()
    }

    /// The candidate's text when it is an HTML document.
    pub fn into_html_source(self) -> EditorResult<String> {
        if !self.is_html() {
            return Err(EditorError::new(
                "load.unsupported_media_type",
                format!(
                    "`{}` has media type `{}`, expected HTML",
                    self.name,
                    self.media_type()
                ),
            ));
        }
        Ok(self.decode_text())
    }
}

pub fn media_type_for_name(name: &str) -> Option<&'static str> {
    let (_, extension) = name.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "html" | "htm" => Some("text/html"),
        "xhtml" | "xht" => Some("application/xhtml+xml"),
        _ => None,
    }
}

fn parse_charset_from_html_prefix(body: &[u8]) -> Option<String> {
    let prefix_len = body.len().min(CHARSET_SNIFF_BYTES);
    let prefix = String::from_utf8_lossy(&body[..prefix_len]);
    let lower = prefix.to_ascii_lowercase();
    let mut search_start = 0_usize;

    while let Some(relative) = lower[search_start..].find("charset=") {
        let charset_start = search_start + relative + "charset=".len();
        if let Some(label) = parse_charset_label(&prefix[charset_start..]) {
            return Some(label);
        }
        search_start = charset_start;
    }

    None
}

fn parse_charset_label(input: &str) -> Option<String> {
    let trimmed = input.trim_start();
    let first = trimmed.chars().next()?;

    let label = if first == '"' || first == '\'' {
        let rest = &trimmed[first.len_utf8()..];
        let end = rest.find(first)?;
        rest[..end].trim()
    } else {
        let end = trimmed
            .find(|ch: char| ch.is_whitespace() || matches!(ch, '"' | '\'' | ';' | '>' | '/'))
            .unwrap_or(trimmed.len());
        trimmed[..end].trim()
    };

    (!label.is_empty()).then(|| label.to_owned())
}

#[cfg(test)]
mod tests {
    use super::FileCandidate;
    use super::media_type_for_name;
    use std::time::SystemTime;
    use std::time::UNIX_EPOCH;

    #[test]
    fn accepts_html_media_types_only() {
        let html = FileCandidate::new("page.bin", "text/html", b"<p>x</p>".to_vec());
        assert!(html.is_html());

        let xhtml = FileCandidate::new("page", "application/xhtml+xml", Vec::new());
        assert!(xhtml.is_html());

        let png = FileCandidate::new("logo.html", "image/png", vec![0x89, b'P', b'N', b'G']);
        assert!(!png.is_html());
        let rejected = png.into_html_source();
        assert!(rejected.is_err());
        if let Err(error) = rejected {
            assert_eq!(error.code, "load.unsupported_media_type");
        }
    }

    #[test]
    fn infers_media_type_from_extension_when_missing() {
        assert!(FileCandidate::new("Template.HTM", "", Vec::new()).is_html());
        assert!(!FileCandidate::new("notes.txt", "", Vec::new()).is_html());
        assert!(!FileCandidate::new("README", "", Vec::new()).is_html());
        assert_eq!(media_type_for_name("a.xhtml"), Some("application/xhtml+xml"));
    }

    #[test]
    fn decodes_meta_charset_bom_and_utf8() {
        let latin1 = FileCandidate::new(
            "a.html",
            "text/html",
            b"<meta charset=\"iso-8859-1\"><p>Se\xe7\xe3o</p>".to_vec(),
        );
        assert_eq!(latin1.decode_text(), "<meta charset=\"iso-8859-1\"><p>Seção</p>");

        let with_bom = FileCandidate::new("a.html", "text/html", b"\xef\xbb\xbf<p>\xc2\xa9</p>".to_vec());
        assert_eq!(with_bom.decode_text(), "<p>©</p>");

        let plain = FileCandidate::new("a.html", "text/html", "<p>Ação</p>".as_bytes().to_vec());
        assert_eq!(plain.decode_text(), "<p>Ação</p>");
    }

    #[test]
    fn reads_candidates_from_disk() {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|value| value.as_nanos())
            .unwrap_or_default();
        let dir = std::env::temp_dir().join(format!("inkwell-load-test-{stamp}"));
        assert!(std::fs::create_dir_all(&dir).is_ok());
        let path = dir.join("landing.html");
        assert!(std::fs::write(&path, "<h1>Olá</h1>").is_ok());

        let loaded = FileCandidate::from_path(&path);
        assert!(matches!(
            &loaded,
            Ok(candidate) if candidate.name == "landing.html" && candidate.declared_type == "text/html"
        ));

        let missing = FileCandidate::from_path(&dir.join("missing.html"));
        assert!(matches!(missing, Err(error) if error.code == "load.read_failed"));

        let _ = std::fs::remove_dir_all(dir);
    }
}

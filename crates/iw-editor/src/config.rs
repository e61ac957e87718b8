/// Template every editor session starts from.
pub const SAMPLE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="pt-br">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Exemplo de Template</title>
  <style>
    body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Ubuntu, Cantarell, Noto Sans, Helvetica Neue, Arial, "Apple Color Emoji", "Segoe UI Emoji"; margin: 0; padding: 2rem; }
    .hero { padding: 2rem; border-radius: 12px; background: linear-gradient(135deg, hsl(210 40% 98%), hsl(210 40% 96.1%)); border: 1px solid hsl(214.3 31.8% 91.4%); }
    .btn { display: inline-block; padding: 0.6rem 1rem; border-radius: 8px; background: hsl(222.2 47.4% 11.2%); color: white; text-decoration: none; }
  </style>
</head>
<body>
  <header>
    <h1>Bem-vindo</h1>
  </header>
  <main>
    <section class="hero">
      <h2>Seção Hero</h2>
      <p>Este é um exemplo inicial. Passe o mouse para editar.</p>
      <a class="btn" href="#">Chamada para Ação</a>
    </section>
  </main>
  <footer>
    <small>© 2025</small>
  </footer>
</body>
</html>"##;

/// Visual marker applied to the addressed element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerStyle {
    pub class_name: String,
    /// Any CSS color accepted by the style resolver.
    pub outline_color: String,
    pub pointer_cursor: bool,
}

/// Editor-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub export_file_name: String,
    pub export_media_type: String,
    pub doctype_prefix: String,
    pub hover_marker: MarkerStyle,
    pub lock_marker: MarkerStyle,
    pub marker_outline_width_px: u32,
    pub marker_outline_offset_px: u32,
    pub sample_template: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            export_file_name: "template-editado.html".to_owned(),
            export_media_type: "text/html;charset=utf-8".to_owned(),
            doctype_prefix: "<!DOCTYPE html>\n".to_owned(),
            hover_marker: MarkerStyle {
                class_name: "__iw-hover-marker".to_owned(),
                outline_color: "hsl(217.2 91.2% 59.8%)".to_owned(),
                pointer_cursor: true,
            },
            lock_marker: MarkerStyle {
                class_name: "__iw-lock-marker".to_owned(),
                outline_color: "hsl(222.2 47.4% 11.2%)".to_owned(),
                pointer_cursor: false,
            },
            marker_outline_width_px: 2,
            marker_outline_offset_px: 2,
            sample_template: SAMPLE_TEMPLATE.to_owned(),
        }
    }
}

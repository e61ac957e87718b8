use crate::app::Status;
use crate::app::candidate_from_drop;
use crate::app::load_status;
use crate::expand_inkwell_log;
use crate::preview::ElementBox;
use crate::preview::MAX_PAINT_DEPTH;
use crate::preview::collapse_whitespace;
use crate::preview::hit_test;
use crate::preview::render_document;
use crate::preview::to_color32;
use eframe::egui;
use iw_css::Rgba;
use iw_css::StyleResolver;
use iw_css::document_css;
use iw_dom::NodeHandle;
use iw_core::EditorError;
use iw_editor::Editor;
use iw_editor::FileCandidate;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

fn sample_nodes(tags: &[&str]) -> Vec<NodeHandle> {
    let editor = Editor::default();
    let Some(doc) = editor.document() else {
        panic!("sample template should be loaded");
    };
    tags.iter()
        .map(|tag| {
            let Some(node) = doc.elements_by_tag_name(tag).first().copied() else {
                panic!("sample has no <{tag}>");
            };
            node
        })
        .collect()
}

fn element_box(node: NodeHandle, min: [f32; 2], max: [f32; 2], depth: usize) -> ElementBox {
    ElementBox {
        node,
        rect: egui::Rect::from_min_max(egui::pos2(min[0], min[1]), egui::pos2(max[0], max[1])),
        depth,
        outline: None,
        outline_offset: 0.0,
        pointer_cursor: false,
    }
}

#[test]
fn expands_bare_levels_to_editor_crates() {
    let expanded = expand_inkwell_log(" debug ");
    assert!(expanded.starts_with("warn,"));
    assert!(expanded.contains("iw_editor=debug"));
    assert!(expanded.contains("inkwell_editor=debug"));
    assert!(expanded.contains("iw_dom=debug"));

    assert_eq!(expand_inkwell_log("iw_dom=trace"), "iw_dom=trace");
    assert_eq!(expand_inkwell_log("warn,iw_css=debug"), "warn,iw_css=debug");
}

#[test]
fn converts_css_colors_for_painting() {
    assert_eq!(
        to_color32(Rgba::rgb(15, 23, 42)),
        egui::Color32::from_rgb(15, 23, 42)
    );
    assert_eq!(to_color32(Rgba::TRANSPARENT), egui::Color32::TRANSPARENT);
}

#[test]
fn collapses_whitespace_runs() {
    assert_eq!(collapse_whitespace("  Olá \n\t mundo "), " Olá mundo ");
    assert_eq!(collapse_whitespace("texto"), "texto");
    assert_eq!(collapse_whitespace(""), "");
}

#[test]
fn hit_test_prefers_innermost_box() {
    let nodes = sample_nodes(&["section", "h2", "p"]);
    let (section, heading, paragraph) = (nodes[0], nodes[1], nodes[2]);
    let boxes = vec![
        element_box(heading, [10.0, 10.0], [190.0, 40.0], 4),
        element_box(paragraph, [10.0, 50.0], [190.0, 80.0], 4),
        element_box(section, [0.0, 0.0], [200.0, 100.0], 3),
    ];

    let over_heading = hit_test(&boxes, egui::pos2(20.0, 20.0));
    assert_eq!(over_heading.map(|element| element.node), Some(heading));

    let between = hit_test(&boxes, egui::pos2(20.0, 45.0));
    assert_eq!(between.map(|element| element.node), Some(section));

    assert!(hit_test(&boxes, egui::pos2(250.0, 20.0)).is_none());
}

#[test]
fn web_drops_keep_declared_media_type() {
    let html = egui::DroppedFile {
        name: "landing.html".to_owned(),
        mime: "text/html".to_owned(),
        bytes: Some(Arc::from(b"<p>Oi</p>".as_slice())),
        ..Default::default()
    };
    let Ok(candidate) = candidate_from_drop(&html) else {
        panic!("drop with bytes should build a candidate");
    };
    assert!(candidate.is_html());
    assert_eq!(candidate.bytes, b"<p>Oi</p>".to_vec());

    let image = egui::DroppedFile {
        name: "logo.png".to_owned(),
        mime: "image/png".to_owned(),
        bytes: Some(Arc::from([0x89_u8, b'P', b'N', b'G'].as_slice())),
        ..Default::default()
    };
    let candidate = candidate_from_drop(&image);
    assert!(matches!(candidate, Ok(candidate) if !candidate.is_html()));

    let empty = egui::DroppedFile {
        name: "vazio.html".to_owned(),
        ..Default::default()
    };
    let missing = candidate_from_drop(&empty);
    assert!(matches!(missing, Err(error) if error.code == "load.read_failed"));
}

#[test]
fn native_drops_read_from_disk() {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!("inkwell-drop-test-{stamp}"));
    assert!(std::fs::create_dir_all(&dir).is_ok());
    let path = dir.join("pagina.htm");
    assert!(std::fs::write(&path, "<h1>Olá</h1>").is_ok());

    let dropped = egui::DroppedFile {
        path: Some(path),
        ..Default::default()
    };
    let candidate = candidate_from_drop(&dropped);
    assert!(matches!(
        &candidate,
        Ok(candidate) if candidate.name == "pagina.htm" && candidate.is_html()
    ));

    let mut editor = Editor::default();
    if let Ok(candidate) = candidate {
        assert!(editor.load_file(candidate).is_ok());
    }
    assert_eq!(editor.surface().title(), None);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn deep_documents_paint_within_main_thread_stack() {
    let painter = std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(|| {
            let mut editor = Editor::default();
            editor.load_source(&format!("{}<p>fundo</p>", "<div>".repeat(20_000)));
            let Some(doc) = editor.document() else {
                return 0;
            };
            let resolver = StyleResolver::from_css(&document_css(doc));

            let ctx = egui::Context::default();
            let mut painted = 0;
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    painted = render_document(ui, doc, &resolver).len();
                });
            });
            painted
        });
    let Ok(handle) = painter else {
        panic!("paint thread did not start");
    };
    let Ok(painted) = handle.join() else {
        panic!("painting panicked");
    };
    assert_eq!(painted, MAX_PAINT_DEPTH + 1);
}

#[test]
fn non_html_loads_leave_status_alone() {
    let mut editor = Editor::default();
    let before = editor.document().map(|doc| doc.outer_html(doc.root()));

    let image = FileCandidate::new("foto.png", "image/png", vec![0x89, b'P', b'N', b'G']);
    let result = editor.load_file(image);
    assert_eq!(load_status("foto.png", result), None);
    assert_eq!(editor.document().map(|doc| doc.outer_html(doc.root())), before);

    let html = FileCandidate::new("pagina.html", "text/html", b"<p>Oi</p>".to_vec());
    assert_eq!(
        load_status("pagina.html", editor.load_file(html)),
        Some(Status::Info("Template carregado: pagina.html".to_owned()))
    );

    let unreadable = EditorError::new("load.read_failed", "sem acesso");
    assert!(matches!(
        load_status("x.html", Err(unreadable)),
        Some(Status::Error(error)) if error.code == "load.read_failed"
    ));
}

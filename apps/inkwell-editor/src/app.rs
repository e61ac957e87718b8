use crate::APP_TITLE;
use crate::inspector;
use crate::preview::PreviewPane;
use eframe::egui;
use iw_core::EditorError;
use iw_core::EditorResult;
use iw_editor::Editor;
use iw_editor::FileCandidate;
use tracing::debug;
use tracing::info;
use tracing::warn;

const HTML_FILTER_NAME: &str = "HTML";
const HTML_EXTENSIONS: &[&str] = &["html", "htm"];
const INSPECTOR_WIDTH: f32 = 340.0;
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 65, 65);
const DROP_HINT: &str = "Solte o arquivo HTML aqui";

/// Last action shown in the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Status {
    Info(String),
    Error(EditorError),
}

pub(crate) struct EditorUiApp {
    editor: Editor,
    preview: PreviewPane,
    status: Status,
}

impl Default for EditorUiApp {
    fn default() -> Self {
        Self {
            editor: Editor::default(),
            preview: PreviewPane::default(),
            status: Status::Info("Template de exemplo carregado.".to_owned()),
        }
    }
}

impl EditorUiApp {
    fn open_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter(HTML_FILTER_NAME, HTML_EXTENSIONS)
            .set_title("Abrir HTML")
            .pick_file()
        else {
            return;
        };

        match FileCandidate::from_path(&path) {
            Ok(candidate) => self.load(candidate),
            Err(error) => self.fail(error),
        }
    }

    fn save_file(&mut self) {
        let exported = match self.editor.export() {
            Ok(exported) => exported,
            Err(error) => return self.fail(error),
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter(HTML_FILTER_NAME, HTML_EXTENSIONS)
            .set_title("Salvar HTML")
            .set_file_name(&exported.file_name)
            .save_file()
        else {
            return;
        };

        match exported.write_to(&path) {
            Ok(()) => {
                info!(path = %path.display(), "template saved");
                self.status = Status::Info(format!("Salvo em {}", path.display()));
            }
            Err(error) => self.fail(error),
        }
    }

    /// Only the first dropped file is considered.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        let Some(file) = dropped.first() else {
            return;
        };

        match candidate_from_drop(file) {
            Ok(candidate) => self.load(candidate),
            Err(error) => self.fail(error),
        }
    }

    fn load(&mut self, candidate: FileCandidate) {
        let name = candidate.name.clone();
        let result = self.editor.load_file(candidate);
        if result.is_ok() {
            self.preview.reset();
        }
        if let Some(status) = load_status(&name, result) {
            self.status = status;
        }
    }

    fn fail(&mut self, error: EditorError) {
        warn!(%error, "editor action failed");
        self.status = Status::Error(error);
    }
}

/// Status line after a load attempt. Files that are not HTML are ignored
/// without touching the status line; the editor already logged them.
pub(crate) fn load_status(name: &str, result: EditorResult<()>) -> Option<Status> {
    match result {
        Ok(()) => Some(Status::Info(format!("Template carregado: {name}"))),
        Err(error) if error.is("load.unsupported_media_type") => {
            debug!(file = name, "non-HTML file left the editor unchanged");
            None
        }
        Err(error) => {
            warn!(%error, "editor action failed");
            Some(Status::Error(error))
        }
    }
}

/// Builds a load candidate from a drop. Web drops carry bytes and a media
/// type; native drops carry a path.
pub(crate) fn candidate_from_drop(file: &egui::DroppedFile) -> EditorResult<FileCandidate> {
    if let Some(bytes) = &file.bytes {
        return Ok(FileCandidate::new(
            file.name.clone(),
            file.mime.clone(),
            bytes.to_vec(),
        ));
    }

    let Some(path) = &file.path else {
        return Err(EditorError::new(
            "load.read_failed",
            format!("dropped file `{}` has no readable contents", file.name),
        ));
    };
    let mut candidate = FileCandidate::from_path(path)?;
    if !file.mime.trim().is_empty() {
        candidate.declared_type = file.mime.clone();
    }
    Ok(candidate)
}

impl eframe::App for EditorUiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("header_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(APP_TITLE);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Salvar HTML").clicked() {
                        self.save_file();
                    }
                    if ui.button("Abrir HTML").clicked() {
                        self.open_file();
                    }
                    if let Some(title) = self.editor.surface().title() {
                        ui.separator();
                        ui.label(title);
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| match &self.status {
                Status::Info(text) => {
                    ui.label(text);
                }
                Status::Error(error) => {
                    ui.colored_label(ERROR_COLOR, format!("Erro: {error}"));
                }
            });
        });

        egui::SidePanel::right("inspector_panel")
            .resizable(true)
            .default_width(INSPECTOR_WIDTH)
            .show(ctx, |ui| {
                if let Some(status) = inspector::show(ui, &mut self.editor) {
                    self.status = status;
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = self.preview.show(ui, &mut self.editor) {
                self.status = Status::Info(message);
            }
        });

        if ctx.input(|input| !input.raw.hovered_files.is_empty()) {
            paint_drop_overlay(ctx);
        }
    }
}

fn paint_drop_overlay(ctx: &egui::Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("drop_overlay"),
    ));
    let screen = ctx.screen_rect();
    painter.rect_filled(screen, 0.0, egui::Color32::from_black_alpha(160));
    painter.text(
        screen.center(),
        egui::Align2::CENTER_CENTER,
        DROP_HINT,
        egui::FontId::proportional(22.0),
        egui::Color32::WHITE,
    );
}

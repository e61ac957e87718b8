use crate::app::Status;
use eframe::egui;
use iw_editor::Editor;

const PLACEHOLDER_PATH: &str = "Passe o mouse sobre um elemento";
const HELP_LINES: &[&str] = &[
    "Arraste um arquivo .html para a área de visualização ou use \"Abrir HTML\".",
    "Passe o mouse sobre elementos para ver e editar propriedades.",
    "Clique para bloquear a seleção enquanto edita.",
    "Use \"Salvar HTML\" para gravar o template editado.",
];

/// Property panel for the addressed element. Returns a status update when a
/// control changed something.
pub(crate) fn show(ui: &mut egui::Ui, editor: &mut Editor) -> Option<Status> {
    let mut status = None;

    ui.horizontal(|ui| {
        ui.heading("Propriedades");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let mut locked = editor.is_locked();
            if ui.checkbox(&mut locked, "Bloquear").changed() {
                editor.set_locked(locked);
                let message = if editor.is_locked() {
                    "Seleção bloqueada."
                } else {
                    "Seleção liberada."
                };
                status = Some(Status::Info(message.to_owned()));
            }
        });
    });
    ui.separator();

    ui.label(egui::RichText::new("Elemento selecionado").small().strong());
    let path = editor.path_descriptor();
    if path.is_empty() {
        ui.label(egui::RichText::new(PLACEHOLDER_PATH).small().weak());
    } else {
        ui.label(egui::RichText::new(path).small().monospace());
    }
    ui.separator();

    let form = editor.form_mut();
    ui.label("id");
    ui.add(egui::TextEdit::singleline(&mut form.id).desired_width(f32::INFINITY));
    ui.label("class");
    ui.add(egui::TextEdit::singleline(&mut form.class).desired_width(f32::INFINITY));
    ui.label("style (inline)");
    ui.add(
        egui::TextEdit::multiline(&mut form.style)
            .desired_rows(3)
            .desired_width(f32::INFINITY),
    );
    ui.label("conteúdo (texto)");
    ui.add(
        egui::TextEdit::multiline(&mut form.text)
            .desired_rows(6)
            .desired_width(f32::INFINITY),
    );

    let enabled = editor.can_edit();
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(enabled, egui::Button::new("Aplicar alterações"))
            .clicked()
        {
            status = Some(match editor.apply_edits() {
                Ok(true) => Status::Info("Alterações aplicadas.".to_owned()),
                Ok(false) => Status::Info("Nenhum elemento selecionado.".to_owned()),
                Err(error) => Status::Error(error),
            });
        }
        if ui
            .add_enabled(enabled, egui::Button::new("Recarregar do elemento"))
            .clicked()
            && editor.reload_from_element()
        {
            status = Some(Status::Info("Formulário recarregado do elemento.".to_owned()));
        }
    });

    ui.separator();
    egui::ScrollArea::vertical()
        .id_salt("inspector_help_scroll")
        .max_height(160.0)
        .show(ui, |ui| {
            ui.label(egui::RichText::new("Como usar:").small());
            for line in HELP_LINES {
                ui.label(egui::RichText::new(format!("• {line}")).small().weak());
            }
        });

    status
}

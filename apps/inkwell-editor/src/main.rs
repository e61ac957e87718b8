mod app;
mod inspector;
mod preview;
#[cfg(test)]
mod tests;

use eframe::egui;
use std::env;
use tracing_subscriber::EnvFilter;

const APP_TITLE: &str = "Editor de Templates HTML";
const WINDOW_SIZE: [f32; 2] = [1320.0, 840.0];
const MIN_WINDOW_SIZE: [f32; 2] = [960.0, 640.0];
const LOG_ENV: &str = "INKWELL_LOG";
const DEFAULT_LOG_FILTER: &str = "warn,iw_editor=info,inkwell_editor=info";

fn main() -> Result<(), eframe::Error> {
    if let Err(error) = init_logging() {
        eprintln!("Inkwell logging disabled: {error}");
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size(WINDOW_SIZE)
            .with_min_inner_size(MIN_WINDOW_SIZE)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        native_options,
        Box::new(|_cc| Ok(Box::new(app::EditorUiApp::default()))),
    )
}

/// Stdout logging. `INKWELL_LOG` wins over `RUST_LOG`; without either the
/// editor crates log at `info` and everything else at `warn`.
fn init_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(create_filter())
        .try_init()
}

fn create_filter() -> EnvFilter {
    if let Ok(level) = env::var(LOG_ENV) {
        return EnvFilter::new(expand_inkwell_log(&level));
    }

    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }

    EnvFilter::new(DEFAULT_LOG_FILTER)
}

/// `INKWELL_LOG=debug` applies to every editor crate; directive syntax
/// (`iw_dom=trace,iw_editor=debug`) passes through untouched.
pub(crate) fn expand_inkwell_log(value: &str) -> String {
    let value = value.trim();
    if value.contains('=') || value.contains(':') || value.contains(',') {
        return value.to_owned();
    }

    format!(
        "warn,inkwell_editor={value},iw_editor={value},iw_dom={value},iw_html={value},iw_css={value}"
    )
}

use crate::{
    core::state::ArrangerState,
    ui::{app::ArrangerApp, font::get_fonts, theme::get_app_style, window::get_native_options},
};

use egui::Theme;
pub mod app;
pub mod font;
pub mod interaction;
pub mod panels;
pub mod render;
pub mod theme;
mod view;
mod widget;
mod window;

/// Open the arranger window. Blocks until it is closed.
pub fn run_app(state: ArrangerState) -> Result<(), eframe::Error> {
    eframe::run_native(
        "Arranger",
        get_native_options(),
        Box::new(|cc| {
            cc.egui_ctx.set_fonts(get_fonts());
            cc.egui_ctx.set_style(get_app_style());
            cc.egui_ctx.set_theme(Theme::Dark);
            Ok(Box::new(ArrangerApp::new(state, cc)))
        }),
    )
}

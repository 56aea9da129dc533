use egui::{Context, DragValue, FontId, Frame, Layout, Margin, Response, RichText, Sense, Ui, Vec2};
use egui_phosphor::fill::{CIRCLE, METRONOME, PLAY, REPEAT, SKIP_BACK, STOP};

use crate::{
    core::state::{ArrangerState, MAX_TEMPO, MIN_TEMPO},
    engine::client::ConnectionState,
    ui::{
        font::icon_fill,
        theme::{
            CLIP_LABEL, CONNECTED_COLOR, CONNECTING_COLOR, DISCONNECTED_COLOR, RULER_BACKGROUND,
            RULER_TEXT,
        },
        widget::square_button::SquareButton,
    },
};

pub const TOP_BAR_HEIGHT: f32 = 36.;

/// Transport bar
pub struct UITopBar {
    // Tempo being edited, sent once the edit ends
    bpm_edit: Option<f32>,
}

impl UITopBar {
    pub fn new() -> Self {
        Self { bpm_edit: None }
    }

    pub fn show(&mut self, ctx: &Context, state: &mut ArrangerState) {
        egui::TopBottomPanel::top("transport_bar")
            .exact_height(TOP_BAR_HEIGHT)
            .frame(
                Frame::side_top_panel(&ctx.style())
                    .inner_margin(Margin::symmetric(8, 4))
                    .fill(RULER_BACKGROUND),
            )
            .show(ctx, |ui| self.ui(ui, state));
    }

    pub fn ui(&mut self, ui: &mut Ui, state: &mut ArrangerState) {
        let transport = state.transport();
        ui.horizontal_centered(|ui| {
            ui.spacing_mut().item_spacing = Vec2::new(4.0, 4.0);
            ui.label(
                RichText::new(transport.position_label())
                    .font(FontId::monospace(16.))
                    .color(CLIP_LABEL),
            );
            ui.add_space(8.);

            if icon_button(ui, SKIP_BACK, "Rewind", false).clicked() {
                state.rewind();
            }
            if icon_button(ui, STOP, "Stop", !transport.is_playing).clicked() {
                state.stop();
            }
            if icon_button(ui, PLAY, "Play", transport.is_playing).clicked() {
                state.play();
            }
            self.record_button_ui(ui);
            ui.add_space(8.);

            self.bpm_ui(ui, state, transport.tempo);
            ui.label(
                RichText::new(format!(
                    "{}/{}",
                    transport.time_signature_numerator, transport.time_signature_denominator
                ))
                .color(CLIP_LABEL),
            );
            ui.add_space(8.);

            if icon_button(ui, REPEAT, "Loop", transport.is_looping).clicked() {
                state.toggle_loop();
            }
            if transport.is_looping {
                ui.label(
                    RichText::new(format!(
                        "{} - {}",
                        transport.loop_start.floor(),
                        transport.loop_end.floor()
                    ))
                    .color(RULER_TEXT),
                );
            }
            if icon_button(ui, METRONOME, "Metronome", transport.metronome_enabled).clicked() {
                state.toggle_metronome();
            }

            ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                self.connection_ui(ui, state);
                if let Some(error) = state.last_error() {
                    ui.label(RichText::new(error).color(DISCONNECTED_COLOR).size(11.));
                }
            });
        });
    }

    fn bpm_ui(&mut self, ui: &mut Ui, state: &mut ArrangerState, tempo: f32) {
        let mut bpm = self.bpm_edit.unwrap_or(tempo);
        let response = ui.add(
            DragValue::new(&mut bpm)
                .range(MIN_TEMPO..=MAX_TEMPO)
                .speed(0.5)
                .fixed_decimals(0)
                .suffix(" BPM"),
        );
        if response.changed() {
            self.bpm_edit = Some(bpm);
        }
        let editing = response.dragged() || response.has_focus();
        if !editing && let Some(value) = self.bpm_edit.take() {
            state.set_tempo(value);
        }
    }

    // Recording is not supported by the engine yet
    fn record_button_ui(&mut self, ui: &mut Ui) {
        ui.add_enabled(
            false,
            SquareButton::new(CIRCLE)
                .font(icon_fill(13.))
                .color(DISCONNECTED_COLOR)
                .tooltip("Record"),
        );
    }

    fn connection_ui(&mut self, ui: &mut Ui, state: &ArrangerState) {
        let (color, text) = match state.connection_state() {
            ConnectionState::Connected => (CONNECTED_COLOR, "Connected"),
            ConnectionState::Connecting => (CONNECTING_COLOR, "Connecting..."),
            ConnectionState::Disconnected => (DISCONNECTED_COLOR, "Engine offline"),
        };
        ui.label(RichText::new(text).color(color).size(11.))
            .on_hover_text(state.engine_url());
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.), Sense::hover());
        ui.painter().circle_filled(rect.center(), 4., color);
    }
}

fn icon_button(ui: &mut Ui, icon: &str, tooltip: &str, active: bool) -> Response {
    ui.add(
        SquareButton::new(icon)
            .font(icon_fill(14.))
            .active(active)
            .tooltip(tooltip),
    )
}

use egui::{
    Event, FontId, MouseWheelUnit, Pos2, Rect, Response, RichText, Sense, Ui, Vec2,
};
use egui_phosphor::regular::{MAGNIFYING_GLASS_MINUS, MAGNIFYING_GLASS_PLUS};

use crate::{
    core::{
        state::ArrangerState,
        viewport::{MAX_ZOOM, MIN_ZOOM, TimelineViewport},
    },
    ui::{
        interaction::{InteractionController, TimelineIntent},
        render::{PainterSurface, RenderContext, render_timeline},
        theme::RULER_TEXT,
        widget::square_button::SquareButton,
    },
};
mod keys;

/// Pixels scrolled per wheel line
const LINE_SCROLL: f32 = 40.;
const ZOOM_IN_BUTTON: f32 = 1.2;
const ZOOM_OUT_BUTTON: f32 = 0.8;
pub const ZOOM_BAR_HEIGHT: f32 = 24.;

pub struct UITimeline {
    viewport: TimelineViewport,
    controller: InteractionController,
    // Playhead shown while scrubbing, until the engine catches up
    scrubbed_beat: Option<f32>,
    last_pointer: Option<Pos2>,
}

impl UITimeline {
    pub fn new() -> Self {
        Self {
            viewport: TimelineViewport::default(),
            controller: InteractionController::new(),
            scrubbed_beat: None,
            last_pointer: None,
        }
    }

    pub fn ui(&mut self, ui: &mut Ui, state: &mut ArrangerState, rect: Rect) {
        self.viewport.beats_per_bar = state.transport().beats_per_bar();
        // First handle key presses
        self.handle_key_press(ui, state);

        let response = ui.allocate_rect(rect, Sense::click_and_drag());
        self.interact(ui, &response, state, rect);

        if self.controller.is_idle() && state.in_flight() == 0 {
            self.scrubbed_beat = None;
        }
        let mut transport = state.transport();
        if let Some(beat) = self.scrubbed_beat {
            transport.playhead_beat = beat;
        }

        let painter = ui.painter_at(rect);
        let mut surface = PainterSurface::new(&painter, rect.min);
        render_timeline(
            &mut surface,
            &RenderContext {
                width: rect.width(),
                height: rect.height(),
                viewport: &self.viewport,
                tracks: state.project.tracks(),
                transport: &transport,
                selected_track: state.project.selected_track(),
                selected_clip: state.project.selected_clip(),
            },
        );
    }

    /// Zoom buttons with the current zoom level in between
    pub fn zoom_bar_ui(&mut self, ui: &mut Ui) {
        ui.horizontal_centered(|ui| {
            ui.spacing_mut().item_spacing = Vec2::new(4.0, 4.0);
            if ui
                .add_enabled(
                    self.viewport.zoom > MIN_ZOOM,
                    SquareButton::new(MAGNIFYING_GLASS_MINUS)
                        .sized(18.)
                        .font(FontId::proportional(12.))
                        .tooltip("Zoom out"),
                )
                .clicked()
            {
                self.viewport.zoom_by(ZOOM_OUT_BUTTON);
            }
            ui.label(
                RichText::new(format!("{:.0}%", self.viewport.zoom * 100.))
                    .color(RULER_TEXT)
                    .size(11.),
            );
            if ui
                .add_enabled(
                    self.viewport.zoom < MAX_ZOOM,
                    SquareButton::new(MAGNIFYING_GLASS_PLUS)
                        .sized(18.)
                        .font(FontId::proportional(12.))
                        .tooltip("Zoom in"),
                )
                .clicked()
            {
                self.viewport.zoom_by(ZOOM_IN_BUTTON);
            }
        });
    }

    /// Feed raw pointer and wheel events to the controller
    fn interact(&mut self, ui: &mut Ui, response: &Response, state: &mut ArrangerState, rect: Rect) {
        let to_local = |pos: Pos2| pos - rect.min.to_vec2();
        let events = ui.input(|i| i.events.clone());
        for event in events {
            match event {
                Event::PointerButton {
                    pos,
                    button,
                    pressed: true,
                    ..
                } if rect.contains(pos) => {
                    let intents = self.controller.pointer_down(
                        to_local(pos),
                        button,
                        &self.viewport,
                        state.project.tracks(),
                    );
                    self.apply(state, intents);
                }
                Event::PointerButton {
                    pos,
                    button,
                    pressed: false,
                    ..
                } if !self.controller.is_idle() => {
                    let intents = self.controller.pointer_up(
                        to_local(pos),
                        button,
                        &self.viewport,
                        state.project.tracks(),
                    );
                    self.apply(state, intents);
                }
                Event::PointerMoved(pos) => {
                    self.last_pointer = Some(pos);
                    if self.controller.is_idle() {
                        continue;
                    }
                    let intents = if rect.contains(pos) {
                        self.controller.pointer_move(to_local(pos), &mut self.viewport)
                    } else {
                        self.controller
                            .pointer_leave(to_local(pos), &self.viewport, state.project.tracks())
                    };
                    self.apply(state, intents);
                }
                Event::PointerGone => {
                    if let Some(pos) = self.last_pointer.take()
                        && !self.controller.is_idle()
                    {
                        let intents = self.controller.pointer_leave(
                            to_local(pos),
                            &self.viewport,
                            state.project.tracks(),
                        );
                        self.apply(state, intents);
                    }
                }
                Event::MouseWheel {
                    unit,
                    delta,
                    modifiers,
                } if response.hovered() => {
                    let scale = match unit {
                        MouseWheelUnit::Point => 1.,
                        MouseWheelUnit::Line => LINE_SCROLL,
                        MouseWheelUnit::Page => rect.height(),
                    };
                    // egui deltas move the content, the controller expects scroll offsets
                    self.controller.wheel(
                        -delta * scale,
                        modifiers.command || modifiers.ctrl,
                        &mut self.viewport,
                    );
                }
                _ => {}
            }
        }

        if response.double_clicked()
            && let Some(pos) = response.interact_pointer_pos()
            && let Some(intent) =
                self.controller
                    .double_click(to_local(pos), &self.viewport, state.project.tracks())
        {
            state.apply_intent(intent);
        }
    }

    fn apply(&mut self, state: &mut ArrangerState, intents: Vec<TimelineIntent>) {
        for intent in intents {
            if let TimelineIntent::SetPlayhead(beat) = intent {
                self.scrubbed_beat = Some(beat);
            }
            state.apply_intent(intent);
        }
    }
}

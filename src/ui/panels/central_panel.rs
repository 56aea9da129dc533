use crate::{
    core::state::ArrangerState,
    ui::view::timeline::{UITimeline, ZOOM_BAR_HEIGHT},
};
use egui::{Color32, Context, Frame, Margin, Rect, Ui, pos2, vec2};

pub struct UICentralPanel {
    timeline: UITimeline,
}

impl UICentralPanel {
    pub fn new() -> Self {
        Self {
            timeline: UITimeline::new(),
        }
    }

    pub fn show(&mut self, ctx: &Context, state: &mut ArrangerState) {
        egui::CentralPanel::default()
            .frame(
                Frame::central_panel(&ctx.style())
                    .inner_margin(Margin::ZERO)
                    .fill(Color32::from_gray(30)),
            )
            .show(ctx, |ui| {
                self.ui(ui, state);
            });
    }

    fn ui(&mut self, ui: &mut Ui, state: &mut ArrangerState) {
        let available_rect = ui.available_rect_before_wrap();
        // Zoom controls on top
        let bar_rect = Rect::from_min_size(
            available_rect.min,
            vec2(available_rect.width(), ZOOM_BAR_HEIGHT),
        );
        ui.scope_builder(egui::UiBuilder::new().max_rect(bar_rect.shrink2(vec2(8., 0.))), |ui| {
            self.timeline.zoom_bar_ui(ui);
        });

        // Timeline fills the rest
        let timeline_rect = Rect::from_min_max(
            pos2(available_rect.left(), bar_rect.bottom()),
            available_rect.max,
        );
        if timeline_rect.height() > 0. && timeline_rect.width() > 0. {
            self.timeline.ui(ui, state, timeline_rect);
        }
    }
}

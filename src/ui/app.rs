use std::time::{Duration, Instant};

use crate::{
    core::state::ArrangerState,
    ui::panels::{central_panel::UICentralPanel, top_bar::UITopBar},
};

/// Upper bound between frames so engine pushes show up without input
const REFRESH_INTERVAL: Duration = Duration::from_millis(50);

pub struct ArrangerApp {
    state: ArrangerState,
    top_bar: UITopBar,
    central_panel: UICentralPanel,
}

impl ArrangerApp {
    pub fn new(state: ArrangerState, _cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            state,
            top_bar: UITopBar::new(),
            central_panel: UICentralPanel::new(),
        }
    }
}

impl eframe::App for ArrangerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Update state
        self.state.update(Instant::now());
        if self.state.transport().is_playing {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(REFRESH_INTERVAL);
        }
        self.top_bar.show(ctx, &mut self.state);
        self.central_panel.show(ctx, &mut self.state);
    }
}

impl Drop for ArrangerApp {
    fn drop(&mut self) {
        self.state.shutdown();
    }
}

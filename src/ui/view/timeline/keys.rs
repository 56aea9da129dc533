use egui::{Key, Ui};

use crate::{core::state::ArrangerState, ui::view::timeline::UITimeline};

impl UITimeline {
    pub fn handle_key_press(&mut self, ui: &mut Ui, state: &mut ArrangerState) {
        // If other element focused do not check
        if ui.memory(|m| m.focused().is_some()) {
            return;
        }

        if ui.input(|i| i.focused && i.key_pressed(Key::Space)) {
            state.toggle_play();
        } else if ui.input(|i| i.key_pressed(Key::Home)) {
            state.rewind();
        } else if ui.input(|i| i.key_pressed(Key::L) && i.modifiers.ctrl) {
            state.toggle_loop();
        } else if ui.input(|i| i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace)) {
            // Delete
            if state.project.selected_clip().is_some() {
                state.delete_selected_clip();
            } else {
                state.delete_selected_track();
            }
        }
    }
}

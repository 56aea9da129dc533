
use egui::{PointerButton, Pos2, Vec2};
use log::debug;

use crate::core::{track::Track, viewport::TimelineViewport};

/// Wheel zoom steps
const ZOOM_IN_STEP: f32 = 1.1;
const ZOOM_OUT_STEP: f32 = 0.9;
/// Dropped clips land on quarter beats
const SNAP_DIVISIONS: f32 = 4.;

/// Gesture in progress. Each variant carries exactly what it needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingPlayhead,
    DraggingClip {
        clip_id: String,
        original_track: usize,
        original_beat: f32,
        /// Snapped beat under the press, a release on it is a plain click
        press_beat: f32,
    },
    Panning {
        last: Pos2,
    },
}

/// Edits proposed to the owner of the data model
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineIntent {
    SelectTrack(usize),
    SelectClip(Option<String>),
    MoveClip {
        clip_id: String,
        track_index: usize,
        beat: f32,
    },
    SetPlayhead(f32),
    AddClip {
        track_index: usize,
        beat: f32,
    },
}

/// Snap a beat to the nearest quarter, never before the timeline start
pub fn snap_beat(beat: f32) -> f32 {
    ((beat * SNAP_DIVISIONS).round() / SNAP_DIVISIONS).max(0.)
}

/// Pointer and wheel gestures over the timeline surface. Positions are in
/// surface coordinates. Only the viewport is mutated directly, everything
/// else comes back as intents.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
    // Button that started the current gesture
    button: Option<PointerButton>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    pub fn pointer_down(
        &mut self,
        pos: Pos2,
        button: PointerButton,
        viewport: &TimelineViewport,
        tracks: &[Track],
    ) -> Vec<TimelineIntent> {
        if !self.is_idle() {
            debug!("Ignoring {:?} press during {:?}", button, self.state);
            return Vec::new();
        }
        self.button = Some(button);
        // Ruler grabs the playhead
        if viewport.in_ruler(pos.y) {
            self.state = InteractionState::DraggingPlayhead;
            return vec![TimelineIntent::SetPlayhead(viewport.x_to_beat(pos.x).max(0.))];
        }

        let track_index = viewport.track_at(pos.y, tracks.len());
        if let Some(index) = track_index {
            let beat = viewport.x_to_beat(pos.x);
            if let Some(clip) = tracks[index].clip_at(beat) {
                self.state = InteractionState::DraggingClip {
                    clip_id: clip.id.clone(),
                    original_track: index,
                    original_beat: clip.start_beat,
                    press_beat: snap_beat(beat),
                };
                return vec![
                    TimelineIntent::SelectClip(Some(clip.id.clone())),
                    TimelineIntent::SelectTrack(index),
                ];
            }
        }

        let mut intents = Vec::new();
        if let Some(index) = track_index {
            intents.push(TimelineIntent::SelectTrack(index));
            intents.push(TimelineIntent::SelectClip(None));
        }
        self.state = if button == PointerButton::Middle {
            InteractionState::Panning { last: pos }
        } else {
            InteractionState::Idle
        };
        if self.is_idle() {
            self.button = None;
        }
        intents
    }

    pub fn pointer_move(&mut self, pos: Pos2, viewport: &mut TimelineViewport) -> Vec<TimelineIntent> {
        match &mut self.state {
            InteractionState::DraggingPlayhead => {
                vec![TimelineIntent::SetPlayhead(viewport.x_to_beat(pos.x).max(0.))]
            }
            InteractionState::Panning { last } => {
                let delta = pos - *last;
                viewport.scroll_by(-delta.x, -delta.y);
                *last = pos;
                Vec::new()
            }
            // Clips stay in place until released
            InteractionState::DraggingClip { .. } | InteractionState::Idle => Vec::new(),
        }
    }

    /// End the current gesture when `button` is the one that started it.
    /// A clip drag commits to the row under `pos`.
    pub fn pointer_up(
        &mut self,
        pos: Pos2,
        button: PointerButton,
        viewport: &TimelineViewport,
        tracks: &[Track],
    ) -> Vec<TimelineIntent> {
        if self.button.is_some_and(|started| started != button) {
            debug!("Ignoring {:?} release during {:?}", button, self.state);
            return Vec::new();
        }
        self.finish(pos, viewport, tracks)
    }

    /// Leaving the surface finishes the gesture exactly like a release.
    pub fn pointer_leave(
        &mut self,
        pos: Pos2,
        viewport: &TimelineViewport,
        tracks: &[Track],
    ) -> Vec<TimelineIntent> {
        self.finish(pos, viewport, tracks)
    }

    fn finish(
        &mut self,
        pos: Pos2,
        viewport: &TimelineViewport,
        tracks: &[Track],
    ) -> Vec<TimelineIntent> {
        self.button = None;
        let mut intents = Vec::new();
        if let InteractionState::DraggingClip {
            clip_id,
            original_track,
            original_beat,
            press_beat,
        } = std::mem::take(&mut self.state)
        {
            let beat = snap_beat(viewport.x_to_beat(pos.x));
            match viewport.track_at(pos.y, tracks.len()) {
                Some(track_index) if track_index == original_track && beat == press_beat => {
                    debug!("Clip {} released where it was pressed", clip_id)
                }
                Some(track_index) => intents.push(TimelineIntent::MoveClip {
                    clip_id,
                    track_index,
                    beat,
                }),
                None => debug!(
                    "Clip {} dropped outside the tracks, stays on track {} at beat {}",
                    clip_id, original_track, original_beat
                ),
            }
        }
        intents
    }

    pub fn double_click(
        &self,
        pos: Pos2,
        viewport: &TimelineViewport,
        tracks: &[Track],
    ) -> Option<TimelineIntent> {
        if viewport.in_ruler(pos.y) {
            return None;
        }
        let track_index = viewport.track_at(pos.y, tracks.len())?;
        Some(TimelineIntent::AddClip {
            track_index,
            beat: viewport.x_to_beat(pos.x).floor().max(0.),
        })
    }

    /// Scroll by `delta` pixels, or zoom when the accelerator is held.
    /// Positive `delta.y` means scrolling down, which zooms out.
    pub fn wheel(&mut self, delta: Vec2, accelerator: bool, viewport: &mut TimelineViewport) {
        if accelerator {
            let factor = if delta.y > 0. {
                ZOOM_OUT_STEP
            } else {
                ZOOM_IN_STEP
            };
            viewport.zoom_by(factor);
        } else {
            viewport.scroll_by(delta.x, delta.y);
        }
    }
}

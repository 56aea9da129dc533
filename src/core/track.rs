use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::core::clip::Clip;

pub const DEFAULT_COLOR: Color32 = Color32::from_rgb(137, 180, 250);

/// Palette handed out to new tracks in turn
pub const TRACK_COLORS: [Color32; 9] = [
    Color32::from_rgb(243, 139, 168),
    Color32::from_rgb(250, 179, 135),
    Color32::from_rgb(249, 226, 175),
    Color32::from_rgb(166, 227, 161),
    Color32::from_rgb(148, 226, 213),
    Color32::from_rgb(137, 220, 235),
    Color32::from_rgb(137, 180, 250),
    Color32::from_rgb(203, 166, 247),
    Color32::from_rgb(245, 194, 231),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Midi,
    Audio,
    Bus,
    Master,
}

impl TrackType {
    pub fn default_name(&self) -> &'static str {
        match self {
            TrackType::Midi => "MIDI Track",
            TrackType::Audio => "Audio Track",
            TrackType::Bus | TrackType::Master => "Track",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub kind: TrackType,
    pub name: String,
    pub color: Color32,
    /// Linear gain, 0.0-2.0
    pub volume: f32,
    /// -1.0 (left) to 1.0 (right)
    pub pan: f32,
    pub mute: bool,
    pub solo: bool,
    pub arm: bool,
    /// Insertion order, not time order. Overlaps are allowed.
    pub clips: Vec<Clip>,
}

impl Track {
    pub fn new(kind: TrackType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().into(),
            kind,
            name: kind.default_name().into(),
            color: DEFAULT_COLOR,
            volume: 1.,
            pan: 0.,
            mute: false,
            solo: false,
            arm: false,
            clips: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }
    /// Append a clip, rewriting its owner to this track
    pub fn with_clip(mut self, mut clip: Clip) -> Self {
        clip.track_id = self.id.clone();
        self.clips.push(clip);
        self
    }

    /// First clip, in insertion order, whose range contains `beat`.
    pub fn clip_at(&self, beat: f32) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.contains_beat(beat))
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0., 2.);
    }
    pub fn set_pan(&mut self, pan: f32) {
        self.pan = pan.clamp(-1., 1.);
    }
}

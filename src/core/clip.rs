use egui::Color32;
use std::fmt::Debug;

use crate::core::track::DEFAULT_COLOR;

/// Length in beats of a clip created from the timeline
pub const DEFAULT_CLIP_LENGTH: f32 = 4.;

/// A MIDI note, positioned relative to the start of its clip
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    /// MIDI pitch, 0-127
    pub pitch: u8,
    /// Offset in beats from the clip start
    pub start_beat: f32,
    pub length_beats: f32,
    /// 0-127
    pub velocity: u8,
}

impl Note {
    pub fn new(pitch: u8, start_beat: f32, length_beats: f32, velocity: u8) -> Self {
        Self {
            id: uuid::Uuid::new_v4().into(),
            pitch: pitch.min(127),
            start_beat: start_beat.max(0.),
            length_beats,
            velocity: velocity.min(127),
        }
    }
}

/// What a clip plays
#[derive(Debug, Clone, PartialEq)]
pub enum ClipContent {
    Midi { notes: Vec<Note> },
    Audio { source: Option<String> },
}

/// A time-bounded region on a track
#[derive(Clone, PartialEq)]
pub struct Clip {
    pub id: String,
    pub track_id: String,
    pub name: String,
    /// Position in beats on the timeline
    pub start_beat: f32,
    pub length_beats: f32,
    /// Falls back to the timeline default when unset
    pub color: Option<Color32>,
    pub content: ClipContent,
    pub gain: f32,
    pub fade_in: f32,
    pub fade_out: f32,
}

impl Clip {
    /// Empty MIDI clip as created by a double click on the timeline.
    pub fn new_midi(track_id: impl Into<String>, start_beat: f32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().into(),
            track_id: track_id.into(),
            name: "New Clip".into(),
            start_beat: start_beat.max(0.),
            length_beats: DEFAULT_CLIP_LENGTH,
            color: Some(DEFAULT_COLOR),
            content: ClipContent::Midi { notes: Vec::new() },
            gain: 1.,
            fade_in: 0.,
            fade_out: 0.,
        }
    }

    pub fn new_audio(track_id: impl Into<String>, start_beat: f32, source: impl Into<String>) -> Self {
        Self {
            content: ClipContent::Audio {
                source: Some(source.into()),
            },
            name: "Audio".into(),
            ..Self::new_midi(track_id, start_beat)
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
    pub fn with_length(mut self, length_beats: f32) -> Self {
        self.length_beats = length_beats;
        self
    }
    pub fn with_color(mut self, color: Option<Color32>) -> Self {
        self.color = color;
        self
    }
    pub fn with_notes(mut self, notes: Vec<Note>) -> Self {
        self.content = ClipContent::Midi { notes };
        self
    }

    pub fn is_midi(&self) -> bool {
        matches!(self.content, ClipContent::Midi { .. })
    }
    /// Notes of a MIDI clip, empty for audio clips
    pub fn notes(&self) -> &[Note] {
        match &self.content {
            ClipContent::Midi { notes } => notes,
            ClipContent::Audio { .. } => &[],
        }
    }
    pub fn end_beat(&self) -> f32 {
        self.start_beat + self.length_beats
    }
    /// Half-open range check `[start, end)`
    pub fn contains_beat(&self, beat: f32) -> bool {
        beat >= self.start_beat && beat < self.end_beat()
    }
}

impl Debug for Clip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clip")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("start_beat", &self.start_beat)
            .field("length_beats", &self.length_beats)
            .field("notes", &self.notes().len())
            .finish()
    }
}

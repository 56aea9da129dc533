
use crate::core::{
    clip::{Clip, Note},
    track::{TRACK_COLORS, Track, TrackType},
};

/// Tracks and clips shown by the arrangement, plus the current selection.
/// Intents coming from the timeline are applied here.
#[derive(Debug, Clone, Default)]
pub struct Project {
    tracks: Vec<Track>,
    selected_track: Option<usize>,
    selected_clip: Option<String>,
    next_color: usize,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small arrangement shown before the engine publishes anything
    pub fn demo() -> Self {
        let mut project = Project::new();
        let intro = Clip::new_midi("", 0.)
            .with_id("clip-1")
            .with_name("Intro")
            .with_color(Some(TRACK_COLORS[6]))
            .with_notes(vec![
                Note::new(60, 0., 1., 100),
                Note::new(64, 1., 1., 100),
                Note::new(67, 2., 1., 100),
                Note::new(72, 3., 1., 100),
            ]);
        let verse = Clip::new_midi("", 8.)
            .with_id("clip-2")
            .with_name("Verse")
            .with_length(8.)
            .with_color(Some(TRACK_COLORS[3]));
        project.add_track(
            Track::new(TrackType::Midi)
                .with_id("track-1")
                .with_name("Demo Track 1")
                .with_color(TRACK_COLORS[6])
                .with_clip(intro)
                .with_clip(verse),
        );
        project.add_track(
            Track::new(TrackType::Midi)
                .with_id("track-2")
                .with_name("Demo Track 2")
                .with_color(TRACK_COLORS[7]),
        );
        project.selected_track = Some(0);
        project
    }

    // Tracks
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }
    pub fn track_len(&self) -> usize {
        self.tracks.len()
    }
    /// Add track at the last position. Returns its index.
    pub fn add_track(&mut self, track: Track) -> usize {
        self.add_track_at(track, self.tracks.len())
    }
    /// Add track at a specific index, clamped to the track count.
    pub fn add_track_at(&mut self, track: Track, index: usize) -> usize {
        let index = index.min(self.tracks.len());
        self.tracks.insert(index, track);
        if let Some(selected) = self.selected_track
            && selected >= index
        {
            self.selected_track = Some(selected + 1);
        }
        index
    }
    /// New track of the given type, colored from the palette in turn.
    pub fn create_track(&mut self, kind: TrackType) -> usize {
        let color = TRACK_COLORS[self.next_color % TRACK_COLORS.len()];
        self.next_color += 1;
        self.add_track(Track::new(kind).with_color(color))
    }
    /// Remove the track at `index`. Selection is kept on the same track when it survives.
    pub fn delete_track(&mut self, index: usize) -> Option<Track> {
        if index >= self.tracks.len() {
            return None;
        }
        let track = self.tracks.remove(index);
        self.selected_track = match self.selected_track {
            Some(selected) if selected == index => None,
            Some(selected) if selected > index => Some(selected - 1),
            other => other,
        };
        if let Some(clip_id) = &self.selected_clip
            && track.clips.iter().any(|clip| clip.id == *clip_id)
        {
            self.selected_clip = None;
        }
        Some(track)
    }
    pub fn rename_track(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.tracks.get_mut(index) {
            Some(track) => {
                track.name = name.into();
                true
            }
            None => false,
        }
    }
    pub fn set_volume(&mut self, index: usize, volume: f32) {
        if let Some(track) = self.tracks.get_mut(index) {
            track.set_volume(volume);
        }
    }
    pub fn set_pan(&mut self, index: usize, pan: f32) {
        if let Some(track) = self.tracks.get_mut(index) {
            track.set_pan(pan);
        }
    }
    pub fn toggle_mute(&mut self, index: usize) -> bool {
        self.tracks
            .get_mut(index)
            .map(|track| track.mute = !track.mute)
            .is_some()
    }
    pub fn toggle_solo(&mut self, index: usize) -> bool {
        self.tracks
            .get_mut(index)
            .map(|track| track.solo = !track.solo)
            .is_some()
    }

    // Clips
    /// Append a clip to the track at `track_index`. Returns the clip id.
    pub fn add_clip(&mut self, track_index: usize, mut clip: Clip) -> Option<String> {
        let track = self.tracks.get_mut(track_index)?;
        clip.track_id = track.id.clone();
        let id = clip.id.clone();
        track.clips.push(clip);
        Some(id)
    }
    /// Default empty MIDI clip at `beat`
    pub fn add_default_clip(&mut self, track_index: usize, beat: f32) -> Option<String> {
        let track_id = self.tracks.get(track_index)?.id.clone();
        self.add_clip(track_index, Clip::new_midi(track_id, beat))
    }
    /// Locate a clip by id. Returns the owning track index and the clip.
    pub fn find_clip(&self, id: &str) -> Option<(usize, &Clip)> {
        self.tracks.iter().enumerate().find_map(|(index, track)| {
            track
                .clips
                .iter()
                .find(|clip| clip.id == id)
                .map(|clip| (index, clip))
        })
    }
    /// Move a clip to a new start beat, possibly on another track.
    /// A clip changing track is appended after the destination's clips.
    pub fn move_clip(&mut self, id: &str, to_track: usize, to_beat: f32) -> bool {
        if to_track >= self.tracks.len() {
            return false;
        }
        let Some((from_track, _)) = self.find_clip(id) else {
            return false;
        };
        let to_beat = to_beat.max(0.);
        if from_track == to_track {
            if let Some(clip) = self.tracks[to_track].clips.iter_mut().find(|c| c.id == id) {
                clip.start_beat = to_beat;
            }
            return true;
        }
        let clips = &mut self.tracks[from_track].clips;
        let Some(position) = clips.iter().position(|c| c.id == id) else {
            return false;
        };
        let mut clip = clips.remove(position);
        clip.start_beat = to_beat;
        clip.track_id = self.tracks[to_track].id.clone();
        self.tracks[to_track].clips.push(clip);
        true
    }
    pub fn delete_clip(&mut self, id: &str) -> Option<Clip> {
        let (track_index, _) = self.find_clip(id)?;
        let clips = &mut self.tracks[track_index].clips;
        let position = clips.iter().position(|c| c.id == id)?;
        if self.selected_clip.as_deref() == Some(id) {
            self.selected_clip = None;
        }
        Some(clips.remove(position))
    }

    // Selection
    pub fn selected_track(&self) -> Option<usize> {
        self.selected_track
    }
    pub fn selected_clip(&self) -> Option<&str> {
        self.selected_clip.as_deref()
    }
    /// Ignored when `index` is out of range
    pub fn select_track(&mut self, index: usize) {
        if index < self.tracks.len() {
            self.selected_track = Some(index);
        }
    }
    pub fn select_clip(&mut self, id: Option<String>) {
        self.selected_clip = id.filter(|id| self.find_clip(id).is_some());
    }
}

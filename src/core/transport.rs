use serde::{Deserialize, Serialize};

/// Local projection of the engine's transport. Only the engine is authoritative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportState {
    pub is_playing: bool,
    pub playhead_beat: f32,
    /// Beats per minute
    pub tempo: f32,
    pub is_looping: bool,
    pub loop_start: f32,
    pub loop_end: f32,
    pub metronome_enabled: bool,
    pub time_signature_numerator: u32,
    pub time_signature_denominator: u32,
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            is_playing: false,
            playhead_beat: 0.,
            tempo: 120.,
            is_looping: false,
            loop_start: 0.,
            loop_end: 16.,
            metronome_enabled: false,
            time_signature_numerator: 4,
            time_signature_denominator: 4,
        }
    }
}

/// Partial transport state as sent by the engine. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_playing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playhead_beat: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_looping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_start: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_end: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metronome_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_signature_numerator: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_signature_denominator: Option<u32>,
}

impl TransportPatch {
    pub fn is_empty(&self) -> bool {
        *self == TransportPatch::default()
    }
}

impl From<&TransportState> for TransportPatch {
    fn from(state: &TransportState) -> Self {
        Self {
            is_playing: Some(state.is_playing),
            playhead_beat: Some(state.playhead_beat),
            tempo: Some(state.tempo),
            is_looping: Some(state.is_looping),
            loop_start: Some(state.loop_start),
            loop_end: Some(state.loop_end),
            metronome_enabled: Some(state.metronome_enabled),
            time_signature_numerator: Some(state.time_signature_numerator),
            time_signature_denominator: Some(state.time_signature_denominator),
        }
    }
}

impl TransportState {
    /// Shallow merge, last write wins per field
    pub fn apply(&mut self, patch: &TransportPatch) {
        if let Some(value) = patch.is_playing {
            self.is_playing = value;
        }
        if let Some(value) = patch.playhead_beat {
            self.playhead_beat = value;
        }
        if let Some(value) = patch.tempo {
            self.tempo = value;
        }
        if let Some(value) = patch.is_looping {
            self.is_looping = value;
        }
        if let Some(value) = patch.loop_start {
            self.loop_start = value;
        }
        if let Some(value) = patch.loop_end {
            self.loop_end = value;
        }
        if let Some(value) = patch.metronome_enabled {
            self.metronome_enabled = value;
        }
        if let Some(value) = patch.time_signature_numerator {
            self.time_signature_numerator = value;
        }
        if let Some(value) = patch.time_signature_denominator {
            self.time_signature_denominator = value;
        }
    }

    pub fn beats_per_bar(&self) -> u32 {
        self.time_signature_numerator.max(1)
    }

    /// Playhead formatted as `bar.beat.ticks`, 1-based, with hundredths of a beat as ticks.
    pub fn position_label(&self) -> String {
        format_position(self.playhead_beat, self.beats_per_bar())
    }
}

pub fn format_position(beat: f32, beats_per_bar: u32) -> String {
    let beat = beat.max(0.);
    let per_bar = beats_per_bar.max(1) as f32;
    let bar = (beat / per_bar).floor() as u32 + 1;
    let beat_in_bar = (beat % per_bar).floor() as u32 + 1;
    let ticks = ((beat % 1.) * 100.).floor() as u32;
    format!("{}.{}.{:0>2}", bar, beat_in_bar, ticks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_position() {
        assert_eq!(format_position(0., 4), "1.1.00");
        assert_eq!(format_position(5.5, 4), "2.2.50");
        assert_eq!(format_position(2.25, 3), "1.3.25");
        assert_eq!(format_position(12., 4), "4.1.00");
    }

    #[test]
    fn test_apply_patch_only_touches_present_fields() {
        let mut state = TransportState::default();
        state.apply(&TransportPatch {
            tempo: Some(140.),
            is_looping: Some(true),
            ..Default::default()
        });
        assert_eq!(state.tempo, 140.);
        assert!(state.is_looping);
        assert_eq!(state.loop_end, 16.);
        assert!(!state.is_playing);
    }

    #[test]
    fn test_patch_from_camel_case() {
        let patch: TransportPatch =
            serde_json::from_str(r#"{"isPlaying":true,"timeSignatureNumerator":3}"#).unwrap();
        assert_eq!(patch.is_playing, Some(true));
        assert_eq!(patch.time_signature_numerator, Some(3));
        assert!(patch.tempo.is_none());
        assert!(!patch.is_empty());
        assert!(TransportPatch::default().is_empty());
    }
}

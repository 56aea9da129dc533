
use std::ops::RangeInclusive;

/// Width of a beat in pixels at zoom 1
pub const BASE_BEAT_WIDTH: f32 = 20.;
/// Height of the ruler strip above the first track
pub const HEADER_HEIGHT: f32 = 24.;
pub const TRACK_HEIGHT: f32 = 80.;
pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 4.0;

/// Pixels covered by one beat at the given zoom level.
pub fn pixels_per_beat(zoom: f32) -> f32 {
    BASE_BEAT_WIDTH * zoom
}

/// Vertical extent of a track row in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackBounds {
    pub y: f32,
    pub height: f32,
}

impl TrackBounds {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
    /// Half-open containment, a row owns its top edge but not its bottom one.
    pub fn contains(&self, y: f32) -> bool {
        y >= self.y && y < self.bottom()
    }
}

/// Scroll and zoom state of the timeline. Purely presentational, never sent to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineViewport {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub zoom: f32,
    pub beats_per_bar: u32,
}

impl Default for TimelineViewport {
    fn default() -> Self {
        Self {
            scroll_x: 0.,
            scroll_y: 0.,
            zoom: 1.,
            beats_per_bar: 4,
        }
    }
}

impl TimelineViewport {
    pub fn pixels_per_beat(&self) -> f32 {
        pixels_per_beat(self.zoom)
    }
    /// Position in beats to surface x position
    pub fn beat_to_x(&self, beat: f32) -> f32 {
        beat * self.pixels_per_beat() - self.scroll_x
    }
    /// Surface x position to position in beats
    pub fn x_to_beat(&self, x: f32) -> f32 {
        (x + self.scroll_x) / self.pixels_per_beat()
    }
    /// Row bounds of the track at `index`. Rows are stacked below the ruler.
    pub fn track_bounds(&self, index: usize) -> TrackBounds {
        TrackBounds {
            y: HEADER_HEIGHT + index as f32 * TRACK_HEIGHT - self.scroll_y,
            height: TRACK_HEIGHT,
        }
    }
    /// Index of the track row containing `y`, if any.
    pub fn track_at(&self, y: f32, track_count: usize) -> Option<usize> {
        (0..track_count).find(|index| self.track_bounds(*index).contains(y))
    }
    /// True when `y` lies in the ruler strip.
    pub fn in_ruler(&self, y: f32) -> bool {
        y < HEADER_HEIGHT
    }
    /// Whole beats intersecting a surface of the given width.
    pub fn visible_beats(&self, width: f32) -> RangeInclusive<i64> {
        let ppb = self.pixels_per_beat();
        let start = (self.scroll_x / ppb).floor() as i64;
        let end = ((self.scroll_x + width) / ppb).ceil() as i64;
        start..=end
    }
    /// Bar lines fall on multiples of the bar length.
    pub fn is_bar_line(&self, beat: i64) -> bool {
        beat.rem_euclid(self.beats_per_bar.max(1) as i64) == 0
    }
    /// Multiply the zoom level, keeping it inside `MIN_ZOOM..=MAX_ZOOM`.
    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }
    /// Shift the scroll offsets. Offsets never go below zero.
    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        self.scroll_x = (self.scroll_x + dx).max(0.);
        self.scroll_y = (self.scroll_y + dy).max(0.);
    }
}

//! Timeline drawing. A pure function of its inputs: the same context always
//! yields the same primitives, in the same order.
mod surface;

use egui::{Align2, FontId, Rect, Stroke, pos2, vec2};

use crate::{
    core::{
        clip::{Clip, Note},
        track::Track,
        transport::TransportState,
        viewport::{HEADER_HEIGHT, TimelineViewport},
    },
    ui::theme::{
        CLIP_BORDER, CLIP_DEFAULT, CLIP_LABEL, CLIP_SELECTED, GRID_MAJOR, GRID_MINOR, LOOP_BORDER,
        LOOP_RANGE, NOTE_PREVIEW, PLAYHEAD_COLOR, RULER_BACKGROUND, RULER_TEXT,
        TIMELINE_BACKGROUND, TRACK_SELECTED, TRACK_SEPARATOR,
    },
};

pub use surface::{DrawOp, PainterSurface, RecordingSurface, Surface};

/// Vertical inset of a clip body inside its track row
pub const CLIP_PADDING: f32 = 4.;
const CLIP_RADIUS: f32 = 4.;
const LABEL_INSET: f32 = 6.;
/// Labels are only drawn when at least this much room is left
const MIN_LABEL_WIDTH: f32 = 20.;
/// Notes are laid out below the clip name
const NOTE_AREA_TOP: f32 = 18.;
const NOTE_HEIGHT: f32 = 3.;
const MIN_NOTE_WIDTH: f32 = 2.;
/// Smallest pitch span used to scale the note preview, one octave
const MIN_PITCH_SPAN: u8 = 12;
const PLAYHEAD_MARKER: f32 = 6.;
const PLAYHEAD_MARKER_HEIGHT: f32 = 10.;
const LOOP_DASH: f32 = 4.;

/// Everything a frame of the timeline depends on
pub struct RenderContext<'a> {
    pub width: f32,
    pub height: f32,
    pub viewport: &'a TimelineViewport,
    pub tracks: &'a [Track],
    pub transport: &'a TransportState,
    pub selected_track: Option<usize>,
    pub selected_clip: Option<&'a str>,
}

pub fn render_timeline(surface: &mut impl Surface, ctx: &RenderContext) {
    surface.fill_rect(
        Rect::from_min_size(pos2(0., 0.), vec2(ctx.width, ctx.height)),
        0.,
        TIMELINE_BACKGROUND,
    );
    draw_grid(surface, ctx);
    draw_track_separators(surface, ctx);
    if ctx.transport.is_looping {
        draw_loop_range(surface, ctx);
    }
    draw_selected_track(surface, ctx);
    draw_clips(surface, ctx);
    draw_playhead(surface, ctx);
    draw_ruler(surface, ctx);
}

fn draw_grid(surface: &mut impl Surface, ctx: &RenderContext) {
    for beat in ctx.viewport.visible_beats(ctx.width) {
        let x = ctx.viewport.beat_to_x(beat as f32);
        let stroke = if ctx.viewport.is_bar_line(beat) {
            Stroke::new(1., GRID_MAJOR)
        } else {
            Stroke::new(0.5, GRID_MINOR)
        };
        surface.line(pos2(x, HEADER_HEIGHT), pos2(x, ctx.height), stroke);
    }
}

fn draw_track_separators(surface: &mut impl Surface, ctx: &RenderContext) {
    let stroke = Stroke::new(1., TRACK_SEPARATOR);
    // One line above every row and one below the last
    for index in 0..=ctx.tracks.len() {
        let y = ctx.viewport.track_bounds(index).y;
        surface.line(pos2(0., y), pos2(ctx.width, y), stroke);
    }
}

fn draw_loop_range(surface: &mut impl Surface, ctx: &RenderContext) {
    let start_x = ctx.viewport.beat_to_x(ctx.transport.loop_start);
    let end_x = ctx.viewport.beat_to_x(ctx.transport.loop_end);
    if end_x > start_x {
        surface.fill_rect(
            Rect::from_min_max(pos2(start_x, HEADER_HEIGHT), pos2(end_x, ctx.height)),
            0.,
            LOOP_RANGE,
        );
    }
    let stroke = Stroke::new(2., LOOP_BORDER);
    for x in [start_x, end_x] {
        surface.dashed_line(
            pos2(x, HEADER_HEIGHT),
            pos2(x, ctx.height),
            stroke,
            LOOP_DASH,
            LOOP_DASH,
        );
    }
}

fn draw_selected_track(surface: &mut impl Surface, ctx: &RenderContext) {
    if let Some(index) = ctx.selected_track
        && index < ctx.tracks.len()
    {
        let bounds = ctx.viewport.track_bounds(index);
        surface.fill_rect(
            Rect::from_min_size(pos2(0., bounds.y), vec2(ctx.width, bounds.height)),
            0.,
            TRACK_SELECTED,
        );
    }
}

fn draw_clips(surface: &mut impl Surface, ctx: &RenderContext) {
    let ppb = ctx.viewport.pixels_per_beat();
    for (index, track) in ctx.tracks.iter().enumerate() {
        let bounds = ctx.viewport.track_bounds(index);
        // Skip rows hidden behind the ruler or below the surface
        if bounds.bottom() < HEADER_HEIGHT || bounds.y > ctx.height {
            continue;
        }
        for clip in &track.clips {
            let x = ctx.viewport.beat_to_x(clip.start_beat);
            let width = clip.length_beats * ppb;
            if x + width < 0. || x > ctx.width {
                continue;
            }
            let rect = Rect::from_min_size(
                pos2(x, bounds.y + CLIP_PADDING),
                vec2(width, bounds.height - 2. * CLIP_PADDING),
            );
            draw_clip(surface, ctx, clip, rect, ppb);
        }
    }
}

fn draw_clip(surface: &mut impl Surface, ctx: &RenderContext, clip: &Clip, rect: Rect, ppb: f32) {
    surface.fill_rect(rect, CLIP_RADIUS, clip.color.unwrap_or(CLIP_DEFAULT));

    let border = if ctx.selected_clip == Some(clip.id.as_str()) {
        Stroke::new(2., CLIP_SELECTED)
    } else {
        Stroke::new(1., CLIP_BORDER)
    };
    surface.stroke_rect(rect, CLIP_RADIUS, border);

    let label_width = rect.width() - 2. * LABEL_INSET;
    if label_width > MIN_LABEL_WIDTH {
        let clip_rect = Rect::from_min_size(
            pos2(rect.left() + LABEL_INSET, rect.top()),
            vec2(label_width, rect.height()),
        );
        surface.text(
            pos2(rect.left() + LABEL_INSET, rect.top() + 4.),
            Align2::LEFT_TOP,
            &clip.name,
            FontId::proportional(11.),
            CLIP_LABEL,
            Some(clip_rect),
        );
    }

    if clip.is_midi() && !clip.notes().is_empty() {
        draw_note_preview(surface, clip.notes(), rect, ppb);
    }
}

/// Notes are placed relative to the clip start and scaled over the pitch span of the clip.
fn draw_note_preview(surface: &mut impl Surface, notes: &[Note], rect: Rect, ppb: f32) {
    let area_top = rect.top() + NOTE_AREA_TOP;
    let area_height = rect.height() - NOTE_AREA_TOP - CLIP_PADDING;
    let min_pitch = notes.iter().map(|n| n.pitch).min().unwrap_or(0);
    let max_pitch = notes.iter().map(|n| n.pitch).max().unwrap_or(0);
    let span = (max_pitch - min_pitch).max(MIN_PITCH_SPAN) as f32;

    for note in notes {
        let x = rect.left() + note.start_beat * ppb;
        let width = (note.length_beats * ppb).max(MIN_NOTE_WIDTH);
        let y = area_top + area_height - (note.pitch - min_pitch) as f32 / span * area_height;
        surface.fill_rect(
            Rect::from_min_size(pos2(x, y), vec2(width, NOTE_HEIGHT)),
            0.,
            NOTE_PREVIEW,
        );
    }
}

fn draw_playhead(surface: &mut impl Surface, ctx: &RenderContext) {
    let x = ctx.viewport.beat_to_x(ctx.transport.playhead_beat);
    surface.line(
        pos2(x, 0.),
        pos2(x, ctx.height),
        Stroke::new(2., PLAYHEAD_COLOR),
    );
    surface.triangle(
        [
            pos2(x - PLAYHEAD_MARKER, 0.),
            pos2(x + PLAYHEAD_MARKER, 0.),
            pos2(x, PLAYHEAD_MARKER_HEIGHT),
        ],
        PLAYHEAD_COLOR,
    );
}

fn draw_ruler(surface: &mut impl Surface, ctx: &RenderContext) {
    surface.fill_rect(
        Rect::from_min_size(pos2(0., 0.), vec2(ctx.width, HEADER_HEIGHT)),
        0.,
        RULER_BACKGROUND,
    );
    let beats_per_bar = ctx.viewport.beats_per_bar.max(1) as i64;
    for beat in ctx.viewport.visible_beats(ctx.width) {
        if !ctx.viewport.is_bar_line(beat) {
            continue;
        }
        let bar = beat.div_euclid(beats_per_bar) + 1;
        let x = ctx.viewport.beat_to_x(beat as f32);
        surface.text(
            pos2(x + 4., HEADER_HEIGHT / 2.),
            Align2::LEFT_CENTER,
            &bar.to_string(),
            FontId::proportional(10.),
            RULER_TEXT,
            None,
        );
    }
}

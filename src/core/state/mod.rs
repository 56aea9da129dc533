
use std::time::Instant;

use log::{debug, warn};

use crate::{
    core::{
        project::Project,
        track::TrackType,
        transport::TransportState,
    },
    engine::{
        client::{CommandTicket, ConnectionState, EngineClient},
        projector::StateProjector,
        protocol::EngineCommand,
    },
    ui::interaction::TimelineIntent,
};

pub const MIN_TEMPO: f32 = 20.;
pub const MAX_TEMPO: f32 = 999.;

/// Application state root: the local project plus the engine session.
///
/// Transport values are never written locally, they only change when the
/// engine answers or pushes new state.
pub struct ArrangerState {
    pub project: Project,
    client: EngineClient,
    projector: StateProjector,
    // Commands waiting for an answer
    in_flight: Vec<CommandTicket>,
    last_error: Option<String>,
}

impl ArrangerState {
    pub fn new(project: Project, mut client: EngineClient) -> Self {
        let projector = StateProjector::attach(&mut client);
        Self {
            project,
            client,
            projector,
            in_flight: Vec::new(),
            last_error: None,
        }
    }

    pub fn start(&mut self) {
        // Failures are retried by the client, the indicator shows progress
        let _ = self.client.start();
    }

    pub fn shutdown(&mut self) {
        self.client.shutdown();
        self.collect_results();
    }

    /// Update each frame the state
    pub fn update(&mut self, now: Instant) {
        self.client.poll(now);
        self.collect_results();
    }

    pub fn transport(&self) -> TransportState {
        self.projector.transport()
    }
    pub fn connection_state(&self) -> ConnectionState {
        self.client.state()
    }
    pub fn engine_url(&self) -> &str {
        &self.client.settings().url
    }
    /// Last failed command, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    // Transport
    pub fn play(&mut self) {
        let ticket = self.client.play();
        self.in_flight.push(ticket);
    }
    pub fn stop(&mut self) {
        let ticket = self.client.stop();
        self.in_flight.push(ticket);
    }
    pub fn toggle_play(&mut self) {
        if self.transport().is_playing {
            self.stop();
        } else {
            self.play();
        }
    }
    /// Ask the engine for a new tempo. Out of range values are ignored.
    pub fn set_tempo(&mut self, tempo: f32) -> bool {
        if !(MIN_TEMPO..=MAX_TEMPO).contains(&tempo) {
            debug!("Ignoring tempo {} outside {}..={}", tempo, MIN_TEMPO, MAX_TEMPO);
            return false;
        }
        let ticket = self.client.set_tempo(tempo);
        self.in_flight.push(ticket);
        true
    }
    pub fn set_playhead(&mut self, beat: f32) {
        let ticket = self.client.set_playhead(beat.max(0.));
        self.in_flight.push(ticket);
    }
    pub fn rewind(&mut self) {
        self.set_playhead(0.);
    }
    /// Flip looping, keeping the current loop bounds
    pub fn toggle_loop(&mut self) {
        let transport = self.transport();
        let ticket = self.client.set_loop(
            !transport.is_looping,
            Some(transport.loop_start),
            Some(transport.loop_end),
        );
        self.in_flight.push(ticket);
    }
    pub fn toggle_metronome(&mut self) {
        let ticket = self.client.toggle_metronome();
        self.in_flight.push(ticket);
    }

    // Timeline
    pub fn apply_intent(&mut self, intent: TimelineIntent) {
        match intent {
            TimelineIntent::SelectTrack(index) => self.project.select_track(index),
            TimelineIntent::SelectClip(id) => self.project.select_clip(id),
            TimelineIntent::MoveClip {
                clip_id,
                track_index,
                beat,
            } => {
                if !self.project.move_clip(&clip_id, track_index, beat) {
                    debug!("Move of unknown clip {} ignored", clip_id);
                }
            }
            TimelineIntent::SetPlayhead(beat) => self.set_playhead(beat),
            TimelineIntent::AddClip { track_index, beat } => {
                if let Some(id) = self.project.add_default_clip(track_index, beat) {
                    self.project.select_track(track_index);
                    self.project.select_clip(Some(id));
                }
            }
        }
    }

    // Tracks
    /// Add a track locally and announce it to the engine
    pub fn add_track(&mut self, kind: TrackType) -> usize {
        let index = self.project.create_track(kind);
        if let Some(track) = self.project.track(index) {
            let command = EngineCommand::CreateTrack {
                kind,
                name: track.name.clone(),
            };
            self.send(command);
        }
        self.project.select_track(index);
        index
    }
    pub fn delete_selected_track(&mut self) {
        if let Some(index) = self.project.selected_track()
            && self.project.delete_track(index).is_some()
        {
            self.send(EngineCommand::DeleteTrack { index });
        }
    }
    pub fn rename_track(&mut self, index: usize, name: &str) {
        if self.project.rename_track(index, name) {
            self.send(EngineCommand::RenameTrack {
                index,
                name: name.to_string(),
            });
        }
    }
    /// Clips only live in the project, the engine is not told
    pub fn delete_selected_clip(&mut self) {
        if let Some(id) = self.project.selected_clip().map(str::to_string) {
            self.project.delete_clip(&id);
        }
    }

    // Mixer
    pub fn set_volume(&mut self, track_index: usize, volume: f32) {
        if track_index < self.project.track_len() {
            self.project.set_volume(track_index, volume);
            self.send(EngineCommand::SetVolume {
                track_index,
                volume: volume.clamp(0., 2.),
            });
        }
    }
    pub fn set_pan(&mut self, track_index: usize, pan: f32) {
        if track_index < self.project.track_len() {
            self.project.set_pan(track_index, pan);
            self.send(EngineCommand::SetPan {
                track_index,
                pan: pan.clamp(-1., 1.),
            });
        }
    }
    pub fn toggle_mute(&mut self, track_index: usize) {
        if self.project.toggle_mute(track_index) {
            self.send(EngineCommand::ToggleMute { track_index });
        }
    }
    pub fn toggle_solo(&mut self, track_index: usize) {
        if self.project.toggle_solo(track_index) {
            self.send(EngineCommand::ToggleSolo { track_index });
        }
    }

    fn send(&mut self, command: EngineCommand) {
        let ticket = self.client.send_command(command);
        self.in_flight.push(ticket);
    }

    fn collect_results(&mut self) {
        let last_error = &mut self.last_error;
        self.in_flight.retain(|ticket| match ticket.try_take() {
            None => true,
            Some(Ok(response)) if response.success => {
                *last_error = None;
                false
            }
            Some(Ok(response)) => {
                let reason = response.error.unwrap_or_else(|| "unknown error".into());
                warn!("Engine rejected {}: {}", ticket.command(), reason);
                *last_error = Some(format!("{}: {}", ticket.command(), reason));
                false
            }
            Some(Err(err)) => {
                warn!("{} failed: {}", ticket.command(), err);
                *last_error = Some(err.to_string());
                false
            }
        });
    }
}

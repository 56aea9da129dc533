//! Wire format shared with the engine. Every frame is a JSON text message
//! whose `kind` field selects the envelope variant.
#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{core::track::TrackType, engine::error::ProtocolError};

/// Scope of the state pushes carrying transport fields
pub const TRANSPORT_SCOPE: &str = "transport";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Envelope {
    Command(CommandFrame),
    Response(EngineResponse),
    State(StateUpdate),
    Event(EngineEvent),
}

impl Envelope {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandFrame {
    pub id: String,
    pub command: String,
    #[serde(default = "empty_object")]
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResponse {
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EngineResponse {
    pub fn ok(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Unsolicited state push, folded into local state on arrival
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub scope: String,
    #[serde(default)]
    pub data: Value,
}

/// Notification such as an engine-side error or a toast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEvent {
    pub event: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Commands understood by the engine, one variant per command name.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Play,
    Stop,
    SetTempo {
        tempo: f32,
    },
    SetPlayhead {
        beat: f32,
    },
    SetLoop {
        enabled: bool,
        start: Option<f32>,
        end: Option<f32>,
    },
    ToggleMetronome,
    CreateTrack {
        kind: TrackType,
        name: String,
    },
    DeleteTrack {
        index: usize,
    },
    RenameTrack {
        index: usize,
        name: String,
    },
    SetVolume {
        track_index: usize,
        volume: f32,
    },
    SetPan {
        track_index: usize,
        pan: f32,
    },
    ToggleMute {
        track_index: usize,
    },
    ToggleSolo {
        track_index: usize,
    },
}

#[derive(Serialize, Deserialize)]
struct TempoPayload {
    tempo: f32,
}

#[derive(Serialize, Deserialize)]
struct PlayheadPayload {
    beat: f32,
}

#[derive(Serialize, Deserialize)]
struct LoopPayload {
    enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<f32>,
}

#[derive(Serialize, Deserialize)]
struct CreateTrackPayload {
    #[serde(rename = "type")]
    kind: TrackType,
    name: String,
}

#[derive(Serialize, Deserialize)]
struct TrackIndexPayload {
    index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MixerPayload {
    track_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volume: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pan: Option<f32>,
}

impl MixerPayload {
    fn track(track_index: usize) -> Self {
        Self {
            track_index,
            volume: None,
            pan: None,
        }
    }
}

impl EngineCommand {
    /// Command name as it appears in the `command` field
    pub fn name(&self) -> &'static str {
        match self {
            EngineCommand::Play => "transport.play",
            EngineCommand::Stop => "transport.stop",
            EngineCommand::SetTempo { .. } => "transport.setTempo",
            EngineCommand::SetPlayhead { .. } => "transport.setPlayhead",
            EngineCommand::SetLoop { .. } => "transport.setLoop",
            EngineCommand::ToggleMetronome => "transport.toggleMetronome",
            EngineCommand::CreateTrack { .. } => "track.create",
            EngineCommand::DeleteTrack { .. } => "track.delete",
            EngineCommand::RenameTrack { .. } => "track.rename",
            EngineCommand::SetVolume { .. } => "mixer.setVolume",
            EngineCommand::SetPan { .. } => "mixer.setPan",
            EngineCommand::ToggleMute { .. } => "mixer.toggleMute",
            EngineCommand::ToggleSolo { .. } => "mixer.toggleSolo",
        }
    }

    /// Structured payload. Commands without arguments send an empty object.
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            EngineCommand::Play | EngineCommand::Stop | EngineCommand::ToggleMetronome => {
                Ok(empty_object())
            }
            EngineCommand::SetTempo { tempo } => serde_json::to_value(TempoPayload { tempo: *tempo }),
            EngineCommand::SetPlayhead { beat } => {
                serde_json::to_value(PlayheadPayload { beat: *beat })
            }
            EngineCommand::SetLoop {
                enabled,
                start,
                end,
            } => serde_json::to_value(LoopPayload {
                enabled: *enabled,
                start: *start,
                end: *end,
            }),
            EngineCommand::CreateTrack { kind, name } => serde_json::to_value(CreateTrackPayload {
                kind: *kind,
                name: name.clone(),
            }),
            EngineCommand::DeleteTrack { index } => serde_json::to_value(TrackIndexPayload {
                index: *index,
                name: None,
            }),
            EngineCommand::RenameTrack { index, name } => serde_json::to_value(TrackIndexPayload {
                index: *index,
                name: Some(name.clone()),
            }),
            EngineCommand::SetVolume {
                track_index,
                volume,
            } => serde_json::to_value(MixerPayload {
                volume: Some(*volume),
                ..MixerPayload::track(*track_index)
            }),
            EngineCommand::SetPan { track_index, pan } => serde_json::to_value(MixerPayload {
                pan: Some(*pan),
                ..MixerPayload::track(*track_index)
            }),
            EngineCommand::ToggleMute { track_index } | EngineCommand::ToggleSolo { track_index } => {
                serde_json::to_value(MixerPayload::track(*track_index))
            }
        }
    }

    pub fn to_frame(&self, id: impl Into<String>) -> Result<CommandFrame, serde_json::Error> {
        Ok(CommandFrame {
            id: id.into(),
            command: self.name().to_string(),
            payload: self.payload()?,
        })
    }

    /// Decode a command frame back into its typed form.
    pub fn from_frame(frame: &CommandFrame) -> Result<Self, ProtocolError> {
        let command = match frame.command.as_str() {
            "transport.play" => EngineCommand::Play,
            "transport.stop" => EngineCommand::Stop,
            "transport.setTempo" => {
                let TempoPayload { tempo } = parse_payload(frame)?;
                EngineCommand::SetTempo { tempo }
            }
            "transport.setPlayhead" => {
                let PlayheadPayload { beat } = parse_payload(frame)?;
                EngineCommand::SetPlayhead { beat }
            }
            "transport.setLoop" => {
                let LoopPayload {
                    enabled,
                    start,
                    end,
                } = parse_payload(frame)?;
                EngineCommand::SetLoop {
                    enabled,
                    start,
                    end,
                }
            }
            "transport.toggleMetronome" => EngineCommand::ToggleMetronome,
            "track.create" => {
                let CreateTrackPayload { kind, name } = parse_payload(frame)?;
                EngineCommand::CreateTrack { kind, name }
            }
            "track.delete" => {
                let TrackIndexPayload { index, .. } = parse_payload(frame)?;
                EngineCommand::DeleteTrack { index }
            }
            "track.rename" => {
                let TrackIndexPayload { index, name } = parse_payload(frame)?;
                EngineCommand::RenameTrack {
                    index,
                    name: name.unwrap_or_default(),
                }
            }
            "mixer.setVolume" => {
                let payload: MixerPayload = parse_payload(frame)?;
                EngineCommand::SetVolume {
                    track_index: payload.track_index,
                    volume: payload.volume.unwrap_or(1.),
                }
            }
            "mixer.setPan" => {
                let payload: MixerPayload = parse_payload(frame)?;
                EngineCommand::SetPan {
                    track_index: payload.track_index,
                    pan: payload.pan.unwrap_or(0.),
                }
            }
            "mixer.toggleMute" => {
                let payload: MixerPayload = parse_payload(frame)?;
                EngineCommand::ToggleMute {
                    track_index: payload.track_index,
                }
            }
            "mixer.toggleSolo" => {
                let payload: MixerPayload = parse_payload(frame)?;
                EngineCommand::ToggleSolo {
                    track_index: payload.track_index,
                }
            }
            other => return Err(ProtocolError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn parse_payload<T: DeserializeOwned>(frame: &CommandFrame) -> Result<T, ProtocolError> {
    serde_json::from_value(frame.payload.clone()).map_err(|source| ProtocolError::InvalidPayload {
        command: frame.command.clone(),
        source,
    })
}

//! Wire contract for the TCP line protocol.
//!
//! Two line shapes share one connection: JSON command envelopes (lines
//! starting with `{`) answered with a JSON response, and slash-delimited
//! sensor frames that feed the control core without a return channel.
//! Outbound notification lines are broadcast to every connected client.

use crate::error::ControlError;
use crate::fixtures::{PipeKind, WaterQuality};
use crate::profile::UserProfile;
use arrayvec::ArrayString;
use core::fmt::Write as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on an accepted command line.
pub const MAX_COMMAND_SIZE: usize = 512;
/// Upper bound on a rendered notification line.
pub const MAX_NOTIFICATION_SIZE: usize = 96;

pub type NotificationLine = ArrayString<MAX_NOTIFICATION_SIZE>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub id: u32,
    pub timestamp: u64,
    pub command_type: CommandType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CommandType {
    Ping,
    Status,
    SetPipe {
        pipe: PipeKind,
        on: bool,
        debit_lps: Option<f64>,
        temperature_c: Option<f64>,
    },
    GetPipeState {
        pipe: PipeKind,
    },
    GetVolume,
    ToggleStopper {
        closed: bool,
    },
    SetDefaultTemperature {
        temperature_c: f64,
    },
    PrepareBath {
        /// None selects the active profile (weight and bath temperature).
        weight_kg: Option<f64>,
        /// None falls back to the default temperature.
        temperature_c: Option<f64>,
    },
    SetPump {
        on: bool,
    },
    AddProfile {
        name: String,
        profile: UserProfile,
    },
    EditProfile {
        name: String,
        profile: UserProfile,
    },
    RemoveProfile {
        name: String,
    },
    SetActiveProfile {
        name: String,
    },
    GetProfile {
        name: String,
    },
    ListProfiles,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub id: u32,
    pub timestamp: u64,
    pub status: ResponseStatus,
    /// Error kind name when rejected; callers branch on this, not on text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Success,
    Rejected,
    ParseError,
}

impl CommandResponse {
    pub fn success(id: u32, message: Option<String>) -> Self {
        Self {
            id,
            timestamp: wall_clock_ms(),
            status: ResponseStatus::Success,
            kind: None,
            message,
        }
    }

    pub fn rejected(id: u32, error: &ControlError) -> Self {
        Self {
            id,
            timestamp: wall_clock_ms(),
            status: ResponseStatus::Rejected,
            kind: Some(error.kind().to_string()),
            message: Some(error.to_string()),
        }
    }

    pub fn parse_error(message: String) -> Self {
        Self {
            id: 0,
            timestamp: wall_clock_ms(),
            status: ResponseStatus::ParseError,
            kind: None,
            message: Some(message),
        }
    }
}

fn wall_clock_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Parses a JSON command line.
pub fn parse_command(line: &str) -> Result<Command, FrameError> {
    if line.len() > MAX_COMMAND_SIZE {
        return Err(FrameError::LineTooLong);
    }
    serde_json::from_str(line).map_err(|_| FrameError::InvalidJson)
}

/// Inbound sensor and remote-control frames. These have no return channel:
/// malformed frames are logged and dropped by the listener.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorFrame {
    /// `temperature/<celsius>` — new default temperature, clamped on apply.
    DefaultTemperature(f64),
    /// `waterQuality/<ph>,<chlorides>,<iron>,<calcium>,<color>`
    WaterQuality(WaterQuality),
    /// `salt/<fraction>` — remaining reservoir fraction in [0, 1].
    SaltLevel(f64),
    /// `display/setPipe/<bath|shower>/<on|off>[/<debit>[/<temperature>]]`
    SetPipe {
        pipe: PipeKind,
        on: bool,
        debit_lps: Option<f64>,
        temperature_c: Option<f64>,
    },
    /// `command/stop` — the listener's own cancellation signal.
    Stop,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("empty frame")]
    Empty,
    #[error("unknown topic '{0}'")]
    UnknownTopic(String),
    #[error("malformed {topic} payload")]
    MalformedPayload { topic: &'static str },
    #[error("invalid command JSON")]
    InvalidJson,
    #[error("line exceeds maximum size")]
    LineTooLong,
}

impl SensorFrame {
    pub fn parse(line: &str) -> Result<Self, FrameError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(FrameError::Empty);
        }
        let (topic, payload) = match line.split_once('/') {
            Some((t, p)) => (t, p),
            None => (line, ""),
        };
        match topic {
            "temperature" => {
                let t = payload
                    .parse()
                    .map_err(|_| FrameError::MalformedPayload { topic: "temperature" })?;
                Ok(SensorFrame::DefaultTemperature(t))
            }
            "waterQuality" => parse_quality(payload),
            "salt" => {
                let fraction: f64 = payload
                    .parse()
                    .map_err(|_| FrameError::MalformedPayload { topic: "salt" })?;
                if !(0.0..=1.0).contains(&fraction) {
                    return Err(FrameError::MalformedPayload { topic: "salt" });
                }
                Ok(SensorFrame::SaltLevel(fraction))
            }
            "display" => parse_set_pipe(payload),
            "command" if payload == "stop" => Ok(SensorFrame::Stop),
            "command" => Err(FrameError::MalformedPayload { topic: "command" }),
            other => Err(FrameError::UnknownTopic(other.to_string())),
        }
    }
}

fn parse_quality(payload: &str) -> Result<SensorFrame, FrameError> {
    const TOPIC: &str = "waterQuality";
    let mut values = [0.0f64; 5];
    let mut fields = payload.split(',');
    for slot in values.iter_mut() {
        *slot = fields
            .next()
            .and_then(|f| f.trim().parse().ok())
            .ok_or(FrameError::MalformedPayload { topic: TOPIC })?;
    }
    if fields.next().is_some() {
        return Err(FrameError::MalformedPayload { topic: TOPIC });
    }
    Ok(SensorFrame::WaterQuality(WaterQuality {
        ph: values[0],
        chlorides_mg_l: values[1],
        iron_mg_l: values[2],
        calcium_mg_l: values[3],
        color: values[4],
    }))
}

fn parse_set_pipe(payload: &str) -> Result<SensorFrame, FrameError> {
    const TOPIC: &str = "display";
    let mut parts = payload.split('/');
    if parts.next() != Some("setPipe") {
        return Err(FrameError::MalformedPayload { topic: TOPIC });
    }
    let pipe: PipeKind = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or(FrameError::MalformedPayload { topic: TOPIC })?;
    let on = match parts.next() {
        Some("on") => true,
        Some("off") => false,
        _ => return Err(FrameError::MalformedPayload { topic: TOPIC }),
    };
    let debit_lps = match parts.next() {
        Some(raw) => Some(
            raw.parse()
                .map_err(|_| FrameError::MalformedPayload { topic: TOPIC })?,
        ),
        None => None,
    };
    let temperature_c = match parts.next() {
        Some(raw) => Some(
            raw.parse()
                .map_err(|_| FrameError::MalformedPayload { topic: TOPIC })?,
        ),
        None => None,
    };
    if parts.next().is_some() || (!on && (debit_lps.is_some() || temperature_c.is_some())) {
        return Err(FrameError::MalformedPayload { topic: TOPIC });
    }
    Ok(SensorFrame::SetPipe {
        pipe,
        on,
        debit_lps,
        temperature_c,
    })
}

/// Outbound display notifications, emitted by the control core and relayed
/// fire-and-forget to connected clients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notification {
    PipeOpened {
        pipe: PipeKind,
        debit_lps: f64,
        temperature_c: f64,
    },
    PipeClosed {
        pipe: PipeKind,
    },
    CurrentVolume(f64),
    TargetReached,
}

impl Notification {
    /// Renders the slash-delimited notification line.
    pub fn render(&self) -> NotificationLine {
        let mut line = NotificationLine::new();
        // Values are bounded (volume <= capacity, debit < 1, temperature
        // <= 50), so the buffer cannot overflow; ignore the fmt result.
        let _ = match self {
            Notification::PipeOpened {
                pipe,
                debit_lps,
                temperature_c,
            } => write!(line, "pipe/{}/on/{}/{}", pipe, debit_lps, temperature_c),
            Notification::PipeClosed { pipe } => write!(line, "pipe/{}/off", pipe),
            Notification::CurrentVolume(volume_l) => write!(line, "currentVolume/{}", volume_l),
            Notification::TargetReached => write!(line, "targetReached"),
        };
        line
    }
}

//! Message and channel types for engine output.
//!
//! Everything a running engine reports travels as one `Message` tagged by
//! channel. Messages are transient: the receiving sink routes them at
//! arrival time and they are never stored.

use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

/// The output channels a run can produce.
///
/// Each channel routes independently: errors and warnings also feed the
/// per-run reporters, dump can capture to a string, and the two
/// selected-output channels feed the typed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Error,
    Warning,
    Log,
    Output,
    Screen,
    Dump,
    SelectedField,
    EndRow,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Channel::Error => "error",
            Channel::Warning => "warning",
            Channel::Log => "log",
            Channel::Output => "output",
            Channel::Screen => "screen",
            Channel::Dump => "dump",
            Channel::SelectedField => "selected-output",
            Channel::EndRow => "selected-output",
        };
        write!(f, "{}", name)
    }
}

/// One message emitted by the engine during a run.
///
/// Text payloads arrive fully formed (the engine includes its own line
/// breaks); the dispatcher adds the `ERROR:`/`WARNING:` prefixes when it
/// writes diagnostics out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Error { text: String, fatal: bool },
    Warning { text: String },
    Log { text: String },
    Output { text: String },
    Screen { text: String },
    Dump { text: String },
    Field { heading: String, value: CellValue },
    EndRow,
}

impl Message {
    pub fn channel(&self) -> Channel {
        match self {
            Message::Error { .. } => Channel::Error,
            Message::Warning { .. } => Channel::Warning,
            Message::Log { .. } => Channel::Log,
            Message::Output { .. } => Channel::Output,
            Message::Screen { .. } => Channel::Screen,
            Message::Dump { .. } => Channel::Dump,
            Message::Field { .. } => Channel::SelectedField,
            Message::EndRow => Channel::EndRow,
        }
    }
}

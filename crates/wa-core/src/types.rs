use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A DOM fragment captured by the selection tool together with the name a
/// human gave it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedElement {
    pub tag_name: String,
    pub markup: String,
}

impl TaggedElement {
    pub fn new(tag_name: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            markup: markup.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionState {
    Idle,
    Running,
    WaitingForUser,
    Completed,
}

impl ExecutionState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::WaitingForUser => "waitingForUser",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
    pub current_line: usize,
    pub waiting_for_user: bool,
    pub is_executing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Ok,
    Failed,
}

/// Result of dispatching one command. The message is what a human sees; the
/// status lets callers branch without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub status: OutcomeStatus,
    pub message: String,
}

impl CommandOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Ok,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Ok
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub line_number: usize,
    pub line: String,
    pub result: String,
    pub ok: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub log: Vec<LogEntry>,
    pub waiting_for_user: bool,
    pub prompt: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub schema_version: String,
    pub script: String,
    pub current_line: usize,
    pub state: ExecutionState,
    pub variables: BTreeMap<String, String>,
    pub session_uid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum Locator {
    Id(String),
    Xpath(String),
}

impl Locator {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Xpath(_) => "xpath",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Id(value) | Self::Xpath(value) => value,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind(), self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementAction {
    Read,
    Click,
    Fill(Vec<String>),
}

impl ElementAction {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Read => "",
            Self::Click => "click",
            Self::Fill(_) => "fill",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressKey {
    Enter,
    Escape,
}

impl PressKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "enter" | "return" => Some(Self::Enter),
            "escape" | "esc" => Some(Self::Escape),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Escape => "escape",
        }
    }
}

/// Answer of the content-analysis collaborator for a semantic element query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindResult {
    pub found: bool,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub attribute: Option<String>,
}

impl FindResult {
    pub fn not_found() -> Self {
        Self {
            found: false,
            value: None,
            attribute: None,
        }
    }

    pub fn found(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            found: true,
            value: Some(value.into()),
            attribute: Some(attribute.into()),
        }
    }
}

use serde::{Deserialize, Serialize};

pub const TESTCASE_SCHEMA_V1: &str = "wa-tool-case.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    /// Script file, relative to the case directory.
    #[serde(default = "default_script")]
    pub script: String,
    /// In-memory driver fixture, relative to the case directory.
    #[serde(default = "default_fixture")]
    pub fixture: String,
    #[serde(default)]
    pub actions: Vec<TestAction>,
    #[serde(default)]
    pub expected_events: Vec<ExpectedEvent>,
}

fn default_script() -> String {
    "main.wa".to_string()
}

fn default_fixture() -> String {
    "fixture.json".to_string()
}

/// Answer given at an `ASK_USER` pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TestAction {
    Confirm,
    Stop,
}

impl TestAction {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExpectedEvent {
    Result { line: usize, result: String, ok: bool },
    Waiting { prompt: String },
    Stopped,
    Completed,
}

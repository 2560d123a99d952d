mod case;
mod runner;
mod source;

pub use case::{ExpectedEvent, TestAction, TestCase, TESTCASE_SCHEMA_V1};
pub use runner::{assert_case, run_case, CaseReport};
pub use source::{discover_cases, read_test_case, TESTCASE_FILE};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse testcase {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to parse fixture {path}: {source}")]
    ParseFixture {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid testcase schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("No {file} files under {path}.")]
    CasesEmpty { path: PathBuf, file: String },
    #[error("Engine error: {0}")]
    Engine(#[from] wa_core::AutomationError),
    #[error("Action missing at event index {event_index}: script is waiting for user.")]
    MissingAction { event_index: usize },
    #[error("Unused actions: used {used} of {total}.")]
    UnusedActions { used: usize, total: usize },
    #[error("Guard exceeded: max_pauses={max_pauses}.")]
    GuardExceeded { max_pauses: usize },
    #[error("Expected event count {expected}, actual {actual}. observed={observed}")]
    EventCountMismatch {
        expected: usize,
        actual: usize,
        observed: String,
    },
    #[error("Event mismatch at index {index}. expected={expected} actual={actual}")]
    EventMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("Failed to serialize event for diff: {0}")]
    EventSerialize(serde_json::Error),
}

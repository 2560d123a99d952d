use tracing::info;
use wa_core::{AutomationError, EngineSnapshot, ExecutionState};
use wa_parser::script_lines;

use super::boundary::ask_user_prompt;
use super::AutomationEngine;
use crate::VariableStore;

pub const SNAPSHOT_SCHEMA: &str = "engine-snapshot.v1";

impl AutomationEngine {
    pub fn snapshot(&self) -> Result<EngineSnapshot, AutomationError> {
        if self.state == ExecutionState::Running {
            return Err(AutomationError::new(
                "SNAPSHOT_NOT_ALLOWED",
                "snapshot() is not allowed while a run is executing.",
            ));
        }

        Ok(EngineSnapshot {
            schema_version: SNAPSHOT_SCHEMA.to_string(),
            script: self.script.clone(),
            current_line: self.current_line,
            state: self.state,
            variables: self.dispatcher.variables().to_map(),
            session_uid: self.dispatcher.session().map(str::to_string),
        })
    }

    pub fn resume(&mut self, snapshot: EngineSnapshot) -> Result<(), AutomationError> {
        self.ensure_not_running()?;
        if snapshot.schema_version != SNAPSHOT_SCHEMA {
            return Err(AutomationError::new(
                "SNAPSHOT_SCHEMA",
                format!(
                    "Unsupported snapshot schema \"{}\".",
                    snapshot.schema_version
                ),
            ));
        }
        if snapshot.state == ExecutionState::Running {
            return Err(AutomationError::new(
                "SNAPSHOT_STATE",
                "Snapshot was taken while running and cannot be resumed.",
            ));
        }

        let line_count = script_lines(&snapshot.script).len();
        let cursor_valid = match snapshot.state {
            ExecutionState::WaitingForUser => snapshot.current_line < line_count,
            _ => snapshot.current_line <= line_count,
        };
        if !cursor_valid {
            return Err(AutomationError::new(
                "SNAPSHOT_CURSOR",
                format!(
                    "Snapshot cursor {} is out of range for a script of {} line(s).",
                    snapshot.current_line, line_count
                ),
            ));
        }

        if snapshot.state == ExecutionState::WaitingForUser
            && ask_user_prompt(&snapshot.script, snapshot.current_line).is_none()
        {
            return Err(AutomationError::new(
                "SNAPSHOT_CURSOR",
                format!(
                    "Snapshot is waiting on line {} which is not ASK_USER.",
                    snapshot.current_line
                ),
            ));
        }

        self.script = snapshot.script;
        self.current_line = snapshot.current_line;
        self.state = snapshot.state;
        self.dispatcher.restore(
            VariableStore::from_map(snapshot.variables),
            snapshot.session_uid,
        );
        info!(line = self.current_line, state = self.state.name(), "engine resumed");
        Ok(())
    }
}

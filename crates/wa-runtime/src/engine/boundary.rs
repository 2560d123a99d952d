use wa_core::{AutomationError, CommandKind, ExecutionState, RunReport};
use wa_parser::{script_lines, split_line, unquote};

use super::AutomationEngine;

impl AutomationEngine {
    /// Continues a paused run after the `ASK_USER` line, which is not run
    /// again.
    pub fn confirm(&mut self) -> Result<RunReport, AutomationError> {
        if self.state != ExecutionState::WaitingForUser {
            return Err(AutomationError::new(
                "ENGINE_NOT_WAITING",
                "Not waiting for user input.",
            ));
        }

        self.state = ExecutionState::Running;
        self.current_line += 1;
        Ok(self.run_loop())
    }

    /// Prompt of the `ASK_USER` line the run is paused on.
    pub fn pending_prompt(&self) -> Option<String> {
        if self.state != ExecutionState::WaitingForUser {
            return None;
        }
        ask_user_prompt(&self.script, self.current_line)
    }
}

pub(super) fn ask_user_prompt(script: &str, line_index: usize) -> Option<String> {
    let lines = script_lines(script);
    let line = split_line(lines.get(line_index)?)?;
    (CommandKind::from_keyword(line.keyword) == Some(CommandKind::AskUser))
        .then(|| unquote(line.args))
}

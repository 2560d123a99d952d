use tracing::{debug, info};
use wa_core::{
    AutomationError, CommandKind, CommandOutcome, ExecutionState, LogEntry, RunReport,
};
use wa_parser::{script_lines, split_line};

use super::AutomationEngine;

impl AutomationEngine {
    /// Runs the script from its first line. Valid from `Idle` and
    /// `Completed`; a paused run must be confirmed, stopped or cleared first.
    pub fn run(&mut self) -> Result<RunReport, AutomationError> {
        self.ensure_not_running()?;
        if self.state == ExecutionState::WaitingForUser {
            return Err(AutomationError::new(
                "ENGINE_WAITING_FOR_USER",
                "Script is waiting for user confirmation; confirm, stop or clear it first.",
            ));
        }

        self.current_line = 0;
        self.state = ExecutionState::Running;
        info!(lines = script_lines(&self.script).len(), "run started");
        Ok(self.run_loop())
    }

    /// Executes one command outside the script. The cursor does not move.
    pub fn dispatch_one(
        &mut self,
        keyword: &str,
        raw_args: &str,
    ) -> Result<CommandOutcome, AutomationError> {
        self.ensure_not_running()?;
        Ok(self.dispatcher.execute(keyword, raw_args))
    }

    pub(super) fn run_loop(&mut self) -> RunReport {
        let lines = script_lines(&self.script)
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let mut report = RunReport::default();

        while let Some(raw) = lines.get(self.current_line) {
            let Some(line) = split_line(raw) else {
                self.current_line += 1;
                continue;
            };

            debug!(line = self.current_line, keyword = line.keyword, "executing line");
            let outcome = self.dispatcher.execute(line.keyword, line.args);
            report.log.push(LogEntry {
                line_number: self.current_line,
                line: raw.trim().to_string(),
                result: outcome.message.clone(),
                ok: outcome.is_success(),
            });

            if CommandKind::from_keyword(line.keyword) == Some(CommandKind::AskUser) {
                self.state = ExecutionState::WaitingForUser;
                info!(line = self.current_line, prompt = %outcome.message, "waiting for user");
                report.waiting_for_user = true;
                report.prompt = Some(outcome.message);
                return report;
            }
            self.current_line += 1;
        }

        self.state = ExecutionState::Completed;
        info!(entries = report.log.len(), "run completed");
        report.completed = true;
        report
    }
}

use serde::Serialize;
use wa_core::{AutomationError, CommandOutcome, RunReport};
use wa_runtime::AutomationEngine;

use crate::{json_string, map_cli_encode};

fn to_json(value: &impl Serialize) -> Result<String, AutomationError> {
    serde_json::to_string(value).map_err(map_cli_encode)
}

fn emit_state_out(state_out: Option<&str>) {
    println!("STATE_OUT:{}", state_out.unwrap_or("NONE"));
}

/// Renders the log of one run up to its next pause or its end.
pub(crate) fn render_report(report: &RunReport) -> Result<Vec<String>, AutomationError> {
    let mut lines = vec!["RESULT:OK".to_string()];
    if report.waiting_for_user {
        lines.push("EVENT:WAITING".to_string());
    } else {
        lines.push("EVENT:COMPLETED".to_string());
    }
    for entry in &report.log {
        lines.push(format!("LOG_JSON:{}", to_json(entry)?));
    }
    if let Some(prompt) = &report.prompt {
        lines.push(format!("PROMPT_JSON:{}", json_string(prompt)));
    }
    Ok(lines)
}

pub(crate) fn emit_report(report: &RunReport, state_out: Option<&str>) -> Result<(), AutomationError> {
    for line in render_report(report)? {
        println!("{}", line);
    }
    emit_state_out(state_out);
    Ok(())
}

pub(crate) fn emit_dispatch(
    outcome: &CommandOutcome,
    state_out: Option<&str>,
) -> Result<(), AutomationError> {
    println!("RESULT:OK");
    println!("EVENT:DISPATCHED");
    println!("OUTCOME_JSON:{}", to_json(outcome)?);
    emit_state_out(state_out);
    Ok(())
}

pub(crate) fn emit_status(
    engine: &AutomationEngine,
    state_out: Option<&str>,
) -> Result<(), AutomationError> {
    println!("RESULT:OK");
    println!("EVENT:STATUS");
    println!("STATE:{}", engine.state().name());
    println!("CURSOR_JSON:{}", to_json(&engine.cursor_state())?);
    println!("VARS_JSON:{}", to_json(&engine.variables())?);
    if let Some(prompt) = engine.pending_prompt() {
        println!("PROMPT_JSON:{}", json_string(&prompt));
    }
    emit_state_out(state_out);
    Ok(())
}

#[cfg(test)]
mod boundary_runner_tests {
    use super::*;
    use wa_core::LogEntry;

    #[test]
    fn render_report_lists_log_and_prompt() {
        let report = RunReport {
            log: vec![LogEntry {
                line_number: 0,
                line: "ASK_USER \"ok?\"".to_string(),
                result: "ok?".to_string(),
                ok: true,
            }],
            waiting_for_user: true,
            prompt: Some("ok?".to_string()),
            completed: false,
        };
        let lines = render_report(&report).expect("report should render");
        assert_eq!(lines[0], "RESULT:OK");
        assert_eq!(lines[1], "EVENT:WAITING");
        assert_eq!(
            lines[2],
            r#"LOG_JSON:{"lineNumber":0,"line":"ASK_USER \"ok?\"","result":"ok?","ok":true}"#
        );
        assert_eq!(lines[3], r#"PROMPT_JSON:"ok?""#);
    }

    #[test]
    fn render_report_marks_completion() {
        let report = RunReport {
            completed: true,
            ..RunReport::default()
        };
        let lines = render_report(&report).expect("report should render");
        assert_eq!(lines, vec!["RESULT:OK", "EVENT:COMPLETED"]);
    }
}

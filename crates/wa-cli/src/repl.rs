use std::io::{self, BufRead, Write};

use wa_core::{AutomationError, RunReport};
use wa_parser::{script_lines, split_line};
use wa_runtime::AutomationEngine;

use crate::{map_repl_io, ReplCommandAction};

pub(crate) const REPL_HELP: &str =
    "commands: :help :run :confirm :stop :clear :status :vars :script :add <line> :quit";

pub(crate) fn run_repl(engine: &mut AutomationEngine) -> Result<i32, AutomationError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_repl_with_io(engine, &mut reader, &mut writer)
}

pub(crate) fn run_repl_with_io(
    engine: &mut AutomationEngine,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, AutomationError> {
    writeln!(writer, "Web automation REPL").map_err(map_repl_io)?;
    writeln!(writer, "{}", REPL_HELP).map_err(map_repl_io)?;

    loop {
        let Some(raw) = prompt_input_from("> ", reader, writer)? else {
            return Ok(0);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let mut lines = Vec::new();
        let mut emit = |line: String| lines.push(line);
        let action = match handle_repl_command(raw, engine, &mut emit) {
            Ok(action) => action,
            Err(error) => {
                emit(format!("error: {}", error));
                ReplCommandAction::Continue
            }
        };
        if action == ReplCommandAction::NotHandled {
            dispatch_line(raw, engine, &mut emit);
        }
        for line in lines {
            writeln!(writer, "{}", line).map_err(map_repl_io)?;
        }
        if action == ReplCommandAction::Quit {
            return Ok(0);
        }
    }
}

/// `:`-prefixed console commands. Anything else is left for dispatch.
pub(crate) fn handle_repl_command(
    raw: &str,
    engine: &mut AutomationEngine,
    emit: &mut dyn FnMut(String),
) -> Result<ReplCommandAction, AutomationError> {
    let (command, rest) = raw.split_once(' ').unwrap_or((raw, ""));
    match command {
        ":help" => emit(REPL_HELP.to_string()),
        ":run" => emit_report_lines(&engine.run()?, emit),
        ":confirm" => emit_report_lines(&engine.confirm()?, emit),
        ":stop" => {
            engine.stop()?;
            emit("stopped".to_string());
        }
        ":clear" => {
            engine.clear();
            emit("cleared".to_string());
        }
        ":status" => {
            let cursor = engine.cursor_state();
            emit(format!(
                "state={} line={} waiting={} executing={}",
                engine.state().name(),
                cursor.current_line,
                cursor.waiting_for_user,
                cursor.is_executing
            ));
        }
        ":vars" => {
            for (name, value) in engine.variables() {
                emit(format!("{} = {}", name, value));
            }
        }
        ":script" => {
            for (index, line) in script_lines(engine.get_script()).into_iter().enumerate() {
                emit(format!("{:>3} {}", index, line));
            }
        }
        ":add" => {
            if rest.trim().is_empty() {
                return Err(AutomationError::new(
                    "REPL_ADD_EMPTY",
                    ":add needs a script line.",
                ));
            }
            engine.append_line(rest.trim());
            emit(format!("added: {}", rest.trim()));
        }
        ":quit" => {
            emit("bye".to_string());
            return Ok(ReplCommandAction::Quit);
        }
        _ => return Ok(ReplCommandAction::NotHandled),
    }
    Ok(ReplCommandAction::Continue)
}

fn dispatch_line(raw: &str, engine: &mut AutomationEngine, emit: &mut dyn FnMut(String)) {
    let Some(line) = split_line(raw) else {
        return;
    };
    match engine.dispatch_one(line.keyword, line.args) {
        Ok(outcome) if outcome.is_success() => emit(outcome.message),
        Ok(outcome) => emit(format!("failed: {}", outcome.message)),
        Err(error) => emit(format!("error: {}", error)),
    }
}

fn emit_report_lines(report: &RunReport, emit: &mut dyn FnMut(String)) {
    for entry in &report.log {
        let marker = if entry.ok { "ok" } else { "failed" };
        emit(format!(
            "[{}] {:>3} {} => {}",
            marker, entry.line_number, entry.line, entry.result
        ));
    }
    if let Some(prompt) = &report.prompt {
        emit(format!("waiting: {} (:confirm to continue)", prompt));
    } else if report.completed {
        emit("[completed]".to_string());
    }
}

/// `None` once the input is exhausted.
pub(crate) fn prompt_input_from(
    prefix: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, AutomationError> {
    write!(writer, "{}", prefix).map_err(map_repl_io)?;
    writer.flush().map_err(map_repl_io)?;
    let mut input = String::new();
    let read = reader.read_line(&mut input).map_err(map_repl_io)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

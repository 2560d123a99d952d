use std::path::Path;

use wa_core::AutomationError;
use wa_parser::split_line;
use wa_runtime::AutomationEngine;

use crate::{
    create_engine_for_cli, emit_dispatch, emit_report, emit_status, load_engine_from_state,
    read_script_file, save_engine_state, AgentArgs, AgentCommand, ClearArgs, ConfirmArgs,
    DispatchArgs, DriverArgs, RunArgs, StatusArgs,
};

pub(super) fn run_agent(driver: &DriverArgs, args: AgentArgs) -> Result<i32, AutomationError> {
    match args.command {
        AgentCommand::Run(args) => run_run(driver, args),
        AgentCommand::Confirm(args) => run_confirm(driver, args),
        AgentCommand::Dispatch(args) => run_dispatch(driver, args),
        AgentCommand::Status(args) => run_status(driver, args),
        AgentCommand::Clear(args) => run_clear(driver, args),
    }
}

/// Engine from `--state-in` when given, otherwise a fresh one. The second
/// value is the session id to persist with the state.
fn open_engine(
    driver: &DriverArgs,
    state_in: Option<&str>,
) -> Result<(AutomationEngine, String), AutomationError> {
    match state_in {
        Some(path) => {
            let (state, engine) = load_engine_from_state(driver, Path::new(path))?;
            Ok((engine, state.session_id))
        }
        None => Ok((create_engine_for_cli(driver, None)?, driver.session.clone())),
    }
}

pub(super) fn run_run(driver: &DriverArgs, args: RunArgs) -> Result<i32, AutomationError> {
    if args.script.is_none() && args.state_in.is_none() {
        return Err(AutomationError::new(
            "CLI_RUN_SOURCE",
            "agent run needs --script or --state-in.",
        ));
    }

    let (mut engine, session_id) = open_engine(driver, args.state_in.as_deref())?;
    if let Some(path) = &args.script {
        engine.load_script(&read_script_file(path)?);
    }

    let report = engine.run()?;
    save_engine_state(Path::new(&args.state_out), &engine, &session_id)?;
    emit_report(&report, Some(&args.state_out))?;
    Ok(0)
}

pub(super) fn run_confirm(driver: &DriverArgs, args: ConfirmArgs) -> Result<i32, AutomationError> {
    let (mut engine, session_id) = open_engine(driver, Some(&args.state_in))?;
    let report = engine.confirm()?;
    save_engine_state(Path::new(&args.state_out), &engine, &session_id)?;
    emit_report(&report, Some(&args.state_out))?;
    Ok(0)
}

pub(super) fn run_dispatch(driver: &DriverArgs, args: DispatchArgs) -> Result<i32, AutomationError> {
    let Some(line) = split_line(&args.line) else {
        return Err(AutomationError::new(
            "CLI_DISPATCH_EMPTY",
            "agent dispatch needs a non-blank --line.",
        ));
    };

    let (mut engine, session_id) = open_engine(driver, args.state_in.as_deref())?;
    let outcome = engine.dispatch_one(line.keyword, line.args)?;
    if let Some(state_out) = &args.state_out {
        save_engine_state(Path::new(state_out), &engine, &session_id)?;
    }
    emit_dispatch(&outcome, args.state_out.as_deref())?;
    Ok(0)
}

pub(super) fn run_status(driver: &DriverArgs, args: StatusArgs) -> Result<i32, AutomationError> {
    let (engine, _) = open_engine(driver, Some(&args.state_in))?;
    emit_status(&engine, None)?;
    Ok(0)
}

pub(super) fn run_clear(driver: &DriverArgs, args: ClearArgs) -> Result<i32, AutomationError> {
    let (mut engine, session_id) = open_engine(driver, Some(&args.state_in))?;
    engine.clear();
    save_engine_state(Path::new(&args.state_out), &engine, &session_id)?;
    emit_status(&engine, Some(&args.state_out))?;
    Ok(0)
}

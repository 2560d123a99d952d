use std::ffi::OsString;

use clap::Parser;
use wa_api::list_supported_commands;
use wa_core::AutomationError;

mod agent;
mod boundary_runner;
mod cli_args;
mod error_map;
mod logging;
mod models;
mod repl;
mod session_ops;
mod state_store;

pub(crate) use boundary_runner::{emit_dispatch, emit_report, emit_status};
#[cfg(test)]
pub(crate) use boundary_runner::render_report;
pub(crate) use cli_args::{
    AgentArgs, AgentCommand, ClearArgs, Cli, ConfirmArgs, DispatchArgs, DriverArgs, Mode,
    ReplArgs, RunArgs, StatusArgs,
};
pub(crate) use error_map::{
    emit_error, json_string, map_cli_encode, map_cli_script_read, map_cli_state_invalid,
    map_cli_state_read, map_cli_state_write, map_repl_io,
};
pub(crate) use logging::init_tracing;
pub(crate) use models::{AgentStateV1, ReplCommandAction, AGENT_STATE_SCHEMA};
pub(crate) use repl::run_repl;
#[cfg(test)]
pub(crate) use repl::{handle_repl_command, prompt_input_from, run_repl_with_io};
pub(crate) use session_ops::{
    create_engine_for_cli, load_engine_from_state, read_script_file, save_engine_state,
};
#[cfg(test)]
pub(crate) use session_ops::driver_config;
pub(crate) use state_store::{load_agent_state, save_agent_state};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    init_tracing(cli.driver.verbose);
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, AutomationError> {
    match cli.command {
        Mode::Agent(args) => agent::run_agent(&cli.driver, args),
        Mode::Repl(args) => run_repl_mode(&cli.driver, args),
        Mode::Commands => run_commands(),
    }
}

fn run_repl_mode(driver: &DriverArgs, args: ReplArgs) -> Result<i32, AutomationError> {
    let script = match &args.script {
        Some(path) => Some(read_script_file(path)?),
        None => None,
    };
    let mut engine = create_engine_for_cli(driver, script)?;
    run_repl(&mut engine)
}

fn run_commands() -> Result<i32, AutomationError> {
    let payload =
        serde_json::to_string_pretty(&list_supported_commands()).map_err(map_cli_encode)?;
    println!("{}", payload);
    Ok(0)
}

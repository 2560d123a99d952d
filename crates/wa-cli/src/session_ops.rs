use std::fs;
use std::path::Path;
use std::time::Duration;

use wa_api::{create_engine, load_fixture, resume_engine, CreateEngineOptions, DriverConfig, ResumeEngineOptions};
use wa_core::AutomationError;
use wa_runtime::AutomationEngine;

use crate::{
    load_agent_state, map_cli_script_read, save_agent_state, AgentStateV1, DriverArgs,
    AGENT_STATE_SCHEMA,
};

pub(crate) fn driver_config(args: &DriverArgs) -> Result<DriverConfig, AutomationError> {
    match &args.fixture {
        Some(path) => Ok(DriverConfig::Fixture(load_fixture(Path::new(path))?)),
        None => Ok(DriverConfig::Http {
            base_url: args.driver_url.clone(),
            timeout: Duration::from_secs(args.timeout_secs),
        }),
    }
}

pub(crate) fn read_script_file(path: &str) -> Result<String, AutomationError> {
    let path = Path::new(path);
    if !path.is_file() {
        return Err(AutomationError::new(
            "CLI_SCRIPT_NOT_FOUND",
            format!("Script file does not exist: {}", path.display()),
        ));
    }
    fs::read_to_string(path).map_err(map_cli_script_read)
}

pub(crate) fn create_engine_for_cli(
    args: &DriverArgs,
    script: Option<String>,
) -> Result<AutomationEngine, AutomationError> {
    create_engine(CreateEngineOptions {
        driver: driver_config(args)?,
        session_id: Some(args.session.clone()),
        script,
    })
}

pub(crate) fn resume_engine_for_state(
    args: &DriverArgs,
    state: &AgentStateV1,
) -> Result<AutomationEngine, AutomationError> {
    resume_engine(ResumeEngineOptions {
        driver: driver_config(args)?,
        session_id: Some(state.session_id.clone()),
        snapshot: state.snapshot.clone(),
    })
}

pub(crate) fn load_engine_from_state(
    args: &DriverArgs,
    path: &Path,
) -> Result<(AgentStateV1, AutomationEngine), AutomationError> {
    let state = load_agent_state(path)?;
    let engine = resume_engine_for_state(args, &state)?;
    Ok((state, engine))
}

pub(crate) fn save_engine_state(
    path: &Path,
    engine: &AutomationEngine,
    session_id: &str,
) -> Result<(), AutomationError> {
    let state = AgentStateV1 {
        schema_version: AGENT_STATE_SCHEMA.to_string(),
        session_id: session_id.to_string(),
        snapshot: engine.snapshot()?,
    };
    save_agent_state(path, &state)
}

use std::fs;
use std::path::Path;

use wa_core::AutomationError;

use crate::{
    map_cli_encode, map_cli_state_invalid, map_cli_state_read, map_cli_state_write, AgentStateV1,
    AGENT_STATE_SCHEMA,
};

pub(crate) fn save_agent_state(path: &Path, state: &AgentStateV1) -> Result<(), AutomationError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(map_cli_state_write)?;

    let payload = serde_json::to_string_pretty(state).map_err(map_cli_encode)?;
    fs::write(path, payload).map_err(map_cli_state_write)
}

pub(crate) fn load_agent_state(path: &Path) -> Result<AgentStateV1, AutomationError> {
    if !path.exists() {
        return Err(AutomationError::new(
            "CLI_STATE_NOT_FOUND",
            format!("State file does not exist: {}", path.display()),
        ));
    }

    let raw = fs::read_to_string(path).map_err(map_cli_state_read)?;
    let state: AgentStateV1 = serde_json::from_str(&raw).map_err(map_cli_state_invalid)?;

    if state.schema_version != AGENT_STATE_SCHEMA {
        return Err(AutomationError::new(
            "CLI_STATE_SCHEMA",
            format!("Unsupported agent state schema: {}", state.schema_version),
        ));
    }

    Ok(state)
}

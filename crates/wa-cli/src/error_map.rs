use std::fmt::Display;

use wa_core::AutomationError;

fn map_error(code: &'static str, error: impl Display) -> AutomationError {
    AutomationError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: AutomationError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!("ERROR_MSG_JSON:{}", json_string(&error.message));
    1
}

pub(crate) fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

pub(crate) fn map_repl_io(error: std::io::Error) -> AutomationError {
    map_error("REPL_IO", error)
}

pub(crate) fn map_cli_script_read(error: std::io::Error) -> AutomationError {
    map_error("CLI_SCRIPT_READ", error)
}

pub(crate) fn map_cli_state_write(error: std::io::Error) -> AutomationError {
    map_error("CLI_STATE_WRITE", error)
}

pub(crate) fn map_cli_state_read(error: std::io::Error) -> AutomationError {
    map_error("CLI_STATE_READ", error)
}

pub(crate) fn map_cli_state_invalid(error: serde_json::Error) -> AutomationError {
    map_error("CLI_STATE_INVALID", error)
}

pub(crate) fn map_cli_encode(error: serde_json::Error) -> AutomationError {
    map_error("CLI_ENCODE", error)
}

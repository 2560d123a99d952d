use serde::{Deserialize, Serialize};
use wa_core::EngineSnapshot;

pub(crate) const AGENT_STATE_SCHEMA: &str = "agent-state.v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AgentStateV1 {
    pub(crate) schema_version: String,
    /// Session uid a fresh NAVIGATE opens when the snapshot has none.
    pub(crate) session_id: String,
    pub(crate) snapshot: EngineSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplCommandAction {
    NotHandled,
    Continue,
    Quit,
}

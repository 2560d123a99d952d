mod boundary;
mod lifecycle;
mod snapshot;
mod step;

pub use lifecycle::{AutomationEngine, AutomationEngineOptions, DEFAULT_SESSION_ID};
pub use snapshot::SNAPSHOT_SCHEMA;

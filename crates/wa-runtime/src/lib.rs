mod dispatch;
mod engine;
mod resolver;
mod variables;

pub use dispatch::{Dispatcher, NO_SESSION_MESSAGE};
pub use engine::{AutomationEngine, AutomationEngineOptions, DEFAULT_SESSION_ID, SNAPSHOT_SCHEMA};
pub use resolver::{Resolution, TaggedResolver};
pub use variables::VariableStore;

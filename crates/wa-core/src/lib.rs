pub mod command;
pub mod error;
pub mod types;

pub use command::*;
pub use error::AutomationError;
pub use types::*;

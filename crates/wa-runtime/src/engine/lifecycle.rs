use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;
use wa_core::{supported_commands, AutomationError, CursorState, ExecutionState};
use wa_driver::{
    ContentAnalyzer, DriverService, MarkupContentAnalyzer, TaggingStore, TemplateCommentGenerator,
    TextGenerator,
};

use crate::Dispatcher;

pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Clone)]
pub struct AutomationEngineOptions {
    pub driver: Arc<dyn DriverService>,
    pub tagging_store: Arc<dyn TaggingStore>,
    /// Defaults to a [`MarkupContentAnalyzer`] over `driver`.
    pub analyzer: Option<Arc<dyn ContentAnalyzer>>,
    /// Defaults to [`TemplateCommentGenerator`].
    pub text_generator: Option<Arc<dyn TextGenerator>>,
    /// Browser session uid opened by the first `NAVIGATE`.
    pub session_id: Option<String>,
}

/// One script interpreter: the script text, the cursor into its lines and
/// the state of the current run. Runs suspend at `ASK_USER` and continue on
/// [`AutomationEngine::confirm`].
pub struct AutomationEngine {
    pub(super) dispatcher: Dispatcher,
    pub(super) script: String,
    pub(super) current_line: usize,
    pub(super) state: ExecutionState,
}

impl AutomationEngine {
    pub fn new(options: AutomationEngineOptions) -> Result<Self, AutomationError> {
        let session_id = options
            .session_id
            .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());
        if session_id.trim().is_empty() {
            return Err(AutomationError::new(
                "ENGINE_SESSION_ID",
                "Session id must not be empty.",
            ));
        }

        let analyzer = options
            .analyzer
            .unwrap_or_else(|| Arc::new(MarkupContentAnalyzer::new(options.driver.clone())));
        let text_generator = options
            .text_generator
            .unwrap_or_else(|| Arc::new(TemplateCommentGenerator));

        Ok(Self {
            dispatcher: Dispatcher::new(
                options.driver,
                options.tagging_store,
                analyzer,
                text_generator,
                session_id,
            ),
            script: String::new(),
            current_line: 0,
            state: ExecutionState::Idle,
        })
    }

    pub fn load_script(&mut self, script: &str) {
        self.script = script.to_string();
    }

    pub fn get_script(&self) -> &str {
        &self.script
    }

    /// Appends `KEYWORD args` as a new last line.
    pub fn append_command(&mut self, keyword: &str, args: &str) -> Result<(), AutomationError> {
        let keyword = keyword.trim();
        if keyword.is_empty() || keyword.contains(char::is_whitespace) {
            return Err(AutomationError::new(
                "ENGINE_COMMAND_KEYWORD",
                format!("Invalid command keyword: {:?}", keyword),
            ));
        }

        let args = args.trim();
        let line = if args.is_empty() {
            keyword.to_string()
        } else {
            format!("{} {}", keyword, args)
        };
        self.append_line(&line);
        Ok(())
    }

    pub fn append_line(&mut self, line: &str) {
        if !self.script.is_empty() && !self.script.ends_with('\n') {
            self.script.push('\n');
        }
        self.script.push_str(line);
    }

    /// Full reset: script, cursor, pause, browser session and variables.
    pub fn clear(&mut self) {
        self.script.clear();
        self.current_line = 0;
        self.state = ExecutionState::Idle;
        self.dispatcher.reset();
        info!("engine cleared");
    }

    /// Abandons a pending pause or a finished run. Script, variables and the
    /// browser session stay.
    pub fn stop(&mut self) -> Result<(), AutomationError> {
        self.ensure_not_running()?;
        self.current_line = 0;
        self.state = ExecutionState::Idle;
        info!("engine stopped");
        Ok(())
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn cursor_state(&self) -> CursorState {
        CursorState {
            current_line: self.current_line,
            waiting_for_user: self.state == ExecutionState::WaitingForUser,
            is_executing: self.state == ExecutionState::Running,
        }
    }

    pub fn variables(&self) -> BTreeMap<String, String> {
        self.dispatcher.variables().to_map()
    }

    pub fn session_uid(&self) -> Option<&str> {
        self.dispatcher.session()
    }

    pub fn supported_commands(&self) -> BTreeMap<String, Vec<String>> {
        supported_commands()
    }

    pub(super) fn ensure_not_running(&self) -> Result<(), AutomationError> {
        if self.state == ExecutionState::Running {
            return Err(AutomationError::new(
                "ENGINE_ALREADY_RUNNING",
                "Script is already running.",
            ));
        }
        Ok(())
    }
}

use std::sync::Arc;

use tracing::{debug, info, warn};
use wa_core::{AutomationError, CommandKind, CommandOutcome, ElementAction, Locator, PressKey};
use wa_driver::{ContentAnalyzer, DriverService, ElementHandle, TaggingStore, TextGenerator};
use wa_parser::{
    normalize_tag_name, parse_find_and_save, parse_pair, parse_save_to_variable, unquote,
    SaveValue,
};

use crate::{Resolution, TaggedResolver, VariableStore};

pub const NO_SESSION_MESSAGE: &str = "No active browser session. Navigate to a page first.";
const EMPTY_TEXT_MESSAGE: &str = "Element found but no text content";

/// Either arm carries the outcome to report; `Err` short-circuits a handler.
type Handled = Result<CommandOutcome, CommandOutcome>;

fn grammar_failure(error: AutomationError) -> CommandOutcome {
    CommandOutcome::failed(error.message)
}

/// Executes single commands against the collaborators. Owns the state that
/// commands share: the browser session handle and the variables.
pub struct Dispatcher {
    driver: Arc<dyn DriverService>,
    resolver: TaggedResolver,
    analyzer: Arc<dyn ContentAnalyzer>,
    text_generator: Arc<dyn TextGenerator>,
    session_id: String,
    session: Option<String>,
    variables: VariableStore,
}

impl Dispatcher {
    pub fn new(
        driver: Arc<dyn DriverService>,
        tagging_store: Arc<dyn TaggingStore>,
        analyzer: Arc<dyn ContentAnalyzer>,
        text_generator: Arc<dyn TextGenerator>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            resolver: TaggedResolver::new(tagging_store, driver.clone()),
            driver,
            analyzer,
            text_generator,
            session_id: session_id.into(),
            session: None,
            variables: VariableStore::new(),
        }
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn reset(&mut self) {
        self.session = None;
        self.variables.clear();
    }

    pub(crate) fn restore(&mut self, variables: VariableStore, session: Option<String>) {
        self.variables = variables;
        self.session = session;
    }

    /// Looks the keyword up case-insensitively and runs it. Unknown keywords
    /// come back as a failed outcome, never as an error.
    pub fn execute(&mut self, keyword: &str, raw_args: &str) -> CommandOutcome {
        let keyword = keyword.trim();
        let outcome = match CommandKind::from_keyword(keyword) {
            Some(kind) => self.execute_kind(kind, raw_args),
            None => CommandOutcome::failed(format!("Unknown command: {}", keyword)),
        };

        if outcome.is_success() {
            debug!(keyword, result = %outcome.message, "command dispatched");
        } else {
            warn!(keyword, result = %outcome.message, "command failed");
        }
        outcome
    }

    pub fn execute_kind(&mut self, kind: CommandKind, raw_args: &str) -> CommandOutcome {
        let handled = match kind {
            CommandKind::Navigate => self.navigate(raw_args),
            CommandKind::AskUser => Ok(CommandOutcome::ok(unquote(raw_args))),
            CommandKind::ClickXpath => self.click_xpath(raw_args),
            CommandKind::TypeXpath => self.type_xpath(raw_args),
            CommandKind::ClickTagged => self.click_tagged(raw_args),
            CommandKind::TypeTagged => self.type_tagged(raw_args),
            CommandKind::PressKeyTagged => self.press_key_tagged(raw_args),
            CommandKind::SaveToVariable => self.save_to_variable(raw_args),
            CommandKind::FindAndSave => self.find_and_save(raw_args),
            CommandKind::Screenshot => self.screenshot(raw_args),
            CommandKind::ReadXpath
            | CommandKind::ReadTagged
            | CommandKind::GenerateComment
            | CommandKind::ReadPage => self.produce_value(kind, raw_args).map(|value| {
                let element_read = matches!(kind, CommandKind::ReadXpath | CommandKind::ReadTagged);
                if element_read && value.is_empty() {
                    CommandOutcome::ok(EMPTY_TEXT_MESSAGE)
                } else {
                    CommandOutcome::ok(value)
                }
            }),
        };
        handled.unwrap_or_else(|failure| failure)
    }

    fn active_session(&self) -> Result<String, CommandOutcome> {
        self.session
            .clone()
            .ok_or_else(|| CommandOutcome::failed(NO_SESSION_MESSAGE))
    }

    fn xpath_element(&self, xpath: String) -> Result<ElementHandle, CommandOutcome> {
        Ok(ElementHandle {
            uid: self.active_session()?,
            locator: Locator::Xpath(xpath),
        })
    }

    /// Record lookup comes first so a missing tag is reported even before any
    /// page was opened.
    fn tagged_element(&self, tag: &str, verb: &str) -> Result<ElementHandle, CommandOutcome> {
        let fault = |error: wa_driver::DriverError| {
            CommandOutcome::failed(format!("Failed to {} tagged element {}: {}", verb, tag, error))
        };
        let not_found = || CommandOutcome::failed(format!("Tagged element not found: {}", tag));

        let record = self.resolver.find_record(tag).map_err(fault)?;
        let record = record.ok_or_else(not_found)?;
        let uid = self.active_session()?;
        match self.resolver.locate(&record, &uid).map_err(fault)? {
            Resolution::Found(element) => Ok(element),
            Resolution::NotFound { .. } => Err(not_found()),
        }
    }

    fn navigate(&mut self, raw_args: &str) -> Handled {
        let url = self.variables.resolve(&unquote(raw_args));
        if url.is_empty() {
            return Err(CommandOutcome::failed("NAVIGATE expects a URL"));
        }

        let uid = self
            .session
            .clone()
            .unwrap_or_else(|| self.session_id.clone());
        self.driver
            .navigate(&uid, &url)
            .map_err(|error| CommandOutcome::failed(format!("Navigation failed: {}", error)))?;

        if self.session.is_some() {
            return Ok(CommandOutcome::ok(format!("Navigated to {}", url)));
        }
        info!(uid = %uid, "browser session opened");
        self.session = Some(uid.clone());
        Ok(CommandOutcome::ok(format!(
            "Opened session {} and navigated to {}",
            uid, url
        )))
    }

    fn click_xpath(&self, raw_args: &str) -> Handled {
        let xpath = unquote(raw_args);
        let element = self.xpath_element(xpath.clone())?;
        self.driver
            .act(&element, &ElementAction::Click)
            .map_err(|error| CommandOutcome::failed(format!("Failed to click: {}", error)))?;
        Ok(CommandOutcome::ok(format!("Clicked element at {}", xpath)))
    }

    fn type_xpath(&self, raw_args: &str) -> Handled {
        let (xpath, text) =
            parse_pair(raw_args, CommandKind::TypeXpath.keyword()).map_err(grammar_failure)?;
        let text = self.variables.resolve(&text);
        let element = self.xpath_element(xpath.clone())?;
        self.driver
            .act(&element, &ElementAction::Fill(vec![text.clone()]))
            .map_err(|error| CommandOutcome::failed(format!("Failed to type: {}", error)))?;
        Ok(CommandOutcome::ok(format!(
            "Typed '{}' into element at {}",
            text, xpath
        )))
    }

    fn click_tagged(&self, raw_args: &str) -> Handled {
        let tag = normalize_tag_name(&unquote(raw_args));
        let element = self.tagged_element(&tag, "click")?;
        self.driver
            .act(&element, &ElementAction::Click)
            .map_err(|error| {
                CommandOutcome::failed(format!("Failed to click tagged element {}: {}", tag, error))
            })?;
        Ok(CommandOutcome::ok(format!("Clicked tagged element {}", tag)))
    }

    fn type_tagged(&self, raw_args: &str) -> Handled {
        let (tag, text) =
            parse_pair(raw_args, CommandKind::TypeTagged.keyword()).map_err(grammar_failure)?;
        let tag = normalize_tag_name(&tag);
        let text = self.variables.resolve(&text);
        let element = self.tagged_element(&tag, "type into")?;
        self.driver
            .act(&element, &ElementAction::Fill(vec![text.clone()]))
            .map_err(|error| {
                CommandOutcome::failed(format!(
                    "Failed to type into tagged element {}: {}",
                    tag, error
                ))
            })?;
        Ok(CommandOutcome::ok(format!(
            "Typed '{}' into tagged element {}",
            text, tag
        )))
    }

    fn press_key_tagged(&self, raw_args: &str) -> Handled {
        let (tag, key) = parse_pair(raw_args, CommandKind::PressKeyTagged.keyword())
            .map_err(grammar_failure)?;
        let tag = normalize_tag_name(&tag);
        let key = PressKey::parse(&key)
            .ok_or_else(|| CommandOutcome::failed(format!("Unsupported key: {}", key)))?;
        let element = self.tagged_element(&tag, "press a key on")?;
        self.driver.press_key(&element, key).map_err(|error| {
            CommandOutcome::failed(format!(
                "Failed to press {} on tagged element {}: {}",
                key.name(),
                tag,
                error
            ))
        })?;
        Ok(CommandOutcome::ok(format!(
            "Pressed {} on tagged element {}",
            key.name(),
            tag
        )))
    }

    /// The raw value of a value-producing command, as `SAVE_TO_VARIABLE`
    /// stores it.
    fn produce_value(&self, kind: CommandKind, raw_args: &str) -> Result<String, CommandOutcome> {
        match kind {
            CommandKind::ReadXpath => {
                let element = self.xpath_element(unquote(raw_args))?;
                self.driver
                    .act(&element, &ElementAction::Read)
                    .map(Option::unwrap_or_default)
                    .map_err(|error| {
                        CommandOutcome::failed(format!("Failed to read xpath: {}", error))
                    })
            }
            CommandKind::ReadTagged => {
                let tag = normalize_tag_name(&unquote(raw_args));
                let element = self.tagged_element(&tag, "read")?;
                self.driver
                    .act(&element, &ElementAction::Read)
                    .map(Option::unwrap_or_default)
                    .map_err(|error| {
                        CommandOutcome::failed(format!(
                            "Failed to read tagged element {}: {}",
                            tag, error
                        ))
                    })
            }
            CommandKind::GenerateComment => {
                let context = self.variables.resolve(&unquote(raw_args));
                Ok(self.text_generator.generate(&context))
            }
            CommandKind::ReadPage => {
                let uid = self.active_session()?;
                self.driver.readable_text(&uid).map_err(|error| {
                    CommandOutcome::failed(format!("Failed to read page: {}", error))
                })
            }
            other => Err(CommandOutcome::failed(format!(
                "{} does not produce a value",
                other.keyword()
            ))),
        }
    }

    fn save_to_variable(&mut self, raw_args: &str) -> Handled {
        let target = parse_save_to_variable(raw_args).map_err(grammar_failure)?;
        match target.value {
            SaveValue::Literal(value) => {
                let message = format!("Saved '{}' to variable '{}'", value, target.variable);
                self.variables.set(target.variable, value);
                Ok(CommandOutcome::ok(message))
            }
            SaveValue::Nested { kind, args } => {
                let value = self.produce_value(kind, &args).map_err(|failure| {
                    CommandOutcome::failed(format!(
                        "Failed to save variable {}: {}",
                        target.variable, failure.message
                    ))
                })?;
                let message = format!("Saved value to variable {}", target.variable);
                self.variables.set(target.variable, value);
                Ok(CommandOutcome::ok(message))
            }
        }
    }

    fn find_and_save(&mut self, raw_args: &str) -> Handled {
        let args = parse_find_and_save(raw_args).map_err(grammar_failure)?;
        let url = self.variables.resolve(&args.url);
        let query = self.variables.resolve(&args.query);
        let result = self.analyzer.find_element(&url, &query).map_err(|error| {
            CommandOutcome::failed(format!(
                "Failed to find element for query {}: {}",
                query, error
            ))
        })?;

        let value = match result.value {
            Some(value) if result.found => value,
            _ => {
                return Err(CommandOutcome::failed(format!(
                    "Element not found for query: {}",
                    query
                )))
            }
        };
        let message = format!("Saved '{}' to variable '{}'", value, args.variable);
        self.variables.set(args.variable, value);
        Ok(CommandOutcome::ok(message))
    }

    fn screenshot(&self, raw_args: &str) -> Handled {
        let path = self.variables.resolve(&unquote(raw_args));
        if path.is_empty() {
            return Err(CommandOutcome::failed("SCREENSHOT expects a file path"));
        }
        let uid = self.active_session()?;
        let png = self.driver.screenshot(&uid).map_err(|error| {
            CommandOutcome::failed(format!("Failed to take screenshot: {}", error))
        })?;
        std::fs::write(&path, &png).map_err(|error| {
            CommandOutcome::failed(format!("Failed to save screenshot to {}: {}", path, error))
        })?;
        Ok(CommandOutcome::ok(format!(
            "Saved screenshot ({} bytes) to {}",
            png.len(),
            path
        )))
    }
}

mod host;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub use host::EngineHost;

use wa_core::{supported_commands, AutomationError, CommandKind, EngineSnapshot};
use wa_driver::{
    DriverFixture, DriverService, HttpDriverClient, InMemoryDriver, InMemoryTaggingStore,
    TaggingStore,
};
use wa_runtime::{AutomationEngine, AutomationEngineOptions};

/// Where browser commands go.
#[derive(Debug, Clone)]
pub enum DriverConfig {
    Http { base_url: String, timeout: Duration },
    Fixture(DriverFixture),
}

#[derive(Debug, Clone)]
pub struct CreateEngineOptions {
    pub driver: DriverConfig,
    pub session_id: Option<String>,
    pub script: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResumeEngineOptions {
    pub driver: DriverConfig,
    pub session_id: Option<String>,
    pub snapshot: EngineSnapshot,
}

pub fn connect_driver(
    config: &DriverConfig,
) -> Result<(Arc<dyn DriverService>, Arc<dyn TaggingStore>), AutomationError> {
    match config {
        DriverConfig::Http { base_url, timeout } => {
            let client = HttpDriverClient::new(base_url, *timeout)
                .map_err(|error| AutomationError::new("API_DRIVER_INIT", error.to_string()))?;
            let client = Arc::new(client);
            let driver: Arc<dyn DriverService> = client.clone();
            let store: Arc<dyn TaggingStore> = client;
            Ok((driver, store))
        }
        DriverConfig::Fixture(fixture) => {
            let driver: Arc<dyn DriverService> = Arc::new(InMemoryDriver::new(fixture.clone()));
            let store: Arc<dyn TaggingStore> =
                Arc::new(InMemoryTaggingStore::new(fixture.tags.clone()));
            Ok((driver, store))
        }
    }
}

pub fn load_fixture(path: &Path) -> Result<DriverFixture, AutomationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        AutomationError::new(
            "API_FIXTURE_READ",
            format!("Failed to read fixture \"{}\": {}", path.display(), error),
        )
    })?;
    serde_json::from_str(&raw).map_err(|error| {
        AutomationError::new(
            "API_FIXTURE_PARSE",
            format!("Failed to parse fixture \"{}\": {}", path.display(), error),
        )
    })
}

fn engine_for(
    driver: &DriverConfig,
    session_id: Option<String>,
) -> Result<AutomationEngine, AutomationError> {
    let (driver, tagging_store) = connect_driver(driver)?;
    AutomationEngine::new(AutomationEngineOptions {
        driver,
        tagging_store,
        analyzer: None,
        text_generator: None,
        session_id,
    })
}

pub fn create_engine(options: CreateEngineOptions) -> Result<AutomationEngine, AutomationError> {
    let mut engine = engine_for(&options.driver, options.session_id)?;
    if let Some(script) = options.script {
        engine.load_script(&script);
    }
    Ok(engine)
}

pub fn resume_engine(options: ResumeEngineOptions) -> Result<AutomationEngine, AutomationError> {
    let mut engine = engine_for(&options.driver, options.session_id)?;
    engine.resume(options.snapshot)?;
    Ok(engine)
}

pub fn list_supported_commands() -> BTreeMap<String, Vec<String>> {
    supported_commands()
}

/// Formats builder parameter values into a script line for `keyword`.
pub fn build_command(keyword: &str, values: &[String]) -> Result<String, AutomationError> {
    let kind = CommandKind::from_keyword(keyword).ok_or_else(|| {
        AutomationError::new(
            "API_UNKNOWN_COMMAND",
            format!("Unknown command: {}", keyword.trim()),
        )
    })?;
    wa_parser::build_command_line(kind, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::{SystemTime, UNIX_EPOCH};

    use wa_core::ExecutionState;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("wa-api-{}-{}", nanos, name))
    }

    fn fixture_options(script: &str) -> CreateEngineOptions {
        CreateEngineOptions {
            driver: DriverConfig::Fixture(DriverFixture::default()),
            session_id: None,
            script: Some(script.to_string()),
        }
    }

    #[test]
    fn create_engine_loads_the_script() {
        let mut engine = create_engine(fixture_options("ASK_USER \"go?\"")).expect("engine");
        assert_eq!(engine.get_script(), "ASK_USER \"go?\"");
        let report = engine.run().expect("run should pass");
        assert_eq!(report.prompt.as_deref(), Some("go?"));
    }

    #[test]
    fn resume_engine_restores_a_paused_run() {
        let mut engine =
            create_engine(fixture_options("SAVE_TO_VARIABLE x 1\nASK_USER wait\nSAVE_TO_VARIABLE y 2"))
                .expect("engine");
        engine.run().expect("run should pass");
        let snapshot = engine.snapshot().expect("snapshot should pass");

        let mut resumed = resume_engine(ResumeEngineOptions {
            driver: DriverConfig::Fixture(DriverFixture::default()),
            session_id: None,
            snapshot,
        })
        .expect("resume should pass");
        assert_eq!(resumed.state(), ExecutionState::WaitingForUser);
        resumed.confirm().expect("confirm should pass");
        assert_eq!(resumed.variables().len(), 2);
    }

    #[test]
    fn http_driver_config_builds_without_contacting_the_service() {
        let engine = create_engine(CreateEngineOptions {
            driver: DriverConfig::Http {
                base_url: "http://127.0.0.1:9".to_string(),
                timeout: Duration::from_secs(1),
            },
            session_id: Some("cli".to_string()),
            script: None,
        })
        .expect("engine should build");
        assert_eq!(engine.get_script(), "");
        assert_eq!(engine.session_uid(), None);
    }

    #[test]
    fn load_fixture_reports_read_and_parse_errors() {
        let missing = load_fixture(&temp_path("missing.json")).expect_err("missing file");
        assert_eq!(missing.code, "API_FIXTURE_READ");

        let path = temp_path("broken.json");
        fs::write(&path, "{ not json").expect("write fixture");
        let broken = load_fixture(&path).expect_err("broken file");
        assert_eq!(broken.code, "API_FIXTURE_PARSE");

        fs::write(&path, r#"{"tags":[{"tagName":"a","markup":"<a id=\"x\">x</a>"}]}"#)
            .expect("write fixture");
        let fixture = load_fixture(&path).expect("fixture should parse");
        assert_eq!(fixture.tags.len(), 1);
        fs::remove_file(path).expect("cleanup should succeed");
    }

    #[test]
    fn build_command_formats_builder_values() {
        let line = build_command(
            "type_xpath",
            &["//input[@name='q']".to_string(), "rust".to_string()],
        )
        .expect("line should build");
        assert_eq!(line, "TYPE_XPATH \"//input[@name='q']\" \"rust\"");

        let error = build_command("JUMP", &[]).expect_err("unknown keyword");
        assert_eq!(error.code, "API_UNKNOWN_COMMAND");
        assert_eq!(list_supported_commands().len(), 14);
    }
}

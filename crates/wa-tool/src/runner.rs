use std::collections::BTreeMap;
use std::path::Path;

use wa_api::{create_engine, CreateEngineOptions, DriverConfig};
use wa_core::RunReport;

use crate::source::{read_fixture, read_script, read_test_case};
use crate::{ExpectedEvent, TestAction, TestCase, WaToolError};

const MAX_PAUSES: usize = 1_000;
const CASE_SESSION: &str = "wa-tool";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
    pub observed_events: Vec<ExpectedEvent>,
    pub consumed_actions: usize,
    pub variables: BTreeMap<String, String>,
}

fn record(report: &RunReport, events: &mut Vec<ExpectedEvent>) {
    events.extend(report.log.iter().map(|entry| ExpectedEvent::Result {
        line: entry.line_number,
        result: entry.result.clone(),
        ok: entry.ok,
    }));
    if let Some(prompt) = &report.prompt {
        events.push(ExpectedEvent::Waiting {
            prompt: prompt.clone(),
        });
    }
}

pub fn run_case(case_dir: &Path, case: &TestCase) -> Result<CaseReport, WaToolError> {
    let script = read_script(case_dir, case)?;
    let fixture = read_fixture(case_dir, case)?;
    let mut engine = create_engine(CreateEngineOptions {
        driver: DriverConfig::Fixture(fixture),
        session_id: Some(CASE_SESSION.to_string()),
        script: Some(script),
    })?;

    let mut observed_events = Vec::new();
    let mut action_index = 0usize;
    let mut report = engine.run()?;

    for _ in 0..=MAX_PAUSES {
        record(&report, &mut observed_events);

        if !report.waiting_for_user {
            observed_events.push(ExpectedEvent::Completed);
            return finish(case, observed_events, action_index, engine.variables());
        }

        let action = case
            .actions
            .get(action_index)
            .ok_or(WaToolError::MissingAction {
                event_index: observed_events.len() - 1,
            })?;
        action_index += 1;
        match action {
            TestAction::Confirm => report = engine.confirm()?,
            TestAction::Stop => {
                engine.stop()?;
                observed_events.push(ExpectedEvent::Stopped);
                return finish(case, observed_events, action_index, engine.variables());
            }
        }
    }

    Err(WaToolError::GuardExceeded {
        max_pauses: MAX_PAUSES,
    })
}

fn finish(
    case: &TestCase,
    observed_events: Vec<ExpectedEvent>,
    action_index: usize,
    variables: BTreeMap<String, String>,
) -> Result<CaseReport, WaToolError> {
    if action_index != case.actions.len() {
        return Err(WaToolError::UnusedActions {
            used: action_index,
            total: case.actions.len(),
        });
    }
    Ok(CaseReport {
        observed_events,
        consumed_actions: action_index,
        variables,
    })
}

pub fn assert_case(case_dir: &Path, case_path: &Path) -> Result<CaseReport, WaToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(case_dir, &case)?;

    if report.observed_events.len() != case.expected_events.len() {
        let observed = serde_json::to_string_pretty(&report.observed_events)
            .map_err(WaToolError::EventSerialize)?;
        return Err(WaToolError::EventCountMismatch {
            expected: case.expected_events.len(),
            actual: report.observed_events.len(),
            observed,
        });
    }

    for (index, (expected, actual)) in case
        .expected_events
        .iter()
        .zip(report.observed_events.iter())
        .enumerate()
    {
        if expected != actual {
            let expected = serde_json::to_string(expected).map_err(WaToolError::EventSerialize)?;
            let actual = serde_json::to_string(actual).map_err(WaToolError::EventSerialize)?;
            return Err(WaToolError::EventMismatch {
                index,
                expected,
                actual,
            });
        }
    }

    Ok(report)
}

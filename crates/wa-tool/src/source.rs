use std::fs;
use std::path::{Path, PathBuf};

use wa_driver::DriverFixture;
use walkdir::WalkDir;

use crate::{TestCase, WaToolError, TESTCASE_SCHEMA_V1};

pub const TESTCASE_FILE: &str = "testcase.json";

fn read_file(path: &Path) -> Result<String, WaToolError> {
    fs::read_to_string(path).map_err(|source| WaToolError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, WaToolError> {
    let raw = read_file(case_path)?;
    let parsed: TestCase = serde_json::from_str(&raw).map_err(|source| WaToolError::ParseCase {
        path: case_path.to_path_buf(),
        source,
    })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(WaToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}

pub(crate) fn read_script(case_dir: &Path, case: &TestCase) -> Result<String, WaToolError> {
    read_file(&case_dir.join(&case.script))
}

pub(crate) fn read_fixture(case_dir: &Path, case: &TestCase) -> Result<DriverFixture, WaToolError> {
    let path = case_dir.join(&case.fixture);
    let raw = read_file(&path)?;
    serde_json::from_str(&raw).map_err(|source| WaToolError::ParseFixture { path, source })
}

/// Directories under `root` holding a `testcase.json`, sorted.
pub fn discover_cases(root: &Path) -> Result<Vec<PathBuf>, WaToolError> {
    let mut dirs = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == TESTCASE_FILE)
        .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
        .collect::<Vec<_>>();

    if dirs.is_empty() {
        return Err(WaToolError::CasesEmpty {
            path: root.to_path_buf(),
            file: TESTCASE_FILE.to_string(),
        });
    }

    dirs.sort();
    Ok(dirs)
}

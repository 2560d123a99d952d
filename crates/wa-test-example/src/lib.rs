use std::path::PathBuf;

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

pub fn demos_root() -> PathBuf {
    workspace_root().join("demos")
}

pub fn demo_dir(name: &str) -> PathBuf {
    demos_root().join(name)
}

pub fn testcase_path(name: &str) -> PathBuf {
    demo_dir(name).join(wa_tool::TESTCASE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_root_points_to_workspace() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn demo_dir_joins_name() {
        assert!(demo_dir("01-navigate-and-read").is_dir());
        assert!(testcase_path("01-navigate-and-read").ends_with("testcase.json"));
    }

    #[test]
    fn every_demo_matches_its_testcase() {
        let dirs = wa_tool::discover_cases(&demos_root()).expect("demos should be discovered");
        assert!(dirs.len() >= 5, "expected the bundled demos");

        for dir in dirs {
            let case_path = dir.join(wa_tool::TESTCASE_FILE);
            if let Err(error) = wa_tool::assert_case(&dir, &case_path) {
                panic!("demo {} failed: {}", dir.display(), error);
            }
        }
    }
}

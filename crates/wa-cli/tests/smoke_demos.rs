use std::fs;
use std::process::Command;

#[test]
fn agent_run_starts_every_demo() {
    let bin = env!("CARGO_BIN_EXE_wa-cli");
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let demos_root = manifest_dir.join("..").join("..").join("demos");

    let mut directories = fs::read_dir(&demos_root)
        .expect("demos root must exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    directories.sort();

    assert!(!directories.is_empty(), "expected bundled demos");

    for directory in directories {
        let state_out = std::env::temp_dir().join(format!(
            "wa-cli-smoke-{}.json",
            directory.file_name().unwrap_or_default().to_string_lossy()
        ));

        let output = Command::new(bin)
            .arg("--fixture")
            .arg(directory.join("fixture.json"))
            .arg("agent")
            .arg("run")
            .arg("--script")
            .arg(directory.join("main.wa"))
            .arg("--state-out")
            .arg(&state_out)
            .output()
            .expect("cli should execute");

        if !output.status.success() {
            panic!(
                "demo {} failed\nstdout:\n{}\nstderr:\n{}",
                directory.display(),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains("RESULT:OK"),
            "stdout missing RESULT:OK for {}",
            directory.display()
        );
        assert!(
            stdout.contains("LOG_JSON:"),
            "stdout missing LOG_JSON for {}",
            directory.display()
        );
        assert!(state_out.exists(), "state missing for {}", directory.display());
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cdeploy_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("cdeploy");
    path
}

/// Write a config with both environments pointing at a closed local port.
fn setup_test_env(content_type: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r##"mode = "deploy"

[from]
base_url = "http://127.0.0.1:9/api/4.0"
client_id = "source-id"
client_secret = "source-secret"
folder_id = 42

[to]
base_url = "http://127.0.0.1:9/api/4.0"
client_id = "dest-id"
"#client_secret" = "dest-secret"
type = "{}"
value = ["Shared/Sales/Weekly"]
target_folder = 7

[paths]
export_dir = "{root}/data/exports"
ini_file = "{root}/data/looker.ini"
output_dir = "{root}/data/out"

[tool]
program = "ldeploy-not-installed"

[http]
timeout_secs = 2
"##,
        content_type,
        root = root.display()
    );

    let config_path = config_dir.join("deploy.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_cdeploy(config_path: &Path, args: &[&str]) -> (String, String, Option<i32>) {
    let binary = cdeploy_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("--progress")
        .arg("off")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run cdeploy binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code())
}

#[test]
fn test_ini_writes_both_sections() {
    let (tmp, config_path) = setup_test_env("dashboards");

    let (stdout, stderr, code) = run_cdeploy(&config_path, &["ini"]);
    assert_eq!(code, Some(0), "ini failed: stdout={}, stderr={}", stdout, stderr);

    let ini = fs::read_to_string(tmp.path().join("data/looker.ini")).unwrap();
    assert!(ini.contains("[from]\nbase_url=http://127.0.0.1:9/api/4.0"));
    assert!(ini.contains("client_secret=dest-secret"));
}

#[test]
fn test_unsupported_type_exits_with_precondition_code() {
    let (tmp, config_path) = setup_test_env("reports");

    let (_stdout, stderr, code) = run_cdeploy(&config_path, &["deploy"]);
    assert_eq!(code, Some(1), "stderr={}", stderr);
    assert!(stderr.contains("reports"));
    assert!(!tmp.path().join("data/out/deploy_log.csv").exists());
    assert!(!tmp.path().join("data/looker.ini").exists());
}

#[test]
fn test_run_uses_configured_mode() {
    let (_tmp, config_path) = setup_test_env("reports");

    let (_stdout, stderr, code) = run_cdeploy(&config_path, &["run"]);
    assert_eq!(code, Some(1), "stderr={}", stderr);
    assert!(stderr.contains("to.type"));
}

#[test]
fn test_missing_config_exits_with_precondition_code() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("missing.toml");

    let (_stdout, stderr, code) = run_cdeploy(&config_path, &["deploy"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("Configuration error"));
}

#[test]
fn test_malformed_config_exits_with_precondition_code() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("deploy.toml");
    fs::write(&config_path, "mode = \"sideways\"\n").unwrap();

    let (_stdout, _stderr, code) = run_cdeploy(&config_path, &["deploy"]);
    assert_eq!(code, Some(1));
}

#[test]
fn test_fetch_details_without_credentials() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("deploy.toml");
    fs::write(
        &config_path,
        format!(
            "mode = \"fetch_details\"\n[paths]\noutput_dir = \"{}/out\"\n",
            tmp.path().display()
        ),
    )
    .unwrap();

    let (_stdout, stderr, code) = run_cdeploy(&config_path, &["run"]);
    assert_eq!(code, Some(1), "stderr={}", stderr);
    assert!(stderr.contains("at least one"));
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn test_unreachable_source_fails_authorization() {
    let (tmp, config_path) = setup_test_env("dashboards");

    let (_stdout, stderr, code) = run_cdeploy(&config_path, &["deploy"]);
    assert_eq!(code, Some(1), "stderr={}", stderr);
    assert!(stderr.contains("Authorization against 'from' failed"));
    assert!(!tmp.path().join("data/out/deploy_log.csv").exists());
}

#[test]
fn test_help_lists_commands() {
    let output = Command::new(cdeploy_binary())
        .arg("--help")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for cmd in ["run", "deploy", "fetch-details", "check", "ini"] {
        assert!(stdout.contains(cmd), "missing {} in help", cmd);
    }
}

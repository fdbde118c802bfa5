use assert_cmd::Command;
use std::path::Path;

fn gendeps(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gendeps").unwrap();
    cmd.arg("--root").arg(root).env_remove("GENDEPS_ROOT");
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_unsupported_platform_notice_and_exit_prompt() {
    let root = tempfile::tempdir().unwrap();
    let output = gendeps(root.path())
        .args(["--platform", "other"])
        .write_stdin("\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Unsupported platform"));
    assert!(stdout.contains("Press Enter to exit..."));
}

#[test]
fn test_linux_declined_runs_nothing() {
    let root = tempfile::tempdir().unwrap();
    let output = gendeps(root.path())
        .args(["--platform", "linux"])
        .write_stdin("n\n\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Install dependencies? (y/N): "));
    assert!(!stdout.contains("apt"));
    assert!(stdout.contains("Press Enter to exit..."));
}

#[test]
fn test_windows_dry_run_prints_plan() {
    let root = tempfile::tempdir().unwrap();
    let output = gendeps(root.path())
        .args(["--platform", "windows", "--dry-run", "--yes", "--no-pause"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Run dependency installation? (y/n): y"));
    assert!(stdout.contains("[dry-run] conan install -if build/deps/Release"));
    assert!(stdout.contains("[dry-run] conan install -if build/deps/RelWithDebInfo"));
    assert!(stdout.contains("compiler.runtime=MDd --build=* tools"));
    assert!(stdout.contains("[dry-run] premake5 vs2019"));
    assert!(!stdout.contains("Press Enter"));

    let install = stdout.find("build/deps/Debug").unwrap();
    let generate = stdout.find("premake5 vs2019").unwrap();
    assert!(install < generate);
}

#[test]
fn test_root_config_file_and_report() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(
        root.path().join("gendeps.toml"),
        "[[linux.install]]\ncommand = [\"pkg\", \"add\"]\npackages = [\"glfw\"]\n",
    )
    .unwrap();
    let report_path = root.path().join("out").join("report.toml");

    let output = gendeps(root.path())
        .args(["--platform", "linux", "--dry-run", "--report"])
        .arg(&report_path)
        .write_stdin("y\n\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("[dry-run] pkg add glfw"));
    assert!(!stdout.contains("sudo"));

    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("platform = \"linux\""));
    assert!(report.contains("pkg add glfw"));
}

#[test]
fn test_invalid_config_fails() {
    let root = tempfile::tempdir().unwrap();
    let config = root.path().join("broken.toml");
    std::fs::write(&config, "[windows]\nconfigurations = [\"Fast\"]\n").unwrap();

    let output = gendeps(root.path())
        .args(["--platform", "windows", "--config"])
        .arg(&config)
        .write_stdin("\n\n\n")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config"));
}

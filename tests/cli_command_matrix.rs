use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

fn run_help(dir: &TempDir, args: &[&str]) {
    let mut cmd = cargo_bin_cmd!("migline");
    cmd.current_dir(dir.path())
        .args(args)
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn every_cli_command_has_help_path() {
    // no migline.toml here; help must not need one
    let dir = TempDir::new().expect("temp dir");

    run_help(&dir, &[]);
    run_help(&dir, &["check"]);
    run_help(&dir, &["create-markers"]);
    run_help(&dir, &["rebase"]);
}

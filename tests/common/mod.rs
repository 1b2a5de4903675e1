#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway project: `migline.toml` plus one package per app under `root`.
pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new(labels: &[&str]) -> Self {
        Self::with_settings(labels, "")
    }

    /// `extra` goes at the top of the generated settings file.
    pub fn with_settings(labels: &[&str], extra: &str) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("project");
        fs::create_dir_all(&root).expect("create project dir");

        let mut settings = format!("{extra}\n");
        for label in labels {
            let dir = root.join(label).join("migrations");
            fs::create_dir_all(&dir).expect("create migrations dir");
            fs::write(dir.join("__init__.py"), "").expect("write __init__.py");
            settings.push_str(&format!("[[apps]]\nlabel = \"{label}\"\npath = \"{label}\"\n\n"));
        }
        if !extra.contains("[rebase]") {
            settings.push_str("[rebase]\nformatter = []\n");
        }
        fs::write(root.join("migline.toml"), settings).expect("write settings");

        Self { _tmp: tmp, root }
    }

    pub fn migrations(&self, label: &str) -> PathBuf {
        self.root.join(label).join("migrations")
    }

    pub fn write_migration(&self, label: &str, name: &str, deps: &[(&str, &str)]) {
        fs::write(
            self.migrations(label).join(format!("{name}.py")),
            migration_source(deps),
        )
        .expect("write migration");
    }

    pub fn write_marker(&self, label: &str, content: &str) {
        fs::write(self.migrations(label).join("max_migration.txt"), content)
            .expect("write marker");
    }

    pub fn marker(&self, label: &str) -> Option<String> {
        fs::read_to_string(self.migrations(label).join("max_migration.txt")).ok()
    }

    pub fn read(&self, label: &str, file: &str) -> String {
        fs::read_to_string(self.migrations(label).join(file)).expect("read migration")
    }

    pub fn exists(&self, label: &str, file: &str) -> bool {
        self.migrations(label).join(file).exists()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("migline");
        cmd.current_dir(&self.root).env_remove("MIGLINE_LOG");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// Like `run_json` but for commands that exit non-zero.
    pub fn run_json_failing(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}

pub fn migration_source(deps: &[(&str, &str)]) -> String {
    let deps: String = deps
        .iter()
        .map(|(app, name)| format!("        (\"{app}\", \"{name}\"),\n"))
        .collect();
    format!(
        "from django.db import migrations\n\n\nclass Migration(migrations.Migration):\n    dependencies = [\n{deps}    ]\n\n    operations = []\n"
    )
}

/// `blog` with `0001_initial` and two children that both claim to be `0002`.
pub fn conflicted_blog(env: &TestEnv) {
    env.write_migration("blog", "0001_initial", &[]);
    env.write_migration("blog", "0002_author_nicknames", &[("blog", "0001_initial")]);
    env.write_migration("blog", "0002_longer_titles", &[("blog", "0001_initial")]);
}

pub fn conflict_block(ours: &str, theirs: &str) -> String {
    format!("<<<<<<< HEAD\n{ours}\n=======\n{theirs}\n>>>>>>> 123456789 (Other branch)\n")
}

pub fn path_str(p: &Path) -> &str {
    p.to_str().expect("utf8 path")
}

use std::path::Path;
use std::process::{Command, Stdio};

pub trait MergeProbe {
    fn merge_in_progress(&self, dir: &Path) -> bool;
}

pub struct GitProbe;

impl MergeProbe for GitProbe {
    fn merge_in_progress(&self, dir: &Path) -> bool {
        let out = Command::new("git")
            .args(["rev-parse", "-q", "--verify", "MERGE_HEAD"])
            .current_dir(dir)
            .stdin(Stdio::null())
            .output();
        match out {
            Ok(out) => out.status.success(),
            Err(e) => {
                tracing::warn!(error = %e, "could not run git, assuming a rebase");
                false
            }
        }
    }
}

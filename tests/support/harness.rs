use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use super::fixtures::load_fixture;

/// A throwaway project directory with a `.strata/architecture.md` config.
pub struct ProjectHarness {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl ProjectHarness {
    /// Project with the layered fixture as `deps.yaml` and the given frontmatter.
    pub fn new(frontmatter: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let strata_dir = dir.path().join(".strata");
        fs::create_dir_all(&strata_dir).expect("Failed to create .strata dir");

        fs::write(dir.path().join("deps.yaml"), load_fixture("layered.yaml"))
            .expect("Failed to write manifest");

        let config_path = strata_dir.join("architecture.md");
        let config = format!("---\n{}---\n\n# Architecture\n", frontmatter);
        fs::write(&config_path, config).expect("Failed to write config");

        Self { dir, config_path }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Run the strata binary inside the project directory.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_strata"))
            .args(args)
            .current_dir(self.dir.path())
            .env_remove("STRATA_LOG")
            .output()
            .expect("Failed to run strata")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

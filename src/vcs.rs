//! Version-control gateway backed by the `git` command-line tool.

use crate::error::GrittyError;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info};

// =============================================================================
// Traits for Dependency Injection
// =============================================================================

/// The three repository operations the commit flow needs.
pub trait VersionControl {
    /// Whether the working directory is inside a repository.
    ///
    /// Fails only when the tool itself cannot be run.
    fn is_repository(&self) -> Result<bool, GrittyError>;

    /// The staged changes as diff text; may be empty.
    fn staged_diff(&self) -> Result<String, GrittyError>;

    /// Records a commit with `message`, returning the tool's output.
    fn commit(&self, message: &str) -> Result<String, GrittyError>;
}

/// Trait for running system processes.
pub trait ProcessRunner {
    /// Executes `program` with `args` in `dir` and returns its output.
    fn run(&self, program: &str, args: &[&str], dir: &Path) -> std::io::Result<Output>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str], dir: &Path) -> std::io::Result<Output> {
        Command::new(program).args(args).current_dir(dir).output()
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

// =============================================================================
// Git implementation
// =============================================================================

/// [`VersionControl`] over the `git` binary.
pub struct GitCli<P: ProcessRunner = SystemProcessRunner> {
    dir: PathBuf,
    runner: P,
}

impl GitCli {
    /// Gateway for the given working directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_runner(dir, SystemProcessRunner)
    }
}

impl<P: ProcessRunner> GitCli<P> {
    pub fn with_runner(dir: impl Into<PathBuf>, runner: P) -> Self {
        Self {
            dir: dir.into(),
            runner,
        }
    }

    fn git(&self, args: &[&str]) -> Result<Output, GrittyError> {
        if !self.runner.program_exists("git") {
            return Err(GrittyError::GitUnavailable);
        }
        debug!("Running git {:?} in {}", args, self.dir.display());
        self.runner
            .run("git", args, &self.dir)
            .map_err(|source| GrittyError::GitInvocation { source })
    }

    fn combined_output(output: &Output) -> String {
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        text.trim().to_string()
    }
}

impl<P: ProcessRunner> VersionControl for GitCli<P> {
    fn is_repository(&self) -> Result<bool, GrittyError> {
        let output = self.git(&["rev-parse", "--is-inside-work-tree"])?;
        Ok(output.status.success())
    }

    fn staged_diff(&self) -> Result<String, GrittyError> {
        let output = self
            .git(&["diff", "--staged"])
            .map_err(|e| GrittyError::StagedDiff(e.to_string()))?;

        if !output.status.success() {
            return Err(GrittyError::StagedDiff(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let diff = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Staged diff is {} bytes", diff.len());
        Ok(diff)
    }

    fn commit(&self, message: &str) -> Result<String, GrittyError> {
        let output = self.git(&["commit", "-m", message])?;
        let combined = Self::combined_output(&output);

        if !output.status.success() {
            return Err(GrittyError::CommitFailed { output: combined });
        }

        info!("Created commit in {}", self.dir.display());
        Ok(combined)
    }
}

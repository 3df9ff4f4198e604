//! Error types for gritty using thiserror.
//!
//! Every variant renders as a single human-readable line prefixed with the
//! step that failed, which is exactly what the binary prints before exiting.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the `init` and `commit` flows.
#[derive(Error, Debug)]
pub enum GrittyError {
    #[error("No configuration file found at {path}. Please run 'gritty init' to set up your configuration.")]
    ConfigMissing { path: PathBuf },

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("error reading configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error saving configuration: {0}")]
    ConfigWrite(String),

    #[error("error setting permissions on {path}: {source}")]
    FilePermission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine the user's home directory")]
    HomeDirUnavailable,

    #[error("current directory is not a Git repository")]
    NotARepository,

    #[error("git executable not found in PATH")]
    GitUnavailable,

    #[error("error running git: {source}")]
    GitInvocation {
        #[source]
        source: std::io::Error,
    },

    #[error("error getting staged diff: {0}")]
    StagedDiff(String),

    #[error("error creating commit: {output}")]
    CommitFailed { output: String },

    #[error("error getting commit messages: request failed: {0}")]
    Network(String),

    #[error("error getting commit messages: credential rejected (status {status})")]
    Auth { status: u16 },

    /// `summary` is a single line derived from the response body.
    #[error("error getting commit messages: api request failed with status code {status}: {summary}")]
    Upstream { status: u16, summary: String },

    #[error("error getting commit messages: could not encode request: {0}")]
    RequestEncoding(String),

    #[error("error getting commit messages: could not parse response: {0}")]
    MalformedResponse(String),

    #[error("error getting commit messages: no candidates in response")]
    EmptyResult,

    #[error("provider '{0}' is already registered")]
    DuplicateProvider(String),

    #[error("provider '{0}' not found")]
    ProviderNotFound(String),

    #[error("error prompting for provider config: {0} cannot be empty")]
    EmptyInput(&'static str),

    #[error("invalid selection, please enter a number between 1 and {max}")]
    InvalidChoice { max: usize },

    #[error("error reading input: {0}")]
    Input(#[source] std::io::Error),
}

impl GrittyError {
    /// True when the failure happened before any network traffic, i.e. it is a
    /// local setup problem the user fixes by rerunning `gritty init`.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing { .. }
                | Self::ConfigInvalid(_)
                | Self::ConfigRead { .. }
                | Self::ProviderNotFound(_)
        )
    }
}

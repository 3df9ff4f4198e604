//! The two user-facing operations, `init` and `commit`.
//!
//! Both flows are strictly sequential and single-shot: nothing is retried and
//! the user is asked at most once per prompt.

use crate::config::{ConfigStore, StoredConfig};
use crate::error::GrittyError;
use crate::provider::{
    MessageProvider, ProviderContext, ProviderRegistry, SecretPrompt, TerminalSecretPrompt,
    bound_candidates,
};
use crate::selector::{InteractiveSelector, Selection};
use crate::vcs::VersionControl;
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

/// Number of candidate messages requested from the provider.
pub const CANDIDATE_COUNT: usize = 3;

/// How a `commit` run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The staged diff was empty or whitespace-only.
    NothingStaged,
    /// The user entered nothing.
    NoSelection,
    /// The user entered something that is not a listed number.
    InvalidSelection(String),
    /// A commit was created with this message.
    Committed(String),
}

/// Composes config, registry, provider, selector and VCS into the CLI flows.
pub struct CommandDispatcher<'a> {
    registry: &'a ProviderRegistry,
    store: ConfigStore,
    context: ProviderContext,
    selector: InteractiveSelector,
}

impl<'a> CommandDispatcher<'a> {
    pub fn new(registry: &'a ProviderRegistry, store: ConfigStore, context: ProviderContext) -> Self {
        Self {
            registry,
            store,
            context,
            selector: InteractiveSelector::new(),
        }
    }

    // =========================================================================
    // init
    // =========================================================================

    /// Lets the user pick a provider, runs its configure routine and persists
    /// the result.
    ///
    /// # Errors
    ///
    /// [`GrittyError::InvalidChoice`] for a bad menu choice, any error from the
    /// provider's configure routine, or a config write/permission error.
    pub fn init_with_io<R: BufRead, W: Write>(
        &self,
        secrets: &dyn SecretPrompt,
        input: &mut R,
        output: &mut W,
    ) -> Result<StoredConfig, GrittyError> {
        let names = self.registry.names();
        let chosen = self.selector.choose_provider_with_io(&names, input, output)?;

        let configure = self.registry.resolve_config_prompt(chosen)?;
        let settings = configure(secrets)?;

        let config = StoredConfig::new(chosen, settings);
        self.store.save(&config)?;

        writeln!(output, "Provider configuration initialized successfully").map_err(GrittyError::Input)?;
        info!("Initialized provider '{}'", chosen);
        Ok(config)
    }

    /// Runs [`Self::init_with_io`] against the terminal.
    pub fn init(&self) -> Result<StoredConfig, GrittyError> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.init_with_io(&TerminalSecretPrompt, &mut input, &mut output)
    }

    // =========================================================================
    // commit
    // =========================================================================

    /// Loads the stored configuration and constructs its provider.
    ///
    /// Any failure to build the provider from stored settings is reported as
    /// [`GrittyError::ConfigInvalid`].
    pub fn build_provider(&self) -> Result<Box<dyn MessageProvider>, GrittyError> {
        let config = self.store.load()?;
        let factory = self.registry.resolve_factory(&config.provider)?;
        debug!("Constructing provider '{}'", config.provider);

        factory(&config.config, &self.context).map_err(|e| match e {
            GrittyError::ConfigInvalid(_) => e,
            other => GrittyError::ConfigInvalid(other.to_string()),
        })
    }

    /// Generates candidate messages for the staged diff, lets the user pick
    /// one and commits it.
    ///
    /// An empty diff, a blank answer and an invalid answer all end the run
    /// successfully without committing.
    pub async fn commit_with_io<V: VersionControl, R: BufRead, W: Write>(
        &self,
        vcs: &V,
        input: &mut R,
        output: &mut W,
    ) -> Result<CommitOutcome, GrittyError> {
        match self.generate_candidates(vcs, output).await? {
            Some(candidates) => self.select_and_commit(vcs, &candidates, input, output),
            None => Ok(CommitOutcome::NothingStaged),
        }
    }

    /// Runs [`Self::commit_with_io`] against the terminal.
    ///
    /// Stdin is locked only for the selection prompt, after the provider has
    /// answered.
    pub async fn commit<V: VersionControl>(&self, vcs: &V) -> Result<CommitOutcome, GrittyError> {
        let mut output = io::stdout();
        let Some(candidates) = self.generate_candidates(vcs, &mut output).await? else {
            return Ok(CommitOutcome::NothingStaged);
        };

        let stdin = io::stdin();
        let mut input = stdin.lock();
        self.select_and_commit(vcs, &candidates, &mut input, &mut output)
    }

    /// Steps up to the provider call. `None` when nothing is staged.
    async fn generate_candidates<V: VersionControl, W: Write>(
        &self,
        vcs: &V,
        output: &mut W,
    ) -> Result<Option<Vec<String>>, GrittyError> {
        let provider = self.build_provider()?;

        if !vcs.is_repository()? {
            return Err(GrittyError::NotARepository);
        }

        let diff = vcs.staged_diff()?;
        if diff.trim().is_empty() {
            writeln!(output, "No staged changes to commit").map_err(GrittyError::Input)?;
            return Ok(None);
        }

        let raw = provider.get_commit_messages(&diff, CANDIDATE_COUNT).await?;
        bound_candidates(raw, CANDIDATE_COUNT).map(Some)
    }

    fn select_and_commit<V: VersionControl, R: BufRead, W: Write>(
        &self,
        vcs: &V,
        candidates: &[String],
        input: &mut R,
        output: &mut W,
    ) -> Result<CommitOutcome, GrittyError> {
        let outcome = match self.selector.select_with_io(candidates, input, output)? {
            Selection::Selected { message, .. } => {
                vcs.commit(&message)?;
                writeln!(output, "Commit created successfully").map_err(GrittyError::Input)?;
                CommitOutcome::Committed(message)
            }
            Selection::Cancelled => {
                writeln!(output, "No selection made, commit aborted").map_err(GrittyError::Input)?;
                CommitOutcome::NoSelection
            }
            Selection::Invalid(raw) => {
                writeln!(output, "Invalid selection '{}', commit aborted", raw)
                    .map_err(GrittyError::Input)?;
                CommitOutcome::InvalidSelection(raw)
            }
        };
        Ok(outcome)
    }
}

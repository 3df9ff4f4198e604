//! Commit-message provider contract and the registry of available backends.
//!
//! A backend contributes a [`ProviderDefinition`]: a stable name, a factory
//! that builds a [`MessageProvider`] from stored settings, and an interactive
//! configure routine that produces those settings. The [`ProviderRegistry`]
//! is built once in `main` and handed by reference to whatever needs lookup.

use crate::error::GrittyError;
use crate::http_client::HttpClient;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// A backend that turns a staged diff into candidate commit messages.
#[async_trait]
pub trait MessageProvider: Send + Sync {
    /// Returns between 1 and `count` candidate messages, most relevant first.
    ///
    /// `diff` must be non-empty; callers filter empty diffs beforehand. Each
    /// call performs at most one outbound request and never retries.
    ///
    /// # Errors
    ///
    /// [`GrittyError::Network`], [`GrittyError::Auth`],
    /// [`GrittyError::Upstream`], [`GrittyError::MalformedResponse`] or
    /// [`GrittyError::EmptyResult`].
    async fn get_commit_messages(&self, diff: &str, count: usize) -> Result<Vec<String>, GrittyError>;
}

/// Reads a secret from the user without echoing it.
pub trait SecretPrompt {
    fn read_secret(&self, prompt: &str) -> Result<String, GrittyError>;
}

/// Secret prompt backed by the controlling terminal.
pub struct TerminalSecretPrompt;

impl SecretPrompt for TerminalSecretPrompt {
    fn read_secret(&self, prompt: &str) -> Result<String, GrittyError> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| GrittyError::Input(std::io::Error::other(e.to_string())))
    }
}

/// Settings shape owned by one provider.
///
/// Each settings type converts itself to and from the generic YAML node that
/// is stored under the `config` key of the config file.
pub trait ProviderSettings: Serialize + DeserializeOwned {
    fn encode(&self) -> Result<serde_yaml::Value, GrittyError> {
        serde_yaml::to_value(self).map_err(|e| GrittyError::ConfigWrite(e.to_string()))
    }

    fn decode(value: &serde_yaml::Value) -> Result<Self, GrittyError> {
        serde_yaml::from_value(value.clone()).map_err(|e| GrittyError::ConfigInvalid(e.to_string()))
    }
}

/// Runtime collaborators handed to every provider factory.
#[derive(Clone)]
pub struct ProviderContext {
    pub http: Arc<dyn HttpClient>,
    env_lookup: fn(&str) -> Option<String>,
}

impl ProviderContext {
    /// Creates a context that reads fallback credentials from the process
    /// environment.
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            env_lookup: |key| std::env::var(key).ok(),
        }
    }

    /// Replaces the environment lookup.
    pub fn with_env_lookup(mut self, env_lookup: fn(&str) -> Option<String>) -> Self {
        self.env_lookup = env_lookup;
        self
    }

    pub fn env(&self, key: &str) -> Option<String> {
        (self.env_lookup)(key)
    }
}

/// Builds a provider from its stored settings.
pub type ProviderFactory =
    fn(&serde_yaml::Value, &ProviderContext) -> Result<Box<dyn MessageProvider>, GrittyError>;

/// Interactively gathers a provider's settings, ready to be persisted as-is.
pub type ConfigPrompt = fn(&dyn SecretPrompt) -> Result<serde_yaml::Value, GrittyError>;

/// One registered backend.
#[derive(Clone, Copy)]
pub struct ProviderDefinition {
    pub name: &'static str,
    pub factory: ProviderFactory,
    pub config_prompt: ConfigPrompt,
}

/// Immutable-after-startup table of provider definitions, in menu order.
#[derive(Default)]
pub struct ProviderRegistry {
    definitions: Vec<ProviderDefinition>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry containing every backend shipped with gritty.
    pub fn builtin() -> Result<Self, GrittyError> {
        let mut registry = Self::new();
        registry.register(crate::openai::definition())?;
        Ok(registry)
    }

    /// Adds a definition.
    ///
    /// # Errors
    ///
    /// [`GrittyError::DuplicateProvider`] if the name is already taken.
    pub fn register(&mut self, definition: ProviderDefinition) -> Result<(), GrittyError> {
        if self.find(definition.name).is_some() {
            return Err(GrittyError::DuplicateProvider(definition.name.to_string()));
        }
        debug!("Registered provider '{}'", definition.name);
        self.definitions.push(definition);
        Ok(())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.definitions.iter().map(|d| d.name).collect()
    }

    pub fn resolve_factory(&self, name: &str) -> Result<ProviderFactory, GrittyError> {
        self.find(name)
            .map(|d| d.factory)
            .ok_or_else(|| GrittyError::ProviderNotFound(name.to_string()))
    }

    pub fn resolve_config_prompt(&self, name: &str) -> Result<ConfigPrompt, GrittyError> {
        self.find(name)
            .map(|d| d.config_prompt)
            .ok_or_else(|| GrittyError::ProviderNotFound(name.to_string()))
    }

    fn find(&self, name: &str) -> Option<&ProviderDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }
}

/// Applies the candidate-count contract to a provider's raw output: blank
/// entries are dropped, the rest trimmed and capped at `count`.
///
/// # Errors
///
/// [`GrittyError::EmptyResult`] when nothing usable remains.
pub fn bound_candidates(raw: Vec<String>, count: usize) -> Result<Vec<String>, GrittyError> {
    let candidates: Vec<String> = raw
        .into_iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .take(count)
        .collect();

    if candidates.is_empty() {
        return Err(GrittyError::EmptyResult);
    }
    Ok(candidates)
}

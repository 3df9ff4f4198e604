//! Gritty - AI-generated Git commit messages.
//!
//! Gritty sends the staged diff to a language-model provider, shows the
//! returned candidate messages as a numbered list and commits the one the
//! user picks.
//!
//! # Architecture
//!
//! - [`config`] - Per-user provider selection and settings (`~/.gritty/config.yaml`)
//! - [`dispatcher`] - The `init` and `commit` flows
//! - [`error`] - Error taxonomy shared by every module
//! - [`http_client`] - HTTP client abstraction
//! - [`openai`] - The OpenAI chat-completion provider
//! - [`provider`] - Provider contract and registry
//! - [`selector`] - Numbered-menu prompts
//! - [`vcs`] - Git gateway
//!
//! # Example
//!
//! ```ignore
//! use gritty::config::ConfigStore;
//! use gritty::dispatcher::CommandDispatcher;
//! use gritty::http_client::ReqwestHttpClient;
//! use gritty::provider::{ProviderContext, ProviderRegistry};
//! use gritty::vcs::GitCli;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = ProviderRegistry::builtin()?;
//!     let context = ProviderContext::new(Arc::new(ReqwestHttpClient::new()?));
//!     let dispatcher = CommandDispatcher::new(&registry, ConfigStore::user_default()?, context);
//!
//!     dispatcher.commit(&GitCli::new(".")).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http_client;
pub mod openai;
pub mod provider;
pub mod selector;
pub mod vcs;

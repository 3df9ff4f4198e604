use clap::Command;
use gritty::config::ConfigStore;
use gritty::dispatcher::CommandDispatcher;
use gritty::error::GrittyError;
use gritty::http_client::ReqwestHttpClient;
use gritty::provider::{ProviderContext, ProviderRegistry};
use gritty::vcs::GitCli;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("gritty")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Gritty is a tool to generate Git commit messages using AI")
        .long_about(
            "Gritty helps developers generate Git commit messages based on staged changes \
             in a Git repository using AI models. Run 'gritty init' once to choose a provider.",
        )
        .subcommand(
            Command::new("init").about("Initialize the configuration for the commit message provider"),
        )
        .subcommand(
            Command::new("commit")
                .about("Generate and apply a Git commit message based on staged changes"),
        )
}

async fn run() -> anyhow::Result<()> {
    let mut command = cli();
    let matches = command.clone().get_matches();

    let registry = ProviderRegistry::builtin()?;
    let store = ConfigStore::user_default()?;
    let context = ProviderContext::new(Arc::new(ReqwestHttpClient::new()?));
    let dispatcher = CommandDispatcher::new(&registry, store, context);

    match matches.subcommand() {
        Some(("init", _)) => {
            dispatcher.init()?;
        }
        Some(("commit", _)) => {
            let git = GitCli::new(std::env::current_dir()?);
            let outcome = dispatcher.commit(&git).await?;
            info!("Commit flow finished: {:?}", outcome);
        }
        _ => {
            command.print_help()?;
            println!();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        let reconfigure = e
            .downcast_ref::<GrittyError>()
            .is_some_and(|g| g.is_config_error() && !matches!(g, GrittyError::ConfigMissing { .. }));
        if reconfigure {
            eprintln!("Run 'gritty init' to reconfigure.");
        }
        std::process::exit(1);
    }
}

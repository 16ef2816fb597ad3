//! Secrets commands

use clap::{Args, Subcommand};
use reviews_core::Secrets;

/// Secrets commands
#[derive(Args, Debug)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SecretsCommand {
    /// Create an empty secrets file with owner-only permissions
    Init,

    /// Show where the API key would be read from
    Status,
}

impl SecretsArgs {
    /// Execute the secrets command
    pub fn execute(&self) -> anyhow::Result<()> {
        match self.command {
            SecretsCommand::Init => {
                let path = Secrets::create_template()?;
                println!("Created {}", path.display());
                println!("Add your API key under [anthropic] api_key.");
            }
            SecretsCommand::Status => {
                if let Some(path) = Secrets::default_secrets_path() {
                    let state = if path.exists() { "exists" } else { "not found" };
                    println!("Secrets file: {} ({})", path.display(), state);
                }

                match Secrets::load()?.resolve_api_key() {
                    Some((_, source)) => println!("API key: set from {}", source),
                    None => println!("API key: not set"),
                }
            }
        }
        Ok(())
    }
}

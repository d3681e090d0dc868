//! CLI command execution.
//!
//! One-shot commands load the registry, apply their change and save it back.
//! Everything credential-bound lives in the interactive console, because
//! tokens exist only for the lifetime of one process.

use anyhow::{Context, Result};

use crate::session::{RegistryStore, Session};

use super::args::{Cli, Commands, EnvAction};
use super::console;

/// Execute the parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        None | Some(Commands::Console) => console::run().await,
        Some(Commands::Env { action }) => run_env(action),
        Some(Commands::Open) => open_active(),
    }
}

fn run_env(action: EnvAction) -> Result<()> {
    let store = RegistryStore::open_default()?;
    let mut session = store.load()?;

    match action {
        EnvAction::Add { name, url } => {
            let env = session.add_environment(&name, &url);
            store.save(&session)?;
            println!("Added environment {} ({})", env.name, env.id);
        }
        EnvAction::List => print_environments(&session),
        EnvAction::Remove { id } => {
            let known = session.environments().iter().any(|e| e.id == id);
            session.remove_environment(&id);
            store.save(&session)?;
            if known {
                println!("Removed environment {id}");
            } else {
                println!("No environment with id {id}");
            }
        }
        EnvAction::Select { id } => {
            session.select_environment(&id)?;
            store.save(&session)?;
            println!("Active environment is now {id}");
        }
    }
    Ok(())
}

/// Print the environment registry as a table.
pub(super) fn print_environments(session: &Session) {
    if session.environments().is_empty() {
        println!("No environments configured. Add one with `env add <name> <url>`.");
        return;
    }

    println!(
        "{:<38} {:<18} {:<32} {:<8} {}",
        "ID", "NAME", "URL", "ACTIVE", "LAST USED"
    );
    println!("{}", "-".repeat(110));

    let active_id = session.active_environment().map(|e| e.id.clone());
    for env in session.environments() {
        let active = if active_id.as_deref() == Some(env.id.as_str()) {
            "*"
        } else {
            ""
        };
        let last_used = env.last_used.map_or_else(
            || "-".to_string(),
            |t| t.format("%Y-%m-%d %H:%M").to_string(),
        );
        println!(
            "{:<38} {:<18} {:<32} {:<8} {last_used}",
            env.id, env.name, env.base_url, active
        );
    }
}

fn open_active() -> Result<()> {
    let store = RegistryStore::open_default()?;
    let session = store.load()?;
    let env = session
        .active_environment()
        .context("no active environment selected")?;
    println!("Opening {}", env.base_url);
    open::that(&env.base_url).with_context(|| format!("failed to open {}", env.base_url))?;
    Ok(())
}

//! Sticky Locks admin tool
//!
//! Inspects and maintains the lock database outside the game server.
//!
//! ## Usage
//!
//! ```bash
//! # Create the schema and show which configured materials are lockable
//! sticky-locks init
//!
//! # Use a specific config / storage directory
//! sticky-locks --config /path/to/config.toml stats
//! sticky-locks --storage-dir /srv/world/plugins/locks stats
//!
//! # Who owns the cell at (10, 64, -3)?
//! sticky-locks owner --world world --x 10 --y 64 --z -3 --material CHEST
//!
//! # Access groups
//! sticky-locks groups <owner-uuid>
//! sticky-locks members <owner-uuid> friends
//! ```
//!
//! Blocks given on the command line are treated as single cells: no
//! double-chest or door resolution is possible without the engine.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sticky_locks::{BlockPos, BlockSnapshot, Config, LockService, StaticCatalog};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "sticky-locks")]
#[command(about = "Block ownership store for multiplayer world servers")]
struct Cli {
    /// Path to config file
    #[arg(short, long, env = "STICKY_LOCKS_CONFIG")]
    config: Option<PathBuf>,

    /// Storage directory (overrides config)
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or repair the schema and list lockable materials
    Init,
    /// Print row counts as JSON
    Stats,
    /// Print the owner of a cell
    Owner(BlockArgs),
    /// Remove the lock on a cell
    Unlock(BlockArgs),
    /// List an owner's access groups
    Groups { owner: Uuid },
    /// List the members of an access group
    Members { owner: Uuid, group: String },
    /// Set a player's notify flag
    Notify { player: Uuid, state: Toggle },
}

#[derive(Args, Debug)]
struct BlockArgs {
    #[arg(long)]
    world: String,
    #[arg(long, allow_hyphen_values = true)]
    x: i32,
    #[arg(long, allow_hyphen_values = true)]
    y: i32,
    #[arg(long, allow_hyphen_values = true)]
    z: i32,
    #[arg(long)]
    material: String,
}

impl BlockArgs {
    fn snapshot(&self) -> BlockSnapshot {
        BlockSnapshot::new(
            self.world.clone(),
            BlockPos::new(self.x, self.y, self.z),
            self.material.to_ascii_uppercase(),
        )
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Toggle {
    On,
    Off,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("sticky_locks=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::default()
    };

    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }

    let catalog = StaticCatalog::with_defaults();
    let service = LockService::initialize(&config, &catalog)?;

    match cli.command {
        Command::Init => {
            for material in service.protectables().iter() {
                println!("{}", material);
            }
            info!("Schema ready at {}", config.database_path().display());
        }
        Command::Stats => {
            println!("{}", serde_json::to_string_pretty(&service.stats()?)?);
        }
        Command::Owner(block) => {
            let block = block.snapshot();
            match service.get_owner(&block)? {
                Some(owner) => {
                    let name = service.display_name(&owner)?;
                    println!("{} {}", owner, name.as_deref().unwrap_or("<unknown>"));
                }
                None => println!("not locked"),
            }
        }
        Command::Unlock(block) => {
            let block = block.snapshot();
            if service.unlock_block(&block)? {
                info!("Unlocked {}", block.pos);
            } else {
                warn!("{} was not locked", block.pos);
            }
        }
        Command::Groups { owner } => {
            for group in service.list_group_names(&owner)? {
                println!("{}", group);
            }
        }
        Command::Members { owner, group } => {
            for member in service.list_members(&owner, &group)? {
                println!("{}", member);
            }
        }
        Command::Notify { player, state } => {
            let notify = matches!(state, Toggle::On);
            if !service.set_notify(&player, notify)? {
                warn!("Player {} is not known", player);
            }
        }
    }

    service.shutdown()?;
    Ok(())
}

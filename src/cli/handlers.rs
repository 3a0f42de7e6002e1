use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::cli::commands::InitArgs;
use crate::model::Actor;
use crate::store::Store;
use crate::store::config::{WorkspaceConfig, write_config};

const WORKSPACE_DIR: &str = ".clarity";

/// The workspace directory: `-C` override or `./.clarity`.
pub fn workspace_dir(flag: Option<&str>) -> PathBuf {
    match flag {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(WORKSPACE_DIR).to_path_buf(),
    }
}

/// `clarity init`: create the workspace with its owning human actor.
pub fn cmd_init(dir: &Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if dir.join("db.json").exists() {
        return Err(format!("workspace already exists at {}", dir.display()).into());
    }

    let name = args
        .owner
        .or_else(|| std::env::var("USER").ok())
        .filter(|n| !n.trim().is_empty())
        .ok_or("cannot infer owner name; pass --owner")?;

    std::fs::create_dir_all(dir)?;
    let owner = Actor::human(format!("user-{}", uuid::Uuid::new_v4()), &name, Utc::now());
    let owner_id = owner.id.clone();
    Store::init(dir, owner)?;
    write_config(dir, &WorkspaceConfig::default())?;

    println!("initialized workspace at {}", dir.display());
    println!("owner: {name} ({owner_id})");
    Ok(())
}

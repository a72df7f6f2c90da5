//! `hget config` – show where the config lives and what is in effect.

use anyhow::Result;
use hget_core::config::{self, GetterConfig};

pub fn run_config(cfg: &GetterConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", cfg.to_toml()?);
    Ok(())
}

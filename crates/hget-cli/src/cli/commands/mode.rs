//! `hget mode` – print the client mode a URL maps to.

use anyhow::Result;
use hget_core::{locator, mode};

pub fn run_mode(url: &str) -> Result<()> {
    let url = locator::parse(url)?;
    println!("{}", mode::classify(&url).as_str());
    Ok(())
}

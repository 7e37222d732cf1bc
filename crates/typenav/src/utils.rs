use anyhow::Result;
use home::home_dir;
use std::fs;
use std::path::PathBuf;

const TYPENAV_DIR: &str = ".typenav";

pub fn typenav_dir() -> Result<PathBuf> {
    let home = home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    Ok(home.join(TYPENAV_DIR))
}

pub fn get_typenav_dir() -> Result<PathBuf> {
    let typenav_dir = typenav_dir()?;
    fs::create_dir_all(&typenav_dir)?;
    Ok(typenav_dir)
}

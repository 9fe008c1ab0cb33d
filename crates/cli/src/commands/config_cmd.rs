//! `turnwright config` — Configuration display.

use turnwright_config::AppConfig;
use turnwright_core::{Error, Result};

use super::load_config;

pub async fn show(defaults: bool) -> Result<()> {
    if defaults {
        println!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = load_config()?;
    let config_path = AppConfig::config_dir().join("config.toml");

    println!("# {}", config_path.display());
    println!("{}", toml::to_string_pretty(&config).map_err(Error::config)?);
    println!("# chats stored in {}", config.store.resolved_path().display());
    Ok(())
}

use std::io::{self, Write};
use std::path::Path;

use eyre::Result;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub async fn handle_config_command(cmd: ConfigCommands, path: &Path, dry_run: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Set { key, value } => handle_set_config(path, key, value, dry_run).await,
        ConfigCommands::Get { key } => handle_get_config(path, key).await,
        ConfigCommands::Show => handle_show_config(path).await,
        ConfigCommands::Reset { force } => handle_reset_config(path, force, dry_run).await,
    }
}

async fn handle_set_config(path: &Path, key: String, value: String, dry_run: bool) -> Result<()> {
    let mut config = Config::load(path).await?;

    if let Err(e) = config.set_value(&key, &value) {
        println!("❌ Failed to set configuration: {}", e);
        return Err(e);
    }

    if dry_run {
        println!("Would set config: {} = {}", key, value);
        return Ok(());
    }

    config.save(path).await?;
    println!("✅ Configuration updated: {} = {}", key, value);
    Ok(())
}

async fn handle_get_config(path: &Path, key: String) -> Result<()> {
    let config = Config::load(path).await?;

    match config.get_value(&key) {
        Ok(value) => {
            println!("{}: {}", key, value);
        }
        Err(e) => {
            println!("❌ Failed to get configuration: {}", e);
            println!("💡 Use 'novella config show' to see all available keys");
            return Err(e);
        }
    }

    Ok(())
}

async fn handle_show_config(path: &Path) -> Result<()> {
    let config = Config::load(path).await?;
    println!("{}", config.show_all());
    Ok(())
}

async fn handle_reset_config(path: &Path, force: bool, dry_run: bool) -> Result<()> {
    if dry_run {
        println!("Would reset configuration to defaults");
        return Ok(());
    }

    if !force {
        print!("Are you sure you want to reset all configuration? (y/N): ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().to_lowercase().starts_with('y') {
            println!("❌ Cancelled");
            return Ok(());
        }
    }

    Config::reset(path).await?;
    println!("✅ Configuration reset to defaults");
    Ok(())
}

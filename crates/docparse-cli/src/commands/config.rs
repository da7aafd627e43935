//! Configuration commands.

use super::{config_path, load_config, GlobalOpts};
use anyhow::{Context, Result};
use colored::Colorize;
use docparse_config::{mask_secret, Config};

/// Write a commented template config file.
pub fn init(opts: &GlobalOpts, force: bool) -> Result<()> {
    let path = config_path(opts)?;

    if path.exists() && !force {
        println!("{} Config already exists: {}", "Note:".yellow().bold(), path.display());
        println!("  Use --force to overwrite it.");
        return Ok(());
    }

    Config::create_default_file(&path).context("Failed to create config file")?;
    println!("  {} Created config: {}", "✓".green(), path.display());
    println!();
    println!("Fill in the values, or export the matching environment variables, then run:");
    println!("  {}", "docparse config check".cyan());

    Ok(())
}

/// Load, validate and print the effective configuration with secrets masked.
pub fn check(opts: &GlobalOpts) -> Result<()> {
    let path = config_path(opts)?;
    let config = load_config(opts)?;

    println!("{}", "Configuration OK".green().bold());
    println!("{}", "─".repeat(50));
    println!(
        "  File:           {}",
        if path.exists() {
            path.display().to_string()
        } else {
            "(none, environment only)".to_string()
        }
    );
    println!("  Endpoint:       {}", config.appwrite.endpoint);
    println!("  Project:        {}", config.appwrite.project);
    println!("  API key:        {}", mask_secret(&config.appwrite.api_key));
    println!("  Bucket:         {}", config.appwrite.bucket_id);
    println!(
        "  Destination:    {}/{}",
        config.appwrite.database_id, config.appwrite.collection_id
    );
    println!("  Parser URL:     {}", config.llama.api_url);
    println!("  Parser key:     {}", mask_secret(&config.llama.api_key));
    println!("  Parser timeout: {}s", config.llama.timeout_seconds);
    println!(
        "  Max file size:  {}",
        config
            .handler
            .max_file_bytes
            .map(|b| format!("{} bytes", b))
            .unwrap_or_else(|| "unlimited".to_string())
    );
    if let Some(sqlite) = &opts.sqlite {
        println!("  Local store:    {}", sqlite);
    }

    Ok(())
}

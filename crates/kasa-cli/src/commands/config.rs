use std::path::Path;

use anyhow::Result;

use crate::cli::ConfigAction;
use crate::config::KasaConfig;

/// Handle config subcommands.
pub fn handle(action: ConfigAction, state_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = KasaConfig::config_path(state_dir);
            if path.exists() {
                println!("Config already exists at: {}", path.display());
                println!("Use `kasa config show` to view it.");
                return Ok(());
            }

            let config = KasaConfig::default();
            config.save(state_dir)?;
            println!("Created default config at: {}", path.display());
            println!();
            print_config(&config, state_dir);
        }

        ConfigAction::Show => {
            let config = KasaConfig::load(state_dir)?;
            print_config(&config, state_dir);
        }
    }
    Ok(())
}

fn print_config(config: &KasaConfig, state_dir: &Path) {
    println!("Configuration:");
    println!("  state_dir:           {}", state_dir.display());
    println!("  snapshot_file:       {}", config.snapshot_file);
    println!("  report_time:         {}", config.report_time);
    println!("  ranking_size:        {}", config.ranking_size);
    println!("  on_corrupt_snapshot: {:?}", config.on_corrupt_snapshot);
    println!("  listen_addr:         {}", config.listen_addr);
    println!("  log_level:           {}", config.log_level);
    println!(
        "  self_id:             {}",
        config.self_id.as_deref().unwrap_or("(none)")
    );
    println!("  bonus.tzm:           {}", config.bonus.tzm);
    println!("  bonus.met:           {}", config.bonus.met);
    println!("  directory:           {} entries", config.directory.len());
}

use anyhow::{Context, Result, bail};
use bsp_console_core::ConsoleConfig;
use bsp_console_core::config::CONFIG_FILE_NAMES;
use std::{env, path::PathBuf};
use tracing::info;

pub fn init_command(cwd: Option<&str>, force: bool) -> Result<()> {
    let project_root = if let Some(cwd) = cwd {
        PathBuf::from(cwd)
    } else {
        env::current_dir().context("Failed to get current directory")?
    };

    let project_root = project_root
        .canonicalize()
        .context("Failed to canonicalize project root")?;

    let config_path = project_root.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = ConsoleConfig {
        base_path: Some(project_root.clone()),
        ..ConsoleConfig::default()
    };
    config
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    info!("Initialized bsp-console in {}", project_root.display());
    println!("✅ Created config: {}", config_path.display());
    Ok(())
}

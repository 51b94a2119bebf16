use crate::cli::conf::render_config;
use crate::conf::MonitorConfig;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;

pub fn init(path: PathBuf) -> Result<()> {
    // Refuse to overwrite an existing file
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    let contents = render_config(&MonitorConfig::default(), false)?;
    fs::write(&path, contents).with_context(|| format!("failed to create {}", path.display()))?;

    // User feedback
    println!("✔ Wrote default hitwatch config to {}", path.display());
    println!();
    println!("Next steps:");
    println!("  hitwatch config check {}", path.display());
    println!("  hitwatch watch /var/log/nginx/access.log --config {}", path.display());

    Ok(())
}

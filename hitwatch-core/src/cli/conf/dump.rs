use crate::conf::{ConfigOverrides, MonitorConfig, load_config};
use std::path::PathBuf;

pub fn dump(path: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let cfg = load_config(path.as_deref(), &ConfigOverrides::default())?;
    println!("{}", render_config(&cfg, json)?);
    Ok(())
}

pub fn render_config(cfg: &MonitorConfig, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(cfg)?)
    } else {
        Ok(hcl::to_string(cfg)?)
    }
}

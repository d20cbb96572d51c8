use std::fs;
use std::path::Path;

use crate::core::config::CascadeConfig;
use crate::core::error::{CascadeError, CascadeResult, ConfigError, ResultExt};
use crate::host::manifest::MEMBERS_DIR;

/// Run the init command: mint a new family and write cascade.toml
pub fn run_init(root: &Path, name: &str, layout: Option<String>, cascade: Option<String>) -> CascadeResult<()> {
  if let Some(existing) = CascadeConfig::find_config_path(root) {
    return Err(CascadeError::Config(ConfigError::AlreadyExists { path: existing }));
  }

  let layout = layout.unwrap_or_else(|| format!("{}-layout", name));
  let cascade = cascade.unwrap_or_else(|| format!("{}-cascade", name));
  let config = CascadeConfig::new(name, layout, cascade);
  config.validate()?;

  let members_dir = root.join(MEMBERS_DIR);
  fs::create_dir_all(&members_dir).with_context(|| format!("Failed to create {}", members_dir.display()))?;
  config.save(root)?;

  println!("📦 Created family '{}'", config.family.name);
  println!("   family id: {}", config.family.id);
  println!("   layout:    {} ({})", config.layout.project, config.layout_identity());
  println!("   cascade:   {} ({})", config.cascade.project, config.cascade_identity());
  println!();
  println!("✅ Wrote {}", root.join("cascade.toml").display());
  println!();
  println!("Next steps:");
  println!("  Add member projects under {}/<project>/project.toml", MEMBERS_DIR);
  println!("  cascade status");

  Ok(())
}

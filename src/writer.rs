// src/writer.rs

//! File-writer collaborator
//!
//! Thin I/O wrapper that persists a resolved plan under a config directory:
//! the rendered `datadog.yaml`, the `install_info` record, and the `conf.d`
//! check directory. All logic lives in the engine; this module only writes
//! what it is handed.

use crate::error::Result;
use crate::resolver::Resolution;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Write the rendered document and install metadata under `config_dir`,
/// creating the directory tree as needed.
pub fn write_plan(resolution: &Resolution, config_dir: &Path) -> Result<()> {
    fs::create_dir_all(config_dir)?;
    fs::create_dir_all(config_dir.join("conf.d"))?;

    let config_path = config_dir.join("datadog.yaml");
    fs::write(&config_path, &resolution.rendered)?;
    debug!(path = %config_path.display(), "wrote agent config");

    let install_info_path = config_dir.join("install_info");
    fs::write(&install_info_path, resolution.install_info.to_yaml()?)?;
    debug!(path = %install_info_path.display(), "wrote install metadata");

    Ok(())
}

//! Credentials file for the external content tool.
//!
//! One section per environment:
//!
//! ```ini
//! [from]
//! base_url=https://source.example.com/api/4.0
//! client_id=...
//! client_secret=...
//! verify_ssl=True
//! ```

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{Config, Credentials};
use crate::models::Environment;

fn render_section(out: &mut String, env: Environment, creds: &Credentials) {
    out.push_str(&format!("[{}]\n", env.as_str()));
    out.push_str(&format!("base_url={}\n", creds.base_url));
    out.push_str(&format!("client_id={}\n", creds.client_id));
    out.push_str(&format!("client_secret={}\n", creds.client_secret));
    out.push_str("verify_ssl=True\n\n");
}

/// Render the file for every environment present in `config`.
pub fn render_ini(config: &Config) -> String {
    let mut out = String::new();
    for env in [Environment::From, Environment::To] {
        if let Some(creds) = config.credentials(env) {
            render_section(&mut out, env, &creds);
        }
    }
    out
}

/// Write the credentials file to `[paths].ini_file`, creating parent directories.
pub fn write_ini(config: &Config) -> Result<()> {
    let path: &Path = &config.paths.ini_file;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, render_ini(config))
        .with_context(|| format!("Failed to write credentials file: {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote credentials file");
    Ok(())
}

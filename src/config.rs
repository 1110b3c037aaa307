use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::{de_opt_id, Environment};

/// What a run does.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Export from the source and import into the destination.
    #[default]
    Deploy,
    /// Resolve and report hierarchy and content tables only.
    FetchDetails,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub from: Option<SourceConfig>,
    #[serde(default)]
    pub to: Option<DestinationConfig>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Connection settings of one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.base_url.trim().is_empty()
            && !self.client_id.trim().is_empty()
            && !self.client_secret.trim().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourceConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default, alias = "#client_secret")]
    pub client_secret: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub folder_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DestinationConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default, alias = "#client_secret")]
    pub client_secret: String,
    /// Raw content type; checked against the supported kinds during validation.
    #[serde(default, rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub value: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub target_folder: Option<String>,
}

impl SourceConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            base_url: self.base_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

impl DestinationConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            base_url: self.base_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    #[serde(default = "default_ini_file")]
    pub ini_file: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
            ini_file: default_ini_file(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("./data/exports")
}
fn default_ini_file() -> PathBuf {
    PathBuf::from("./data/looker.ini")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./data/out")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ToolConfig {
    #[serde(default = "default_program")]
    pub program: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

fn default_program() -> String {
    "ldeploy".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Credentials of `env`, if that section is present.
    pub fn credentials(&self, env: Environment) -> Option<Credentials> {
        match env {
            Environment::From => self.from.as_ref().map(SourceConfig::credentials),
            Environment::To => self.to.as_ref().map(DestinationConfig::credentials),
        }
    }

    /// Environments whose credentials are fully configured, source first.
    pub fn configured_environments(&self) -> Vec<Environment> {
        [Environment::From, Environment::To]
            .into_iter()
            .filter(|env| {
                self.credentials(*env)
                    .map(|c| c.is_complete())
                    .unwrap_or(false)
            })
            .collect()
    }
}

/// Parse a configuration document.
///
/// Only the document structure is checked here. Whether the values are
/// usable for the selected mode is decided by [`crate::preconditions`].
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.tool.program.trim().is_empty() {
        anyhow::bail!("tool.program must not be empty");
    }
    if config.http.timeout_secs == 0 {
        anyhow::bail!("http.timeout_secs must be > 0");
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r##"
mode = "deploy"

[from]
base_url = "https://src.example.com/api/4.0"
client_id = "abc"
"#client_secret" = "s3cret"
folder_id = 42

[to]
base_url = "https://dst.example.com/api/4.0"
client_id = "def"
client_secret = "hunter2"
type = "dashboards"
value = ["A/B/Sales"]
target_folder = "17"

[paths]
export_dir = "/tmp/exports"
"##;

    #[test]
    fn parses_full_config() {
        let cfg = parse_config(FULL).unwrap();
        assert_eq!(cfg.mode, Mode::Deploy);
        let from = cfg.from.as_ref().unwrap();
        assert_eq!(from.client_secret, "s3cret");
        assert_eq!(from.folder_id.as_deref(), Some("42"));
        let to = cfg.to.as_ref().unwrap();
        assert_eq!(to.content_type, "dashboards");
        assert_eq!(to.target_folder.as_deref(), Some("17"));
        assert_eq!(cfg.paths.export_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(cfg.paths.ini_file, PathBuf::from("./data/looker.ini"));
        assert_eq!(cfg.tool.program, "ldeploy");
        assert_eq!(cfg.http.timeout_secs, 30);
        assert_eq!(
            cfg.configured_environments(),
            vec![Environment::From, Environment::To]
        );
    }

    #[test]
    fn unsupported_type_still_parses() {
        let cfg = parse_config("[to]\ntype = \"reports\"\n").unwrap();
        assert_eq!(cfg.to.unwrap().content_type, "reports");
    }

    #[test]
    fn fetch_details_mode_with_one_environment() {
        let cfg = parse_config(
            "mode = \"fetch_details\"\n[to]\nbase_url = \"u\"\nclient_id = \"i\"\nclient_secret = \"s\"\n",
        )
        .unwrap();
        assert_eq!(cfg.mode, Mode::FetchDetails);
        assert_eq!(cfg.configured_environments(), vec![Environment::To]);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(parse_config("mode = \"sync\"\n").is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(parse_config("[http]\ntimeout_secs = 0\n").is_err());
    }
}

//! Declarative configuration checks, keyed by run mode.
//!
//! The table is pure data: [`preconditions_for`] says which checks a mode
//! needs and [`Precondition::check`] evaluates one of them against a
//! [`Config`]. Live checks (authorization, source folder lookup) happen
//! afterwards in [`crate::deploy`].

use crate::config::{Config, Mode};
use crate::error::DeployError;
use crate::models::ContentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    SourceCredentials,
    DestinationCredentials,
    AnyCredentials,
    SourceFolderConfigured,
    ContentTypeSupported,
    ValuesRequested,
    TargetFolderConfigured,
}

const DEPLOY: &[Precondition] = &[
    Precondition::SourceCredentials,
    Precondition::DestinationCredentials,
    Precondition::SourceFolderConfigured,
    Precondition::ContentTypeSupported,
    Precondition::ValuesRequested,
    Precondition::TargetFolderConfigured,
];

const FETCH_DETAILS: &[Precondition] = &[Precondition::AnyCredentials];

pub fn preconditions_for(mode: Mode) -> &'static [Precondition] {
    match mode {
        Mode::Deploy => DEPLOY,
        Mode::FetchDetails => FETCH_DETAILS,
    }
}

fn blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

impl Precondition {
    pub fn check(&self, config: &Config) -> Result<(), String> {
        match self {
            Precondition::SourceCredentials => match &config.from {
                Some(from) if from.credentials().is_complete() => Ok(()),
                _ => Err("from: base_url, client_id and client_secret are required".into()),
            },
            Precondition::DestinationCredentials => match &config.to {
                Some(to) if to.credentials().is_complete() => Ok(()),
                _ => Err("to: base_url, client_id and client_secret are required".into()),
            },
            Precondition::AnyCredentials => {
                if config.configured_environments().is_empty() {
                    Err("credentials for at least one of from/to are required".into())
                } else {
                    Ok(())
                }
            }
            Precondition::SourceFolderConfigured => {
                if blank(config.from.as_ref().and_then(|f| f.folder_id.as_deref())) {
                    Err("from.folder_id is required".into())
                } else {
                    Ok(())
                }
            }
            Precondition::ContentTypeSupported => {
                let raw = config
                    .to
                    .as_ref()
                    .map(|t| t.content_type.as_str())
                    .unwrap_or_default();
                raw.parse::<ContentKind>()
                    .map(|_| ())
                    .map_err(|e| format!("to.type: {}", e))
            }
            Precondition::ValuesRequested => {
                let any = config
                    .to
                    .as_ref()
                    .map(|t| t.value.iter().any(|v| !v.trim().is_empty()))
                    .unwrap_or(false);
                if any {
                    Ok(())
                } else {
                    Err("to.value must list at least one item".into())
                }
            }
            Precondition::TargetFolderConfigured => {
                if blank(config.to.as_ref().and_then(|t| t.target_folder.as_deref())) {
                    Err("to.target_folder is required".into())
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Evaluate every precondition of `mode` and collect all failures.
pub fn validate(config: &Config, mode: Mode) -> Result<(), DeployError> {
    let problems: Vec<String> = preconditions_for(mode)
        .iter()
        .filter_map(|p| p.check(config).err())
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DeployError::Precondition(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    const VALID: &str = r#"
[from]
base_url = "https://src"
client_id = "a"
client_secret = "b"
folder_id = "1"

[to]
base_url = "https://dst"
client_id = "c"
client_secret = "d"
type = "dashboards"
value = ["A/B/Sales"]
target_folder = "9"
"#;

    fn problems(toml: &str, mode: Mode) -> Vec<String> {
        match validate(&parse_config(toml).unwrap(), mode) {
            Ok(()) => vec![],
            Err(DeployError::Precondition(p)) => p,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn valid_deploy_config_passes() {
        assert!(problems(VALID, Mode::Deploy).is_empty());
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let toml = VALID.replace("\"dashboards\"", "\"reports\"");
        let p = problems(&toml, Mode::Deploy);
        assert_eq!(p.len(), 1);
        assert!(p[0].contains("reports"));
    }

    #[test]
    fn empty_config_reports_every_deploy_check() {
        assert_eq!(problems("", Mode::Deploy).len(), DEPLOY.len());
    }

    #[test]
    fn fetch_details_needs_only_one_environment() {
        let toml = "[from]\nbase_url = \"u\"\nclient_id = \"i\"\nclient_secret = \"s\"\n";
        assert!(problems(toml, Mode::FetchDetails).is_empty());
        assert_eq!(problems("", Mode::FetchDetails).len(), 1);
    }

    #[test]
    fn blank_values_do_not_count() {
        let toml = VALID.replace("[\"A/B/Sales\"]", "[\" \"]");
        assert_eq!(
            problems(&toml, Mode::Deploy),
            vec!["to.value must list at least one item".to_string()]
        );
    }
}

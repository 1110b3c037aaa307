//! Core data models used throughout the deployer.
//!
//! Records returned by the reporting service are normalized here: every
//! identifier becomes a `String` no matter whether the API sent a JSON
//! number or a string, and empty parent ids become `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two reporting environments taking part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// The environment content is exported from.
    From,
    /// The environment content is imported into.
    To,
}

impl Environment {
    /// Section name in the credentials file and value of the tool's `--env` flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::From => "from",
            Environment::To => "to",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Kind of content a deploy request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Folders,
    Dashboards,
    Looks,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [
        ContentKind::Folders,
        ContentKind::Dashboards,
        ContentKind::Looks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Folders => "folders",
            ContentKind::Dashboards => "dashboards",
            ContentKind::Looks => "looks",
        }
    }

    /// Prefix of the exported artifact filename, e.g. `Dashboard_10_Sales.json`.
    ///
    /// Folders are exported as directories and have no file prefix.
    pub fn file_prefix(&self) -> Option<&'static str> {
        match self {
            ContentKind::Folders => None,
            ContentKind::Dashboards => Some("Dashboard"),
            ContentKind::Looks => Some("Look"),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folders" => Ok(ContentKind::Folders),
            "dashboards" => Ok(ContentKind::Dashboards),
            "looks" => Ok(ContentKind::Looks),
            other => Err(format!(
                "unsupported content type '{}'. Must be folders, dashboards, or looks.",
                other
            )),
        }
    }
}

/// A folder as listed by `GET /folders`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FolderRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub parent_id: Option<String>,
}

impl FolderRecord {
    pub fn new(id: &str, name: &str, parent_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
        }
    }
}

/// A dashboard or look as listed by `GET /dashboards` or `GET /looks`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentItem {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub title: String,
    #[serde(default, alias = "space_id", deserialize_with = "de_opt_id")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
}

impl ContentItem {
    pub fn new(id: &str, title: &str, folder_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            folder_id: folder_id.map(str::to_string),
            public: None,
        }
    }
}

/// A folder together with its computed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFolder {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub full_path: String,
}

/// A dashboard or look together with its storage path and UI path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    pub item: ContentItem,
    pub kind: ContentKind,
    /// Relative path of the exported artifact, e.g. `A/B/Dashboard_10_Sales.json`.
    pub full_path: String,
    /// Title-based path shown in the UI, e.g. `A/B/Sales`.
    pub ui_path: String,
}

/// Outcome status of a single requested item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeployStatus {
    Deployed,
    Failed,
}

impl DeployStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStatus::Deployed => "DEPLOYED",
            DeployStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One row of the deploy log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployOutcome {
    pub date: DateTime<Utc>,
    pub kind: ContentKind,
    pub requested_value: String,
    pub status: DeployStatus,
    pub issue: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Uint(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Uint(n) => n.to_string(),
        }
    }
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(RawId::deserialize(deserializer)?.into_string())
}

pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(RawId::into_string).filter(|id| !id.is_empty()))
}

fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_ids_are_normalized_to_strings() {
        let json = r#"[
            {"id": 1, "name": "A", "parent_id": null},
            {"id": "2", "name": "B", "parent_id": 1},
            {"id": 3, "name": "C", "parent_id": ""},
            {"id": 4, "name": null}
        ]"#;
        let folders: Vec<FolderRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(folders[0], FolderRecord::new("1", "A", None));
        assert_eq!(folders[1], FolderRecord::new("2", "B", Some("1")));
        assert_eq!(folders[2].parent_id, None);
        assert_eq!(folders[3].name, "");
        assert_eq!(folders[3].parent_id, None);
    }

    #[test]
    fn content_item_accepts_space_id_alias() {
        let json = r#"{"id": 7, "title": "Churn", "space_id": "12", "public": true}"#;
        let item: ContentItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "7");
        assert_eq!(item.folder_id.as_deref(), Some("12"));
        assert_eq!(item.public, Some(true));
    }

    #[test]
    fn content_kind_parses_only_known_kinds() {
        assert_eq!("looks".parse::<ContentKind>(), Ok(ContentKind::Looks));
        assert!("reports".parse::<ContentKind>().is_err());
    }
}

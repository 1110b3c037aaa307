//! Environment snapshots and the fetch-details report.
//!
//! A snapshot is the raw listing of one environment. Resolving it runs the
//! hierarchy walk and content location and yields the tables written by
//! `fetch_details` as well as the [`CrossEnvironmentIndex`] used by deploy.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::api::{AccessToken, ContentApi};
use crate::config::{Config, Mode};
use crate::error::DeployError;
use crate::hierarchy::{self, FolderHierarchy};
use crate::locator::{self, CrossEnvironmentIndex};
use crate::models::{ContentItem, ContentKind, Environment, FolderRecord, ResolvedFolder, ResolvedItem};
use crate::preconditions;
use crate::progress::{DeployProgressEvent, DeployProgressReporter};
use crate::tables::Table;

pub const FOLDER_COLUMNS: [&str; 4] = ["id", "name", "parent_id", "full_path"];
pub const DASHBOARD_COLUMNS: [&str; 5] = ["dashboard_id", "title", "folder", "full_path", "ui_path"];
pub const LOOK_COLUMNS: [&str; 6] = ["id", "title", "public", "folder", "full_path", "ui_path"];

/// Raw listings of one environment.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSnapshot {
    pub folders: Vec<FolderRecord>,
    pub dashboards: Vec<ContentItem>,
    pub looks: Vec<ContentItem>,
}

/// A snapshot after hierarchy and path resolution.
#[derive(Debug, Clone)]
pub struct ResolvedEnvironment {
    pub env: Environment,
    pub hierarchy: FolderHierarchy,
    pub folders: Vec<ResolvedFolder>,
    pub dashboards: Vec<ResolvedItem>,
    pub looks: Vec<ResolvedItem>,
    pub index: CrossEnvironmentIndex,
}

impl EnvironmentSnapshot {
    pub fn resolve(&self, env: Environment) -> ResolvedEnvironment {
        let (hierarchy, folders) = hierarchy::resolve(&self.folders);

        let mut index = CrossEnvironmentIndex::default();
        let (dashboards, dashboard_index) =
            locator::locate(&self.dashboards, &hierarchy, ContentKind::Dashboards);
        index.insert(ContentKind::Dashboards, dashboard_index);
        let (looks, look_index) = locator::locate(&self.looks, &hierarchy, ContentKind::Looks);
        index.insert(ContentKind::Looks, look_index);

        if hierarchy.is_empty() {
            tracing::warn!(env = env.as_str(), "environment lists no folders");
        }
        tracing::info!(
            env = env.as_str(),
            folders = hierarchy.len(),
            dashboards = dashboards.len(),
            looks = looks.len(),
            "resolved environment"
        );

        ResolvedEnvironment {
            env,
            hierarchy,
            folders,
            dashboards,
            looks,
            index,
        }
    }
}

/// Authorize against `env` using its configured credentials.
pub async fn authorize(
    api: &dyn ContentApi,
    config: &Config,
    env: Environment,
) -> Result<AccessToken, DeployError> {
    let creds = config
        .credentials(env)
        .filter(|c| c.is_complete())
        .ok_or_else(|| DeployError::Authorization {
            env: env.as_str().to_string(),
            message: "credentials are not configured".into(),
        })?;

    let token = api
        .login(&creds)
        .await
        .map_err(|e| DeployError::Authorization {
            env: env.as_str().to_string(),
            message: format!("{:#}", e),
        })?;
    tracing::info!(env = env.as_str(), "authorized");
    Ok(token)
}

/// List folders, dashboards and looks of one environment concurrently.
pub async fn fetch_snapshot(
    api: &dyn ContentApi,
    base_url: &str,
    token: &AccessToken,
) -> Result<EnvironmentSnapshot> {
    let (folders, dashboards, looks) = tokio::try_join!(
        api.folders(base_url, token),
        api.dashboards(base_url, token),
        api.looks(base_url, token),
    )?;
    Ok(EnvironmentSnapshot {
        folders,
        dashboards,
        looks,
    })
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl ResolvedEnvironment {
    pub fn folders_table(&self) -> Table {
        let mut t = Table::new(&FOLDER_COLUMNS);
        for f in &self.folders {
            t.push_row(vec![
                f.id.clone(),
                f.name.clone(),
                opt(&f.parent_id),
                f.full_path.clone(),
            ]);
        }
        t
    }

    pub fn dashboards_table(&self) -> Table {
        let mut t = Table::new(&DASHBOARD_COLUMNS);
        for d in &self.dashboards {
            t.push_row(vec![
                d.item.id.clone(),
                d.item.title.clone(),
                opt(&d.item.folder_id),
                d.full_path.clone(),
                d.ui_path.clone(),
            ]);
        }
        t
    }

    pub fn looks_table(&self) -> Table {
        let mut t = Table::new(&LOOK_COLUMNS);
        for l in &self.looks {
            t.push_row(vec![
                l.item.id.clone(),
                l.item.title.clone(),
                l.item.public.map(|p| p.to_string()).unwrap_or_default(),
                opt(&l.item.folder_id),
                l.full_path.clone(),
                l.ui_path.clone(),
            ]);
        }
        t
    }

    /// Write `<env>_folders.csv`, `<env>_dashboards.csv` and `<env>_looks.csv`.
    pub fn write_tables(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let env = self.env.as_str();
        let mut written = Vec::with_capacity(3);
        for kind in ContentKind::ALL {
            let table = match kind {
                ContentKind::Folders => self.folders_table(),
                ContentKind::Dashboards => self.dashboards_table(),
                ContentKind::Looks => self.looks_table(),
            };
            let name = format!("{}_{}.csv", env, kind.as_str());
            written.push(table.write_to(output_dir, &name)?);
        }
        Ok(written)
    }
}

/// List and resolve one already authorized environment.
pub async fn load_environment(
    api: &dyn ContentApi,
    config: &Config,
    env: Environment,
    token: &AccessToken,
    progress: &dyn DeployProgressReporter,
) -> Result<ResolvedEnvironment> {
    progress.report(DeployProgressEvent::Fetching { env });
    let base_url = config
        .credentials(env)
        .map(|c| c.base_url)
        .unwrap_or_default();
    let snapshot = fetch_snapshot(api, &base_url, token).await?;
    Ok(snapshot.resolve(env))
}

/// Run the read-only fetch-details report.
///
/// Every environment with complete credentials is resolved and its three
/// tables are written to `[paths].output_dir`.
pub async fn run_fetch_details(
    config: &Config,
    api: &dyn ContentApi,
    progress: &dyn DeployProgressReporter,
) -> Result<Vec<ResolvedEnvironment>> {
    progress.report(DeployProgressEvent::Validating);
    preconditions::validate(config, Mode::FetchDetails)?;

    let mut resolved = Vec::new();
    for env in config.configured_environments() {
        let token = authorize(api, config, env).await?;
        let environment = load_environment(api, config, env, &token, progress).await?;
        for path in environment.write_tables(&config.paths.output_dir)? {
            tracing::info!(path = %path.display(), "wrote table");
        }
        resolved.push(environment);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> EnvironmentSnapshot {
        let mut look = ContentItem::new("4", "Churn, weekly", Some("1"));
        look.public = Some(false);
        EnvironmentSnapshot {
            folders: vec![
                FolderRecord::new("1", "A", None),
                FolderRecord::new("2", "B", Some("1")),
            ],
            dashboards: vec![ContentItem::new("10", "Sales", Some("2"))],
            looks: vec![look],
        }
    }

    #[test]
    fn resolve_builds_index_for_both_kinds() {
        let env = snapshot().resolve(Environment::From);
        assert_eq!(env.index.dashboards["A/B/Sales"], "A/B/Dashboard_10_Sales.json");
        assert_eq!(env.index.looks["A/Churn, weekly"], "A/Look_4_Churn, weekly.json");
        assert!(env.hierarchy.contains("2"));
    }

    #[test]
    fn tables_use_report_columns() {
        let env = snapshot().resolve(Environment::To);
        assert_eq!(
            env.folders_table().to_csv(),
            "id,name,parent_id,full_path\n1,A,,A\n2,B,1,A/B\n"
        );
        assert_eq!(
            env.dashboards_table().to_csv(),
            "dashboard_id,title,folder,full_path,ui_path\n\
             10,Sales,2,A/B/Dashboard_10_Sales.json,A/B/Sales\n"
        );
        assert_eq!(
            env.looks_table().rows()[0],
            vec!["4", "Churn, weekly", "false", "1", "A/Look_4_Churn, weekly.json", "A/Churn, weekly"]
        );
    }

    #[test]
    fn empty_snapshot_resolves_to_empty_tables() {
        let env = EnvironmentSnapshot::default().resolve(Environment::To);
        assert!(env.hierarchy.is_empty());
        assert_eq!(env.folders_table().to_csv(), "id,name,parent_id,full_path\n");
        assert!(env.index.dashboards.is_empty());
    }

    #[test]
    fn write_tables_prefixes_environment() {
        let tmp = tempfile::TempDir::new().unwrap();
        let written = snapshot()
            .resolve(Environment::From)
            .write_tables(tmp.path())
            .unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["from_folders.csv", "from_dashboards.csv", "from_looks.csv"]);
    }
}

//! Two-phase deploy pipeline.
//!
//! ```text
//! Validating ──▶ Exporting ──▶ Importing(0) ──▶ … ──▶ Importing(n-1) ──▶ Done
//!     │              │
//!     └──────────────┴──▶ Aborted
//! ```
//!
//! `Validating` and `Exporting` are preconditions for the whole batch: a
//! failure there aborts the run and no log is written. Inside the import
//! loop every failure is scoped to one item and recorded as a `FAILED` row.

use anyhow::Result;
use std::path::{Component, Path, PathBuf};

use crate::api::ContentApi;
use crate::config::{Config, Mode};
use crate::content_tool::ContentTool;
use crate::credentials;
use crate::deploy_log::DeployLog;
use crate::error::DeployError;
use crate::fetch::{self, ResolvedEnvironment};
use crate::mapper;
use crate::models::{ContentKind, DeployStatus, Environment};
use crate::preconditions;
use crate::progress::{DeployProgressEvent, DeployProgressReporter};

pub const ISSUE_REQUEST_FAILED: &str = "Request failed.";
pub const ISSUE_EMPTY_VALUE: &str = "Empty value.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Validating,
    Exporting,
    Importing(usize),
    Done,
    Aborted,
}

/// Everything the export and import stages need, produced by validation.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub kind: ContentKind,
    pub values: Vec<String>,
    pub source_folder_id: String,
    pub target_folder: String,
    pub source: ResolvedEnvironment,
    pub destination: ResolvedEnvironment,
}

pub fn missing_artifact_issue(value: &str) -> String {
    format!("[{}] does not exist in path.", value)
}

pub fn outside_export_issue(value: &str) -> String {
    format!("[{}] is not a path inside the export directory.", value)
}

/// True when `storage_path` is relative and made only of plain names, so
/// joining it onto the export directory cannot leave that directory.
pub fn is_contained(storage_path: &str) -> bool {
    let path = Path::new(storage_path);
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}

pub struct DeployOrchestrator<'a> {
    config: &'a Config,
    api: &'a dyn ContentApi,
    tool: &'a dyn ContentTool,
    progress: &'a dyn DeployProgressReporter,
    state: DeployState,
}

impl<'a> DeployOrchestrator<'a> {
    pub fn new(
        config: &'a Config,
        api: &'a dyn ContentApi,
        tool: &'a dyn ContentTool,
        progress: &'a dyn DeployProgressReporter,
    ) -> Self {
        Self {
            config,
            api,
            tool,
            progress,
            state: DeployState::Validating,
        }
    }

    pub fn state(&self) -> DeployState {
        self.state
    }

    fn transition(&mut self, next: DeployState) {
        tracing::debug!(from = ?self.state, to = ?next, "deploy state");
        self.state = next;
    }

    /// Run the pipeline and return the deploy log. The log is not written.
    pub async fn run(&mut self) -> Result<DeployLog> {
        self.transition(DeployState::Validating);
        let plan = match self.validate().await {
            Ok(plan) => plan,
            Err(e) => {
                self.transition(DeployState::Aborted);
                return Err(e);
            }
        };

        self.transition(DeployState::Exporting);
        if let Err(e) = self.export(&plan).await {
            self.transition(DeployState::Aborted);
            return Err(e);
        }

        let log = self.import_all(&plan).await;

        self.transition(DeployState::Done);
        self.progress.report(DeployProgressEvent::Done {
            deployed: log.count(DeployStatus::Deployed) as u64,
            failed: log.count(DeployStatus::Failed) as u64,
        });
        Ok(log)
    }

    /// Config checks, authorization of both environments and the source folder lookup.
    pub async fn validate(&mut self) -> Result<DeployPlan> {
        self.progress.report(DeployProgressEvent::Validating);
        preconditions::validate(self.config, Mode::Deploy)?;

        let (from, to) = match (&self.config.from, &self.config.to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(DeployError::Config("from and to sections are required".into()).into()),
        };
        let kind: ContentKind = to
            .content_type
            .parse()
            .map_err(|e: String| DeployError::Precondition(vec![e]))?;
        let source_folder_id = from.folder_id.clone().unwrap_or_default();
        let target_folder = to.target_folder.clone().unwrap_or_default();

        let source_token = fetch::authorize(self.api, self.config, Environment::From).await?;
        let destination_token = fetch::authorize(self.api, self.config, Environment::To).await?;

        let source = fetch::load_environment(
            self.api,
            self.config,
            Environment::From,
            &source_token,
            self.progress,
        )
        .await?;
        if !source.hierarchy.contains(&source_folder_id) {
            return Err(DeployError::UnknownSourceFolder(source_folder_id).into());
        }
        let destination = fetch::load_environment(
            self.api,
            self.config,
            Environment::To,
            &destination_token,
            self.progress,
        )
        .await?;

        tracing::info!(
            kind = kind.as_str(),
            items = to.value.len(),
            source_folder = %source_folder_id,
            source_path = %source.hierarchy.path_of(&source_folder_id).unwrap_or_default(),
            "validated deploy"
        );

        Ok(DeployPlan {
            kind,
            values: to.value.clone(),
            source_folder_id,
            target_folder,
            source,
            destination,
        })
    }

    async fn export(&self, plan: &DeployPlan) -> Result<()> {
        let paths = &self.config.paths;
        std::fs::create_dir_all(&paths.export_dir).map_err(|e| DeployError::Export {
            folder_id: plan.source_folder_id.clone(),
            message: format!("cannot create {}: {}", paths.export_dir.display(), e),
        })?;
        credentials::write_ini(self.config).map_err(|e| DeployError::Export {
            folder_id: plan.source_folder_id.clone(),
            message: format!("{:#}", e),
        })?;

        self.progress.report(DeployProgressEvent::Exporting {
            folder_id: plan.source_folder_id.clone(),
        });
        tracing::info!(folder_id = %plan.source_folder_id, "exporting source folder");

        self.tool
            .export(&plan.source_folder_id, &paths.export_dir, &paths.ini_file)
            .await
            .map_err(|e| DeployError::Export {
                folder_id: plan.source_folder_id.clone(),
                message: format!("{:#}", e),
            })?;
        Ok(())
    }

    async fn import_all(&mut self, plan: &DeployPlan) -> DeployLog {
        let mut log = DeployLog::new();
        let total = plan.values.len() as u64;

        for (i, value) in plan.values.iter().enumerate() {
            self.transition(DeployState::Importing(i));
            self.progress.report(DeployProgressEvent::Importing {
                n: i as u64 + 1,
                total,
                value: value.clone(),
            });
            self.import_one(plan, value, &mut log).await;
        }

        log
    }

    async fn import_one(&self, plan: &DeployPlan, value: &str, log: &mut DeployLog) {
        let kind = plan.kind;
        if value.trim().is_empty() {
            tracing::warn!(kind = kind.as_str(), "skipping empty value");
            log.record_failed(kind, value, ISSUE_EMPTY_VALUE);
            return;
        }

        let storage_path = match mapper::map(kind, value, &plan.source.index) {
            Ok(path) => path,
            Err(miss) => {
                tracing::warn!(kind = kind.as_str(), value, "{}", miss);
                log.record_failed(kind, value, miss.to_string());
                return;
            }
        };

        if !is_contained(&storage_path) {
            tracing::warn!(value, storage_path = %storage_path, "storage path escapes export directory");
            log.record_failed(kind, value, outside_export_issue(value));
            return;
        }

        let artifact = self.artifact_path(&storage_path);
        if !artifact.exists() {
            tracing::warn!(value, artifact = %artifact.display(), "export artifact missing");
            log.record_failed(kind, value, missing_artifact_issue(value));
            return;
        }

        if plan
            .destination
            .index
            .kind(kind)
            .is_some_and(|idx| idx.contains_key(value))
        {
            tracing::debug!(value, "destination already has content at this path");
        }

        tracing::info!(kind = kind.as_str(), value, "importing");
        match self
            .tool
            .import(
                kind,
                &artifact,
                &plan.target_folder,
                &self.config.paths.ini_file,
            )
            .await
        {
            Ok(()) => log.record_deployed(kind, value),
            Err(e) => {
                tracing::error!(kind = kind.as_str(), value, error = %format!("{:#}", e), "import failed");
                log.record_failed(kind, value, ISSUE_REQUEST_FAILED);
            }
        }
    }

    fn artifact_path(&self, storage_path: &str) -> PathBuf {
        self.config.paths.export_dir.join(storage_path)
    }
}

/// Run a full deploy and write `deploy_log.csv` to `[paths].output_dir`.
pub async fn run_deploy(
    config: &Config,
    api: &dyn ContentApi,
    tool: &dyn ContentTool,
    progress: &dyn DeployProgressReporter,
) -> Result<DeployLog> {
    let mut orchestrator = DeployOrchestrator::new(config, api, tool, progress);
    let log = orchestrator.run().await?;
    let path = log.write(&config.paths.output_dir)?;
    tracing::info!(
        path = %path.display(),
        deployed = log.count(DeployStatus::Deployed),
        failed = log.count(DeployStatus::Failed),
        "deploy finished"
    );
    Ok(log)
}

/// Run only the validation stage.
pub async fn run_check(
    config: &Config,
    api: &dyn ContentApi,
    tool: &dyn ContentTool,
    progress: &dyn DeployProgressReporter,
) -> Result<DeployPlan> {
    let mut orchestrator = DeployOrchestrator::new(config, api, tool, progress);
    orchestrator.validate().await
}

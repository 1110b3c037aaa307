//! External content export/import tool.
//!
//! The tool reads connection settings from the credentials file and moves
//! content between an instance and a local directory:
//!
//! ```text
//! <program> content export --env from --folders <id> --local-target <dir> --ini <file>
//! <program> content import --env to --<type> <artifact> --target-folder <id> --ini <file> [--recursive]
//! ```
//!
//! Arguments are always passed as a vector, never through a shell, because
//! titles are free text and end up inside artifact paths.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;

use crate::models::{ContentKind, Environment};

#[async_trait]
pub trait ContentTool: Send + Sync {
    /// Export the folder `folder_id` of the source environment into `export_dir`.
    async fn export(&self, folder_id: &str, export_dir: &Path, ini_file: &Path) -> Result<()>;

    /// Import one exported artifact into `target_folder` of the destination.
    async fn import(
        &self,
        kind: ContentKind,
        artifact: &Path,
        target_folder: &str,
        ini_file: &Path,
    ) -> Result<()>;
}

pub fn export_args(folder_id: &str, export_dir: &Path, ini_file: &Path) -> Vec<OsString> {
    vec![
        "content".into(),
        "export".into(),
        "--env".into(),
        Environment::From.as_str().into(),
        "--folders".into(),
        folder_id.into(),
        "--local-target".into(),
        export_dir.into(),
        "--ini".into(),
        ini_file.into(),
    ]
}

pub fn import_args(
    kind: ContentKind,
    artifact: &Path,
    target_folder: &str,
    ini_file: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "content".into(),
        "import".into(),
        "--env".into(),
        Environment::To.as_str().into(),
        format!("--{}", kind.as_str()).into(),
        artifact.into(),
        "--target-folder".into(),
        target_folder.into(),
        "--ini".into(),
        ini_file.into(),
    ];
    if kind == ContentKind::Folders {
        args.push("--recursive".into());
    }
    args
}

/// Runs the `ldeploy`-compatible program named in `[tool].program`.
pub struct LdeployTool {
    program: String,
}

impl LdeployTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: Vec<OsString>) -> Result<()> {
        tracing::debug!(program = %self.program, args = ?args, "spawning");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .with_context(|| format!("Failed to execute '{}'. Is it installed?", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        Ok(())
    }
}

#[async_trait]
impl ContentTool for LdeployTool {
    async fn export(&self, folder_id: &str, export_dir: &Path, ini_file: &Path) -> Result<()> {
        self.run(export_args(folder_id, export_dir, ini_file)).await
    }

    async fn import(
        &self,
        kind: ContentKind,
        artifact: &Path,
        target_folder: &str,
        ini_file: &Path,
    ) -> Result<()> {
        self.run(import_args(kind, artifact, target_folder, ini_file))
            .await
    }
}

//! Deploy progress reporting.
//!
//! Reports which stage a run is in and how far the import loop has come, so
//! operators can follow long batches. Progress is emitted on **stderr** so
//! stdout stays parseable for scripts.

use std::io::Write;

use crate::models::Environment;

/// A single progress event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeployProgressEvent {
    /// Config checks and authorization are running.
    Validating,
    /// Listing folders, dashboards and looks of one environment.
    Fetching { env: Environment },
    /// The external export is running.
    Exporting { folder_id: String },
    /// Item `n` of `total` is being imported.
    Importing { n: u64, total: u64, value: String },
    /// The run finished.
    Done { deployed: u64, failed: u64 },
}

/// Reports deploy progress. Implementations write to stderr (human or JSON).
pub trait DeployProgressReporter: Send + Sync {
    fn report(&self, event: DeployProgressEvent);
}

/// Human-friendly progress on stderr: "deploy  importing  3 / 1,200  A/B/Sales".
pub struct StderrProgress;

impl DeployProgressReporter for StderrProgress {
    fn report(&self, event: DeployProgressEvent) {
        let line = match &event {
            DeployProgressEvent::Validating => "deploy  validating...\n".to_string(),
            DeployProgressEvent::Fetching { env } => {
                format!("deploy  fetching {}...\n", env)
            }
            DeployProgressEvent::Exporting { folder_id } => {
                format!("deploy  exporting folder {}...\n", folder_id)
            }
            DeployProgressEvent::Importing { n, total, value } => format!(
                "deploy  importing  {} / {}  {}\n",
                format_number(*n),
                format_number(*total),
                value
            ),
            DeployProgressEvent::Done { deployed, failed } => format!(
                "deploy  done  {} deployed, {} failed\n",
                format_number(*deployed),
                format_number(*failed)
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl DeployProgressReporter for JsonProgress {
    fn report(&self, event: DeployProgressEvent) {
        let obj = match &event {
            DeployProgressEvent::Validating => serde_json::json!({
                "event": "progress",
                "phase": "validating"
            }),
            DeployProgressEvent::Fetching { env } => serde_json::json!({
                "event": "progress",
                "phase": "fetching",
                "env": env.as_str()
            }),
            DeployProgressEvent::Exporting { folder_id } => serde_json::json!({
                "event": "progress",
                "phase": "exporting",
                "folder_id": folder_id
            }),
            DeployProgressEvent::Importing { n, total, value } => serde_json::json!({
                "event": "progress",
                "phase": "importing",
                "n": n,
                "total": total,
                "value": value
            }),
            DeployProgressEvent::Done { deployed, failed } => serde_json::json!({
                "event": "progress",
                "phase": "done",
                "deployed": deployed,
                "failed": failed
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl DeployProgressReporter for NoProgress {
    fn report(&self, _event: DeployProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn DeployProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

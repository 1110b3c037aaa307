//! # Content Deployer
//!
//! Migrates BI content (folders, dashboards and looks) from a source
//! reporting instance to a destination instance.
//!
//! Numeric ids are not stable between instances, so content is matched by
//! its UI path (folder names plus title). The source folder is exported with
//! an external content tool, every requested item is mapped to its exported
//! artifact and imported into the destination one at a time, and each item's
//! outcome lands in a deploy log.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌────────────┐
//! │  HTTP API    │──▶│  Hierarchy   │──▶│  Locator   │
//! │ folders/...  │   │  resolver    │   │ ui index   │
//! └──────────────┘   └─────────────┘   └─────┬──────┘
//!                                            │
//!                     ┌──────────────────────┤
//!                     ▼                      ▼
//!              ┌────────────┐         ┌────────────┐
//!              │   Deploy   │────────▶│ Deploy log │
//!              │ export/imp │         │   (CSV)    │
//!              └────────────┘         └────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`preconditions`] | Per-mode configuration checks |
//! | [`models`] | Core data types |
//! | [`hierarchy`] | Folder tree and folder paths |
//! | [`locator`] | Content paths and the UI path index |
//! | [`mapper`] | Requested value → exported artifact |
//! | [`api`] | Reporting service HTTP client |
//! | [`content_tool`] | External export/import tool |
//! | [`credentials`] | Credentials file for the tool |
//! | [`deploy`] | Deploy pipeline |
//! | [`deploy_log`] | Per-item outcomes |
//! | [`fetch`] | Environment snapshots and fetch-details report |
//! | [`tables`] | CSV output |
//! | [`progress`] | Progress reporting on stderr |
//! | [`error`] | Run-level errors and exit codes |

pub mod api;
pub mod config;
pub mod content_tool;
pub mod credentials;
pub mod deploy;
pub mod deploy_log;
pub mod error;
pub mod fetch;
pub mod hierarchy;
pub mod locator;
pub mod mapper;
pub mod models;
pub mod preconditions;
pub mod progress;
pub mod tables;
